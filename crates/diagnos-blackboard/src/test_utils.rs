//! Test utilities for diagnos-blackboard
//!
//! Fixtures are defined locally because the shared `diagnos-test` crate
//! depends on this crate, which would give its contributors a distinct
//! `Contributor` trait inside these unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use diagnos_core::{Choice, DiagnosError, KnowledgeBase, ObjectId, Result};

use crate::contributor::{Contributor, ContributorId, ContributorKind, ContributorRegistry};
use crate::fact::{Fact, PropagationEntry, Source};
use crate::session::Session;
use crate::user::UserContributor;

pub fn contributor_id(index: usize) -> ContributorId {
    ContributorId::from_index(index)
}

/// Knowledge base with one-choice question `weekday` (Monday..Sunday) and
/// two free questions `a` and `b`.
pub fn weekday_kb() -> (Arc<KnowledgeBase>, ObjectId) {
    let mut builder = KnowledgeBase::builder("weekday");
    let weekday = builder
        .one_choice(
            "weekday",
            [
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
                "Sunday",
            ]
            .map(Choice::new),
            None,
        )
        .unwrap();
    for name in ["a", "b"] {
        builder
            .one_choice(name, ["A", "B", "C"].map(Choice::new), None)
            .unwrap();
    }
    (Arc::new(builder.build()), weekday)
}

/// Registry of the given stubs with [`UserContributor`] registered first.
pub fn registry_with(stubs: Vec<StubContributor>) -> Arc<ContributorRegistry> {
    shared_registry(stubs.into_iter().map(Arc::new).collect())
}

pub fn shared_registry(stubs: Vec<Arc<StubContributor>>) -> Arc<ContributorRegistry> {
    let builder = ContributorRegistry::builder().with(UserContributor);
    let builder = stubs
        .into_iter()
        .fold(builder, |b, stub| b.with_shared(stub as Arc<dyn Contributor>));
    Arc::new(builder.build())
}

pub fn session_with(kb: Arc<KnowledgeBase>, stubs: Vec<Arc<StubContributor>>) -> Session {
    Session::new(kb, shared_registry(stubs)).unwrap()
}

/// Configurable contributor recording every batch it receives.
#[derive(Debug)]
pub struct StubContributor {
    name: String,
    priority: u32,
    kind: ContributorKind,
    failing: bool,
    // Copies the value of the first object onto the second.
    cascade: Option<(ObjectId, ObjectId)>,
    batches: Mutex<Vec<Vec<PropagationEntry>>>,
    post_calls: AtomicUsize,
}

impl StubContributor {
    pub fn new(name: &str, priority: u32) -> Self {
        Self {
            name: name.to_string(),
            priority,
            kind: ContributorKind::Problemsolver,
            failing: false,
            cascade: None,
            batches: Mutex::new(Vec::new()),
            post_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_kind(mut self, kind: ContributorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn with_cascade(mut self, from: ObjectId, to: ObjectId) -> Self {
        self.cascade = Some((from, to));
        self
    }

    pub fn batches(&self) -> Vec<Vec<PropagationEntry>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn received(&self) -> Vec<PropagationEntry> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }
}

impl Contributor for StubContributor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ContributorKind {
        self.kind
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn propagate(
        &self,
        session: &mut Session,
        me: ContributorId,
        changes: &[PropagationEntry],
    ) -> Result<()> {
        self.batches.lock().unwrap().push(changes.to_vec());
        if self.failing {
            return Err(DiagnosError::InvalidState(format!("{} failed", self.name)));
        }
        if let Some((from, to)) = self.cascade {
            for change in changes.iter().filter(|c| c.object() == from) {
                if change.new_value().is_undefined() {
                    session.remove_object_facts(to, me);
                } else {
                    session.add_fact(Fact::new(
                        to,
                        change.new_value().clone(),
                        Source::Object(from),
                        me,
                    ));
                }
            }
        }
        Ok(())
    }

    fn post_propagate(&self, _session: &mut Session, _me: ContributorId) -> Result<()> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
