//! Sessions: one blackboard, one propagation controller and per-contributor
//! private state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use diagnos_core::{DiagnosError, Indication, KnowledgeBase, ObjectId, Result, Value};
use tracing::{debug, error, trace};

use crate::blackboard::Blackboard;
use crate::contributor::{ContributorId, ContributorKind, ContributorRegistry};
use crate::fact::{Fact, Source};
use crate::propagation::PropagationController;
use crate::user::UserContributor;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// One diagnostic case.
///
/// Every write goes through a propagation frame. When the outermost frame
/// closes, pending changes are handed to contributors in priority order until
/// none are left, then every contributor's `post_propagate` runs. The loop
/// repeats while those hooks produce new changes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use diagnos_blackboard::{ContributorRegistry, Session, UserContributor};
/// use diagnos_core::{Choice, KnowledgeBase, Value};
///
/// let mut builder = KnowledgeBase::builder("demo");
/// let fever = builder
///     .one_choice("fever", [Choice::new("yes"), Choice::new("no")], None)
///     .unwrap();
/// let kb = Arc::new(builder.build());
/// let registry = Arc::new(ContributorRegistry::builder().with(UserContributor).build());
///
/// let mut session = Session::new(kb, registry).unwrap();
/// session.answer_choice("fever", "yes").unwrap();
/// assert_eq!(session.value(fever), &Value::choice("yes"));
/// ```
pub struct Session {
    id: SessionId,
    kb: Arc<KnowledgeBase>,
    registry: Arc<ContributorRegistry>,
    blackboard: Blackboard,
    propagation: PropagationController,
    objects: HashMap<ContributorId, Box<dyn Any + Send>>,
    simulation: bool,
}

impl Session {
    /// Creates a live session and initializes every contributor.
    pub fn new(kb: Arc<KnowledgeBase>, registry: Arc<ContributorRegistry>) -> Result<Self> {
        Self::create(kb, registry, false)
    }

    fn create(
        kb: Arc<KnowledgeBase>,
        registry: Arc<ContributorRegistry>,
        simulation: bool,
    ) -> Result<Self> {
        let listening = registry
            .ids()
            .map(|id| !simulation || registry.get(id).kind() != ContributorKind::Strategic)
            .collect();
        let mut session = Session {
            id: SessionId::next(),
            kb,
            blackboard: Blackboard::new(Arc::clone(&registry)),
            registry: Arc::clone(&registry),
            propagation: PropagationController::new(listening),
            objects: HashMap::new(),
            simulation,
        };
        // One frame for all inits, so nothing is distributed to a
        // contributor before its own init ran.
        session.propagate(|s| -> Result<()> {
            for &id in registry.by_priority() {
                if s.propagation.is_listening(id) {
                    registry.get(id).init(s, id)?;
                }
            }
            Ok(())
        })?;
        Ok(session)
    }

    /// Creates a simulated copy for planning.
    ///
    /// The copy shares knowledge base and contributors, skips strategic
    /// contributors, and starts with the merged value of every answered
    /// question stored under the contributor that owns it.
    pub fn search_copy(&self) -> Result<Session> {
        let mut copy = Self::create(Arc::clone(&self.kb), Arc::clone(&self.registry), true)?;
        let source = Source::named("search-copy");
        let facts: Vec<Fact> = self
            .kb
            .questions()
            .filter_map(|question| {
                let id = question.id();
                let value = self.blackboard.value(id);
                let owner = self.blackboard.owner(id)?;
                value
                    .is_answered()
                    .then(|| Fact::new(id, value.clone(), source.clone(), owner))
            })
            .collect();
        debug!(
            event = "search_copy",
            session = %self.id,
            copy = %copy.id,
            facts = facts.len(),
        );
        copy.propagate(|s| {
            for fact in facts {
                s.add_fact(fact);
            }
        });
        Ok(copy)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn contributors(&self) -> &Arc<ContributorRegistry> {
        &self.registry
    }

    pub fn contributor_id(&self, name: &str) -> Result<ContributorId> {
        self.registry.require(name)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn propagation(&self) -> &PropagationController {
        &self.propagation
    }

    /// Returns true for search copies.
    pub fn is_simulation(&self) -> bool {
        self.simulation
    }

    pub fn value(&self, object: ObjectId) -> &Value {
        self.blackboard.value(object)
    }

    pub fn indication(&self, object: ObjectId) -> Indication {
        self.blackboard.indication(object)
    }

    /// Returns true once every question below the QContainer is answered.
    pub fn is_done(&self, qcontainer: ObjectId) -> bool {
        self.kb
            .questions_of(qcontainer)
            .into_iter()
            .all(|question| self.value(question).is_answered())
    }

    /// Runs `f` inside one propagation frame.
    pub fn propagate<R>(&mut self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.propagation.open_frame();
        let result = f(self);
        self.close_frame();
        result
    }

    pub fn add_fact(&mut self, fact: Fact) {
        self.propagate(|s| {
            if let Some(entry) = s.blackboard.add_fact(fact) {
                s.propagation.report(entry);
            }
        });
    }

    pub fn remove_fact(&mut self, fact: &Fact) {
        self.propagate(|s| {
            if let Some(entry) = s.blackboard.remove_fact(fact) {
                s.propagation.report(entry);
            }
        });
    }

    /// Removes all facts of a contributor for an object.
    pub fn remove_object_facts(&mut self, object: ObjectId, contributor: ContributorId) {
        self.propagate(|s| {
            if let Some(entry) = s.blackboard.remove_object_facts(object, contributor) {
                s.propagation.report(entry);
            }
        });
    }

    /// Removes previously added facts in reverse order within one frame.
    pub fn retract_facts(&mut self, facts: &[Fact]) {
        self.propagate(|s| {
            for fact in facts.iter().rev() {
                s.remove_fact(fact);
            }
        });
    }

    /// Enters a user answer for a question and returns the stored fact.
    pub fn answer(&mut self, question: ObjectId, value: Value) -> Result<Fact> {
        let object = self
            .kb
            .get(question)
            .ok_or_else(|| DiagnosError::UnknownObject(question.to_string()))?;
        if !object.is_question() {
            return Err(DiagnosError::WrongKind {
                name: object.name().to_string(),
                expected: "question",
            });
        }
        let user = self.registry.require(UserContributor::NAME)?;
        let fact = Fact::new(question, value, Source::User, user);
        self.add_fact(fact.clone());
        Ok(fact)
    }

    /// Selects a choice of a choice question, both given by name.
    pub fn answer_choice(&mut self, question: &str, choice: &str) -> Result<Fact> {
        let id = self.kb.search_question(question)?;
        let value = self.kb.choice_value(id, choice)?;
        self.answer(id, value)
    }

    fn close_frame(&mut self) {
        if self.propagation.depth() == 1 {
            self.distribute();
        }
        self.propagation.leave_frame();
    }

    fn distribute(&mut self) {
        let registry = Arc::clone(&self.registry);
        let order = registry.by_priority();
        loop {
            while let Some((id, batch)) = self.propagation.next_batch(order) {
                let contributor = registry.get(id);
                trace!(
                    event = "distribute",
                    session = %self.id,
                    contributor = contributor.name(),
                    changes = batch.len(),
                );
                if let Err(err) = contributor.propagate(self, id, &batch) {
                    error!(
                        event = "propagation_failed",
                        session = %self.id,
                        contributor = contributor.name(),
                        error = %err,
                    );
                }
            }
            for &id in order {
                if !self.propagation.is_listening(id) {
                    continue;
                }
                let contributor = registry.get(id);
                if let Err(err) = contributor.post_propagate(self, id) {
                    error!(
                        event = "post_propagation_failed",
                        session = %self.id,
                        contributor = contributor.name(),
                        error = %err,
                    );
                }
            }
            if !self.propagation.has_pending() {
                break;
            }
        }
    }

    /// Stores a contributor's private state, replacing any previous one.
    pub fn insert_object<T: Any + Send>(&mut self, contributor: ContributorId, object: T) {
        self.objects.insert(contributor, Box::new(object));
    }

    pub fn object<T: Any + Send>(&self, contributor: ContributorId) -> Result<&T> {
        self.objects
            .get(&contributor)
            .and_then(|object| object.downcast_ref::<T>())
            .ok_or_else(|| DiagnosError::MissingSessionObject(contributor.to_string()))
    }

    pub fn object_mut<T: Any + Send>(&mut self, contributor: ContributorId) -> Result<&mut T> {
        self.objects
            .get_mut(&contributor)
            .and_then(|object| object.downcast_mut::<T>())
            .ok_or_else(|| DiagnosError::MissingSessionObject(contributor.to_string()))
    }

    /// Runs `f` with a contributor's private state taken out of the session,
    /// so `f` can mutate both.
    pub fn with_object<T: Any + Send, R>(
        &mut self,
        contributor: ContributorId,
        f: impl FnOnce(&mut T, &mut Session) -> R,
    ) -> Result<R> {
        let missing = || DiagnosError::MissingSessionObject(contributor.to_string());
        let boxed = self.objects.remove(&contributor).ok_or_else(missing)?;
        let mut object = match boxed.downcast::<T>() {
            Ok(object) => object,
            Err(boxed) => {
                self.objects.insert(contributor, boxed);
                return Err(missing());
            }
        };
        let result = f(object.as_mut(), self);
        self.objects.insert(contributor, object);
        Ok(result)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("kb", &self.kb.name())
            .field("simulation", &self.simulation)
            .field("objects", &self.blackboard.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
