//! Inference contributors and their registration table.

use std::fmt::{self, Debug};
use std::sync::Arc;

use diagnos_core::{DiagnosError, Result, Value};

use crate::fact::{Fact, PropagationEntry};
use crate::merge;
use crate::session::Session;

/// Index of a contributor inside its [`ContributorRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContributorId(u16);

impl ContributorId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u16)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contributor-{}", self.0)
    }
}

/// Role of a contributor in the reasoning cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContributorKind {
    /// Enters observations (user input, external data).
    Source,
    /// Derives values from other values (rules, transitions).
    Problemsolver,
    /// Plans which questions to ask next. Skipped in simulated sessions.
    Strategic,
}

/// An independent inference module.
///
/// Contributors derive values for terminology objects and merge their own
/// competing facts. They never see facts of other contributors.
pub trait Contributor: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> ContributorKind;

    /// Distribution order and merge precedence, lower comes first.
    fn priority(&self) -> u32;

    /// Merges this contributor's facts for one object into a single value.
    ///
    /// Facts are passed in insertion order. The default keeps the last one.
    fn merge(&self, facts: &[&Fact]) -> Value {
        merge::last_wins(facts)
    }

    /// Called once when a session is created, inside the session's first
    /// propagation frame.
    fn init(&self, _session: &mut Session, _me: ContributorId) -> Result<()> {
        Ok(())
    }

    /// Reacts to a batch of changed values.
    fn propagate(
        &self,
        session: &mut Session,
        me: ContributorId,
        changes: &[PropagationEntry],
    ) -> Result<()>;

    /// Called after every pending change has been distributed.
    fn post_propagate(&self, _session: &mut Session, _me: ContributorId) -> Result<()> {
        Ok(())
    }
}

/// Explicit, priority-sorted table of contributors shared by sessions.
///
/// # Example
///
/// ```
/// use diagnos_blackboard::{ContributorRegistry, UserContributor};
///
/// let registry = ContributorRegistry::builder()
///     .with(UserContributor)
///     .build();
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.find(UserContributor::NAME).is_some());
/// ```
#[derive(Debug)]
pub struct ContributorRegistry {
    contributors: Vec<Arc<dyn Contributor>>,
    by_priority: Vec<ContributorId>,
}

impl ContributorRegistry {
    pub fn builder() -> ContributorRegistryBuilder {
        ContributorRegistryBuilder {
            contributors: Vec::new(),
        }
    }

    /// Returns the contributor behind an id.
    ///
    /// # Panics
    ///
    /// Panics if the id belongs to another registry.
    pub fn get(&self, id: ContributorId) -> &Arc<dyn Contributor> {
        &self.contributors[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<ContributorId> {
        self.contributors
            .iter()
            .position(|c| c.name() == name)
            .map(ContributorId::from_index)
    }

    /// Like [`find`](Self::find) but reports a missing contributor as error.
    pub fn require(&self, name: &str) -> Result<ContributorId> {
        self.find(name)
            .ok_or_else(|| DiagnosError::UnknownContributor(name.to_string()))
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ContributorId> {
        (0..self.contributors.len()).map(ContributorId::from_index)
    }

    /// Ids sorted by priority, ties in registration order.
    pub fn by_priority(&self) -> &[ContributorId] {
        &self.by_priority
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}

/// Builder for [`ContributorRegistry`].
#[derive(Debug)]
pub struct ContributorRegistryBuilder {
    contributors: Vec<Arc<dyn Contributor>>,
}

impl ContributorRegistryBuilder {
    pub fn with<C: Contributor + 'static>(self, contributor: C) -> Self {
        self.with_shared(Arc::new(contributor))
    }

    /// Registers a contributor the caller keeps a handle to.
    pub fn with_shared(mut self, contributor: Arc<dyn Contributor>) -> Self {
        self.contributors.push(contributor);
        self
    }

    pub fn build(self) -> ContributorRegistry {
        let mut by_priority: Vec<ContributorId> = (0..self.contributors.len())
            .map(ContributorId::from_index)
            .collect();
        by_priority.sort_by_key(|id| (self.contributors[id.index()].priority(), *id));
        ContributorRegistry {
            contributors: self.contributors,
            by_priority,
        }
    }
}
