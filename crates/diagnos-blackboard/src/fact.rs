//! Facts and propagation entries.

use std::fmt;
use std::sync::Arc;

use diagnos_core::{ObjectId, Value};

use crate::contributor::ContributorId;

/// Where a fact came from.
///
/// Facts of one contributor for one object are keyed by their source: a new
/// fact with the same source replaces the old one, facts with different
/// sources coexist and are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// Entered by the user.
    User,
    /// Derived from a terminology object, e.g. a fired state transition.
    Object(ObjectId),
    /// Any other named origin.
    Named(Arc<str>),
    /// Created while simulating a path, tagged with the path length.
    Simulation(usize),
}

impl Source {
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Source::Named(name.into())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::User => write!(f, "user"),
            Source::Object(id) => write!(f, "object {id}"),
            Source::Named(name) => write!(f, "{name}"),
            Source::Simulation(depth) => write!(f, "simulation@{depth}"),
        }
    }
}

/// A value for one object, stated by one contributor from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    object: ObjectId,
    value: Value,
    source: Source,
    contributor: ContributorId,
}

impl Fact {
    pub fn new(object: ObjectId, value: Value, source: Source, contributor: ContributorId) -> Self {
        Self {
            object,
            value,
            source,
            contributor,
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn contributor(&self) -> ContributorId {
        self.contributor
    }

    /// Returns true if `other` occupies the same slot on the blackboard.
    pub fn same_key(&self, other: &Fact) -> bool {
        self.object == other.object
            && self.contributor == other.contributor
            && self.source == other.source
    }
}

/// A change of the merged value of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationEntry {
    object: ObjectId,
    old_value: Value,
    new_value: Value,
}

impl PropagationEntry {
    pub fn new(object: ObjectId, old_value: Value, new_value: Value) -> Self {
        Self {
            object,
            old_value,
            new_value,
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn old_value(&self) -> &Value {
        &self.old_value
    }

    pub fn new_value(&self) -> &Value {
        &self.new_value
    }

    pub fn has_changed(&self) -> bool {
        self.old_value != self.new_value
    }

    pub(crate) fn set_new_value(&mut self, value: Value) {
        self.new_value = value;
    }
}
