//! Knowledge slices attached to terminology objects.
//!
//! Slices are kept in a [`KnowledgeRegistry`] keyed by an explicit
//! [`KnowledgeKind`] and the object they belong to.

use std::collections::{BTreeMap, HashMap};

use crate::condition::Condition;
use crate::terminology::ObjectId;
use crate::value::Value;

/// Kinds of knowledge the registry can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KnowledgeKind {
    StateTransition,
}

/// Sets a value when its condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalValueSetter {
    value: Value,
    condition: Option<Condition>,
}

impl ConditionalValueSetter {
    pub fn new(value: Value, condition: Option<Condition>) -> Self {
        Self { value, condition }
    }

    /// A setter without condition, always applicable.
    pub fn always(value: Value) -> Self {
        Self::new(value, None)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Effect of a test batch on one state question.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTransition {
    question: ObjectId,
    setters: Vec<ConditionalValueSetter>,
}

impl ValueTransition {
    pub fn new(question: ObjectId, setters: Vec<ConditionalValueSetter>) -> Self {
        Self { question, setters }
    }

    pub fn question(&self) -> ObjectId {
        self.question
    }

    pub fn setters(&self) -> &[ConditionalValueSetter] {
        &self.setters
    }
}

/// Precondition and post-execution effects of a QContainer.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    qcontainer: ObjectId,
    activation_condition: Option<Condition>,
    post_transitions: Vec<ValueTransition>,
}

impl StateTransition {
    pub fn new(
        qcontainer: ObjectId,
        activation_condition: Option<Condition>,
        post_transitions: Vec<ValueTransition>,
    ) -> Self {
        Self {
            qcontainer,
            activation_condition,
            post_transitions,
        }
    }

    pub fn qcontainer(&self) -> ObjectId {
        self.qcontainer
    }

    pub fn activation_condition(&self) -> Option<&Condition> {
        self.activation_condition.as_ref()
    }

    pub fn post_transitions(&self) -> &[ValueTransition] {
        &self.post_transitions
    }

    /// Returns true if firing this transition can change any value.
    pub fn has_effects(&self) -> bool {
        self.post_transitions
            .iter()
            .any(|transition| !transition.setters.is_empty())
    }
}

/// A piece of knowledge of a given kind.
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeSlice {
    StateTransition(StateTransition),
}

impl KnowledgeSlice {
    pub fn kind(&self) -> KnowledgeKind {
        match self {
            KnowledgeSlice::StateTransition(_) => KnowledgeKind::StateTransition,
        }
    }

    /// The object this slice is attached to.
    pub fn owner(&self) -> ObjectId {
        match self {
            KnowledgeSlice::StateTransition(st) => st.qcontainer(),
        }
    }
}

/// Typed store of knowledge slices.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeRegistry {
    slices: HashMap<KnowledgeKind, BTreeMap<ObjectId, KnowledgeSlice>>,
}

impl KnowledgeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a slice, replacing a previous slice of the same kind for the
    /// same owner.
    pub fn insert(&mut self, slice: KnowledgeSlice) -> Option<KnowledgeSlice> {
        self.slices
            .entry(slice.kind())
            .or_default()
            .insert(slice.owner(), slice)
    }

    pub fn get(&self, kind: KnowledgeKind, owner: ObjectId) -> Option<&KnowledgeSlice> {
        self.slices.get(&kind).and_then(|by_owner| by_owner.get(&owner))
    }

    /// All slices of a kind, ordered by owner.
    pub fn all(&self, kind: KnowledgeKind) -> impl Iterator<Item = &KnowledgeSlice> {
        self.slices
            .get(&kind)
            .into_iter()
            .flat_map(|by_owner| by_owner.values())
    }

    pub fn state_transition(&self, qcontainer: ObjectId) -> Option<&StateTransition> {
        match self.get(KnowledgeKind::StateTransition, qcontainer) {
            Some(KnowledgeSlice::StateTransition(st)) => Some(st),
            None => None,
        }
    }

    pub fn state_transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.all(KnowledgeKind::StateTransition)
            .map(|slice| match slice {
                KnowledgeSlice::StateTransition(st) => st,
            })
    }
}
