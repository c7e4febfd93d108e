//! Observation values stored on the blackboard.
//!
//! A [`Value`] is either undefined (no observation at all), unknown (the
//! observation was attempted but the answer is "unknown"), or one of the
//! defined variants. Values are immutable and compared structurally.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};

/// A set of selected choice names.
///
/// One-choice questions hold a set with exactly one element, multiple-choice
/// questions hold any number of elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChoiceSet(BTreeSet<String>);

impl ChoiceSet {
    /// Creates an empty choice set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Creates a set holding a single choice.
    pub fn single(choice: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(choice.into());
        Self(set)
    }

    pub fn insert(&mut self, choice: impl Into<String>) -> bool {
        self.0.insert(choice.into())
    }

    pub fn contains(&self, choice: &str) -> bool {
        self.0.contains(choice)
    }

    /// Returns true if every choice of `self` is also selected in `other`.
    pub fn is_subset(&self, other: &ChoiceSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Returns the union of both sets.
    pub fn union(&self, other: &ChoiceSet) -> ChoiceSet {
        ChoiceSet(self.0.union(&other.0).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ChoiceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Indication state of a QContainer, ordered by specificity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicationState {
    #[default]
    Neutral,
    Indicated,
    /// Indicated as part of a planned sequence; may occur more than once.
    MultipleIndicated,
    ContraIndicated,
}

/// Indication of a QContainer with a rank used for ordering the agenda.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indication {
    state: IndicationState,
    rank: f64,
}

impl Indication {
    pub fn new(state: IndicationState, rank: f64) -> Self {
        Self { state, rank }
    }

    pub fn neutral() -> Self {
        Self::new(IndicationState::Neutral, 0.0)
    }

    pub fn state(&self) -> IndicationState {
        self.state
    }

    pub fn rank(&self) -> f64 {
        self.rank
    }

    pub fn is_contra_indicated(&self) -> bool {
        self.state == IndicationState::ContraIndicated
    }

    pub fn is_relevant(&self) -> bool {
        matches!(
            self.state,
            IndicationState::Indicated | IndicationState::MultipleIndicated
        )
    }

    /// Returns the more specific of both indications.
    ///
    /// The state with higher specificity wins; equal states keep the lower
    /// rank. The result does not depend on argument order.
    pub fn strongest(self, other: Indication) -> Indication {
        match self.state.cmp(&other.state) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => {
                if other.rank < self.rank {
                    other
                } else {
                    self
                }
            }
        }
    }
}

impl Default for Indication {
    fn default() -> Self {
        Self::neutral()
    }
}

/// The value of a terminology object.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No observation exists.
    #[default]
    Undefined,
    /// The object was asked but answered "unknown".
    Unknown,
    Choices(ChoiceSet),
    Num(f64),
    Text(String),
    Date(DateTime<Utc>),
    Indication(Indication),
}

impl Value {
    /// Single choice value.
    pub fn choice(name: impl Into<String>) -> Self {
        Value::Choices(ChoiceSet::single(name))
    }

    /// Multiple choice value.
    pub fn choices<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Value::Choices(names.into_iter().collect())
    }

    pub fn indication(state: IndicationState, rank: f64) -> Self {
        Value::Indication(Indication::new(state, rank))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Returns true for every value except [`Value::Undefined`].
    pub fn is_answered(&self) -> bool {
        !self.is_undefined()
    }

    pub fn as_choices(&self) -> Option<&ChoiceSet> {
        match self {
            Value::Choices(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_indication(&self) -> Option<Indication> {
        match self {
            Value::Indication(indication) => Some(*indication),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Unknown => write!(f, "unknown"),
            Value::Choices(set) => {
                let names: Vec<&str> = set.iter().collect();
                write!(f, "[{}]", names.join(", "))
            }
            Value::Num(n) => write!(f, "{n}"),
            Value::Text(text) => write!(f, "\"{text}\""),
            Value::Date(date) => write!(f, "{}", date.to_rfc3339()),
            Value::Indication(indication) => {
                write!(f, "{:?}@{}", indication.state(), indication.rank())
            }
        }
    }
}
