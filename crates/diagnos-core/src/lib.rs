//! diagnos core - terminology and values for diagnostic reasoning
//!
//! This crate provides the fundamental abstractions for diagnos:
//! - Terminology objects (questions, QContainers, solutions) in an arena
//! - Observation values and indications
//! - Three-valued condition evaluation
//! - Knowledge slices such as state transitions

pub mod condition;
pub mod error;
pub mod knowledge;
pub mod knowledge_base;
pub mod terminology;
pub mod value;

pub use condition::{Condition, Indeterminate, NumOp, Truth, ValueLookup};
pub use error::{DiagnosError, Result};
pub use knowledge::{
    ConditionalValueSetter, KnowledgeKind, KnowledgeRegistry, KnowledgeSlice, StateTransition,
    ValueTransition,
};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseBuilder};
pub use terminology::{Choice, ObjectId, ObjectKind, Properties, QuestionKind, TerminologyObject};
pub use value::{ChoiceSet, Indication, IndicationState, Value};
