//! Error types for diagnos

use thiserror::Error;

/// Main error type for diagnos operations
#[derive(Debug, Error)]
pub enum DiagnosError {
    /// No terminology object with the given name exists
    #[error("Unknown terminology object: {0}")]
    UnknownObject(String),

    /// A terminology object with the given name was already defined
    #[error("Duplicate terminology object: {0}")]
    DuplicateObject(String),

    /// The object exists but is of another kind than requested
    #[error("Object '{name}' is not a {expected}")]
    WrongKind { name: String, expected: &'static str },

    /// The question does not offer the requested choice
    #[error("Question '{question}' has no choice '{choice}'")]
    UnknownChoice { question: String, choice: String },

    /// No contributor with the given name is registered in the session
    #[error("Unknown contributor: {0}")]
    UnknownContributor(String),

    /// A contributor accessed its per-session state before it was created
    #[error("Missing session object for contributor: {0}")]
    MissingSessionObject(String),

    /// The planner could not reach any of the requested targets
    #[error("No path found to any target")]
    NoPathFound,

    /// Invalid operation for the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for diagnos operations
pub type Result<T> = std::result::Result<T, DiagnosError>;
