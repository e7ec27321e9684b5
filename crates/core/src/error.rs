//! Error types for the Agora domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

use crate::agent::Role;

/// The top-level error type for all Agora operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Role binding errors ---
    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    // --- Member agent errors ---
    #[error("Member error: {0}")]
    Member(#[from] MemberError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Raised while binding agents to work-pattern slots, before any stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("{agent} is not of the expected type for the {slot} slot (it is a {actual} agent)")]
    TypeMismatch {
        slot: Role,
        agent: String,
        actual: Role,
    },

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Raised by a member agent while executing its stage.
#[derive(Debug, Clone, Error)]
pub enum MemberError {
    #[error("Agent {agent} failed: {reason}")]
    ExecutionFailed { agent: String, reason: String },

    #[error("Agent {agent} produced invalid output: {reason}")]
    InvalidOutput { agent: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_displays_correctly() {
        let err = Error::Binding(BindingError::TypeMismatch {
            slot: Role::Critique,
            agent: "writer".into(),
            actual: Role::Rewriting,
        });
        let text = err.to_string();
        assert!(text.contains("writer"));
        assert!(text.contains("critique"));
        assert!(text.contains("rewriting"));
    }

    #[test]
    fn member_error_displays_correctly() {
        let err = Error::Member(MemberError::ExecutionFailed {
            agent: "planner".into(),
            reason: "upstream timeout".into(),
        });
        assert!(err.to_string().contains("planner"));
        assert!(err.to_string().contains("upstream timeout"));
    }
}
