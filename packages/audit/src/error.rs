//! Unified error type for every audit operation.
//!
//! Storage backends (the Postgres store in `api`, the in-memory store here)
//! translate their native failures into [`Error`] so the orchestrators can
//! stay backend-agnostic.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness constraint was violated. Carries the constraint name or
    /// the backend message so [`crate::messages`] can translate it.
    #[error("{0}")]
    Duplicate(String),

    /// One or more human-readable validation failures.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("You do not have permission to do this")]
    Forbidden,

    #[error("Photo storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Backend(String),
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Error::Validation(vec![message.into()])
    }

    /// Individual messages, one per failure.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Error::Validation(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("assignment", "a-1");
        assert_eq!(err.to_string(), "assignment not found");
    }

    #[test]
    fn test_validation_joins_messages() {
        let err = Error::Validation(vec![
            "Proof photo is required".to_string(),
            "Damage description is required".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Proof photo is required; Damage description is required"
        );
        assert_eq!(err.messages().len(), 2);
    }
}
