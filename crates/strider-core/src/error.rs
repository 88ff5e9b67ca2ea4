//! Error types for the Strider planner.

use thiserror::Error;

/// Main error type for Strider operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StriderError {
    /// An action was applied to a state in which it is not applicable.
    #[error("Invalid transition for action {action}: {reason}")]
    InvalidTransition { action: String, reason: String },

    /// Planner configuration is invalid (weight, heuristic, workers).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The problem declares a requirement outside the supported fragment.
    #[error("Unsupported problem requirement: {requirement}")]
    UnsupportedProblem { requirement: String },

    /// The problem description is malformed.
    #[error("Invalid problem: {message}")]
    InvalidProblem { message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StriderError {
    /// Shorthand for a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        StriderError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for an invalid problem error.
    pub fn invalid_problem(message: impl Into<String>) -> Self {
        StriderError::InvalidProblem {
            message: message.into(),
        }
    }

    /// Returns true if this error is raised before any search begins.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            StriderError::Configuration { .. }
                | StriderError::UnsupportedProblem { .. }
                | StriderError::InvalidProblem { .. }
                | StriderError::Serialization(_)
        )
    }
}

/// Convenience Result type for Strider operations.
pub type Result<T> = std::result::Result<T, StriderError>;

impl From<serde_json::Error> for StriderError {
    fn from(err: serde_json::Error) -> Self {
        StriderError::Serialization(err.to_string())
    }
}
