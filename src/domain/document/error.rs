//! Document-specific errors

use std::fmt;

use crate::domain::DomainError;

/// Errors raised by document entity rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Invalid document ID format
    InvalidId(String),

    /// Status change not allowed by the lifecycle
    InvalidStateTransition {
        from: String,
        to: String,
        reason: String,
    },

    Validation(String),
}

impl DocumentError {
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId(message.into())
    }

    pub fn invalid_transition(from: &str, to: &str, reason: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(msg) => write!(f, "Invalid document ID: {}", msg),
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid state transition from '{}' to '{}': {}",
                    from, to, reason
                )
            }
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for DocumentError {}

impl From<DocumentError> for DomainError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::InvalidId(msg) => DomainError::invalid_id(msg),
            other => DomainError::validation(other.to_string()),
        }
    }
}
