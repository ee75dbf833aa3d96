//! Domain error types

use crate::lifecycle::state::LifecycleState;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid transition: {from} -> {to} is not a legal edge")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown lifecycle state: {0}")]
    UnknownState(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let error = DomainError::InvalidTransition {
            from: LifecycleState::Init,
            to: LifecycleState::Act,
        };
        assert_eq!(
            error.to_string(),
            "Invalid transition: init -> act is not a legal edge"
        );
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::UnknownRole("x".to_string()).is_cancelled());
    }
}
