//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (database, transport).

use thiserror::Error;

/// Coarse classification of a [`DomainError`].
///
/// Callers decide how to react (surface, retry, escalate) from the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Role mismatch or wrong lifecycle stage. Never retried.
    Validation,
    /// Missing record, or a record that is not addressed to the caller.
    NotFound,
    /// A conditional write matched nothing. Safe to retry.
    Conflict,
    /// Persisted state contradicts an invariant. Needs manual reconciliation.
    DataIntegrity,
}

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// HR already holds a pending application or request
    #[error("HR user already has a pending application or request")]
    AlreadyPending,

    /// HR is already bound to an Admin manager
    #[error("HR user is already mapped to an admin")]
    AlreadyMapped,

    /// HR is not bound to an Admin manager
    #[error("HR user is not mapped to an admin")]
    NotMapped,

    /// Acting user may not start this interaction in its current state
    #[error("Not eligible: {0}")]
    NotEligible(String),

    /// Candidate cannot be assigned in its current state
    #[error("Candidate not eligible: {0}")]
    NotEligibleCandidate(String),

    /// HR cannot receive candidates in its current state
    #[error("HR not eligible: {0}")]
    NotEligibleHr(String),

    /// Target of an application or request does not exist or has the wrong role
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// Acting user has the wrong role for this action
    #[error("Wrong role: {0}")]
    WrongRole(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conditional write lost a race, or a unique value is taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persisted data contradicts a workflow invariant
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    /// Create a data integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        DomainError::DataIntegrity(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_)
            | DomainError::AlreadyPending
            | DomainError::AlreadyMapped
            | DomainError::NotMapped
            | DomainError::NotEligible(_)
            | DomainError::NotEligibleCandidate(_)
            | DomainError::NotEligibleHr(_)
            | DomainError::WrongRole(_) => ErrorKind::Validation,
            DomainError::TargetNotFound(_) | DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) => ErrorKind::Conflict,
            DomainError::DataIntegrity(_) => ErrorKind::DataIntegrity,
        }
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(DomainError::AlreadyPending.kind(), ErrorKind::Validation);
        assert_eq!(DomainError::WrongRole("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(DomainError::TargetNotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::conflict("lost").kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::integrity("bad").kind(), ErrorKind::DataIntegrity);
    }
}
