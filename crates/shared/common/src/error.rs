//! Unified error handling for the workflow services.
//!
//! Wraps the domain taxonomy and adds infrastructure failures, which are
//! reported as transient and never confused with a lost race.

use domain::{DomainError, ErrorKind};
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Business rule outcomes
    #[error(transparent)]
    Domain(#[from] DomainError),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// How a caller should treat an [`AppError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// One of the domain kinds
    Domain(ErrorKind),
    /// Store timeout, disconnect or similar
    Transient,
    Internal,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation(_) => "VALIDATION_ERROR",
                DomainError::AlreadyPending => "ALREADY_PENDING",
                DomainError::AlreadyMapped => "ALREADY_MAPPED",
                DomainError::NotMapped => "NOT_MAPPED",
                DomainError::NotEligible(_) => "NOT_ELIGIBLE",
                DomainError::NotEligibleCandidate(_) => "NOT_ELIGIBLE_CANDIDATE",
                DomainError::NotEligibleHr(_) => "NOT_ELIGIBLE_HR",
                DomainError::TargetNotFound(_) => "TARGET_NOT_FOUND",
                DomainError::WrongRole(_) => "WRONG_ROLE",
                DomainError::NotFound(_) => "NOT_FOUND",
                DomainError::Conflict(_) => "CONFLICT",
                DomainError::DataIntegrity(_) => "DATA_INTEGRITY",
            },
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Unavailable(_) => "STORE_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Classify for caller policy
    pub fn class(&self) -> FailureClass {
        match self {
            AppError::Domain(err) => FailureClass::Domain(err.kind()),
            #[cfg(feature = "database")]
            AppError::Database(_) => FailureClass::Transient,
            AppError::Unavailable(_) => FailureClass::Transient,
            AppError::Internal(_) => FailureClass::Internal,
        }
    }

    /// Domain kind, if this is a business rule outcome
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Domain(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Conflicts and transient store failures may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.class(),
            FailureClass::Domain(ErrorKind::Conflict) | FailureClass::Transient
        )
    }

    /// Borrow the domain error, if any
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::DataIntegrity(msg)) => {
                tracing::error!("Data integrity violation: {}", msg);
                "Stored data is inconsistent and needs manual reconciliation".to_string()
            }
            AppError::Domain(err) => err.to_string(),
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Unavailable(store) => {
                tracing::error!("Store unavailable: {}", store);
                "The store is temporarily unavailable".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::Domain(DomainError::not_found(entity)))
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Domain(DomainError::conflict(msg))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Domain(DomainError::validation(msg))
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        AppError::Domain(DomainError::not_found(entity))
    }

    pub fn integrity(msg: impl Into<String>) -> Self {
        AppError::Domain(DomainError::integrity(msg))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    pub fn unavailable(store: impl Into<String>) -> Self {
        AppError::Unavailable(store.into())
    }
}
