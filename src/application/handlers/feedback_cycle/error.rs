//! Scheduling handler errors.

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// Another writer changed the occurrence log first.
    Conflict(String),

    /// Infrastructure error.
    Infrastructure(String),
}

impl SchedulingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SchedulingError::Conflict(_) => ErrorCode::ConcurrencyConflict,
            SchedulingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SchedulingError::Conflict(msg) => format!("Already rolled over: {}", msg),
            SchedulingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SchedulingError::Conflict(_))
    }
}

impl std::fmt::Display for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SchedulingError {}

impl From<DomainError> for SchedulingError {
    fn from(err: DomainError) -> Self {
        if err.code.is_conflict() {
            SchedulingError::Conflict(err.message)
        } else {
            SchedulingError::Infrastructure(err.to_string())
        }
    }
}

impl From<SchedulingError> for DomainError {
    fn from(err: SchedulingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
