//! Org handler errors.
//!
//! Validation findings are not errors here; handlers return them as data.
//! These variants cover what stops a handler from producing a result.

use crate::domain::foundation::{DomainError, ErrorCode, MemberId};
use crate::domain::org::ImportParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgError {
    /// The import payload could not be read at all.
    ImportRejected(ImportParseError),

    /// A member disappeared between read and write.
    MemberNotFound(MemberId),

    /// Infrastructure error.
    Infrastructure(String),
}

impl OrgError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrgError::ImportRejected(_) => ErrorCode::InvalidFormat,
            OrgError::MemberNotFound(_) => ErrorCode::MemberNotFound,
            OrgError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            OrgError::ImportRejected(err) => format!("Import rejected: {}", err),
            OrgError::MemberNotFound(id) => format!("Member not found: {}", id),
            OrgError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for OrgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for OrgError {}

impl From<ImportParseError> for OrgError {
    fn from(err: ImportParseError) -> Self {
        OrgError::ImportRejected(err)
    }
}

impl From<DomainError> for OrgError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::MemberNotFound => match err.details.get("member_id").map(|id| MemberId::new(id.as_str())) {
                Some(Ok(id)) => OrgError::MemberNotFound(id),
                _ => OrgError::Infrastructure(err.to_string()),
            },
            _ => OrgError::Infrastructure(err.to_string()),
        }
    }
}

impl From<OrgError> for DomainError {
    fn from(err: OrgError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
