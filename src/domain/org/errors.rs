//! Structured validation findings for assignments and imports.
//!
//! These are report entries, not failures: validation collects every finding
//! in a batch and hands the full list back to the caller.
//!
//! | Code | Raised by |
//! |------|-----------|
//! | INVALID_EMAIL | import |
//! | CIRCULAR_REFERENCE | assignment, import |
//! | UNRESOLVED_MANAGER | assignment, strict import |
//! | UNKNOWN_MEMBER | assignment |
//! | DUPLICATE_EMAIL | import |
//! | INVALID_ROLE | import |

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportErrorCode {
    InvalidEmail,
    CircularReference,
    UnresolvedManager,
    UnknownMember,
    DuplicateEmail,
    InvalidRole,
}

impl ImportErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorCode::InvalidEmail => "INVALID_EMAIL",
            ImportErrorCode::CircularReference => "CIRCULAR_REFERENCE",
            ImportErrorCode::UnresolvedManager => "UNRESOLVED_MANAGER",
            ImportErrorCode::UnknownMember => "UNKNOWN_MEMBER",
            ImportErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ImportErrorCode::InvalidRole => "INVALID_ROLE",
        }
    }
}

impl fmt::Display for ImportErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One finding from assignment or import validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    pub code: ImportErrorCode,
    /// The offending member id or email.
    pub subject: String,
    pub message: String,
    /// Manager chain explaining a circular reference, origin first and last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
    /// 1-based source line for import findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ImportError {
    fn new(code: ImportErrorCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            subject: subject.into(),
            message: message.into(),
            chain: Vec::new(),
            line: None,
        }
    }

    pub fn invalid_email(field: &str, value: &str) -> Self {
        let message = if value.is_empty() {
            format!("{} is required", field)
        } else {
            format!("{} '{}' is not a valid email address", field, value)
        };
        Self::new(ImportErrorCode::InvalidEmail, value, message)
    }

    pub fn circular_reference(subject: impl Into<String>, chain: Vec<String>) -> Self {
        let subject = subject.into();
        let message = if chain.len() <= 2 {
            format!("'{}' cannot be their own manager", subject)
        } else {
            format!("Manager chain loops back to '{}': {}", subject, chain.join(" -> "))
        };
        Self {
            chain,
            ..Self::new(ImportErrorCode::CircularReference, subject, message)
        }
    }

    pub fn unresolved_manager(subject: impl Into<String>, manager: &str) -> Self {
        let subject = subject.into();
        let message = format!("Manager '{}' of '{}' does not match any member", manager, subject);
        Self::new(ImportErrorCode::UnresolvedManager, subject, message)
    }

    pub fn unknown_member(subject: impl Into<String>) -> Self {
        let subject = subject.into();
        let message = format!("'{}' is not a member of this company", subject);
        Self::new(ImportErrorCode::UnknownMember, subject, message)
    }

    pub fn duplicate_email(email: &str, first_line: usize) -> Self {
        Self::new(
            ImportErrorCode::DuplicateEmail,
            email,
            format!("'{}' already appears on line {}", email, first_line),
        )
    }

    pub fn invalid_role(value: &str) -> Self {
        Self::new(
            ImportErrorCode::InvalidRole,
            value,
            format!("Role '{}' is not one of admin, owner, member", value),
        )
    }

    /// Attaches the source line this finding came from.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[{}] line {}: {}", self.code, line, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Fatal problems that prevent an import payload from being read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportParseError {
    #[error("Import payload is empty")]
    Empty,

    #[error("Required column '{0}' is missing from the header")]
    MissingColumn(&'static str),

    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Import has {actual} rows, maximum is {max}")]
    TooManyRows { max: usize, actual: usize },
}
