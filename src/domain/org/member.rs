//! Company member record as seen by the org core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{MemberId, ValidationError};

/// Role of a member within their company.
///
/// Passed through by the hierarchy code, never interpreted by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Owner,
    #[default]
    Member,
}

impl MemberRole {
    /// Returns the storage representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Owner => "owner",
            MemberRole::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(MemberRole::Admin),
            "owner" => Ok(MemberRole::Owner),
            "member" => Ok(MemberRole::Member),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("'{}' is not one of admin, owner, member", other),
            )),
        }
    }
}

/// A company member, registered or invited.
///
/// # Invariants
///
/// - `id` is unique within a company
/// - Following `manager_id` transitively never returns to `id` in a healthy org
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub manager_id: Option<MemberId>,
    pub role: MemberRole,
    /// Placeholder created by an invitation, not yet registered.
    pub is_invited: bool,
    pub email: String,
    pub name: Option<String>,
    pub title: Option<String>,
}

impl Member {
    /// Creates a registered member with no manager.
    pub fn registered(id: MemberId, email: impl Into<String>) -> Self {
        Self {
            id,
            manager_id: None,
            role: MemberRole::Member,
            is_invited: false,
            email: email.into(),
            name: None,
            title: None,
        }
    }

    /// Creates an invited placeholder member with no manager.
    pub fn invited(id: MemberId, email: impl Into<String>) -> Self {
        Self {
            is_invited: true,
            ..Self::registered(id, email)
        }
    }

    pub fn with_manager(mut self, manager_id: Option<MemberId>) -> Self {
        self.manager_id = manager_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }

    /// Name to show in listings: the member's name, else their email.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}
