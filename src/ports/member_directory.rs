//! Member directory port.
//!
//! The directory is the source of truth for who belongs to a company and
//! who reports to whom. Registered and invited members share one id space
//! per company; the directory does not guarantee the two never collide,
//! and callers flag collisions rather than merge them.
//!
//! # Example
//!
//! ```ignore
//! async fn org_size(directory: &dyn MemberDirectory, company: &CompanyId) -> Result<usize, DomainError> {
//!     Ok(directory.list_members(company).await?.len())
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{CompanyId, DomainError, MemberId};
use crate::domain::org::{Member, MemberRole};

/// Details for a member invited through an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInvite {
    /// Normalized (lowercase) email.
    pub email: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub role: MemberRole,
}

/// Read and keyed-write access to a company's members.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Lists every registered and invited member of the company.
    ///
    /// Order is unspecified.
    async fn list_members(&self, company_id: &CompanyId) -> Result<Vec<Member>, DomainError>;

    /// Sets or clears one member's manager.
    ///
    /// # Errors
    ///
    /// - `MemberNotFound` if the member is not in the company
    /// - `DatabaseError` on persistence failure
    async fn update_manager(
        &self,
        company_id: &CompanyId,
        member_id: &MemberId,
        manager_id: Option<&MemberId>,
    ) -> Result<(), DomainError>;

    /// Creates an invited member, or refreshes the invite already on file
    /// for the same email. Returns the member's id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert_invited_member(
        &self,
        company_id: &CompanyId,
        invite: &MemberInvite,
    ) -> Result<MemberId, DomainError>;
}
