//! In-memory member directory.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::foundation::{CompanyId, DomainError, ErrorCode, MemberId};
use crate::domain::org::Member;
use crate::ports::{MemberDirectory, MemberInvite};

/// Member directory backed by a map, for tests and local runs.
///
/// Records are kept in insertion order per company, duplicates included,
/// so the hierarchy's collision handling can be exercised.
#[derive(Default)]
pub struct InMemoryMemberDirectory {
    companies: RwLock<HashMap<CompanyId, Vec<Member>>>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a company's members.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn with_members(self, company_id: CompanyId, members: Vec<Member>) -> Self {
        self.companies
            .write()
            .expect("InMemoryMemberDirectory: lock poisoned")
            .entry(company_id)
            .or_default()
            .extend(members);
        self
    }

    /// Snapshot of a company's members (for test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn members(&self, company_id: &CompanyId) -> Vec<Member> {
        self.companies
            .read()
            .expect("InMemoryMemberDirectory: lock poisoned")
            .get(company_id)
            .cloned()
            .unwrap_or_default()
    }
}

fn poisoned() -> DomainError {
    DomainError::new(ErrorCode::InternalError, "InMemoryMemberDirectory: lock poisoned")
}

#[async_trait]
impl MemberDirectory for InMemoryMemberDirectory {
    async fn list_members(&self, company_id: &CompanyId) -> Result<Vec<Member>, DomainError> {
        let companies = self.companies.read().map_err(|_| poisoned())?;
        Ok(companies.get(company_id).cloned().unwrap_or_default())
    }

    async fn update_manager(
        &self,
        company_id: &CompanyId,
        member_id: &MemberId,
        manager_id: Option<&MemberId>,
    ) -> Result<(), DomainError> {
        let mut companies = self.companies.write().map_err(|_| poisoned())?;
        let member = companies
            .get_mut(company_id)
            .and_then(|members| members.iter_mut().find(|m| &m.id == member_id))
            .ok_or_else(|| {
                DomainError::new(ErrorCode::MemberNotFound, format!("Member not found: {}", member_id))
                    .with_detail("member_id", member_id.as_str())
            })?;
        member.manager_id = manager_id.cloned();
        Ok(())
    }

    async fn upsert_invited_member(
        &self,
        company_id: &CompanyId,
        invite: &MemberInvite,
    ) -> Result<MemberId, DomainError> {
        let mut companies = self.companies.write().map_err(|_| poisoned())?;
        let members = companies.entry(*company_id).or_default();

        if let Some(existing) = members.iter_mut().find(|m| m.email.eq_ignore_ascii_case(&invite.email)) {
            if existing.is_invited {
                existing.name = invite.name.clone();
                existing.title = invite.title.clone();
                existing.role = invite.role;
            }
            return Ok(existing.id.clone());
        }

        let id = MemberId::new(format!("inv_{}", Uuid::new_v4().simple()))?;
        members.push(Member {
            id: id.clone(),
            manager_id: None,
            role: invite.role,
            is_invited: true,
            email: invite.email.clone(),
            name: invite.name.clone(),
            title: invite.title.clone(),
        });
        Ok(id)
    }
}
