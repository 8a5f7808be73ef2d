//! PostgreSQL implementation of MemberDirectory.
//!
//! Registered members live in `company_members`, pending invites in
//! `invited_members`. Both are read as one list; ids are not guaranteed
//! distinct across the two tables.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{CompanyId, DomainError, ErrorCode, MemberId};
use crate::domain::org::Member;
use crate::ports::{MemberDirectory, MemberInvite};

/// PostgreSQL implementation of the MemberDirectory port.
pub struct PostgresMemberDirectory {
    pool: PgPool,
}

impl PostgresMemberDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: String,
    manager_id: Option<String>,
    role: String,
    is_invited: bool,
    email: String,
    name: Option<String>,
    title: Option<String>,
}

impl TryFrom<MemberRow> for Member {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        let invalid = |field: &str, e: &dyn std::fmt::Display| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid {}: {}", field, e))
        };

        Ok(Member {
            id: MemberId::new(row.id).map_err(|e| invalid("member id", &e))?,
            // An empty manager id is treated as no manager.
            manager_id: row.manager_id.and_then(|id| MemberId::new(id).ok()),
            role: row.role.parse().map_err(|e| invalid("role", &e))?,
            is_invited: row.is_invited,
            email: row.email,
            name: row.name,
            title: row.title,
        })
    }
}

fn database_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl MemberDirectory for PostgresMemberDirectory {
    async fn list_members(&self, company_id: &CompanyId) -> Result<Vec<Member>, DomainError> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, manager_id, role, FALSE AS is_invited, email, name, title
            FROM company_members
            WHERE company_id = $1
            UNION ALL
            SELECT id, manager_id, role, TRUE AS is_invited, email, name, title
            FROM invited_members
            WHERE company_id = $1
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list members", e))?;

        rows.into_iter().map(Member::try_from).collect()
    }

    async fn update_manager(
        &self,
        company_id: &CompanyId,
        member_id: &MemberId,
        manager_id: Option<&MemberId>,
    ) -> Result<(), DomainError> {
        for table in ["company_members", "invited_members"] {
            let result = sqlx::query(&format!(
                "UPDATE {} SET manager_id = $3 WHERE company_id = $1 AND id = $2",
                table
            ))
            .bind(company_id.as_uuid())
            .bind(member_id.as_str())
            .bind(manager_id.map(MemberId::as_str))
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("update manager", e))?;

            if result.rows_affected() > 0 {
                return Ok(());
            }
        }

        Err(
            DomainError::new(ErrorCode::MemberNotFound, format!("Member not found: {}", member_id))
                .with_detail("member_id", member_id.as_str()),
        )
    }

    async fn upsert_invited_member(
        &self,
        company_id: &CompanyId,
        invite: &MemberInvite,
    ) -> Result<MemberId, DomainError> {
        let registered: Option<String> = sqlx::query_scalar(
            "SELECT id FROM company_members WHERE company_id = $1 AND lower(email) = lower($2) LIMIT 1",
        )
        .bind(company_id.as_uuid())
        .bind(&invite.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("look up member", e))?;

        if let Some(id) = registered {
            return Ok(MemberId::new(id)?);
        }

        let id: String = sqlx::query_scalar(
            r#"
            INSERT INTO invited_members (id, company_id, email, name, title, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (company_id, email) DO UPDATE SET
                name = EXCLUDED.name,
                title = EXCLUDED.title,
                role = EXCLUDED.role
            RETURNING id
            "#,
        )
        .bind(format!("inv_{}", Uuid::new_v4().simple()))
        .bind(company_id.as_uuid())
        .bind(&invite.email)
        .bind(&invite.name)
        .bind(&invite.title)
        .bind(invite.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("upsert invited member", e))?;

        Ok(MemberId::new(id)?)
    }
}
