//! PostgreSQL implementation of FeedbackCycleStore.
//!
//! The `(cycle_id, occurrence_number)` unique constraint and the partial
//! unique index on active occurrences do the real concurrency control.
//! A rollover completes the old occurrence with a guarded UPDATE and inserts
//! the next one in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::feedback_cycle::{FeedbackCycle, FeedbackCycleOccurrence, OccurrenceNumber};
use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, FeedbackCycleId, OccurrenceId, Timestamp,
};
use crate::ports::FeedbackCycleStore;

/// PostgreSQL implementation of the FeedbackCycleStore port.
pub struct PostgresFeedbackCycleStore {
    pool: PgPool,
}

impl PostgresFeedbackCycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CycleRow {
    id: Uuid,
    company_id: Uuid,
    frequency: String,
    status: String,
    due_date: Option<NaiveDate>,
}

impl TryFrom<CycleRow> for FeedbackCycle {
    type Error = DomainError;

    fn try_from(row: CycleRow) -> Result<Self, Self::Error> {
        Ok(FeedbackCycle {
            id: FeedbackCycleId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            frequency: row.frequency.parse().map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid frequency: {}", e))
            })?,
            status: row.status.parse().map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid cycle status: {}", e))
            })?,
            due_date: row.due_date,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OccurrenceRow {
    id: Uuid,
    cycle_id: Uuid,
    occurrence_number: i32,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<OccurrenceRow> for FeedbackCycleOccurrence {
    type Error = DomainError;

    fn try_from(row: OccurrenceRow) -> Result<Self, Self::Error> {
        let number = u32::try_from(row.occurrence_number)
            .ok()
            .and_then(|n| OccurrenceNumber::new(n).ok())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid occurrence number: {}", row.occurrence_number),
                )
            })?;

        Ok(FeedbackCycleOccurrence {
            id: OccurrenceId::from_uuid(row.id),
            cycle_id: FeedbackCycleId::from_uuid(row.cycle_id),
            occurrence_number: number,
            start_date: Timestamp::from_datetime(row.start_date),
            end_date: Timestamp::from_datetime(row.end_date),
            status: row.status.parse().map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid occurrence status: {}", e))
            })?,
        })
    }
}

fn database_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

/// Maps a failed occurrence insert, turning unique violations into
/// `DuplicateOccurrence`.
fn insert_error(occurrence: &FeedbackCycleOccurrence, e: sqlx::Error) -> DomainError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DomainError::new(
            ErrorCode::DuplicateOccurrence,
            format!(
                "Occurrence {} of cycle {} already exists or another is active",
                occurrence.occurrence_number, occurrence.cycle_id
            ),
        )
        .with_detail("cycle_id", occurrence.cycle_id.to_string()),
        e => database_error("insert occurrence", e),
    }
}

const INSERT_OCCURRENCE: &str = r#"
    INSERT INTO feedback_cycle_occurrences (
        id, cycle_id, occurrence_number, start_date, end_date, status
    ) VALUES ($1, $2, $3, $4, $5, $6)
"#;

const SELECT_CYCLE: &str = "SELECT id, company_id, frequency, status, due_date FROM feedback_cycles";

fn occurrence_number_column(occurrence: &FeedbackCycleOccurrence) -> Result<i32, DomainError> {
    i32::try_from(occurrence.occurrence_number.value()).map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Occurrence number {} is out of range", occurrence.occurrence_number),
        )
    })
}

#[async_trait]
impl FeedbackCycleStore for PostgresFeedbackCycleStore {
    async fn list_cycles(&self, company_id: &CompanyId) -> Result<Vec<FeedbackCycle>, DomainError> {
        let rows: Vec<CycleRow> =
            sqlx::query_as(&format!("{} WHERE company_id = $1 ORDER BY created_at", SELECT_CYCLE))
                .bind(company_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error("list cycles", e))?;

        rows.into_iter().map(FeedbackCycle::try_from).collect()
    }

    async fn list_active_cycles(&self) -> Result<Vec<FeedbackCycle>, DomainError> {
        let rows: Vec<CycleRow> =
            sqlx::query_as(&format!("{} WHERE status = 'active' ORDER BY created_at", SELECT_CYCLE))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| database_error("list active cycles", e))?;

        rows.into_iter().map(FeedbackCycle::try_from).collect()
    }

    async fn find_latest_occurrence(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Option<FeedbackCycleOccurrence>, DomainError> {
        let row: Option<OccurrenceRow> = sqlx::query_as(
            r#"
            SELECT id, cycle_id, occurrence_number, start_date, end_date, status
            FROM feedback_cycle_occurrences
            WHERE cycle_id = $1
            ORDER BY occurrence_number DESC
            LIMIT 1
            "#,
        )
        .bind(cycle_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("find latest occurrence", e))?;

        row.map(FeedbackCycleOccurrence::try_from).transpose()
    }

    async fn list_occurrences(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Vec<FeedbackCycleOccurrence>, DomainError> {
        let rows: Vec<OccurrenceRow> = sqlx::query_as(
            r#"
            SELECT id, cycle_id, occurrence_number, start_date, end_date, status
            FROM feedback_cycle_occurrences
            WHERE cycle_id = $1
            ORDER BY occurrence_number ASC
            "#,
        )
        .bind(cycle_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list occurrences", e))?;

        rows.into_iter().map(FeedbackCycleOccurrence::try_from).collect()
    }

    async fn insert_occurrence(&self, occurrence: &FeedbackCycleOccurrence) -> Result<(), DomainError> {
        sqlx::query(INSERT_OCCURRENCE)
            .bind(occurrence.id.as_uuid())
            .bind(occurrence.cycle_id.as_uuid())
            .bind(occurrence_number_column(occurrence)?)
            .bind(occurrence.start_date.as_datetime())
            .bind(occurrence.end_date.as_datetime())
            .bind(occurrence.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(occurrence, e))?;

        Ok(())
    }

    async fn roll_over(
        &self,
        completed: &OccurrenceId,
        next: &FeedbackCycleOccurrence,
    ) -> Result<(), DomainError> {
        let number = occurrence_number_column(next)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| database_error("start transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE feedback_cycle_occurrences
            SET status = 'completed'
            WHERE id = $1 AND status = 'active'
            "#,
        )
        .bind(completed.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| database_error("complete occurrence", e))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!("Occurrence {} is no longer active", completed),
            )
            .with_detail("occurrence_id", completed.to_string()));
        }

        sqlx::query(INSERT_OCCURRENCE)
            .bind(next.id.as_uuid())
            .bind(next.cycle_id.as_uuid())
            .bind(number)
            .bind(next.start_date.as_datetime())
            .bind(next.end_date.as_datetime())
            .bind(next.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(next, e))?;

        tx.commit()
            .await
            .map_err(|e| database_error("commit rollover", e))?;

        Ok(())
    }
}
