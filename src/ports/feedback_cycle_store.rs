//! Feedback cycle and occurrence store port.
//!
//! Writes are limited to inserting occurrences and completing the active
//! one. Implementations must enforce, at the storage level:
//!
//! - one row per `(cycle_id, occurrence_number)`
//! - at most one `active` occurrence per cycle
//!
//! A write rejected by either rule fails with `DuplicateOccurrence`. Callers
//! treat that as "another writer already rolled this cycle over" and re-read
//! instead of retrying.

use async_trait::async_trait;

use crate::domain::feedback_cycle::{FeedbackCycle, FeedbackCycleOccurrence};
use crate::domain::foundation::{CompanyId, DomainError, FeedbackCycleId, OccurrenceId};

#[async_trait]
pub trait FeedbackCycleStore: Send + Sync {
    /// Lists every cycle of a company, draft and active.
    async fn list_cycles(&self, company_id: &CompanyId) -> Result<Vec<FeedbackCycle>, DomainError>;

    /// Lists active cycles across all companies.
    async fn list_active_cycles(&self) -> Result<Vec<FeedbackCycle>, DomainError>;

    /// Occurrence with the highest number for the cycle, if any.
    async fn find_latest_occurrence(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Option<FeedbackCycleOccurrence>, DomainError>;

    /// All occurrences of the cycle, by ascending number.
    async fn list_occurrences(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Vec<FeedbackCycleOccurrence>, DomainError>;

    /// Inserts one new occurrence.
    ///
    /// # Errors
    ///
    /// - `DuplicateOccurrence` if the number is taken or another occurrence is active
    /// - `DatabaseError` on persistence failure
    async fn insert_occurrence(&self, occurrence: &FeedbackCycleOccurrence) -> Result<(), DomainError>;

    /// Completes `completed` and inserts `next` as one atomic write.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict` if `completed` is no longer active
    /// - `DuplicateOccurrence` if `next` collides with an existing occurrence
    /// - `DatabaseError` on persistence failure
    async fn roll_over(
        &self,
        completed: &OccurrenceId,
        next: &FeedbackCycleOccurrence,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_cycle_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn FeedbackCycleStore) {}
    }
}
