//! In-memory feedback cycle store.
//!
//! Enforces the same write rules as the database schema: unique
//! `(cycle_id, occurrence_number)` and at most one active occurrence per
//! cycle. Each write runs under one lock, so a rollover is atomic.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::feedback_cycle::{FeedbackCycle, FeedbackCycleOccurrence, OccurrenceStatus};
use crate::domain::foundation::{CompanyId, DomainError, ErrorCode, FeedbackCycleId, OccurrenceId};
use crate::ports::FeedbackCycleStore;

#[derive(Default)]
struct StoreState {
    cycles: Vec<FeedbackCycle>,
    occurrences: Vec<FeedbackCycleOccurrence>,
}

impl StoreState {
    /// Checks `candidate` against the uniqueness rules. `replacing` is the
    /// active occurrence being completed in the same write.
    fn check_insert(
        &self,
        candidate: &FeedbackCycleOccurrence,
        replacing: Option<&OccurrenceId>,
    ) -> Result<(), DomainError> {
        let siblings = self.occurrences.iter().filter(|o| o.cycle_id == candidate.cycle_id);

        for existing in siblings {
            if existing.occurrence_number == candidate.occurrence_number {
                return Err(DomainError::new(
                    ErrorCode::DuplicateOccurrence,
                    format!(
                        "Occurrence {} already exists for cycle {}",
                        candidate.occurrence_number, candidate.cycle_id
                    ),
                ));
            }
            if existing.is_active() && candidate.is_active() && Some(&existing.id) != replacing {
                return Err(DomainError::new(
                    ErrorCode::DuplicateOccurrence,
                    format!("Cycle {} already has an active occurrence", candidate.cycle_id),
                ));
            }
        }
        Ok(())
    }
}

/// Feedback cycle store backed by vectors, for tests and local runs.
#[derive(Default)]
pub struct InMemoryFeedbackCycleStore {
    state: RwLock<StoreState>,
}

impl InMemoryFeedbackCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a cycle.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_cycle(&self, cycle: FeedbackCycle) {
        let mut state = self.state.write().expect("InMemoryFeedbackCycleStore: lock poisoned");
        state.cycles.retain(|c| c.id != cycle.id);
        state.cycles.push(cycle);
    }
}

fn poisoned() -> DomainError {
    DomainError::new(ErrorCode::InternalError, "InMemoryFeedbackCycleStore: lock poisoned")
}

#[async_trait]
impl FeedbackCycleStore for InMemoryFeedbackCycleStore {
    async fn list_cycles(&self, company_id: &CompanyId) -> Result<Vec<FeedbackCycle>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .cycles
            .iter()
            .filter(|c| &c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn list_active_cycles(&self) -> Result<Vec<FeedbackCycle>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.cycles.iter().filter(|c| c.is_active()).cloned().collect())
    }

    async fn find_latest_occurrence(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Option<FeedbackCycleOccurrence>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .occurrences
            .iter()
            .filter(|o| &o.cycle_id == cycle_id)
            .max_by_key(|o| o.occurrence_number)
            .cloned())
    }

    async fn list_occurrences(
        &self,
        cycle_id: &FeedbackCycleId,
    ) -> Result<Vec<FeedbackCycleOccurrence>, DomainError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let mut occurrences: Vec<_> = state
            .occurrences
            .iter()
            .filter(|o| &o.cycle_id == cycle_id)
            .cloned()
            .collect();
        occurrences.sort_by_key(|o| o.occurrence_number);
        Ok(occurrences)
    }

    async fn insert_occurrence(&self, occurrence: &FeedbackCycleOccurrence) -> Result<(), DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        state.check_insert(occurrence, None)?;
        state.occurrences.push(occurrence.clone());
        Ok(())
    }

    async fn roll_over(
        &self,
        completed: &OccurrenceId,
        next: &FeedbackCycleOccurrence,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        let current = state
            .occurrences
            .iter()
            .find(|o| &o.id == completed)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::OccurrenceNotFound, format!("Occurrence not found: {}", completed))
            })?;
        if !current.is_active() {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!("Occurrence {} is already completed", completed),
            ));
        }
        state.check_insert(next, Some(completed))?;

        if let Some(current) = state.occurrences.iter_mut().find(|o| &o.id == completed) {
            current.status = OccurrenceStatus::Completed;
        }
        state.occurrences.push(next.clone());
        Ok(())
    }
}
