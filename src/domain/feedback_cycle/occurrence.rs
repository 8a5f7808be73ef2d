//! Time-bounded instances of a feedback cycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{FeedbackCycleId, OccurrenceId, StateMachine, Timestamp, ValidationError};

use super::OccurrenceStatus;

/// Position of an occurrence within its cycle, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceNumber(u32);

impl OccurrenceNumber {
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::invalid_format(
                "occurrence_number",
                "occurrence numbers start at 1",
            ));
        }
        Ok(Self(value))
    }

    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for OccurrenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One concrete window `[start_date, end_date)` of a feedback cycle.
///
/// # Invariants
///
/// - At most one occurrence per cycle is `Active`
/// - Occurrence numbers per cycle are contiguous from 1
/// - `status` never goes back from `Completed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCycleOccurrence {
    pub id: OccurrenceId,
    pub cycle_id: FeedbackCycleId,
    pub occurrence_number: OccurrenceNumber,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub status: OccurrenceStatus,
}

impl FeedbackCycleOccurrence {
    pub fn is_active(&self) -> bool {
        self.status == OccurrenceStatus::Active
    }

    /// True once `now` has reached the (exclusive) end of the window.
    pub fn has_ended_at(&self, now: Timestamp) -> bool {
        !now.is_before(&self.end_date)
    }

    /// True if `at` falls inside the window.
    pub fn contains(&self, at: Timestamp) -> bool {
        !at.is_before(&self.start_date) && at.is_before(&self.end_date)
    }

    /// Marks the occurrence completed.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OccurrenceStatus::Completed)?;
        Ok(())
    }
}
