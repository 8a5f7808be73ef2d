//! Planned changes to a cycle's occurrence log.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FeedbackCycleId, OccurrenceId, Timestamp};

use super::{FeedbackCycleOccurrence, OccurrenceNumber, OccurrenceStatus};

/// An occurrence the scheduler wants created. Always starts `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOccurrence {
    pub cycle_id: FeedbackCycleId,
    pub occurrence_number: OccurrenceNumber,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

impl PlannedOccurrence {
    /// Materializes the plan under a freshly allocated id.
    pub fn into_occurrence(self, id: OccurrenceId) -> FeedbackCycleOccurrence {
        FeedbackCycleOccurrence {
            id,
            cycle_id: self.cycle_id,
            occurrence_number: self.occurrence_number,
            start_date: self.start_date,
            end_date: self.end_date,
            status: OccurrenceStatus::Active,
        }
    }
}

/// What should happen to a cycle's occurrences at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OccurrenceTransition {
    /// The current window is still open, or the cycle is not active.
    NoOp,
    /// Open a new occurrence; nothing is active.
    Create { occurrence: PlannedOccurrence },
    /// Close `completed` and open `next`, as one atomic write.
    CompleteAndCreate {
        completed: OccurrenceId,
        next: PlannedOccurrence,
    },
}

impl OccurrenceTransition {
    pub fn is_noop(&self) -> bool {
        matches!(self, OccurrenceTransition::NoOp)
    }

    /// The occurrence this transition creates, if any.
    pub fn planned(&self) -> Option<&PlannedOccurrence> {
        match self {
            OccurrenceTransition::NoOp => None,
            OccurrenceTransition::Create { occurrence } => Some(occurrence),
            OccurrenceTransition::CompleteAndCreate { next, .. } => Some(next),
        }
    }
}
