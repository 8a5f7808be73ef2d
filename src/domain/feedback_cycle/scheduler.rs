//! Occurrence rollover planning.
//!
//! The scheduler is pure: `now` and `today` are always parameters, so it
//! never reads the wall clock and can be tested without a mock clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{
    FeedbackCycle, FeedbackCycleOccurrence, OccurrenceNumber, OccurrenceStatus, OccurrenceTransition,
    PlannedOccurrence,
};

/// Where a replacement occurrence's window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RolloverAnchor {
    /// At the evaluation time that noticed the rollover.
    #[default]
    EvaluationTime,
    /// At the previous occurrence's end date. Windows stay back-to-back even
    /// when evaluation runs late; a cycle that fell several windows behind
    /// catches up one window per evaluation.
    PreviousEnd,
}

/// Decides when a cycle's current occurrence closes and what replaces it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackCycleScheduler {
    anchor: RolloverAnchor,
}

impl FeedbackCycleScheduler {
    pub fn new(anchor: RolloverAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> RolloverAnchor {
        self.anchor
    }

    /// Plans the next change for `cycle` given its latest occurrence.
    ///
    /// - Draft cycle: `NoOp`.
    /// - No occurrence yet: `Create` occurrence 1 starting at `now`.
    /// - Latest occurrence already completed: `Create` the next number, so a
    ///   rollover whose insert was lost is finished rather than reopened.
    /// - Active occurrence with `now < end_date`: `NoOp`.
    /// - Otherwise: `CompleteAndCreate` with the next number.
    ///
    /// `current` must be the occurrence with the highest number for `cycle`.
    pub fn plan_occurrence_transition(
        &self,
        cycle: &FeedbackCycle,
        current: Option<&FeedbackCycleOccurrence>,
        now: Timestamp,
    ) -> OccurrenceTransition {
        if !cycle.is_active() {
            return OccurrenceTransition::NoOp;
        }

        let Some(current) = current else {
            return OccurrenceTransition::Create {
                occurrence: self.window(cycle, OccurrenceNumber::first(), now),
            };
        };

        let start = match self.anchor {
            RolloverAnchor::EvaluationTime => now,
            RolloverAnchor::PreviousEnd => current.end_date,
        };
        let next = self.window(cycle, current.occurrence_number.next(), start);

        match current.status {
            OccurrenceStatus::Completed => OccurrenceTransition::Create { occurrence: next },
            OccurrenceStatus::Active if !current.has_ended_at(now) => OccurrenceTransition::NoOp,
            OccurrenceStatus::Active => OccurrenceTransition::CompleteAndCreate {
                completed: current.id,
                next,
            },
        }
    }

    /// Cycles whose reminder emails should go out on `today`: active, and
    /// `today` on or before the due date when one is set.
    pub fn select_due_cycles<'a>(&self, cycles: &'a [FeedbackCycle], today: NaiveDate) -> Vec<&'a FeedbackCycle> {
        cycles.iter().filter(|cycle| cycle.is_due_on(today)).collect()
    }

    fn window(&self, cycle: &FeedbackCycle, number: OccurrenceNumber, start: Timestamp) -> PlannedOccurrence {
        PlannedOccurrence {
            cycle_id: cycle.id,
            occurrence_number: number,
            start_date: start,
            end_date: cycle.frequency.interval_end(start),
        }
    }
}
