//! RollOverOccurrencesHandler - Command handler for the periodic rollover job.
//!
//! For every active cycle: read the latest occurrence, plan the transition,
//! and persist it. A lost race (`DUPLICATE_OCCURRENCE` or a completed
//! occurrence that is no longer active) means another run already did the
//! work; the handler re-reads and moves on. Transient storage failures are
//! retried with the configured policy; a cycle that still fails is reported
//! and does not stop the pass.

use std::sync::Arc;

use serde::Serialize;

use crate::application::RetryPolicy;
use crate::domain::feedback_cycle::{FeedbackCycle, FeedbackCycleScheduler, OccurrenceNumber, OccurrenceTransition};
use crate::domain::foundation::{FeedbackCycleId, OccurrenceId, Timestamp};
use crate::ports::FeedbackCycleStore;

use super::SchedulingError;

/// Command to run one rollover pass.
#[derive(Debug, Clone, Copy)]
pub struct RollOverOccurrencesCommand {
    /// Evaluation time. Passed in so passes are reproducible.
    pub now: Timestamp,
}

/// What one pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverSummary {
    pub evaluated: usize,
    /// First occurrences (or successors of an already completed one) created.
    pub created: usize,
    /// Active occurrences completed and replaced.
    pub rolled_over: usize,
    pub unchanged: usize,
    /// Cycles another writer had already rolled over.
    pub conflicts: usize,
    /// Cycles that failed after retries.
    pub failed: Vec<FeedbackCycleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Unchanged,
    Created(OccurrenceNumber),
    RolledOver(OccurrenceNumber),
}

/// Handler for the rollover job.
pub struct RollOverOccurrencesHandler {
    store: Arc<dyn FeedbackCycleStore>,
    scheduler: FeedbackCycleScheduler,
    retry: RetryPolicy,
}

impl RollOverOccurrencesHandler {
    pub fn new(store: Arc<dyn FeedbackCycleStore>, scheduler: FeedbackCycleScheduler, retry: RetryPolicy) -> Self {
        Self { store, scheduler, retry }
    }

    pub async fn handle(&self, cmd: RollOverOccurrencesCommand) -> Result<RolloverSummary, SchedulingError> {
        let store = &self.store;
        let cycles = self.retry.run("list_active_cycles", || store.list_active_cycles()).await?;

        let mut summary = RolloverSummary {
            evaluated: cycles.len(),
            ..Default::default()
        };

        for cycle in &cycles {
            match self.roll_over_cycle(cycle, cmd.now).await {
                Ok(CycleOutcome::Unchanged) => summary.unchanged += 1,
                Ok(CycleOutcome::Created(number)) => {
                    tracing::info!(cycle_id = %cycle.id, occurrence = %number, "Created occurrence");
                    summary.created += 1;
                }
                Ok(CycleOutcome::RolledOver(number)) => {
                    tracing::info!(cycle_id = %cycle.id, occurrence = %number, "Rolled over occurrence");
                    summary.rolled_over += 1;
                }
                Err(SchedulingError::Conflict(reason)) => {
                    summary.conflicts += 1;
                    self.log_current(cycle, &reason).await;
                }
                Err(err) => {
                    tracing::error!(cycle_id = %cycle.id, "Rollover failed: {}", err);
                    summary.failed.push(cycle.id);
                }
            }
        }

        tracing::info!(
            evaluated = summary.evaluated,
            created = summary.created,
            rolled_over = summary.rolled_over,
            unchanged = summary.unchanged,
            conflicts = summary.conflicts,
            failed = summary.failed.len(),
            "Rollover pass finished"
        );

        Ok(summary)
    }

    async fn roll_over_cycle(&self, cycle: &FeedbackCycle, now: Timestamp) -> Result<CycleOutcome, SchedulingError> {
        let store = &self.store;
        let current = self
            .retry
            .run("find_latest_occurrence", || store.find_latest_occurrence(&cycle.id))
            .await?;

        let transition = self.scheduler.plan_occurrence_transition(cycle, current.as_ref(), now);
        tracing::debug!(cycle_id = %cycle.id, transition = ?transition, "Planned transition");

        match transition {
            OccurrenceTransition::NoOp => Ok(CycleOutcome::Unchanged),
            OccurrenceTransition::Create { occurrence } => {
                let occurrence = occurrence.into_occurrence(OccurrenceId::new());
                let occurrence = &occurrence;
                self.retry
                    .run("insert_occurrence", || store.insert_occurrence(occurrence))
                    .await?;
                Ok(CycleOutcome::Created(occurrence.occurrence_number))
            }
            OccurrenceTransition::CompleteAndCreate { completed, next } => {
                let next = next.into_occurrence(OccurrenceId::new());
                let (completed, next) = (&completed, &next);
                self.retry
                    .run("roll_over", || store.roll_over(completed, next))
                    .await?;
                Ok(CycleOutcome::RolledOver(next.occurrence_number))
            }
        }
    }

    /// Re-reads after a lost race so the log shows where the cycle ended up.
    async fn log_current(&self, cycle: &FeedbackCycle, reason: &str) {
        match self.store.find_latest_occurrence(&cycle.id).await {
            Ok(Some(current)) => tracing::warn!(
                cycle_id = %cycle.id,
                occurrence = %current.occurrence_number,
                status = %current.status,
                "Cycle already rolled over by another writer: {}",
                reason
            ),
            Ok(None) => tracing::warn!(cycle_id = %cycle.id, "Write conflict on a cycle with no occurrences: {}", reason),
            Err(err) => tracing::warn!(cycle_id = %cycle.id, "Write conflict, re-read failed: {}", err),
        }
    }
}
