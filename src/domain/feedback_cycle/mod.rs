//! Recurring feedback cycles and their occurrence log.
//!
//! A cycle is the policy (frequency, status); occurrences are the concrete
//! windows it generates, numbered from 1 and never reopened.

mod cycle;
mod frequency;
mod occurrence;
mod scheduler;
mod status;
mod transition;

pub use cycle::FeedbackCycle;
pub use frequency::Frequency;
pub use occurrence::{FeedbackCycleOccurrence, OccurrenceNumber};
pub use scheduler::{FeedbackCycleScheduler, RolloverAnchor};
pub use status::{FeedbackCycleStatus, OccurrenceStatus};
pub use transition::{OccurrenceTransition, PlannedOccurrence};
