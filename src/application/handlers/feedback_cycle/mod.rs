//! Feedback cycle handlers.
//!
//! ## Commands
//! - Occurrence rollover pass
//!
//! ## Queries
//! - Cycles due for reminder emails

mod error;
mod list_due_cycles;
mod roll_over_occurrences;

pub use error::SchedulingError;

// Commands
pub use roll_over_occurrences::{RollOverOccurrencesCommand, RollOverOccurrencesHandler, RolloverSummary};

// Queries
pub use list_due_cycles::{ListDueCyclesHandler, ListDueCyclesQuery, ListDueCyclesResult};
