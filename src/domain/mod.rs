//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `org` - Members, reporting lines, bulk assignment and import validation
//! - `feedback_cycle` - Recurring feedback cycles and occurrence rollover planning

pub mod feedback_cycle;
pub mod foundation;
pub mod org;
