//! In-memory adapters.
//!
//! Used by tests and for running handlers without a database. Both enforce
//! the same rules as their PostgreSQL counterparts.

mod feedback_cycle_store;
mod member_directory;

pub use feedback_cycle_store::InMemoryFeedbackCycleStore;
pub use member_directory::InMemoryMemberDirectory;
