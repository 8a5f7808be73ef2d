//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresMemberDirectory` - Registered and invited members
//! - `PostgresFeedbackCycleStore` - Cycles and their occurrence log

mod feedback_cycle_store;
mod member_directory;

pub use feedback_cycle_store::PostgresFeedbackCycleStore;
pub use member_directory::PostgresMemberDirectory;
