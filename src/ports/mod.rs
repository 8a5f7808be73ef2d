//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `MemberDirectory` - Company members and reporting lines
//! - `FeedbackCycleStore` - Feedback cycles and their occurrence log

mod feedback_cycle_store;
mod member_directory;

pub use feedback_cycle_store::FeedbackCycleStore;
pub use member_directory::{MemberDirectory, MemberInvite};
