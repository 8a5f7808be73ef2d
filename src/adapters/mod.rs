//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-process stores for tests and local runs
//! - `postgres` - PostgreSQL-backed persistence

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryFeedbackCycleStore, InMemoryMemberDirectory};
pub use postgres::{PostgresFeedbackCycleStore, PostgresMemberDirectory};
