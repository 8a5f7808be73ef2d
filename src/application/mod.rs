//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;
mod retry;

pub use handlers::feedback_cycle::{
    ListDueCyclesHandler, ListDueCyclesQuery, ListDueCyclesResult, RollOverOccurrencesCommand,
    RollOverOccurrencesHandler, RolloverSummary, SchedulingError,
};
pub use handlers::org::{
    AssignManagersCommand, AssignManagersHandler, AssignManagersResult, AssignmentMode,
    GetOrgChartHandler, GetOrgChartQuery, GetOrgChartResult, ImportMembersCommand,
    ImportMembersHandler, ImportMembersResult, OrgChartMemberView, OrgError,
};
pub use retry::RetryPolicy;
