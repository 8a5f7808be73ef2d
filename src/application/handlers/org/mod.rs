//! Org handlers.
//!
//! ## Commands
//! - Bulk manager reassignment
//! - CSV member import
//!
//! ## Queries
//! - Org chart

mod assign_managers;
mod error;
mod get_org_chart;
mod import_members;

pub use error::OrgError;

// Commands
pub use assign_managers::{
    AssignManagersCommand, AssignManagersHandler, AssignManagersResult, AssignmentMode,
};
pub use import_members::{ImportMembersCommand, ImportMembersHandler, ImportMembersResult};

// Queries
pub use get_org_chart::{GetOrgChartHandler, GetOrgChartQuery, GetOrgChartResult, OrgChartMemberView};
