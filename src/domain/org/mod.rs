//! Company membership and reporting lines.
//!
//! Pure domain services: the hierarchy builder, bulk assignment validation
//! and the member import parser. None of them touch storage.

mod assignment;
mod errors;
mod hierarchy;
mod import;
mod manager_chain;
mod member;

pub use assignment::ManagerAssignment;
pub use errors::{ImportError, ImportErrorCode, ImportParseError};
pub use hierarchy::{OrgChartNode, OrgHierarchy, OrgHierarchyBuilder};
pub use import::{
    is_valid_email, normalize_email, ImportOptions, ImportReport, ImportRow, MemberImportParser,
    RawImportRecord, RawImportTable,
};
pub use member::{Member, MemberRole};
