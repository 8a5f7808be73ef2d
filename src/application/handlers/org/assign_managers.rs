//! AssignManagersHandler - Command handler for bulk manager reassignment.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, MemberId};
use crate::domain::org::{ImportError, ManagerAssignment, OrgHierarchyBuilder};
use crate::ports::MemberDirectory;

use super::OrgError;

/// What to persist when some assignments in a batch are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Persist nothing unless the whole batch is valid.
    #[default]
    AllOrNothing,
    /// Persist the assignments that are valid on their own.
    ValidOnly,
}

/// Command to reassign managers in bulk.
#[derive(Debug, Clone)]
pub struct AssignManagersCommand {
    pub company_id: CompanyId,
    pub assignments: Vec<ManagerAssignment>,
    pub mode: AssignmentMode,
}

/// Result of a bulk reassignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignManagersResult {
    /// Members whose manager was written, in batch order.
    pub applied: Vec<MemberId>,
    /// Every finding for the batch. Empty means everything was applied.
    pub errors: Vec<ImportError>,
}

/// Handler for bulk manager reassignment.
pub struct AssignManagersHandler {
    directory: Arc<dyn MemberDirectory>,
}

impl AssignManagersHandler {
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, cmd: AssignManagersCommand) -> Result<AssignManagersResult, OrgError> {
        let members = self.directory.list_members(&cmd.company_id).await?;

        let (accepted, errors) = match cmd.mode {
            AssignmentMode::AllOrNothing => {
                let errors = OrgHierarchyBuilder::validate_bulk_assignment(&cmd.assignments, &members);
                let accepted = if errors.is_empty() { cmd.assignments } else { Vec::new() };
                (accepted, errors)
            }
            AssignmentMode::ValidOnly => {
                // Dropping an invalid assignment leaves that member's old manager
                // in place, which can close a loop the full batch did not have,
                // so validate again until the remaining batch is clean.
                let mut remaining = cmd.assignments;
                let mut errors = Vec::new();
                loop {
                    let found = OrgHierarchyBuilder::validate_bulk_assignment(&remaining, &members);
                    if found.is_empty() {
                        break;
                    }
                    let rejected: HashSet<&str> = found.iter().map(|e| e.subject.as_str()).collect();
                    remaining.retain(|a| !rejected.contains(a.member_id.as_str()));
                    errors.extend(found);
                }
                (remaining, errors)
            }
        };

        if !errors.is_empty() {
            tracing::warn!(
                company_id = %cmd.company_id,
                mode = ?cmd.mode,
                errors = errors.len(),
                accepted = accepted.len(),
                "Manager assignment batch has problems"
            );
        }

        let mut applied = Vec::with_capacity(accepted.len());
        for assignment in accepted {
            self.directory
                .update_manager(&cmd.company_id, &assignment.member_id, assignment.manager_id.as_ref())
                .await?;
            applied.push(assignment.member_id);
        }

        tracing::info!(company_id = %cmd.company_id, applied = applied.len(), "Applied manager assignments");

        Ok(AssignManagersResult { applied, errors })
    }
}
