//! ImportMembersHandler - Command handler for CSV member imports.
//!
//! 1. Parse and validate the payload by email.
//! 2. Resolve emails to member ids, reserving provisional ids for new people.
//! 3. Validate the resulting manager assignments against the whole company,
//!    which catches loops through members not named in the file.
//! 4. Only then invite new members and write the manager changes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{CompanyId, DomainError, MemberId};
use crate::domain::org::{
    ImportError, ImportOptions, ImportReport, ManagerAssignment, Member, MemberImportParser,
    OrgHierarchyBuilder,
};
use crate::ports::{MemberDirectory, MemberInvite};

use super::OrgError;

/// Command to import members from a CSV payload.
#[derive(Debug, Clone)]
pub struct ImportMembersCommand {
    pub company_id: CompanyId,
    pub csv: String,
}

/// Result of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMembersResult {
    /// Parsed rows and row-level findings.
    pub report: ImportReport,
    /// Findings from validating the import against existing reporting lines.
    pub assignment_errors: Vec<ImportError>,
    /// Members created as invited placeholders.
    pub invited: Vec<MemberId>,
    /// Members whose manager changed.
    pub reassigned: Vec<MemberId>,
}

impl ImportMembersResult {
    /// True if the import was written.
    pub fn is_applied(&self) -> bool {
        self.report.is_clean() && self.assignment_errors.is_empty()
    }

    fn rejected(report: ImportReport, assignment_errors: Vec<ImportError>) -> Self {
        Self {
            report,
            assignment_errors,
            invited: Vec::new(),
            reassigned: Vec::new(),
        }
    }
}

/// Handler for CSV member imports.
pub struct ImportMembersHandler {
    directory: Arc<dyn MemberDirectory>,
    options: ImportOptions,
}

impl ImportMembersHandler {
    pub fn new(directory: Arc<dyn MemberDirectory>, options: ImportOptions) -> Self {
        Self { directory, options }
    }

    pub async fn handle(&self, cmd: ImportMembersCommand) -> Result<ImportMembersResult, OrgError> {
        let members = self.directory.list_members(&cmd.company_id).await?;

        let report = MemberImportParser::new(self.options.clone())
            .with_known_emails(members.iter().map(|m| m.email.as_str()))
            .parse_csv(&cmd.csv)?;

        if !report.is_clean() {
            tracing::info!(
                company_id = %cmd.company_id,
                rows = report.rows.len(),
                errors = report.errors.len(),
                "Import rejected by row validation"
            );
            return Ok(ImportMembersResult::rejected(report, Vec::new()));
        }

        // Existing members by email; the first record wins like in the chart.
        let mut by_email: HashMap<String, MemberId> = HashMap::new();
        for member in &members {
            by_email
                .entry(member.email.to_lowercase())
                .or_insert_with(|| member.id.clone());
        }

        let mut proposed = members.clone();
        let mut pending: HashMap<MemberId, usize> = HashMap::new();
        for (index, row) in report.rows.iter().enumerate() {
            if by_email.contains_key(&row.email) {
                continue;
            }
            let provisional = MemberId::new(format!("pending:{}", row.email)).map_err(DomainError::from)?;
            proposed.push(row.to_member(provisional.clone(), None, true));
            pending.insert(provisional.clone(), index);
            by_email.insert(row.email.clone(), provisional);
        }

        let assignments = self.assignments(&report, &by_email, &proposed);
        let assignment_errors = OrgHierarchyBuilder::validate_bulk_assignment(&assignments, &proposed);
        if !assignment_errors.is_empty() {
            tracing::info!(
                company_id = %cmd.company_id,
                errors = assignment_errors.len(),
                "Import rejected by reporting line validation"
            );
            return Ok(ImportMembersResult::rejected(report, assignment_errors));
        }

        // Swap provisional ids for real ones as invites are created.
        let mut real_ids: HashMap<MemberId, MemberId> = HashMap::new();
        let mut invited = Vec::with_capacity(pending.len());
        for row in &report.rows {
            let Some(provisional) = by_email.get(&row.email) else {
                continue;
            };
            if !pending.contains_key(provisional) || real_ids.contains_key(provisional) {
                continue;
            }
            let invite = MemberInvite {
                email: row.email.clone(),
                name: row.name.clone(),
                title: row.title.clone(),
                role: row.role,
            };
            let id = self.directory.upsert_invited_member(&cmd.company_id, &invite).await?;
            real_ids.insert(provisional.clone(), id.clone());
            invited.push(id);
        }
        let resolve = |id: &MemberId| real_ids.get(id).cloned().unwrap_or_else(|| id.clone());

        let mut reassigned = Vec::new();
        for assignment in &assignments {
            let member_id = resolve(&assignment.member_id);
            let manager_id = assignment.manager_id.as_ref().map(resolve);
            self.directory
                .update_manager(&cmd.company_id, &member_id, manager_id.as_ref())
                .await?;
            reassigned.push(member_id);
        }

        tracing::info!(
            company_id = %cmd.company_id,
            rows = report.rows.len(),
            invited = invited.len(),
            reassigned = reassigned.len(),
            "Imported members"
        );

        Ok(ImportMembersResult {
            report,
            assignment_errors,
            invited,
            reassigned,
        })
    }

    /// Manager changes the import asks for, skipping rows that already match.
    ///
    /// A manager email that matches nobody leaves the member without a
    /// manager; strict imports have already rejected such rows.
    fn assignments(
        &self,
        report: &ImportReport,
        by_email: &HashMap<String, MemberId>,
        proposed: &[Member],
    ) -> Vec<ManagerAssignment> {
        let current: HashMap<&MemberId, Option<&MemberId>> = proposed
            .iter()
            .rev()
            .map(|m| (&m.id, m.manager_id.as_ref()))
            .collect();

        report
            .rows
            .iter()
            .filter_map(|row| {
                let member_id = by_email.get(&row.email)?.clone();
                let manager_id = row
                    .manager_email
                    .as_ref()
                    .and_then(|email| by_email.get(email))
                    .cloned();
                let unchanged = current.get(&member_id).copied().flatten() == manager_id.as_ref();
                (!unchanged).then(|| ManagerAssignment::new(member_id, manager_id))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberDirectory;
    use crate::domain::org::{ImportErrorCode, ImportParseError};

    fn id(s: &str) -> MemberId {
        MemberId::new(s).unwrap()
    }

    fn member(me: &str, manager: Option<&str>) -> Member {
        Member::registered(id(me), format!("{}@x.com", me)).with_manager(manager.map(id))
    }

    fn setup(members: Vec<Member>, options: ImportOptions) -> (CompanyId, Arc<InMemoryMemberDirectory>, ImportMembersHandler) {
        let company = CompanyId::new();
        let directory = Arc::new(InMemoryMemberDirectory::new().with_members(company, members));
        let handler = ImportMembersHandler::new(directory.clone(), options);
        (company, directory, handler)
    }

    fn find<'a>(members: &'a [Member], email: &str) -> &'a Member {
        members.iter().find(|m| m.email == email).unwrap()
    }

    #[tokio::test]
    async fn new_people_are_invited_and_wired_up() {
        let (company, directory, handler) = setup(vec![member("boss", None)], ImportOptions::default());

        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: "email,managerEmail,name\nnew@x.com,boss@x.com,Newbie\nintern@x.com,new@x.com,\n".into(),
            })
            .await
            .unwrap();

        assert!(result.is_applied());
        assert_eq!(result.invited.len(), 2);

        let members = directory.members(&company);
        let newbie = find(&members, "new@x.com");
        assert!(newbie.is_invited);
        assert_eq!(newbie.name.as_deref(), Some("Newbie"));
        assert_eq!(newbie.manager_id, Some(id("boss")));
        assert_eq!(find(&members, "intern@x.com").manager_id, Some(newbie.id.clone()));
    }

    #[tokio::test]
    async fn existing_members_are_reassigned_not_duplicated() {
        let (company, directory, handler) =
            setup(vec![member("boss", None), member("dev", None)], ImportOptions::default());

        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: "email,managerEmail\nDEV@x.com,boss@x.com\nboss@x.com,\n".into(),
            })
            .await
            .unwrap();

        assert!(result.invited.is_empty());
        assert_eq!(result.reassigned, vec![id("dev")]);
        assert_eq!(directory.members(&company).len(), 2);
        assert_eq!(find(&directory.members(&company), "dev@x.com").manager_id, Some(id("boss")));
    }

    #[tokio::test]
    async fn row_errors_block_the_whole_import() {
        let (company, directory, handler) = setup(vec![member("boss", None)], ImportOptions::default());

        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: "email,managerEmail\nok@x.com,boss@x.com\nbroken,boss@x.com\n".into(),
            })
            .await
            .unwrap();

        assert!(!result.is_applied());
        assert_eq!(result.report.errors[0].code, ImportErrorCode::InvalidEmail);
        assert_eq!(directory.members(&company).len(), 1);
    }

    #[tokio::test]
    async fn loop_through_existing_members_is_caught_before_writing() {
        // lead already reports to dev; the file makes dev report to lead.
        let (company, directory, handler) =
            setup(vec![member("lead", Some("dev")), member("dev", None)], ImportOptions::default());

        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: "email,managerEmail\ndev@x.com,lead@x.com\nnew@x.com,dev@x.com\n".into(),
            })
            .await
            .unwrap();

        assert!(!result.is_applied());
        assert_eq!(result.assignment_errors[0].code, ImportErrorCode::CircularReference);
        assert_eq!(directory.members(&company).len(), 2);
        assert_eq!(find(&directory.members(&company), "dev@x.com").manager_id, None);
    }

    #[tokio::test]
    async fn unknown_manager_becomes_root_unless_strict() {
        let csv = "email,managerEmail\nsolo@x.com,gone@x.com\n";

        let (company, directory, handler) = setup(vec![], ImportOptions::default());
        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: csv.into(),
            })
            .await
            .unwrap();
        assert!(result.is_applied());
        assert_eq!(find(&directory.members(&company), "solo@x.com").manager_id, None);

        let strict = ImportOptions {
            strict_manager_resolution: true,
            ..Default::default()
        };
        let (company, _directory, handler) = setup(vec![], strict);
        let result = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: csv.into(),
            })
            .await
            .unwrap();
        assert_eq!(result.report.errors[0].code, ImportErrorCode::UnresolvedManager);
    }

    #[tokio::test]
    async fn unreadable_payload_is_an_error() {
        let (company, _directory, handler) = setup(vec![], ImportOptions::default());
        let err = handler
            .handle(ImportMembersCommand {
                company_id: company,
                csv: "name\nAlice\n".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, OrgError::ImportRejected(ImportParseError::MissingColumn("email")));
    }
}
