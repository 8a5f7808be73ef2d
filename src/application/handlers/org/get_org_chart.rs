//! GetOrgChartHandler - Query handler for a company's org chart.
//!
//! Builds the hierarchy from the member directory and turns it into an
//! owned read model with siblings sorted by display name.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{CompanyId, MemberId};
use crate::domain::org::{Member, MemberRole, OrgChartNode, OrgHierarchyBuilder};
use crate::ports::MemberDirectory;

use super::OrgError;

/// Query to get the org chart for a company.
#[derive(Debug, Clone)]
pub struct GetOrgChartQuery {
    pub company_id: CompanyId,
}

/// One member in the org chart read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgChartMemberView {
    pub id: MemberId,
    pub display_name: String,
    pub email: String,
    pub title: Option<String>,
    pub role: MemberRole,
    pub is_invited: bool,
    pub direct_reports: Vec<OrgChartMemberView>,
}

impl OrgChartMemberView {
    fn leaf(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            display_name: member.display_name().to_string(),
            email: member.email.clone(),
            title: member.title.clone(),
            role: member.role,
            is_invited: member.is_invited,
            direct_reports: Vec::new(),
        }
    }

    /// Copies a hierarchy subtree into the read model.
    ///
    /// Iterative, like the builder, so deep chains cannot overflow the stack.
    fn from_node(root: &OrgChartNode<'_>) -> Self {
        // Pre-order, so every child has a higher index than its parent.
        let mut order: Vec<(&OrgChartNode<'_>, Option<usize>)> = Vec::new();
        let mut stack = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let index = order.len();
            order.push((node, parent));
            stack.extend(node.direct_reports.iter().map(|child| (child, Some(index))));
        }

        let mut views: Vec<Option<Self>> = order.iter().map(|(node, _)| Some(Self::leaf(node.member))).collect();
        for index in (1..order.len()).rev() {
            if let (Some(parent), Some(mut view)) = (order[index].1, views[index].take()) {
                sort_by_display_name(&mut view.direct_reports);
                if let Some(parent_view) = views[parent].as_mut() {
                    parent_view.direct_reports.push(view);
                }
            }
        }

        let mut root_view = views
            .into_iter()
            .next()
            .flatten()
            .unwrap_or_else(|| Self::leaf(root.member));
        sort_by_display_name(&mut root_view.direct_reports);
        root_view
    }

    /// Number of members in this subtree, including this one.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(view) = stack.pop() {
            count += 1;
            stack.extend(view.direct_reports.iter());
        }
        count
    }
}

fn sort_by_display_name(views: &mut [OrgChartMemberView]) {
    views.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.email.cmp(&b.email))
    });
}

/// Result of the org chart query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrgChartResult {
    pub roots: Vec<OrgChartMemberView>,
    /// Members caught in or below a manager loop, and duplicate-id records.
    pub unassigned: Vec<OrgChartMemberView>,
    /// Roots whose manager id matched nobody.
    pub unresolved_managers: Vec<MemberId>,
    /// Ids carried by more than one directory record.
    pub collisions: Vec<MemberId>,
    pub total_members: usize,
}

/// Handler for retrieving a company's org chart.
pub struct GetOrgChartHandler {
    directory: Arc<dyn MemberDirectory>,
}

impl GetOrgChartHandler {
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    pub async fn handle(&self, query: GetOrgChartQuery) -> Result<GetOrgChartResult, OrgError> {
        let members = self.directory.list_members(&query.company_id).await?;
        let hierarchy = OrgHierarchyBuilder::build(&members);

        if !hierarchy.collisions.is_empty() {
            tracing::warn!(
                company_id = %query.company_id,
                collisions = ?hierarchy.collisions,
                "Member ids shared by more than one record"
            );
        }
        if !hierarchy.unassigned.is_empty() {
            tracing::warn!(
                company_id = %query.company_id,
                unassigned = hierarchy.unassigned.len(),
                "Members outside the reporting tree"
            );
        }

        let mut roots: Vec<_> = hierarchy.roots.iter().map(OrgChartMemberView::from_node).collect();
        sort_by_display_name(&mut roots);
        let mut unassigned: Vec<_> = hierarchy.unassigned.iter().map(|m| OrgChartMemberView::leaf(m)).collect();
        sort_by_display_name(&mut unassigned);

        tracing::debug!(
            company_id = %query.company_id,
            members = members.len(),
            roots = roots.len(),
            "Built org chart"
        );

        Ok(GetOrgChartResult {
            roots,
            unassigned,
            unresolved_managers: hierarchy.unresolved_managers.clone(),
            collisions: hierarchy.collisions.clone(),
            total_members: members.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMemberDirectory;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::MemberInvite;
    use async_trait::async_trait;

    fn id(s: &str) -> MemberId {
        MemberId::new(s).unwrap()
    }

    fn member(me: &str, name: &str, manager: Option<&str>) -> Member {
        Member::registered(id(me), format!("{}@x.com", me))
            .with_name(name)
            .with_manager(manager.map(id))
    }

    fn names(views: &[OrgChartMemberView]) -> Vec<&str> {
        views.iter().map(|v| v.display_name.as_str()).collect()
    }

    struct FailingDirectory;

    #[async_trait]
    impl MemberDirectory for FailingDirectory {
        async fn list_members(&self, _company_id: &CompanyId) -> Result<Vec<Member>, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated read failure"))
        }

        async fn update_manager(
            &self,
            _company_id: &CompanyId,
            _member_id: &MemberId,
            _manager_id: Option<&MemberId>,
        ) -> Result<(), DomainError> {
            Ok(())
        }

        async fn upsert_invited_member(
            &self,
            _company_id: &CompanyId,
            _invite: &MemberInvite,
        ) -> Result<MemberId, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "Simulated write failure"))
        }
    }

    #[tokio::test]
    async fn siblings_are_sorted_by_display_name() {
        let company = CompanyId::new();
        let directory = InMemoryMemberDirectory::new().with_members(
            company,
            vec![
                member("boss", "Zed", None),
                member("c", "charlie", Some("boss")),
                member("a", "Alice", Some("boss")),
                member("b", "Bob", Some("boss")),
                member("solo", "Anna", None),
            ],
        );
        let handler = GetOrgChartHandler::new(Arc::new(directory));

        let chart = handler.handle(GetOrgChartQuery { company_id: company }).await.unwrap();

        assert_eq!(names(&chart.roots), vec!["Anna", "Zed"]);
        assert_eq!(names(&chart.roots[1].direct_reports), vec!["Alice", "Bob", "charlie"]);
        assert_eq!(chart.total_members, 5);
    }

    #[tokio::test]
    async fn invited_member_without_name_sorts_by_email() {
        let company = CompanyId::new();
        let directory = InMemoryMemberDirectory::new().with_members(
            company,
            vec![
                member("boss", "Boss", None),
                Member::invited(id("i1"), "aaron@x.com").with_manager(Some(id("boss"))),
                member("m", "Mia", Some("boss")),
            ],
        );
        let handler = GetOrgChartHandler::new(Arc::new(directory));

        let chart = handler.handle(GetOrgChartQuery { company_id: company }).await.unwrap();

        let reports = &chart.roots[0].direct_reports;
        assert_eq!(names(reports), vec!["aaron@x.com", "Mia"]);
        assert!(reports[0].is_invited);
    }

    #[tokio::test]
    async fn loops_and_collisions_are_surfaced() {
        let company = CompanyId::new();
        let directory = InMemoryMemberDirectory::new().with_members(
            company,
            vec![
                member("a", "A", Some("b")),
                member("b", "B", Some("a")),
                member("root", "Root", Some("departed")),
                Member::invited(id("root"), "dup@x.com"),
            ],
        );
        let handler = GetOrgChartHandler::new(Arc::new(directory));

        let chart = handler.handle(GetOrgChartQuery { company_id: company }).await.unwrap();

        assert_eq!(names(&chart.roots), vec!["Root"]);
        assert_eq!(names(&chart.unassigned), vec!["A", "B", "dup@x.com"]);
        assert_eq!(chart.unresolved_managers, vec![id("root")]);
        assert_eq!(chart.collisions, vec![id("root")]);
    }

    #[tokio::test]
    async fn deep_chain_converts_without_recursion() {
        let company = CompanyId::new();
        let mut members = vec![member("m0", "m0", None)];
        for i in 1..3_000 {
            members.push(member(&format!("m{}", i), &format!("m{}", i), Some(&format!("m{}", i - 1))));
        }
        let directory = InMemoryMemberDirectory::new().with_members(company, members);
        let handler = GetOrgChartHandler::new(Arc::new(directory));

        let chart = handler.handle(GetOrgChartQuery { company_id: company }).await.unwrap();
        assert_eq!(chart.roots[0].size(), 3_000);
    }

    #[tokio::test]
    async fn empty_company_has_empty_chart() {
        let handler = GetOrgChartHandler::new(Arc::new(InMemoryMemberDirectory::new()));
        let chart = handler
            .handle(GetOrgChartQuery {
                company_id: CompanyId::new(),
            })
            .await
            .unwrap();
        assert!(chart.roots.is_empty());
        assert_eq!(chart.total_members, 0);
    }

    #[tokio::test]
    async fn directory_failure_is_infrastructure_error() {
        let handler = GetOrgChartHandler::new(Arc::new(FailingDirectory));
        let err = handler
            .handle(GetOrgChartQuery {
                company_id: CompanyId::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::Infrastructure(_)));
    }
}
