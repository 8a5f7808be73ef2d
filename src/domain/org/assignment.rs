//! Validation of bulk manager reassignments.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::MemberId;

use super::manager_chain::find_cycle_through;
use super::{ImportError, Member, OrgHierarchyBuilder};

/// Request to set (or clear) one member's manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerAssignment {
    pub member_id: MemberId,
    pub manager_id: Option<MemberId>,
}

impl ManagerAssignment {
    pub fn new(member_id: MemberId, manager_id: Option<MemberId>) -> Self {
        Self {
            member_id,
            manager_id,
        }
    }
}

impl OrgHierarchyBuilder {
    /// Checks a batch of manager assignments against the current members.
    ///
    /// Reports, for each assignment in order:
    /// - `UNKNOWN_MEMBER` when the member being reassigned does not exist
    /// - `CIRCULAR_REFERENCE` when a member is made their own manager
    /// - `UNRESOLVED_MANAGER` when the new manager does not exist
    /// - `CIRCULAR_REFERENCE` when, with the whole batch applied, the member's
    ///   manager chain leads back to them
    ///
    /// Loops that already existed and do not pass through an assigned member
    /// are not reported. An empty result means the batch is safe to persist.
    pub fn validate_bulk_assignment(
        assignments: &[ManagerAssignment],
        members: &[Member],
    ) -> Vec<ImportError> {
        let mut graph: HashMap<&MemberId, Option<&MemberId>> = HashMap::with_capacity(members.len());
        for member in members {
            graph
                .entry(&member.id)
                .or_insert(member.manager_id.as_ref());
        }

        // Findings are kept per assignment so the report stays in batch order.
        let mut findings: Vec<Vec<ImportError>> = vec![Vec::new(); assignments.len()];
        let mut needs_walk = vec![false; assignments.len()];

        for (slot, assignment) in assignments.iter().enumerate() {
            let member_id = &assignment.member_id;
            if !graph.contains_key(member_id) {
                findings[slot].push(ImportError::unknown_member(member_id.as_str()));
                continue;
            }
            match &assignment.manager_id {
                Some(manager_id) if manager_id == member_id => {
                    findings[slot].push(ImportError::circular_reference(
                        member_id.as_str(),
                        vec![member_id.to_string(), member_id.to_string()],
                    ));
                }
                Some(manager_id) if !graph.contains_key(manager_id) => {
                    findings[slot].push(ImportError::unresolved_manager(
                        member_id.as_str(),
                        manager_id.as_str(),
                    ));
                }
                Some(_) => needs_walk[slot] = true,
                None => {}
            }
        }

        // Apply the whole batch to the simulated graph, last write wins.
        for assignment in assignments {
            if let Some(manager) = graph.get_mut(&assignment.member_id) {
                *manager = assignment.manager_id.as_ref();
            }
        }

        for (slot, assignment) in assignments.iter().enumerate() {
            if !needs_walk[slot] {
                continue;
            }
            let origin = &assignment.member_id;
            if let Some(chain) = find_cycle_through(&origin, |id| graph.get(id).copied().flatten()) {
                let chain = chain.iter().map(|id| id.to_string()).collect();
                findings[slot].push(ImportError::circular_reference(origin.as_str(), chain));
            }
        }

        findings.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::org::ImportErrorCode;

    fn id(s: &str) -> MemberId {
        MemberId::new(s).unwrap()
    }

    fn member(me: &str, manager: Option<&str>) -> Member {
        Member::registered(id(me), format!("{}@x.com", me)).with_manager(manager.map(id))
    }

    fn assign(me: &str, manager: Option<&str>) -> ManagerAssignment {
        ManagerAssignment::new(id(me), manager.map(id))
    }

    fn org() -> Vec<Member> {
        vec![
            member("ceo", None),
            member("vp", Some("ceo")),
            member("lead", Some("vp")),
            member("dev", Some("lead")),
        ]
    }

    #[test]
    fn valid_batch_returns_no_errors() {
        let errors = OrgHierarchyBuilder::validate_bulk_assignment(
            &[assign("dev", Some("vp")), assign("lead", None)],
            &org(),
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn self_management_is_rejected() {
        let errors =
            OrgHierarchyBuilder::validate_bulk_assignment(&[assign("dev", Some("dev"))], &org());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ImportErrorCode::CircularReference);
        assert_eq!(errors[0].subject, "dev");
    }

    #[test]
    fn self_management_of_unknown_id_is_still_reported() {
        let errors =
            OrgHierarchyBuilder::validate_bulk_assignment(&[assign("x", Some("x"))], &[]);
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.subject == "x"));
    }

    #[test]
    fn unknown_manager_is_reported() {
        let errors = OrgHierarchyBuilder::validate_bulk_assignment(
            &[assign("dev", Some("nobody"))],
            &org(),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ImportErrorCode::UnresolvedManager);
    }

    #[test]
    fn unknown_member_is_reported() {
        let errors =
            OrgHierarchyBuilder::validate_bulk_assignment(&[assign("ghost", Some("ceo"))], &org());
        assert_eq!(errors[0].code, ImportErrorCode::UnknownMember);
    }

    #[test]
    fn introduced_cycle_is_reported_with_chain() {
        // ceo -> dev closes ceo <- vp <- lead <- dev
        let errors =
            OrgHierarchyBuilder::validate_bulk_assignment(&[assign("ceo", Some("dev"))], &org());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ImportErrorCode::CircularReference);
        assert_eq!(errors[0].chain, vec!["ceo", "dev", "lead", "vp", "ceo"]);
    }

    #[test]
    fn cycle_formed_only_by_combined_batch_is_detected() {
        // Each assignment alone is fine; together they swap into a loop.
        let batch = [assign("vp", Some("lead")), assign("lead", Some("dev")), assign("dev", Some("vp"))];
        let members = vec![member("vp", None), member("lead", None), member("dev", None)];

        let errors = OrgHierarchyBuilder::validate_bulk_assignment(&batch, &members);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.code == ImportErrorCode::CircularReference));
    }

    #[test]
    fn later_assignment_in_batch_can_break_a_cycle() {
        let batch = [assign("ceo", Some("dev")), assign("dev", None)];
        let errors = OrgHierarchyBuilder::validate_bulk_assignment(&batch, &org());
        assert!(errors.is_empty());
    }

    #[test]
    fn all_errors_are_collected_in_batch_order() {
        let mut members = org();
        members.push(member("intern", Some("dev")));
        members.push(member("temp", None));

        let batch = [
            assign("ghost", None),
            assign("ceo", Some("dev")),
            assign("intern", Some("intern")),
            assign("temp", Some("nobody")),
        ];
        let errors = OrgHierarchyBuilder::validate_bulk_assignment(&batch, &members);

        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                ImportErrorCode::UnknownMember,
                ImportErrorCode::CircularReference,
                ImportErrorCode::CircularReference,
                ImportErrorCode::UnresolvedManager,
            ]
        );
        let subjects: Vec<_> = errors.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, vec!["ghost", "ceo", "intern", "temp"]);
    }

    #[test]
    fn pre_existing_loop_elsewhere_is_not_blamed_on_batch() {
        let members = vec![member("a", Some("b")), member("b", Some("a")), member("c", None), member("d", None)];
        let errors =
            OrgHierarchyBuilder::validate_bulk_assignment(&[assign("c", Some("a"))], &members);
        assert!(errors.is_empty());
    }

    #[test]
    fn repeated_validation_is_identical() {
        let batch = [assign("ceo", Some("dev")), assign("dev", Some("dev"))];
        let members = org();
        let first = OrgHierarchyBuilder::validate_bulk_assignment(&batch, &members);
        let second = OrgHierarchyBuilder::validate_bulk_assignment(&batch, &members);
        assert_eq!(first, second);
    }
}
