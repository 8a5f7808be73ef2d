//! Org chart construction from a flat member list.
//!
//! The chart is rebuilt from scratch on every call. Nodes borrow their
//! member records from the input slice, so nothing is cloned and the whole
//! structure is dropped with the response that used it.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::foundation::MemberId;

use super::Member;

/// A member together with the subtree of people reporting to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgChartNode<'a> {
    pub member: &'a Member,
    pub direct_reports: Vec<OrgChartNode<'a>>,
}

impl<'a> OrgChartNode<'a> {
    /// Number of members in this subtree, including this node.
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order iterator over the members of this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &'a Member> + '_ {
        let mut stack: Vec<&OrgChartNode<'a>> = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.direct_reports.iter().rev());
            Some(node.member)
        })
    }

    /// Finds the node for `id` within this subtree.
    pub fn find(&self, id: &MemberId) -> Option<&OrgChartNode<'a>> {
        let mut stack: Vec<&OrgChartNode<'a>> = vec![self];
        while let Some(node) = stack.pop() {
            if &node.member.id == id {
                return Some(node);
            }
            stack.extend(node.direct_reports.iter());
        }
        None
    }
}

/// Result of building a hierarchy.
///
/// Every input record lands in exactly one place: somewhere under `roots`,
/// or in `unassigned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgHierarchy<'a> {
    /// Members with no resolvable manager, each with their reporting subtree.
    pub roots: Vec<OrgChartNode<'a>>,
    /// Members not reachable from any root: manager loops, anyone hanging
    /// below a loop, and duplicate-id records.
    pub unassigned: Vec<&'a Member>,
    /// Roots whose `manager_id` was set but pointed outside the member list.
    pub unresolved_managers: Vec<MemberId>,
    /// Ids seen more than once. The first record wins; later ones are unassigned.
    pub collisions: Vec<MemberId>,
}

impl<'a> OrgHierarchy<'a> {
    /// Number of members placed in the tree.
    pub fn placed_count(&self) -> usize {
        self.roots.iter().map(OrgChartNode::size).sum()
    }

    /// Pre-order iterator over every member placed in the tree.
    pub fn members(&self) -> impl Iterator<Item = &'a Member> + '_ {
        self.roots.iter().flat_map(|root| root.iter())
    }

    /// Finds the node for `id` anywhere in the tree.
    pub fn find(&self, id: &MemberId) -> Option<&OrgChartNode<'a>> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    /// True if `id` is unassigned.
    pub fn is_unassigned(&self, id: &MemberId) -> bool {
        self.unassigned.iter().any(|m| &m.id == id)
    }
}

/// Builds org charts and validates changes to them.
///
/// Stateless; every operation is a pure function of its arguments.
pub struct OrgHierarchyBuilder;

impl OrgHierarchyBuilder {
    /// Turns a flat member list into a forest of reporting trees.
    ///
    /// Members with no manager, or a manager id that matches nobody, become
    /// roots. Everyone else is attached under their manager, top-down from
    /// the roots. Members whose chain never reaches a root (manager loops)
    /// are left in `unassigned`. Sibling order follows input order.
    ///
    /// Never panics and always terminates, whatever the input shape.
    pub fn build(members: &[Member]) -> OrgHierarchy<'_> {
        let count = members.len();

        let mut position: HashMap<&MemberId, usize> = HashMap::with_capacity(count);
        let mut duplicate = vec![false; count];
        let mut collisions = Vec::new();

        for (pos, member) in members.iter().enumerate() {
            if position.contains_key(&member.id) {
                duplicate[pos] = true;
                collisions.push(member.id.clone());
            } else {
                position.insert(&member.id, pos);
            }
        }

        let mut reports: Vec<Vec<usize>> = vec![Vec::new(); count];
        let mut root_positions = Vec::new();
        let mut unresolved_managers = Vec::new();

        for (pos, member) in members.iter().enumerate() {
            if duplicate[pos] {
                continue;
            }
            match &member.manager_id {
                None => root_positions.push(pos),
                Some(manager_id) => match position.get(manager_id) {
                    Some(&manager_pos) => reports[manager_pos].push(pos),
                    None => {
                        unresolved_managers.push(member.id.clone());
                        root_positions.push(pos);
                    }
                },
            }
        }

        // Breadth-first from the roots. Each member sits in exactly one
        // reports list, so nothing is visited twice.
        let mut placed = vec![false; count];
        let mut order = Vec::with_capacity(count);
        for &root in &root_positions {
            placed[root] = true;
            order.push(root);
        }
        let mut cursor = 0;
        while cursor < order.len() {
            let pos = order[cursor];
            cursor += 1;
            for &child in &reports[pos] {
                if !placed[child] {
                    placed[child] = true;
                    order.push(child);
                }
            }
        }

        // Assemble bottom-up so deep chains need no recursion.
        let mut nodes: Vec<Option<OrgChartNode<'_>>> = (0..count).map(|_| None).collect();
        for &pos in order.iter().rev() {
            let direct_reports = reports[pos]
                .iter()
                .filter_map(|&child| nodes[child].take())
                .collect();
            nodes[pos] = Some(OrgChartNode {
                member: &members[pos],
                direct_reports,
            });
        }

        let roots = root_positions
            .iter()
            .filter_map(|&pos| nodes[pos].take())
            .collect();

        let unassigned = members
            .iter()
            .zip(placed.iter())
            .filter(|(_, is_placed)| !**is_placed)
            .map(|(member, _)| member)
            .collect();

        OrgHierarchy {
            roots,
            unassigned,
            unresolved_managers,
            collisions,
        }
    }
}
