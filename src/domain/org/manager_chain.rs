//! Iterative walk up a manager chain.
//!
//! Shared by assignment validation (keyed by member id) and import
//! validation (keyed by email, before any ids exist).

use std::collections::HashSet;
use std::hash::Hash;

/// Walks from `origin` up the chain given by `manager_of`.
///
/// Returns the chain `[origin, m1, ..., origin]` if the walk comes back to
/// `origin`. Returns `None` when the walk reaches a node without a manager,
/// or when it enters a loop that does not include `origin` (that loop belongs
/// to some other node's report).
pub(crate) fn find_cycle_through<K, F>(origin: &K, mut manager_of: F) -> Option<Vec<K>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&K) -> Option<K>,
{
    let mut visited: HashSet<K> = HashSet::new();
    visited.insert(origin.clone());

    let mut chain = vec![origin.clone()];
    let mut current = manager_of(origin);

    while let Some(manager) = current {
        chain.push(manager.clone());
        if &manager == origin {
            return Some(chain);
        }
        if !visited.insert(manager.clone()) {
            return None;
        }
        current = manager_of(&manager);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn graph(edges: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        edges.iter().copied().collect()
    }

    #[test]
    fn terminates_at_root_without_cycle() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        assert_eq!(find_cycle_through(&"a", |k| g.get(k).copied()), None);
    }

    #[test]
    fn returns_chain_back_to_origin() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(
            find_cycle_through(&"a", |k| g.get(k).copied()),
            Some(vec!["a", "b", "c", "a"])
        );
    }

    #[test]
    fn self_reference_is_a_two_element_chain() {
        let g = graph(&[("x", "x")]);
        assert_eq!(
            find_cycle_through(&"x", |k| g.get(k).copied()),
            Some(vec!["x", "x"])
        );
    }

    #[test]
    fn stops_on_foreign_loop() {
        // a hangs off the b <-> c loop but is not part of it
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "b")]);
        assert_eq!(find_cycle_through(&"a", |k| g.get(k).copied()), None);
    }
}
