//! Tree invariant checks over a flat node set.

use std::collections::HashSet;

use itertools::Itertools;
use tracing::instrument;

use crate::domain::error::Violation;
use crate::domain::index::ChildrenIndex;
use crate::domain::node::{NodeId, TreeNode};

/// Checks the four tree invariants and reports the first violation found.
///
/// 1. exactly one root, every other parent exists
/// 2. no cycles
/// 3. unique ids
/// 4. every node reachable from the root
#[instrument(level = "trace", skip(nodes), fields(nodes = nodes.len()))]
pub fn validate(nodes: &[TreeNode]) -> Result<(), Violation> {
    if let Some(duplicate) = nodes.iter().map(|n| n.id).duplicates().next() {
        return Err(Violation::DuplicateId(duplicate));
    }
    let ids: HashSet<NodeId> = nodes.iter().map(|n| n.id).collect();

    let mut roots = nodes.iter().filter(|n| n.is_root()).map(|n| n.id);
    match (roots.next(), roots.next()) {
        (None, _) => return Err(Violation::NoRoot),
        (Some(first), Some(second)) => return Err(Violation::MultipleRoots(first, second)),
        (Some(_), None) => {}
    }

    for node in nodes {
        if let Some(parent) = node.parent {
            if !ids.contains(&parent) {
                return Err(Violation::DanglingParent {
                    node: node.id,
                    parent,
                });
            }
        }
    }

    let index = ChildrenIndex::build(nodes);
    let reachable: HashSet<NodeId> = index.iter_preorder().map(|(id, _)| id).collect();
    if let Some(unreached) = nodes.iter().find(|n| !reachable.contains(&n.id)) {
        return Err(classify_unreachable(nodes, unreached.id));
    }
    Ok(())
}

// With one root and no dangling parents, an unreachable node hangs off a cycle.
fn classify_unreachable(nodes: &[TreeNode], start: NodeId) -> Violation {
    let mut seen = HashSet::new();
    let mut current = start;
    while seen.insert(current) {
        match nodes
            .iter()
            .find(|n| n.id == current)
            .and_then(|n| n.parent)
        {
            Some(parent) => current = parent,
            None => return Violation::Orphan(start),
        }
    }
    Violation::Cycle(current)
}
