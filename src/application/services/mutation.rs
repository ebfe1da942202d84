//! Structural and display mutations on tree snapshots
//!
//! Every operation checks all of its preconditions against the input snapshot
//! before touching anything, then builds the successor snapshot from a copy of
//! the node set. A rejected command leaves the caller's snapshot as it was.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    DomainError, EdgeDeriver, IdSequence, LayoutEngine, NodeCategory, NodeId, Snapshot, TreeNode,
    Violation,
};

/// Applies mutations and re-derives layout and connectors.
#[derive(Debug, Clone, Default)]
pub struct MutationService {
    layout: LayoutEngine,
    edges: EdgeDeriver,
}

impl MutationService {
    pub fn new(layout: LayoutEngine, edges: EdgeDeriver) -> Self {
        Self { layout, edges }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            LayoutEngine::new(settings.layout_params()),
            EdgeDeriver::new(settings.highlight_anchor.map(NodeId)),
        )
    }

    /// Lays out a tree consisting of `root` alone.
    pub fn initial(&self, root: TreeNode) -> Snapshot {
        debug_assert!(root.is_root());
        self.relayout(vec![root])
    }

    /// Re-runs layout and connector derivation over a whole node set.
    #[instrument(level = "trace", skip_all, fields(nodes = nodes.len()))]
    pub fn relayout(&self, nodes: Vec<TreeNode>) -> Snapshot {
        let nodes = self.layout.layout(&nodes);
        let connectors = self.edges.derive(&nodes);
        Snapshot::new(nodes, connectors)
    }

    /// Creates a node under `parent` with the next id from `ids`.
    #[instrument(level = "debug", skip(self, snapshot, ids))]
    pub fn add_child(
        &self,
        snapshot: &Snapshot,
        ids: &mut IdSequence,
        parent: NodeId,
        label: Option<&str>,
    ) -> ApplicationResult<Snapshot> {
        snapshot.require(parent)?;

        let id = ids.next_id();
        let mut child = TreeNode::new(id, Some(parent));
        if let Some(label) = label {
            child.label = label.to_string();
        }
        debug!("add_child: created {} under {}", id, parent);

        let mut nodes = snapshot.nodes().to_vec();
        nodes.push(child);
        Ok(self.relayout(nodes))
    }

    /// Removes `node` and every node below it in one step.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn delete_subtree(&self, snapshot: &Snapshot, node: NodeId) -> ApplicationResult<Snapshot> {
        if snapshot.require(node)?.is_root() {
            return Err(DomainError::from(Violation::RootNotDeletable).into());
        }

        let index = snapshot.children_index();
        let doomed: HashSet<NodeId> = std::iter::once(node)
            .chain(index.descendants_of(node))
            .collect();
        debug!("delete_subtree: removing {} node(s) rooted at {}", doomed.len(), node);

        let nodes = snapshot
            .nodes()
            .iter()
            .filter(|n| !doomed.contains(&n.id))
            .cloned()
            .collect();
        Ok(self.relayout(nodes))
    }

    /// Checks whether `node` may be moved under `new_parent`.
    ///
    /// Failures are reported in a fixed order: unknown node, root, unknown
    /// parent, unchanged parent, cycle.
    pub fn check_relink(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        new_parent: NodeId,
    ) -> Result<(), DomainError> {
        let current_parent = snapshot
            .require(node)?
            .parent
            .ok_or(Violation::RootNotRelinkable)?;
        snapshot.require(new_parent)?;

        if current_parent == new_parent {
            return Err(Violation::AlreadyChildOf {
                node,
                parent: new_parent,
            }
            .into());
        }
        if new_parent == node || snapshot.children_index().is_ancestor_of(node, new_parent) {
            return Err(Violation::WouldCreateCycle { node, new_parent }.into());
        }
        Ok(())
    }

    /// Re-parents `node` under `new_parent` and re-lays the whole tree.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn relink(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        new_parent: NodeId,
    ) -> ApplicationResult<Snapshot> {
        self.check_relink(snapshot, node, new_parent)?;
        Ok(self.apply_relink(snapshot, node, new_parent))
    }

    /// Relink without precondition checks; callers run
    /// [`MutationService::check_relink`] first.
    pub(crate) fn apply_relink(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        new_parent: NodeId,
    ) -> Snapshot {
        debug!("relink: {} -> {}", node, new_parent);
        let nodes = with_node_edited(snapshot, node, |n| n.parent = Some(new_parent));
        self.relayout(nodes)
    }

    /// Changes the display label. Geometry is untouched.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn rename(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        label: &str,
    ) -> ApplicationResult<Snapshot> {
        self.update_display(snapshot, node, |n| n.label = label.to_string())
    }

    /// Changes the display category. Geometry is untouched.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn retype(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        category: NodeCategory,
    ) -> ApplicationResult<Snapshot> {
        self.update_display(snapshot, node, |n| n.category = category)
    }

    fn update_display(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        edit: impl FnOnce(&mut TreeNode),
    ) -> ApplicationResult<Snapshot> {
        snapshot.require(node)?;
        let nodes = with_node_edited(snapshot, node, edit);
        Ok(Snapshot::new(nodes, snapshot.connectors().to_vec()))
    }

    /// Records a render width reported by the rendering surface and re-lays
    /// the tree with it.
    #[instrument(level = "debug", skip(self, snapshot))]
    pub fn set_measured_width(
        &self,
        snapshot: &Snapshot,
        node: NodeId,
        width: f64,
    ) -> ApplicationResult<Snapshot> {
        let current = snapshot.require(node)?;
        if !width.is_finite() || width <= 0.0 {
            return Err(DomainError::InvalidMeasurement { node, width }.into());
        }
        if current.measured_width == Some(width) {
            return Ok(snapshot.clone());
        }
        debug!("set_measured_width: {} = {}", node, width);

        let nodes = with_node_edited(snapshot, node, |n| n.measured_width = Some(width));
        Ok(self.relayout(nodes))
    }
}

// Copy of the node set with one node changed in place.
fn with_node_edited(
    snapshot: &Snapshot,
    node: NodeId,
    edit: impl FnOnce(&mut TreeNode),
) -> Vec<TreeNode> {
    let mut nodes = snapshot.nodes().to_vec();
    if let Some(target) = nodes.iter_mut().find(|n| n.id == node) {
        edit(target);
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (MutationService, Snapshot, IdSequence) {
        let service = MutationService::default();
        let mut ids = IdSequence::new();
        let snapshot = service.initial(TreeNode::new(NodeId::ROOT, None));
        let snapshot = service.add_child(&snapshot, &mut ids, NodeId(1), None).unwrap();
        let snapshot = service.add_child(&snapshot, &mut ids, NodeId(2), None).unwrap();
        (service, snapshot, ids)
    }

    #[test]
    fn test_check_relink_reports_failures_in_order() {
        let (service, snapshot, _) = chain();
        assert_eq!(
            service.check_relink(&snapshot, NodeId(9), NodeId(1)),
            Err(DomainError::InvalidReference(NodeId(9)))
        );
        assert_eq!(
            service.check_relink(&snapshot, NodeId(1), NodeId(9)),
            Err(DomainError::from(Violation::RootNotRelinkable))
        );
        assert_eq!(
            service.check_relink(&snapshot, NodeId(3), NodeId(9)),
            Err(DomainError::InvalidReference(NodeId(9)))
        );
        assert_eq!(
            service.check_relink(&snapshot, NodeId(3), NodeId(2)),
            Err(DomainError::from(Violation::AlreadyChildOf {
                node: NodeId(3),
                parent: NodeId(2)
            }))
        );
        assert_eq!(
            service.check_relink(&snapshot, NodeId(2), NodeId(3)),
            Err(DomainError::from(Violation::WouldCreateCycle {
                node: NodeId(2),
                new_parent: NodeId(3)
            }))
        );
        assert_eq!(service.check_relink(&snapshot, NodeId(3), NodeId(1)), Ok(()));
    }

    #[test]
    fn test_rejected_add_does_not_consume_an_id() {
        let (service, snapshot, mut ids) = chain();
        let next = ids.peek();
        assert!(service.add_child(&snapshot, &mut ids, NodeId(99), None).is_err());
        assert_eq!(ids.peek(), next);
    }

    #[test]
    fn test_same_measurement_returns_identical_snapshot() {
        let (service, snapshot, _) = chain();
        let measured = service.set_measured_width(&snapshot, NodeId(2), 120.0).unwrap();
        let again = service.set_measured_width(&measured, NodeId(2), 120.0).unwrap();
        assert_eq!(measured, again);
    }
}
