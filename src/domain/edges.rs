//! Parent → child connectors derived from a laid-out node set.

use std::collections::HashSet;

use serde::Serialize;
use tracing::instrument;

use crate::domain::index::ChildrenIndex;
use crate::domain::node::{NodeId, TreeNode};

/// Visual edge from a parent to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connector {
    /// `e-<source>-<target>`
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    /// Mirrors the target node's visibility
    pub visible: bool,
    /// Target is the anchor or lies below it
    pub highlighted: bool,
}

impl Connector {
    pub fn id_for(source: NodeId, target: NodeId) -> String {
        format!("e-{}-{}", source, target)
    }
}

/// Derives one connector per non-root node.
#[derive(Debug, Clone, Default)]
pub struct EdgeDeriver {
    anchor: Option<NodeId>,
}

impl EdgeDeriver {
    /// `anchor` marks the subtree whose incoming connectors are emphasized.
    pub fn new(anchor: Option<NodeId>) -> Self {
        Self { anchor }
    }

    #[instrument(level = "debug", skip(self, nodes), fields(nodes = nodes.len()))]
    pub fn derive(&self, nodes: &[TreeNode]) -> Vec<Connector> {
        let highlighted = self.highlighted_targets(nodes);
        nodes
            .iter()
            .filter_map(|node| {
                let source = node.parent?;
                Some(Connector {
                    id: Connector::id_for(source, node.id),
                    source,
                    target: node.id,
                    visible: node.visible,
                    highlighted: highlighted.contains(&node.id),
                })
            })
            .collect()
    }

    fn highlighted_targets(&self, nodes: &[TreeNode]) -> HashSet<NodeId> {
        let Some(anchor) = self.anchor.filter(|a| nodes.iter().any(|n| n.id == *a)) else {
            return HashSet::new();
        };
        let index = ChildrenIndex::build(nodes);
        std::iter::once(anchor)
            .chain(index.descendants_of(anchor))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, parent: Option<u64>) -> TreeNode {
        TreeNode::new(NodeId(id), parent.map(NodeId))
    }

    #[test]
    fn test_one_connector_per_non_root_node() {
        let nodes = vec![node(1, None), node(2, Some(1)), node(3, Some(2))];
        let connectors = EdgeDeriver::default().derive(&nodes);
        let ids: Vec<&str> = connectors.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["e-1-2", "e-2-3"]);
        assert!(connectors.iter().all(|c| c.visible && !c.highlighted));
    }

    #[test]
    fn test_missing_anchor_highlights_nothing() {
        let nodes = vec![node(1, None), node(2, Some(1))];
        let connectors = EdgeDeriver::new(Some(NodeId(42))).derive(&nodes);
        assert!(connectors.iter().all(|c| !c.highlighted));
    }

    #[test]
    fn test_visibility_mirrors_target() {
        let mut nodes = vec![node(1, None), node(2, Some(1))];
        nodes[1].visible = false;
        let connectors = EdgeDeriver::default().derive(&nodes);
        assert!(!connectors[0].visible);
    }
}
