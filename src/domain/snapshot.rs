//! Immutable laid-out tree handed to the rendering surface.

use serde::Serialize;

use crate::domain::edges::Connector;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::index::ChildrenIndex;
use crate::domain::node::{NodeId, TreeNode};
use crate::domain::tree::validate;

/// Complete node + connector state produced after a mutation.
///
/// Snapshots are never patched; every command builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    nodes: Vec<TreeNode>,
    connectors: Vec<Connector>,
}

impl Snapshot {
    pub fn new(nodes: Vec<TreeNode>, connectors: Vec<Connector>) -> Self {
        Self { nodes, connectors }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up a node, mapping absence to [`DomainError::InvalidReference`].
    pub fn require(&self, id: NodeId) -> DomainResult<&TreeNode> {
        self.node(id).ok_or(DomainError::InvalidReference(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.is_root())
    }

    pub fn connector(&self, source: NodeId, target: NodeId) -> Option<&Connector> {
        self.connectors
            .iter()
            .find(|c| c.source == source && c.target == target)
    }

    pub fn children_index(&self) -> ChildrenIndex {
        ChildrenIndex::build(&self.nodes)
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate(&self.nodes).map_err(DomainError::from)
    }

    /// True once every node carries a measured width.
    ///
    /// Until then positions are computed from the default width and will shift
    /// when the missing measurements arrive.
    pub fn layout_is_final(&self) -> bool {
        self.nodes.iter().all(|n| n.measured_width.is_some())
    }
}
