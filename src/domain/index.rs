//! Children index and the traversal primitives shared by delete, relink and
//! connector highlighting.

use std::collections::HashMap;

use tracing::instrument;

use crate::domain::node::{NodeId, TreeNode};

/// Parent → ordered children mapping over a node set.
///
/// Child order is the order nodes appear in the input slice; nothing is
/// sorted.
#[derive(Debug, Clone, Default)]
pub struct ChildrenIndex {
    root: Option<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, NodeId>,
}

impl ChildrenIndex {
    #[instrument(level = "trace", skip(nodes), fields(nodes = nodes.len()))]
    pub fn build(nodes: &[TreeNode]) -> Self {
        let mut index = Self::default();
        for node in nodes {
            match node.parent {
                Some(parent) => {
                    index.children.entry(parent).or_default().push(node.id);
                    index.parents.insert(node.id, parent);
                }
                None => {
                    if index.root.is_none() {
                        index.root = Some(node.id);
                    }
                }
            }
        }
        index
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// All transitive descendants of `id` in pre-order, excluding `id`.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            // Push children in reverse order for left-to-right traversal
            stack.extend(self.children(current).iter().rev());
        }
        result
    }

    /// True when `ancestor` lies strictly above `node` on its path to the root.
    ///
    /// Walks parent links upward; the walk is bounded by the number of linked
    /// nodes so a malformed set cannot loop forever.
    #[instrument(level = "trace", skip(self))]
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        for _ in 0..=self.parents.len() {
            match self.parent(current) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// Pre-order walk from the root, children left to right.
    pub fn iter_preorder(&self) -> PreOrderIter<'_> {
        PreOrderIter {
            index: self,
            stack: self.root.into_iter().map(|id| (id, 0)).collect(),
        }
    }

    /// Post-order walk from the root: every child before its parent.
    pub fn iter_postorder(&self) -> PostOrderIter<'_> {
        PostOrderIter {
            index: self,
            stack: self.root.into_iter().map(|id| (id, false)).collect(),
        }
    }
}

/// Yields `(id, depth)` in pre-order.
pub struct PreOrderIter<'a> {
    index: &'a ChildrenIndex,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for PreOrderIter<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (current, depth) = self.stack.pop()?;
        for &child in self.index.children(current).iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((current, depth))
    }
}

pub struct PostOrderIter<'a> {
    index: &'a ChildrenIndex,
    stack: Vec<(NodeId, bool)>,
}

impl Iterator for PostOrderIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            self.stack.push((current, true));
            for &child in self.index.children(current).iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
