/*
Text rendering of a snapshot as a termtree::Tree.
Kept as a trait so the domain types stay free of presentation concerns.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::index::ChildrenIndex;
use crate::domain::node::NodeId;
use crate::domain::snapshot::Snapshot;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Snapshot {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let index = self.children_index();
        match index.root() {
            Some(root) => {
                let mut tree = Tree::new(self.describe(root, false));
                build_tree(self, &index, root, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

fn build_tree(
    snapshot: &Snapshot,
    index: &ChildrenIndex,
    node: NodeId,
    parent_tree: &mut Tree<String>,
) {
    for &child in index.children(node) {
        let highlighted = snapshot
            .connector(node, child)
            .map(|c| c.highlighted)
            .unwrap_or(false);
        let mut child_tree = Tree::new(snapshot.describe(child, highlighted));
        build_tree(snapshot, index, child, &mut child_tree);
        parent_tree.push(child_tree);
    }
}

impl Snapshot {
    /// One-line node description: `label [category] #id @(x, y)`, with a
    /// leading `*` when the incoming connector is highlighted.
    pub fn describe(&self, id: NodeId, highlighted: bool) -> String {
        match self.node(id) {
            Some(node) => format!(
                "{}{} [{}] #{} @{}",
                if highlighted { "* " } else { "" },
                node.label,
                node.category,
                node.id,
                node.position
            ),
            None => format!("<missing #{}>", id),
        }
    }
}
