//! Width-aware tidy layout.
//!
//! Two passes over the children index: subtree widths bottom-up, then
//! placement top-down. Rows have a fixed height per depth level; node heights
//! are never consulted.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::domain::index::ChildrenIndex;
use crate::domain::node::{NodeId, Position, TreeNode};

/// Geometry constants for the layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Width assumed for nodes without a measurement
    pub default_node_width: f64,
    /// Space between adjacent sibling subtrees
    pub horizontal_gap: f64,
    /// Distance between the tops of consecutive rows
    pub vertical_gap: f64,
    /// Horizontal center of the root
    pub origin_x: f64,
    /// Top of the root row
    pub origin_y: f64,
    /// Depth-indexed colors; deeper levels reuse the last entry
    pub palette: Vec<String>,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            default_node_width: 180.0,
            horizontal_gap: 40.0,
            vertical_gap: 120.0,
            origin_x: 0.0,
            origin_y: 0.0,
            palette: default_palette(),
        }
    }
}

pub fn default_palette() -> Vec<String> {
    ["#1e3a8a", "#2563eb", "#0891b2", "#059669", "#65a30d"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Pure layout function: node set in, positioned node set out.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    params: LayoutParams,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    center_x: f64,
    y: f64,
    depth: usize,
    visible: bool,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Returns a copy of `nodes` with depth, position, color and visibility
    /// recomputed. Input order is preserved.
    #[instrument(level = "debug", skip(self, nodes), fields(nodes = nodes.len()))]
    pub fn layout(&self, nodes: &[TreeNode]) -> Vec<TreeNode> {
        let index = ChildrenIndex::build(nodes);
        let widths = self.subtree_widths(nodes, &index);
        let placements = self.place(&index, &widths);

        nodes
            .iter()
            .map(|node| {
                let mut laid_out = node.clone();
                match placements.get(&node.id) {
                    Some(p) => {
                        let width = node.effective_width(self.params.default_node_width);
                        laid_out.depth = p.depth;
                        laid_out.position = Position::new(p.center_x - width / 2.0, p.y);
                        laid_out.color = self.color_for_depth(p.depth);
                        laid_out.visible = p.visible;
                    }
                    None => trace!(node = %node.id, "not reachable from root, left in place"),
                }
                laid_out.draggable = false;
                laid_out
            })
            .collect()
    }

    /// Horizontal space each node's subtree occupies.
    ///
    /// A leaf is as wide as itself. An inner node spans its children plus one
    /// gap between each pair, but never less than its own width.
    #[instrument(level = "trace", skip_all)]
    pub fn subtree_widths(
        &self,
        nodes: &[TreeNode],
        index: &ChildrenIndex,
    ) -> HashMap<NodeId, f64> {
        let own: HashMap<NodeId, f64> = nodes
            .iter()
            .map(|n| {
                if n.measured_width.is_none() {
                    trace!(node = %n.id, "no measurement, using default width");
                }
                (n.id, n.effective_width(self.params.default_node_width))
            })
            .collect();

        let mut widths = HashMap::with_capacity(nodes.len());
        for id in index.iter_postorder() {
            let own_width = own
                .get(&id)
                .copied()
                .unwrap_or(self.params.default_node_width);
            let children = index.children(id);
            let width = if children.is_empty() {
                own_width
            } else {
                let spanned: f64 = children.iter().map(|c| widths[c]).sum::<f64>()
                    + (children.len() - 1) as f64 * self.params.horizontal_gap;
                spanned.max(own_width)
            };
            widths.insert(id, width);
        }
        widths
    }

    fn place(
        &self,
        index: &ChildrenIndex,
        widths: &HashMap<NodeId, f64>,
    ) -> HashMap<NodeId, Placement> {
        let mut placements = HashMap::with_capacity(widths.len());
        let Some(root) = index.root() else {
            return placements;
        };
        placements.insert(
            root,
            Placement {
                center_x: self.params.origin_x,
                y: self.params.origin_y,
                depth: 0,
                visible: true,
            },
        );

        for (id, _) in index.iter_preorder() {
            let parent = placements[&id];
            let children = index.children(id);
            if children.is_empty() {
                continue;
            }
            let run: f64 = children.iter().map(|c| widths[c]).sum::<f64>()
                + (children.len() - 1) as f64 * self.params.horizontal_gap;
            let mut left = parent.center_x - run / 2.0;
            for child in children {
                let slot = widths[child];
                placements.insert(
                    *child,
                    Placement {
                        center_x: left + slot / 2.0,
                        y: parent.y + self.params.vertical_gap,
                        depth: parent.depth + 1,
                        visible: parent.visible,
                    },
                );
                left += slot + self.params.horizontal_gap;
            }
        }
        placements
    }

    /// Palette entry for `depth`, saturating at the last color.
    pub fn color_for_depth(&self, depth: usize) -> String {
        let palette = &self.params.palette;
        palette
            .get(depth.min(palette.len().saturating_sub(1)))
            .cloned()
            .unwrap_or_default()
    }
}
