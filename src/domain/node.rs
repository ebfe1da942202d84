//! Node entities: identifiers, categories and the laid-out tree node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque node identifier, allocated monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Identifier of the root created with every new tree.
    pub const ROOT: NodeId = NodeId(1);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        NodeId(value)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(NodeId)
    }
}

/// Process-scoped id allocator.
///
/// Owned by the editor controller and advanced on every add-child. Deleting a
/// node never rewinds it.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSequence {
    /// Sequence positioned after the root id.
    pub fn new() -> Self {
        Self {
            next: NodeId::ROOT.0 + 1,
        }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Id the next call to [`IdSequence::next_id`] will return.
    pub fn peek(&self) -> NodeId {
        NodeId(self.next)
    }
}

/// Display-only node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeCategory {
    System,
    Subsystem,
    #[default]
    Component,
    Part,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 4] = [
        NodeCategory::System,
        NodeCategory::Subsystem,
        NodeCategory::Component,
        NodeCategory::Part,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::System => "System",
            NodeCategory::Subsystem => "Subsystem",
            NodeCategory::Component => "Component",
            NodeCategory::Part => "Part",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`NodeCategory`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for NodeCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Top-left corner of a node box in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// A node of the diagram tree.
///
/// `parent`, `label`, `category` and `measured_width` are authoritative.
/// `depth`, `position`, `color` and `visible` are derived by the layout pass
/// and overwritten on every structural change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub label: String,
    pub category: NodeCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_width: Option<f64>,
    pub depth: usize,
    pub position: Position,
    pub color: String,
    pub visible: bool,
    /// Always false: position belongs to the layout, not the user.
    pub draggable: bool,
}

impl TreeNode {
    /// A fresh node with the generated placeholder label.
    pub fn new(id: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            id,
            parent,
            label: default_label(id),
            category: NodeCategory::default(),
            measured_width: None,
            depth: 0,
            position: Position::default(),
            color: String::new(),
            visible: true,
            draggable: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_category(mut self, category: NodeCategory) -> Self {
        self.category = category;
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Width used by layout: the measurement when known, else `default_width`.
    pub fn effective_width(&self, default_width: f64) -> f64 {
        self.measured_width.unwrap_or(default_width)
    }

    /// Horizontal center of the node box.
    pub fn center_x(&self, default_width: f64) -> f64 {
        self.position.x + self.effective_width(default_width) / 2.0
    }
}

/// Placeholder label for a node created without one.
pub fn default_label(id: NodeId) -> String {
    format!("Component #{}", id)
}
