//! Domain layer: tree model, invariants, layout and connector derivation
//!
//! Everything here is pure: functions take a node set and return a new one.
//! No I/O, no configuration loading, no mutable editor state.

pub mod edges;
pub mod error;
pub mod index;
pub mod layout;
pub mod node;
pub mod snapshot;
pub mod tree;
pub mod tree_traits;

pub use edges::{Connector, EdgeDeriver};
pub use error::{DomainError, DomainResult, Violation};
pub use index::ChildrenIndex;
pub use layout::{LayoutEngine, LayoutParams};
pub use node::{default_label, IdSequence, NodeCategory, NodeId, Position, TreeNode};
pub use snapshot::Snapshot;
pub use tree::validate;
pub use tree_traits::TreeNodeConvert;
