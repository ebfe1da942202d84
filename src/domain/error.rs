//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent rejected commands and broken tree invariants.
/// The tree is never modified when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("unknown node: {0}")]
    InvalidReference(NodeId),

    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),

    #[error("invalid measured width for node {node}: {width}")]
    InvalidMeasurement { node: NodeId, width: f64 },
}

/// Ways a command or a node set can break the tree invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("the root cannot be deleted")]
    RootNotDeletable,

    #[error("the root cannot be relinked")]
    RootNotRelinkable,

    #[error("node {node} is already a child of {parent}")]
    AlreadyChildOf { node: NodeId, parent: NodeId },

    #[error("relinking {node} under {new_parent} would create a cycle")]
    WouldCreateCycle { node: NodeId, new_parent: NodeId },

    #[error("tree has no root")]
    NoRoot,

    #[error("tree has more than one root: {0} and {1}")]
    MultipleRoots(NodeId, NodeId),

    #[error("node {node} references missing parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("cycle through node {0}")]
    Cycle(NodeId),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("node {0} is not reachable from the root")]
    Orphan(NodeId),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
