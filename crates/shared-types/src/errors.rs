//! # Error Types
//!
//! Structural errors raised while building or validating shared value types.
//! These are programmer/data errors: callers propagate them and abort.

use thiserror::Error;

/// Errors raised by shared value-type validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A node-indexed collection does not hold exactly N entries.
    #[error("Size mismatch: expected {expected} entries, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Nested context identifiers or group disagree with the enclosing payload.
    #[error("Context mismatch: {reason}")]
    ContextMismatch { reason: String },

    /// Node identifier outside the fixed node set.
    #[error("Unknown node: {node_id} is not in 1..={node_count}")]
    UnknownNode { node_id: u8, node_count: usize },

    /// Two entries of a node-indexed collection come from the same node.
    #[error("Duplicate entry from node {node_id}")]
    DuplicateNode { node_id: u8 },

    /// Identifier is not UUID-shaped.
    #[error("Invalid identifier for {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },

    /// Value is not a member of the group.
    #[error("Value is not a member of the group")]
    NotGroupMember,

    /// A node response is internally inconsistent.
    #[error("Malformed share from node {node_id}: {reason}")]
    MalformedShare { node_id: u8, reason: &'static str },

    /// Allow-list entry does not have the commitment hash shape.
    #[error("Invalid allow list entry: {entry:?}")]
    InvalidAllowListEntry { entry: String },
}

/// Result alias for shared value-type operations.
pub type TypeResult<T> = Result<T, TypeError>;
