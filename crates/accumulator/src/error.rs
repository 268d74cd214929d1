//! Error types for accumulator construction, proving and snapshot restore.

use thiserror::Error;

/// Errors raised by the ordered accumulator and the sparse tree.
///
/// Verification never produces one of these: a proof that does not verify is
/// reported as `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("Invalid tree depth {depth}: must be between 1 and {max}")]
    InvalidDepth { depth: usize, max: usize },
    #[error("Tree capacity exceeded: {leaves} leaves plus 2 sentinels do not fit in {capacity} slots")]
    CapacityExceeded { leaves: usize, capacity: usize },
    #[error("Leaf not found: {0}")]
    LeafNotFound(String),
    #[error("Leaf {0} is in the tree, use a membership proof instead")]
    LeafExists(String),
    #[error("Malformed serialized tree: {0}")]
    MalformedSnapshot(String),
    #[error("Invalid node encoding: {0}")]
    InvalidNode(String),
    #[error("Leaves must be strictly ascending and must not contain sentinel values")]
    UnsortedLeaves,
    #[error("Tree is already initialized")]
    AlreadyInitialized,
    #[error("Tree is not initialized")]
    NotInitialized,
    #[error("Key {key} exceeds tree capacity {capacity}")]
    KeyOutOfRange { key: u64, capacity: u64 },
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for AccumulatorError {
    fn from(err: serde_json::Error) -> Self {
        AccumulatorError::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AccumulatorError>;
