//! Sparse Merkle tree keyed by slot index.
//!
//! This module provides:
//! - Native SMT operations (insert, update, delete, proof generation)
//! - Membership and empty-slot proofs
//! - JSON export and import

mod proof;
mod tree;

#[cfg(test)]
mod tests;

pub use proof::{verify_sparse_proof, SparseMerkleProof};
pub use tree::{SnapshotEntry, SparseMerkleTree, SparseTreeSnapshot, DEFAULT_DEPTH};
