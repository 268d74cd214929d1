//! Ordered Merkle accumulator over the BN254 scalar field.
//!
//! This crate provides:
//! - `OrderedMerkleTree`: a sorted-set Merkle tree with sentinel leaves that
//!   proves membership and non-membership against a single root
//! - `SparseMerkleTree`: a keyed sparse tree with updates and deletes
//! - Pluggable asynchronous node hashers (Poseidon, SHA-256, closures)
//! - Layer-wise JSON snapshots that restore without rehashing

pub mod error;
pub mod field;
pub mod hash;
pub mod ordered;
pub mod smt;

pub use error::{AccumulatorError, Result};
pub use field::{node_from_hex, node_to_hex, node_to_prefixed_hex, Node, MAX_NODE};
pub use hash::{FnHasher, NodeHasher, PoseidonHasher, Sha256Hasher};
pub use ordered::{
    verify_membership_proof, verify_non_membership_proof, MembershipProof, NonMembershipProof,
    OrderedMerkleTree, SerializedLayers, MAX_DEPTH,
};
pub use smt::{verify_sparse_proof, SparseMerkleProof, SparseMerkleTree, SparseTreeSnapshot};
