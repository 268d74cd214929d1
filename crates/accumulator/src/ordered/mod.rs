//! Ordered Merkle accumulator.
//!
//! A fixed-depth Merkle tree over a sorted, de-duplicated set of field
//! elements. Two sentinel leaves, `0` and `MODULUS - 1`, are always present so
//! that every other value has a committed left and right neighbor. That makes
//! non-membership provable: a value is absent when two adjacent committed
//! leaves bracket it.
//!
//! This module provides:
//! - Tree construction from sorted or unsorted leaves
//! - Membership and non-membership proofs with stateless verification
//! - Layer-wise JSON snapshots that restore without rehashing

mod proof;
mod serialize;
mod tree;


pub use proof::{
    verify_membership_proof, verify_non_membership_proof, MembershipProof, NonMembershipProof,
};
pub use serialize::SerializedLayers;
pub use tree::{OrderedMerkleTree, MAX_DEPTH};
