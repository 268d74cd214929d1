//! Export of non-membership proofs as circuit witness inputs.
//!
//! Every value is a BN254 field element written as `0x` plus 64 hex digits,
//! the form circom-style input files expect.

use ordered_accumulator::{node_to_prefixed_hex, MembershipProof, Node, NonMembershipProof};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SanctionsError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInputs {
    pub root: String,
    pub target: String,
    pub left_leaf: String,
    pub left_index: String,
    pub left_siblings: Vec<String>,
    pub right_leaf: String,
    pub right_index: String,
    pub right_siblings: Vec<String>,
}

impl CircuitInputs {
    /// Flatten a two-sided proof. The circuit checks both neighbors, so a
    /// proof missing either side is rejected.
    pub fn from_proof(proof: &NonMembershipProof) -> Result<Self> {
        let left = proof
            .left
            .as_ref()
            .ok_or(SanctionsError::IncompleteProof("left"))?;
        let right = proof
            .right
            .as_ref()
            .ok_or(SanctionsError::IncompleteProof("right"))?;

        Ok(Self {
            root: node_to_prefixed_hex(&proof.root),
            target: node_to_prefixed_hex(&proof.target),
            left_leaf: node_to_prefixed_hex(&left.leaf),
            left_index: node_to_prefixed_hex(&Node::from(left.leaf_index)),
            left_siblings: siblings(left),
            right_leaf: node_to_prefixed_hex(&right.leaf),
            right_index: node_to_prefixed_hex(&Node::from(right.leaf_index)),
            right_siblings: siblings(right),
        })
    }
}

fn siblings(proof: &MembershipProof) -> Vec<String> {
    proof.siblings.iter().map(node_to_prefixed_hex).collect()
}
