//! Membership and non-membership proofs for the ordered accumulator.

use serde::{Deserialize, Serialize};

use super::tree::OrderedMerkleTree;
use crate::error::{AccumulatorError, Result};
use crate::field::{hex_node, hex_nodes, node_to_hex, Node};
use crate::hash::NodeHasher;

/// Merkle path from a committed leaf to the root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    #[serde(with = "hex_node")]
    pub root: Node,

    #[serde(with = "hex_node")]
    pub leaf: Node,

    /// Position in the leaf layer. Bit `i` tells whether the path node at
    /// level `i` is a right child.
    pub leaf_index: u64,

    /// Sibling hashes from the leaf layer (0) up to layer depth - 1
    #[serde(with = "hex_nodes")]
    pub siblings: Vec<Node>,
}

impl MembershipProof {
    /// Proof depth (number of levels).
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Recompute the root from the leaf and siblings.
    ///
    /// Returns `None` when `leaf_index` does not fit in the path.
    pub async fn compute_root<H: NodeHasher>(&self, hasher: &H) -> Option<Node> {
        let depth = self.siblings.len();
        if depth < u64::BITS as usize && self.leaf_index >> depth != 0 {
            return None;
        }

        let mut current = self.leaf;
        for (level, sibling) in self.siblings.iter().enumerate() {
            let is_right = (self.leaf_index >> level) & 1 == 1;
            current = if is_right {
                hasher.hash(*sibling, current).await
            } else {
                hasher.hash(current, *sibling).await
            };
        }

        Some(current)
    }
}

/// Proof that `target` is absent: membership proofs for the nearest committed
/// leaf on each side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonMembershipProof {
    #[serde(with = "hex_node")]
    pub root: Node,

    #[serde(with = "hex_node")]
    pub target: Node,

    /// Greatest committed leaf below `target`
    #[serde(default)]
    pub left: Option<MembershipProof>,

    /// Least committed leaf above `target`
    #[serde(default)]
    pub right: Option<MembershipProof>,
}

impl<H> OrderedMerkleTree<H> {
    /// Generate a membership proof for a committed leaf.
    pub fn create_membership_proof(&self, leaf: Node) -> Result<MembershipProof> {
        let index = self
            .leaves
            .binary_search(&leaf)
            .map_err(|_| AccumulatorError::LeafNotFound(node_to_hex(&leaf)))?;
        Ok(self.membership_proof_at(index))
    }

    /// Generate a non-membership proof for a value that is not committed.
    pub fn create_non_membership_proof(&self, target: Node) -> Result<NonMembershipProof> {
        if !self.is_built() {
            return Err(AccumulatorError::NotInitialized);
        }

        let insert_at = match self.leaves.binary_search(&target) {
            Ok(_) => return Err(AccumulatorError::LeafExists(node_to_hex(&target))),
            Err(position) => position,
        };

        let left = insert_at
            .checked_sub(1)
            .map(|index| self.membership_proof_at(index));
        let right = (insert_at < self.leaves.len()).then(|| self.membership_proof_at(insert_at));

        Ok(NonMembershipProof {
            root: self.root(),
            target,
            left,
            right,
        })
    }

    /// Collect the sibling path for the leaf at sorted position `index`.
    ///
    /// The leaf layer is filled positionally, so the sorted position is also
    /// the layer-0 index.
    fn membership_proof_at(&self, index: usize) -> MembershipProof {
        let mut siblings = Vec::with_capacity(self.depth);
        let mut current_index = index;

        for level in 0..self.depth {
            let sibling = self.layers[level]
                .get(current_index ^ 1)
                .copied()
                .unwrap_or_else(|| self.empty_node(level));
            siblings.push(sibling);
            current_index >>= 1;
        }

        MembershipProof {
            root: self.root(),
            leaf: self.leaves[index],
            leaf_index: index as u64,
            siblings,
        }
    }
}

/// Check a membership proof against its own root.
pub async fn verify_membership_proof<H: NodeHasher>(proof: &MembershipProof, hasher: &H) -> bool {
    match proof.compute_root(hasher).await {
        Some(root) => root == proof.root,
        None => false,
    }
}

/// Check a non-membership proof.
///
/// Both neighbors must be present, verify under `proof.root`, sit strictly on
/// either side of the target and be adjacent leaves. The sentinels give every
/// absent value two neighbors, so a one-sided proof is never honest.
pub async fn verify_non_membership_proof<H: NodeHasher>(
    proof: &NonMembershipProof,
    hasher: &H,
) -> bool {
    let (Some(left), Some(right)) = (&proof.left, &proof.right) else {
        return false;
    };

    if left.root != proof.root || right.root != proof.root {
        return false;
    }
    if left.leaf >= proof.target || proof.target >= right.leaf {
        return false;
    }
    if left.leaf_index.checked_add(1) != Some(right.leaf_index) {
        return false;
    }

    verify_membership_proof(left, hasher).await && verify_membership_proof(right, hasher).await
}
