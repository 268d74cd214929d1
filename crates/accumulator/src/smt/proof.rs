//! Merkle proof structure for sparse tree slots.

use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use crate::field::{hex_nodes, Node};
use crate::hash::NodeHasher;

/// A Merkle proof for one slot of a sparse tree.
///
/// With `value: None` the proof shows the slot is empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMerkleProof {
    pub key: u64,

    #[serde(default, with = "opt_hex_node")]
    pub value: Option<Node>,

    /// Sibling hashes from leaf level (0) to root level (depth-1)
    #[serde(with = "hex_nodes")]
    pub siblings: Vec<Node>,
}

impl SparseMerkleProof {
    /// Get the proof depth (number of levels).
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Whether this proof shows the slot is occupied.
    pub fn is_membership(&self) -> bool {
        self.value.is_some()
    }

    /// Compute the root hash from this proof. The key's bits choose the side
    /// at each level.
    pub async fn compute_root<H: NodeHasher>(&self, hasher: &H) -> Node {
        let mut current = match self.value {
            Some(value) => hasher.hash(Node::from(self.key), value).await,
            None => Node::zero(),
        };

        for (level, sibling) in self.siblings.iter().enumerate() {
            let is_right = (self.key >> level) & 1 == 1;
            current = if is_right {
                hasher.hash(*sibling, current).await
            } else {
                hasher.hash(current, *sibling).await
            };
        }

        current
    }
}

/// Verify a sparse proof against a known root.
pub async fn verify_sparse_proof<H: NodeHasher>(
    proof: &SparseMerkleProof,
    root: Node,
    hasher: &H,
) -> bool {
    let depth = proof.siblings.len();
    if depth < u64::BITS as usize && proof.key >> depth != 0 {
        return false;
    }
    if proof.value.is_some_and(|value| value.is_zero()) {
        return false;
    }
    proof.compute_root(hasher).await == root
}

mod opt_hex_node {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::field::{node_from_hex, node_to_hex, Node};

    pub fn serialize<S: Serializer>(value: &Option<Node>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(node) => serializer.serialize_some(&node_to_hex(node)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Node>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| node_from_hex(&encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod proof_tests {
    use super::*;
    use crate::hash::Sha256Hasher;

    #[tokio::test]
    async fn test_compute_root_deterministic() {
        let proof = SparseMerkleProof {
            key: 1,
            value: Some(Node::from(100u64)),
            siblings: vec![Node::from(1u64), Node::from(2u64)],
        };

        let root1 = proof.compute_root(&Sha256Hasher).await;
        let root2 = proof.compute_root(&Sha256Hasher).await;
        assert_eq!(root1, root2);
    }

    #[tokio::test]
    async fn test_different_values_different_roots() {
        let mut proof = SparseMerkleProof {
            key: 1,
            value: Some(Node::from(100u64)),
            siblings: vec![Node::from(1u64), Node::from(2u64)],
        };
        let root1 = proof.compute_root(&Sha256Hasher).await;

        proof.value = Some(Node::from(101u64));
        assert_ne!(root1, proof.compute_root(&Sha256Hasher).await);

        proof.value = None;
        assert_ne!(root1, proof.compute_root(&Sha256Hasher).await);
    }

    #[test]
    fn test_empty_slot_json() {
        let proof = SparseMerkleProof {
            key: 3,
            value: None,
            siblings: vec![Node::from(9u64)],
        };
        let json = serde_json::to_string(&proof).unwrap();
        let decoded: SparseMerkleProof = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, proof);
        assert!(!decoded.is_membership());
    }
}
