//! SHA-256 node hasher.

use std::future::Future;

use ark_ff::{BigInteger, PrimeField};
use sha2::{Digest, Sha256};

use super::NodeHasher;
use crate::field::Node;

/// SHA-256 over the big-endian encodings of both inputs, reduced into the field.
///
/// Cheaper than Poseidon outside circuits; useful for off-chain snapshots and
/// as an independent hash in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    pub fn hash_two(&self, left: Node, right: Node) -> Node {
        let mut hasher = Sha256::new();
        hasher.update(left.into_bigint().to_bytes_be());
        hasher.update(right.into_bigint().to_bytes_be());
        Node::from_be_bytes_mod_order(&hasher.finalize())
    }
}

impl NodeHasher for Sha256Hasher {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        std::future::ready(self.hash_two(left, right))
    }
}
