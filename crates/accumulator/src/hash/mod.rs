//! Pluggable two-to-one hash functions for tree nodes.
//!
//! Hashing is asynchronous by contract so that heavy or out-of-process
//! implementations can be plugged in without blocking the caller. Every call
//! to [`NodeHasher::hash`] is a suspension point.
//!
//! Provided implementations:
//! - [`PoseidonHasher`]: Poseidon sponge over BN254 (the default)
//! - [`Sha256Hasher`]: SHA-256 reduced into the field
//! - [`FnHasher`]: adapter for any closure returning a future

mod poseidon;
mod sha256;

use std::future::Future;
use std::sync::Arc;

use crate::field::Node;

pub use poseidon::{poseidon_config, PoseidonHasher};
pub use sha256::Sha256Hasher;

/// An arity-2 hash `Node x Node -> Node`.
pub trait NodeHasher: Send + Sync {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send;
}

impl<H: NodeHasher> NodeHasher for Arc<H> {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        self.as_ref().hash(left, right)
    }
}

impl<H: NodeHasher> NodeHasher for &H {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        (**self).hash(left, right)
    }
}

/// Wraps a closure `Fn(Node, Node) -> impl Future<Output = Node>` as a hasher.
///
/// ```ignore
/// let hasher = FnHasher(|l, r| async move { remote_hash(l, r).await });
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FnHasher<F>(pub F);

impl<F, Fut> NodeHasher for FnHasher<F>
where
    F: Fn(Node, Node) -> Fut + Send + Sync,
    Fut: Future<Output = Node> + Send,
{
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        (self.0)(left, right)
    }
}
