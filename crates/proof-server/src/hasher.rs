//! Runtime choice between the built-in node hashers.

use std::future::Future;

use futures::future::Either;
use ordered_accumulator::{Node, NodeHasher, PoseidonHasher, Sha256Hasher};

use crate::config::HasherKind;

#[derive(Clone, Debug)]
pub enum ServerHasher {
    Poseidon(PoseidonHasher),
    Sha256(Sha256Hasher),
}

impl From<HasherKind> for ServerHasher {
    fn from(kind: HasherKind) -> Self {
        match kind {
            HasherKind::Poseidon => Self::Poseidon(PoseidonHasher::new()),
            HasherKind::Sha256 => Self::Sha256(Sha256Hasher),
        }
    }
}

impl NodeHasher for ServerHasher {
    fn hash(&self, left: Node, right: Node) -> impl Future<Output = Node> + Send {
        match self {
            Self::Poseidon(hasher) => Either::Left(hasher.hash(left, right)),
            Self::Sha256(hasher) => Either::Right(hasher.hash(left, right)),
        }
    }
}
