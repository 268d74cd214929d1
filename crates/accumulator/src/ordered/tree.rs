//! Ordered accumulator construction and layer storage.

use std::collections::BTreeSet;

use ark_ff::Zero;
use futures::future::join_all;
use tracing::debug;

use crate::error::{AccumulatorError, Result};
use crate::field::{node_to_hex, Node, MAX_NODE};
use crate::hash::NodeHasher;

/// Deepest supported tree (2^24 leaf slots).
///
/// Every layer is held in memory: about `2^(depth + 1)` nodes of 32 bytes,
/// so 1 GiB at this depth.
pub const MAX_DEPTH: usize = 24;

/// Sorted-set Merkle tree with sentinel leaves.
///
/// Created empty with [`OrderedMerkleTree::new`], populated exactly once with
/// [`initialize`](Self::initialize), [`initialize_and_sort`](Self::initialize_and_sort)
/// or [`load_from_serialized`](Self::load_from_serialized), and immutable
/// afterwards.
#[derive(Clone, Debug)]
pub struct OrderedMerkleTree<H> {
    /// Number of levels between the leaf layer and the root
    pub(super) depth: usize,

    pub(super) hasher: H,

    /// zeroes[i] is the root of an all-zero subtree sitting at layer i + 1
    pub(super) zeroes: Vec<Node>,

    /// layers[0] = padded leaves, layers[depth] = [root]. Empty until built.
    pub(super) layers: Vec<Vec<Node>>,

    /// Committed leaves in ascending order, sentinels included
    pub(super) leaves: Vec<Node>,
}

impl<H: NodeHasher> OrderedMerkleTree<H> {
    /// Create an uninitialized tree of the given depth.
    pub async fn new(depth: usize, hasher: H) -> Result<Self> {
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(AccumulatorError::InvalidDepth {
                depth,
                max: MAX_DEPTH,
            });
        }

        let zeroes = compute_zeroes(&hasher, depth).await;

        Ok(Self {
            depth,
            hasher,
            zeroes,
            layers: Vec::new(),
            leaves: Vec::new(),
        })
    }

    /// Create a tree and populate it from leaves in any order.
    pub async fn build(
        depth: usize,
        hasher: H,
        leaves: impl IntoIterator<Item = Node>,
    ) -> Result<Self> {
        let mut tree = Self::new(depth, hasher).await?;
        tree.initialize_and_sort(leaves).await?;
        Ok(tree)
    }

    /// Populate from leaves that are already strictly ascending.
    ///
    /// The sentinels are added here and must not be part of the input.
    pub async fn initialize(&mut self, sorted_unique_leaves: Vec<Node>) -> Result<()> {
        self.ensure_uninitialized()?;

        let capacity = self.capacity();
        if sorted_unique_leaves.len() + 2 > capacity {
            return Err(AccumulatorError::CapacityExceeded {
                leaves: sorted_unique_leaves.len(),
                capacity,
            });
        }

        let strictly_ascending = sorted_unique_leaves.windows(2).all(|w| w[0] < w[1]);
        let has_sentinel = sorted_unique_leaves
            .iter()
            .any(|leaf| leaf.is_zero() || *leaf == MAX_NODE);
        if !strictly_ascending || has_sentinel {
            return Err(AccumulatorError::UnsortedLeaves);
        }

        let mut leaves = Vec::with_capacity(sorted_unique_leaves.len() + 2);
        leaves.push(Node::zero());
        leaves.extend(sorted_unique_leaves);
        leaves.push(MAX_NODE);

        let layers = self.compute_layers(&leaves).await;

        debug!(
            depth = self.depth,
            leaves = leaves.len(),
            root = %node_to_hex(&layers[self.depth][0]),
            "built ordered merkle tree"
        );

        self.leaves = leaves;
        self.layers = layers;
        Ok(())
    }

    /// Populate from leaves in any order. Duplicates collapse and sentinel
    /// values are dropped, since both sentinels are committed regardless.
    pub async fn initialize_and_sort(&mut self, leaves: impl IntoIterator<Item = Node>) -> Result<()> {
        let sorted: Vec<Node> = leaves
            .into_iter()
            .filter(|leaf| !leaf.is_zero() && *leaf != MAX_NODE)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        self.initialize(sorted).await
    }

    /// Hash every layer from the padded leaf layer up to the root.
    ///
    /// Pairs within a level are independent and hashed concurrently; results
    /// keep their positions.
    pub(super) async fn compute_layers(&self, leaves: &[Node]) -> Vec<Vec<Node>> {
        let mut base = vec![Node::zero(); self.capacity()];
        base[..leaves.len()].copy_from_slice(leaves);

        let mut layers = Vec::with_capacity(self.depth + 1);
        layers.push(base);

        for level in 0..self.depth {
            let empty = self.empty_node(level);
            let parents = join_all(layers[level].chunks(2).map(|pair| {
                let right = pair.get(1).copied().unwrap_or(empty);
                self.hasher.hash(pair[0], right)
            }))
            .await;
            layers.push(parents);
        }

        layers
    }

    pub(super) fn ensure_uninitialized(&self) -> Result<()> {
        if self.is_built() {
            return Err(AccumulatorError::AlreadyInitialized);
        }
        Ok(())
    }
}

impl<H> OrderedMerkleTree<H> {
    /// Root of the tree, or the empty-tree root before initialization.
    pub fn root(&self) -> Node {
        match self.layers.get(self.depth) {
            Some(top) => top[0],
            None => self.zeroes[self.depth - 1],
        }
    }

    /// Get the tree depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf slots, `2^depth`.
    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }

    /// Committed leaves in ascending order, both sentinels included.
    pub fn leaves(&self) -> &[Node] {
        &self.leaves
    }

    /// All layers, leaf layer first. Empty before initialization.
    pub fn layers(&self) -> &[Vec<Node>] {
        &self.layers
    }

    /// Per-level empty subtree roots.
    pub fn zeroes(&self) -> &[Node] {
        &self.zeroes
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn is_built(&self) -> bool {
        !self.layers.is_empty()
    }

    pub fn contains(&self, value: &Node) -> bool {
        self.leaves.binary_search(value).is_ok()
    }

    /// Number of committed leaves, sentinels included.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Value of an absent node at `level`: raw zero in the leaf layer, an
    /// empty subtree root above it.
    pub(super) fn empty_node(&self, level: usize) -> Node {
        match level {
            0 => Node::zero(),
            _ => self.zeroes[level - 1],
        }
    }
}

/// Roots of all-zero subtrees: H(0, 0), H(H(0, 0), H(0, 0)), ...
pub(super) async fn compute_zeroes<H: NodeHasher>(hasher: &H, depth: usize) -> Vec<Node> {
    let mut zeroes = Vec::with_capacity(depth);
    let mut current = Node::zero();
    for _ in 0..depth {
        current = hasher.hash(current, current).await;
        zeroes.push(current);
    }
    zeroes
}
