//! Sparse Merkle Tree native implementation.
//!
//! Keys are slot indices (0 to 2^depth - 1) and values are field elements.
//! Only occupied leaves and their ancestors are stored; every other node
//! takes the precomputed default for its level.

use std::collections::{BTreeMap, HashMap};

use ark_ff::Zero;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::proof::SparseMerkleProof;
use crate::error::{AccumulatorError, Result};
use crate::field::{hex_node, Node};
use crate::hash::NodeHasher;

/// Default tree depth (12 levels = 4,096 slots)
pub const DEFAULT_DEPTH: usize = 12;

/// Deepest sparse tree. Only occupied paths are stored, so this can exceed
/// the ordered tree's limit.
pub const MAX_DEPTH: usize = 32;

/// Keyed sparse Merkle tree with updates and deletes.
#[derive(Clone, Debug)]
pub struct SparseMerkleTree<H> {
    /// Tree depth (number of levels from root to leaves)
    depth: usize,

    hasher: H,

    /// Sparse node storage: (level, index) -> hash
    /// Level 0 = leaves, level `depth` = root
    nodes: HashMap<(usize, u64), Node>,

    /// Leaf values: key -> value
    values: BTreeMap<u64, Node>,

    /// defaults[0] = empty leaf (zero)
    /// defaults[i] = hash(defaults[i-1], defaults[i-1])
    defaults: Vec<Node>,
}

/// Portable form of a sparse tree: depth plus occupied slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseTreeSnapshot {
    pub depth: usize,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: u64,
    #[serde(with = "hex_node")]
    pub value: Node,
}

impl<H: NodeHasher> SparseMerkleTree<H> {
    /// Create a new empty tree with the given depth.
    pub async fn new(depth: usize, hasher: H) -> Result<Self> {
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(AccumulatorError::InvalidDepth {
                depth,
                max: MAX_DEPTH,
            });
        }

        let mut defaults = Vec::with_capacity(depth + 1);
        defaults.push(Node::zero());
        for level in 0..depth {
            let prev = defaults[level];
            defaults.push(hasher.hash(prev, prev).await);
        }

        Ok(Self {
            depth,
            hasher,
            nodes: HashMap::new(),
            values: BTreeMap::new(),
            defaults,
        })
    }

    /// Create a tree from (key, value) pairs. Later pairs win on repeated keys.
    pub async fn from_entries(
        depth: usize,
        hasher: H,
        entries: impl IntoIterator<Item = (u64, Node)>,
    ) -> Result<Self> {
        let mut tree = Self::new(depth, hasher).await?;
        for (key, value) in entries {
            tree.update(key, value).await?;
        }
        Ok(tree)
    }

    /// Set the value for a key and recompute affected hashes.
    /// A zero value deletes the key. Returns the new root.
    pub async fn update(&mut self, key: u64, value: Node) -> Result<Node> {
        self.check_key(key)?;

        if value.is_zero() {
            self.values.remove(&key);
            self.nodes.remove(&(0, key));
        } else {
            self.values.insert(key, value);
            let leaf = self.hasher.hash(Node::from(key), value).await;
            self.nodes.insert((0, key), leaf);
        }

        Ok(self.recompute_path(key).await)
    }

    /// Delete a key. Returns the previous value, if any.
    pub async fn remove(&mut self, key: u64) -> Result<Option<Node>> {
        let previous = self.get(key)?;
        if previous.is_some() {
            self.update(key, Node::zero()).await?;
        }
        Ok(previous)
    }

    /// Recompute hashes from a leaf up to the root.
    async fn recompute_path(&mut self, key: u64) -> Node {
        let mut current_index = key;
        let mut current_hash = self.get_node(0, key);

        for level in 0..self.depth {
            let sibling_hash = self.get_node(level, current_index ^ 1);

            let parent_index = current_index >> 1;
            let parent_hash = if current_index & 1 == 0 {
                self.hasher.hash(current_hash, sibling_hash).await
            } else {
                self.hasher.hash(sibling_hash, current_hash).await
            };

            // Subtrees that hash back to the default need no storage
            if parent_hash == self.defaults[level + 1] {
                self.nodes.remove(&(level + 1, parent_index));
            } else {
                self.nodes.insert((level + 1, parent_index), parent_hash);
            }
            current_index = parent_index;
            current_hash = parent_hash;
        }

        current_hash
    }

    /// Rebuild a tree from a snapshot.
    pub async fn import(snapshot: &SparseTreeSnapshot, hasher: H) -> Result<Self> {
        let tree = Self::from_entries(
            snapshot.depth,
            hasher,
            snapshot.entries.iter().map(|entry| (entry.key, entry.value)),
        )
        .await?;
        debug!(depth = tree.depth, entries = tree.len(), "imported sparse merkle tree");
        Ok(tree)
    }

    /// Rebuild a tree from snapshot JSON.
    pub async fn import_json(json: &str, hasher: H) -> Result<Self> {
        let snapshot: SparseTreeSnapshot = serde_json::from_str(json)?;
        Self::import(&snapshot, hasher).await
    }
}

impl<H> SparseMerkleTree<H> {
    fn check_key(&self, key: u64) -> Result<()> {
        let capacity = self.capacity();
        if key >= capacity {
            return Err(AccumulatorError::KeyOutOfRange { key, capacity });
        }
        Ok(())
    }

    /// Get a node hash, returning the level default if not present.
    fn get_node(&self, level: usize, index: u64) -> Node {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.defaults[level])
    }

    /// Number of slots, `2^depth`.
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    /// Get the value stored for a key.
    pub fn get(&self, key: u64) -> Result<Option<Node>> {
        self.check_key(key)?;
        Ok(self.values.get(&key).copied())
    }

    /// Get the current root hash.
    pub fn root(&self) -> Node {
        self.get_node(self.depth, 0)
    }

    /// Get the tree depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get default hash for a level.
    pub fn default_at_level(&self, level: usize) -> Node {
        self.defaults[level]
    }

    /// Generate a proof for a key, occupied or not.
    pub fn get_proof(&self, key: u64) -> Result<SparseMerkleProof> {
        self.check_key(key)?;

        let mut siblings = Vec::with_capacity(self.depth);
        let mut current_index = key;
        for level in 0..self.depth {
            siblings.push(self.get_node(level, current_index ^ 1));
            current_index >>= 1;
        }

        Ok(SparseMerkleProof {
            key,
            value: self.values.get(&key).copied(),
            siblings,
        })
    }

    /// Occupied slots in key order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, Node)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    /// Get the number of occupied slots.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Export occupied slots.
    pub fn export(&self) -> SparseTreeSnapshot {
        SparseTreeSnapshot {
            depth: self.depth,
            entries: self
                .entries()
                .map(|(key, value)| SnapshotEntry { key, value })
                .collect(),
        }
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.export())?)
    }
}
