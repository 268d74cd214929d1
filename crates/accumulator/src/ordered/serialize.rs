//! Layer-wise snapshots of the ordered accumulator.
//!
//! A snapshot is the layer arrays themselves, each node as fixed-width hex:
//! `depth + 1` layers, layer `i` holding `2^depth >> i` nodes, the last one
//! holding only the root. Restoring validates the shape and rebuilds the leaf
//! list without rehashing.

use ark_ff::Zero;
use serde_json::Value;
use tracing::{debug, warn};

use super::tree::{OrderedMerkleTree, MAX_DEPTH};
use crate::error::{AccumulatorError, Result};
use crate::field::{node_from_hex, node_to_hex, Node, MAX_NODE};
use crate::hash::NodeHasher;

/// Serialized form: one list of hex nodes per layer, leaf layer first.
pub type SerializedLayers = Vec<Vec<String>>;

fn malformed(reason: String) -> AccumulatorError {
    warn!(%reason, "rejected serialized tree");
    AccumulatorError::MalformedSnapshot(reason)
}

impl<H> OrderedMerkleTree<H> {
    /// Dump every layer as hex. An uninitialized tree yields no layers.
    pub fn serialize(&self) -> SerializedLayers {
        self.layers
            .iter()
            .map(|layer| layer.iter().map(node_to_hex).collect())
            .collect()
    }

    /// Serialize to a JSON array of arrays.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }
}

impl<H: NodeHasher> OrderedMerkleTree<H> {
    /// Restore a tree from a snapshot, inferring depth from the layer count.
    pub async fn from_serialized(data: &[Vec<String>], hasher: H) -> Result<Self> {
        if data.is_empty() {
            return Err(malformed("payload has no layers".to_string()));
        }

        let depth = data.len() - 1;
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(malformed(format!(
                "{} layers imply depth {}, expected 1 to {}",
                data.len(),
                depth,
                MAX_DEPTH
            )));
        }

        let mut tree = Self::new(depth, hasher).await?;
        tree.load_from_serialized(data)?;
        Ok(tree)
    }

    /// Restore from JSON text. Unlike [`from_serialized`](Self::from_serialized)
    /// this checks the untyped payload first, so a layer that is not an array
    /// is reported by position.
    pub async fn from_json(json: &str, hasher: H) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let data = layers_from_value(&value)?;
        Self::from_serialized(&data, hasher).await
    }

    /// Populate this uninitialized tree from a snapshot of the same depth.
    ///
    /// The snapshot is validated in full before any state changes.
    pub fn load_from_serialized(&mut self, data: &[Vec<String>]) -> Result<()> {
        self.ensure_uninitialized()?;

        if data.is_empty() {
            return Err(malformed("payload has no layers".to_string()));
        }
        if data.len() != self.depth + 1 {
            return Err(malformed(format!(
                "expected {} layers for depth {}, got {}",
                self.depth + 1,
                self.depth,
                data.len()
            )));
        }

        let capacity = self.capacity();
        for (level, layer) in data.iter().enumerate() {
            let expected = capacity >> level;
            if layer.len() != expected {
                return Err(malformed(format!(
                    "layer {} has {} nodes, expected {}",
                    level,
                    layer.len(),
                    expected
                )));
            }
        }
        if data[self.depth].first().is_none() {
            return Err(malformed("root layer is empty".to_string()));
        }

        let mut layers = Vec::with_capacity(data.len());
        for (level, layer) in data.iter().enumerate() {
            let nodes = layer
                .iter()
                .enumerate()
                .map(|(index, encoded)| {
                    node_from_hex(encoded)
                        .map_err(|e| malformed(format!("layer {} node {}: {}", level, index, e)))
                })
                .collect::<Result<Vec<Node>>>()?;
            layers.push(nodes);
        }

        let leaves = trim_padding(&layers[0]);
        validate_leaves(&leaves)?;

        debug!(
            depth = self.depth,
            leaves = leaves.len(),
            root = %node_to_hex(&layers[self.depth][0]),
            "restored ordered merkle tree"
        );

        self.leaves = leaves;
        self.layers = layers;
        Ok(())
    }

    /// Recompute all hashes from the leaf layer and compare with the stored
    /// layers. Loading trusts the snapshot; call this to audit one.
    pub async fn verify_integrity(&self) -> Result<bool> {
        if !self.is_built() {
            return Err(AccumulatorError::NotInitialized);
        }
        let recomputed = self.compute_layers(&self.leaves).await;
        Ok(recomputed == self.layers)
    }
}

/// Drop raw-zero padding from the end of the leaf layer.
fn trim_padding(leaf_layer: &[Node]) -> Vec<Node> {
    let used = leaf_layer
        .iter()
        .rposition(|node| !node.is_zero())
        .map_or(0, |last| last + 1);
    leaf_layer[..used].to_vec()
}

fn validate_leaves(leaves: &[Node]) -> Result<()> {
    let bracketed = leaves.len() >= 2
        && leaves.first().is_some_and(|first| first.is_zero())
        && leaves.last() == Some(&MAX_NODE);
    if !bracketed {
        return Err(malformed(
            "leaf layer is not bracketed by the sentinel leaves".to_string(),
        ));
    }
    if !leaves.windows(2).all(|w| w[0] < w[1]) {
        return Err(malformed("leaf layer is not strictly ascending".to_string()));
    }
    Ok(())
}

/// Structural checks on an untyped payload: a non-empty array whose entries
/// are arrays of strings.
fn layers_from_value(value: &Value) -> Result<SerializedLayers> {
    let outer = value
        .as_array()
        .ok_or_else(|| malformed("payload is not an array".to_string()))?;
    if outer.is_empty() {
        return Err(malformed("payload has no layers".to_string()));
    }

    outer
        .iter()
        .enumerate()
        .map(|(level, layer)| -> Result<Vec<String>> {
            let nodes = layer
                .as_array()
                .ok_or_else(|| malformed(format!("layer {} is not an array", level)))?;
            nodes
                .iter()
                .enumerate()
                .map(|(index, node)| {
                    node.as_str().map(str::to_owned).ok_or_else(|| {
                        malformed(format!("layer {} node {} is not a string", level, index))
                    })
                })
                .collect()
        })
        .collect()
}
