//! Field elements used as tree nodes, and their portable hex encoding.
//!
//! Every node is a BN254 scalar field element. The portable encoding is the
//! canonical big-endian integer as 64 lowercase hex characters. Inputs may
//! carry a `0x` prefix; values outside the field are rejected rather than
//! reduced, so an encoding round-trips byte for byte.

use ark_bn254::Fr;
use ark_ff::{BigInteger, MontFp, PrimeField};

use crate::error::{AccumulatorError, Result};

/// A tree node: leaf, sibling or root.
pub type Node = Fr;

/// Width of an encoded node in hex characters (32 bytes).
pub const NODE_HEX_LEN: usize = 64;

/// The largest field element, `MODULUS - 1`. Used as the upper sentinel leaf.
pub const MAX_NODE: Node =
    MontFp!("21888242871839275222246405745257275088548364400416034343698204186575808495616");

/// Encode a node as 64 hex characters, zero-padded, without prefix.
pub fn node_to_hex(node: &Node) -> String {
    hex::encode(node.into_bigint().to_bytes_be())
}

/// Encode a node with a `0x` prefix, the form circuits and contracts expect.
pub fn node_to_prefixed_hex(node: &Node) -> String {
    format!("0x{}", node_to_hex(node))
}

/// Decode a fixed-width hex node. Rejects wrong widths and non-canonical values.
pub fn node_from_hex(encoded: &str) -> Result<Node> {
    let digits = encoded.strip_prefix("0x").unwrap_or(encoded);
    if digits.len() != NODE_HEX_LEN {
        return Err(AccumulatorError::InvalidNode(format!(
            "expected {} hex characters, got {}",
            NODE_HEX_LEN,
            digits.len()
        )));
    }

    let bytes =
        hex::decode(digits).map_err(|e| AccumulatorError::InvalidNode(format!("{}: {}", digits, e)))?;
    let node = Node::from_be_bytes_mod_order(&bytes);

    // A value >= MODULUS reduces to something else and no longer matches.
    if !node_to_hex(&node).eq_ignore_ascii_case(digits) {
        return Err(AccumulatorError::InvalidNode(format!(
            "{} is not a canonical field element",
            digits
        )));
    }

    Ok(node)
}

/// Serde adapter for a single node as a hex string.
pub mod hex_node {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{node_from_hex, node_to_hex, Node};

    pub fn serialize<S: Serializer>(node: &Node, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&node_to_hex(node))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Node, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        node_from_hex(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for a list of nodes as hex strings.
pub mod hex_nodes {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{node_from_hex, node_to_hex, Node};

    pub fn serialize<S: Serializer>(nodes: &[Node], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(nodes.len()))?;
        for node in nodes {
            seq.serialize_element(&node_to_hex(node))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Node>, D::Error> {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|s| node_from_hex(s).map_err(serde::de::Error::custom))
            .collect()
    }
}
