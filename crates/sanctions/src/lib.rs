//! Sanctions screening on top of the ordered accumulator.
//!
//! This crate provides:
//! - Leaf derivation from sanctions entries and passport fields
//! - Three accumulators (name + date of birth, name + year of birth,
//!   passport + nationality) with directory persistence
//! - Non-membership proofs for an identity, exportable as circuit inputs

pub mod circuit;
pub mod error;
pub mod leaf;
pub mod trees;

pub use circuit::CircuitInputs;
pub use error::{Result, SanctionsError};
pub use leaf::{
    name_dob_leaf, name_yob_leaf, normalize, pack_text, passport_nationality_leaf, EntryLeaves,
    PassportIdentity, SanctionEntry,
};
pub use trees::{
    SanctionsCircuitInputs, SanctionsList, SanctionsProofs, SanctionsRoots, SanctionsTrees,
};

/// Depth used by the builder when none is given: 65,536 leaf slots.
pub const DEFAULT_DEPTH: usize = 16;
