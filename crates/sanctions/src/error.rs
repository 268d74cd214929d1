//! Errors raised while building, loading and checking sanctions trees.

use ordered_accumulator::AccumulatorError;
use thiserror::Error;

use crate::trees::SanctionsList;

#[derive(Error, Debug)]
pub enum SanctionsError {
    #[error("Accumulator error: {0}")]
    Accumulator(#[from] AccumulatorError),

    #[error("Identity is listed in the {0} sanctions list")]
    Listed(SanctionsList),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Non-membership proof has no {0} neighbor")]
    IncompleteProof(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SanctionsError>;
