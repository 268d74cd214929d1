//! Server settings read from the environment.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown HASHER {0:?}: expected poseidon or sha256")]
    UnknownHasher(String),

    #[error("Invalid {name} {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Which node hash the served tree was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasherKind {
    Poseidon,
    Sha256,
}

impl HasherKind {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "poseidon" => Some(Self::Poseidon),
            "sha256" | "sha-256" => Some(Self::Sha256),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Layer snapshot to serve
    pub tree_path: PathBuf,
    /// Depth of the sentinel-only tree used when no snapshot exists
    pub tree_depth: usize,
    pub hasher: HasherKind,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`. Unset values take the defaults; set
    /// values that do not parse are errors.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "PORT",
                value: p,
            })?,
            None => defaults.port,
        };
        let tree_path = lookup("TREE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.tree_path);
        let tree_depth = match lookup("TREE_DEPTH") {
            Some(d) => d.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "TREE_DEPTH",
                value: d,
            })?,
            None => defaults.tree_depth,
        };
        let hasher = match lookup("HASHER") {
            Some(h) => HasherKind::parse(&h).ok_or(ConfigError::UnknownHasher(h))?,
            None => defaults.hasher,
        };

        Ok(Self {
            port,
            tree_path,
            tree_depth,
            hasher,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            tree_path: PathBuf::from("tree.json"),
            tree_depth: 16,
            hasher: HasherKind::Poseidon,
        }
    }
}
