//! HTTP API server for ordered accumulator proofs.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use ordered_accumulator::{node_to_hex, OrderedMerkleTree};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::EnvFilter;

mod config;
mod handlers;
mod hasher;
mod routes;

use config::Config;
use hasher::ServerHasher;

/// Application state shared across handlers. The tree is read-only once
/// served, so handlers share it without a lock.
pub struct AppState {
    pub tree: OrderedMerkleTree<ServerHasher>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the snapshot at `TREE_PATH`, or serve a tree holding only the
/// sentinel leaves when there is none.
async fn load_tree(config: &Config) -> Result<OrderedMerkleTree<ServerHasher>, Box<dyn std::error::Error>> {
    let hasher = ServerHasher::from(config.hasher);

    if config.tree_path.exists() {
        tracing::info!("Loading tree from {:?}", config.tree_path);
        let json = tokio::fs::read_to_string(&config.tree_path).await?;
        let tree = OrderedMerkleTree::from_json(&json, hasher).await?;

        // Restore does not rehash, so a snapshot from another hasher is caught here
        if !tree.verify_integrity().await? {
            return Err(format!(
                "tree at {:?} was not built with the {:?} hasher",
                config.tree_path, config.hasher
            )
            .into());
        }
        return Ok(tree);
    }

    tracing::warn!(
        "No tree at {:?}, serving an empty tree of depth {}",
        config.tree_path,
        config.tree_depth
    );
    Ok(OrderedMerkleTree::build(config.tree_depth, hasher, std::iter::empty()).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(hasher = ?config.hasher, "Starting accumulator proof server");

    let tree = load_tree(&config).await?;
    tracing::info!(
        depth = tree.depth(),
        leaves = tree.len(),
        root = %node_to_hex(&tree.root()),
        "Tree ready"
    );

    let state = Arc::new(AppState { tree });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HasherKind;
    use ordered_accumulator::Node;

    fn config_for(tree_path: std::path::PathBuf, hasher: HasherKind) -> Config {
        Config {
            tree_path,
            hasher,
            ..Config::default()
        }
    }

    async fn write_snapshot(dir: &std::path::Path, hasher: HasherKind) -> std::path::PathBuf {
        let tree = OrderedMerkleTree::build(4, ServerHasher::from(hasher), [5u64, 9].map(Node::from))
            .await
            .unwrap();
        let path = dir.join("tree.json");
        std::fs::write(&path, tree.to_json().unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_snapshot_with_matching_hasher() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(dir.path(), HasherKind::Sha256).await;

        let tree = load_tree(&config_for(path, HasherKind::Sha256)).await.unwrap();
        assert!(tree.contains(&Node::from(9u64)));
    }

    #[tokio::test]
    async fn test_load_snapshot_with_other_hasher_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(dir.path(), HasherKind::Sha256).await;

        let err = load_tree(&config_for(path, HasherKind::Poseidon))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Poseidon"));
    }

    #[tokio::test]
    async fn test_missing_snapshot_serves_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path().join("absent.json"), HasherKind::Sha256);
        config.tree_depth = 3;

        let tree = load_tree(&config).await.unwrap();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.len(), 2);
    }

    #[tokio::test]
    async fn test_depth_beyond_limit_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path().join("absent.json"), HasherKind::Sha256);
        config.tree_depth = ordered_accumulator::MAX_DEPTH + 1;

        assert!(load_tree(&config).await.is_err());
    }
}
