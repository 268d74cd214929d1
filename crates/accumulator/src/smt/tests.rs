//! Integration tests for the SMT module.

use super::*;
use crate::error::AccumulatorError;
use crate::field::Node;
use crate::hash::{PoseidonHasher, Sha256Hasher};

fn node(v: u64) -> Node {
    Node::from(v)
}

#[tokio::test]
async fn test_full_workflow() {
    let items = [(1, node(100)), (5, node(50)), (100, node(25))];
    let tree = SparseMerkleTree::from_entries(DEFAULT_DEPTH, PoseidonHasher::new(), items)
        .await
        .unwrap();
    let hasher = PoseidonHasher::new();

    for (key, value) in items {
        let proof = tree.get_proof(key).unwrap();
        assert_eq!(proof.value, Some(value));
        assert!(verify_sparse_proof(&proof, tree.root(), &hasher).await);
    }

    // Empty slot proves absence
    let empty = tree.get_proof(999).unwrap();
    assert!(!empty.is_membership());
    assert!(verify_sparse_proof(&empty, tree.root(), &hasher).await);
}

#[tokio::test]
async fn test_wrong_value_fails() {
    let tree = SparseMerkleTree::from_entries(DEFAULT_DEPTH, Sha256Hasher, [(1, node(100))])
        .await
        .unwrap();

    let mut proof = tree.get_proof(1).unwrap();
    proof.value = Some(node(99));
    assert!(!verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);

    // Claiming an occupied slot is empty
    proof.value = None;
    assert!(!verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);
}

#[tokio::test]
async fn test_wrong_key_fails() {
    let tree = SparseMerkleTree::from_entries(DEFAULT_DEPTH, Sha256Hasher, [(1, node(100))])
        .await
        .unwrap();

    let mut proof = tree.get_proof(1).unwrap();
    proof.key = 2;
    assert!(!verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);

    proof.key = 1 << DEFAULT_DEPTH;
    assert!(!verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);
}

#[tokio::test]
async fn test_old_proof_matches_old_root() {
    let mut tree = SparseMerkleTree::from_entries(DEFAULT_DEPTH, Sha256Hasher, [(1, node(100))])
        .await
        .unwrap();

    let old_root = tree.root();
    let proof = tree.get_proof(1).unwrap();

    tree.update(1, node(70)).await.unwrap();
    assert_ne!(old_root, tree.root());

    assert!(verify_sparse_proof(&proof, old_root, &Sha256Hasher).await);
    assert!(!verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);
}

#[tokio::test]
async fn test_boundary_keys() {
    let items = [(0, node(10)), (1, node(20)), (4094, node(30)), (4095, node(40))];
    let tree = SparseMerkleTree::from_entries(DEFAULT_DEPTH, Sha256Hasher, items)
        .await
        .unwrap();

    for (key, _) in items {
        let proof = tree.get_proof(key).unwrap();
        assert!(verify_sparse_proof(&proof, tree.root(), &Sha256Hasher).await);
    }
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let tree = SparseMerkleTree::from_entries(
        10,
        Sha256Hasher,
        [(7, node(1)), (3, node(2)), (900, node(3))],
    )
    .await
    .unwrap();

    let snapshot = tree.export();
    assert_eq!(snapshot.depth, 10);
    assert_eq!(
        snapshot.entries.iter().map(|e| e.key).collect::<Vec<_>>(),
        vec![3, 7, 900]
    );

    let json = tree.export_json().unwrap();
    let restored = SparseMerkleTree::import_json(&json, Sha256Hasher).await.unwrap();
    assert_eq!(restored.root(), tree.root());
    assert_eq!(restored.get(900).unwrap(), Some(node(3)));
}

#[tokio::test]
async fn test_import_rejects_bad_snapshot() {
    let err = SparseMerkleTree::import_json("{\"depth\": 4}", Sha256Hasher)
        .await
        .unwrap_err();
    assert!(matches!(err, AccumulatorError::Json(_)));

    let snapshot = SparseTreeSnapshot {
        depth: 4,
        entries: vec![SnapshotEntry {
            key: 16,
            value: node(1),
        }],
    };
    assert!(matches!(
        SparseMerkleTree::import(&snapshot, Sha256Hasher).await,
        Err(AccumulatorError::KeyOutOfRange { .. })
    ));
}
