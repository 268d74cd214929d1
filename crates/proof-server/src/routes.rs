//! API route definitions for accumulator proofs.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::AppState;

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        .route("/api/root", get(handlers::root))
        // Proof generation against the served tree
        .route("/api/prove/membership", post(handlers::prove_membership))
        .route("/api/prove/non-membership", post(handlers::prove_non_membership))
        // Proof checks; the proof root must also be the served root
        .route("/api/verify/membership", post(handlers::verify_membership))
        .route("/api/verify/non-membership", post(handlers::verify_non_membership))
}
