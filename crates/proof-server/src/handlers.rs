//! HTTP request handlers for accumulator proofs.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use ordered_accumulator::{
    node_from_hex, node_to_hex, verify_membership_proof, verify_non_membership_proof,
    AccumulatorError, MembershipProof, NonMembershipProof,
};

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub root: String,
    pub depth: usize,
    /// Committed leaves, sentinels included
    pub leaves: usize,
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        root: node_to_hex(&state.tree.root()),
        depth: state.tree.depth(),
        leaves: state.tree.len(),
    })
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

fn accumulator_error(e: AccumulatorError) -> Response {
    let status = match e {
        AccumulatorError::LeafNotFound(_) => StatusCode::NOT_FOUND,
        AccumulatorError::LeafExists(_) => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };
    error_response(status, e.to_string())
}

/// Unwrap a JSON body, answering malformed payloads with 400 and an error body.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))
}

#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    /// Hex node, with or without `0x`
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

// ============ Proof generation ============

pub async fn prove_membership(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValueRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let value = match node_from_hex(&req.value) {
        Ok(value) => value,
        Err(e) => return accumulator_error(e),
    };

    match state.tree.create_membership_proof(value) {
        Ok(proof) => (StatusCode::OK, Json(proof)).into_response(),
        Err(e) => accumulator_error(e),
    }
}

pub async fn prove_non_membership(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ValueRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let value = match node_from_hex(&req.value) {
        Ok(value) => value,
        Err(e) => return accumulator_error(e),
    };

    match state.tree.create_non_membership_proof(value) {
        Ok(proof) => (StatusCode::OK, Json(proof)).into_response(),
        Err(e) => accumulator_error(e),
    }
}

// ============ Verification ============

pub async fn verify_membership(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MembershipProof>, JsonRejection>,
) -> Response {
    let proof = match json_body(body) {
        Ok(proof) => proof,
        Err(response) => return response,
    };

    let valid = proof.root == state.tree.root()
        && verify_membership_proof(&proof, state.tree.hasher()).await;
    debug!(leaf_index = proof.leaf_index, valid, "verified membership proof");

    (StatusCode::OK, Json(VerifyResponse { valid })).into_response()
}

pub async fn verify_non_membership(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NonMembershipProof>, JsonRejection>,
) -> Response {
    let proof = match json_body(body) {
        Ok(proof) => proof,
        Err(response) => return response,
    };

    let valid = proof.root == state.tree.root()
        && verify_non_membership_proof(&proof, state.tree.hasher()).await;
    debug!(valid, "verified non-membership proof");

    (StatusCode::OK, Json(VerifyResponse { valid })).into_response()
}
