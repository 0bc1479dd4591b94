//! HTTP handlers for the store RPC surface.
//!
//! These are the narrow remote mutators of the request store: the assigner
//! on a peer polls acceptance scores here, pushes delegated requests into
//! the handling list, and removes completed requests from the originator.

use super::protocol::*;
use super::store::RequestStore;

use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_acceptance(
    Extension(store): Extension<Arc<RequestStore>>,
    Json(req): Json<AcceptanceRequest>,
) -> Json<AcceptanceResponse> {
    let priority = store.acceptance_priority(&req.request).await;
    Json(AcceptanceResponse { priority })
}

pub async fn handle_insert_handling(
    Extension(store): Extension<Arc<RequestStore>>,
    Json(req): Json<InsertHandlingRequest>,
) -> StatusCode {
    tracing::debug!(
        "Accepted delegated request {} from {}",
        req.request.id.0,
        req.request.origin_node
    );
    store.insert_handling(req.request).await;

    StatusCode::OK
}

pub async fn handle_remove(
    Extension(store): Extension<Arc<RequestStore>>,
    Json(req): Json<RemoveRequest>,
) -> StatusCode {
    store.remove(&req.id).await;
    StatusCode::OK
}
