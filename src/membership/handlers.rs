//! HTTP handlers for the membership RPC surface.
//!
//! Peers use these routes to probe liveness, pull this node's registry view
//! (sync), read its advertised metadata, and push their own metadata after a
//! successful ping.

use super::protocol::*;
use super::registry::NodeRegistry;
use super::types::NodeName;

use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_ping(
    Extension(registry): Extension<Arc<NodeRegistry>>,
) -> Json<PingResponse> {
    Json(PingResponse {
        node: registry.self_name().0.clone(),
    })
}

pub async fn handle_registry_get(
    Extension(registry): Extension<Arc<NodeRegistry>>,
) -> Json<RegistryResponse> {
    let nodes = registry
        .get()
        .await
        .into_iter()
        .map(|(name, metadata)| (name.0, metadata))
        .collect();

    Json(RegistryResponse { nodes })
}

pub async fn handle_metadata_get(
    Extension(registry): Extension<Arc<NodeRegistry>>,
) -> Json<MetadataResponse> {
    Json(MetadataResponse {
        metadata: registry.self_metadata().await,
    })
}

pub async fn handle_metadata_push(
    Extension(registry): Extension<Arc<NodeRegistry>>,
    Json(req): Json<PushMetadataRequest>,
) -> StatusCode {
    tracing::debug!("Metadata push from {}", req.node);
    registry
        .set_peer_metadata(NodeName(req.node), req.metadata)
        .await;

    StatusCode::OK
}
