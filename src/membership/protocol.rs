use super::types::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Endpoints
pub const ENDPOINT_PING: &str = "/internal/ping";
pub const ENDPOINT_REGISTRY: &str = "/internal/registry";
pub const ENDPOINT_METADATA: &str = "/internal/metadata";

/// Liveness probe reply.
#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub node: String,
}

/// A node's full membership view. Keys are node names.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub nodes: HashMap<String, Metadata>,
}

/// A node's own advertised metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub metadata: Metadata,
}

/// Push of a peer's metadata into this node's registry, sent once per ping
/// cycle so the receiver learns of the sender even without seeding it.
#[derive(Debug, Serialize, Deserialize)]
pub struct PushMetadataRequest {
    pub node: String,
    pub metadata: Metadata,
}
