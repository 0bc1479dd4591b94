//! Authoritative local view of the mesh.
//!
//! The registry is a plain map of node name to advertised metadata, always
//! containing this node under its own name. The ping and sync tasks replace
//! the peer portion wholesale once per cycle; reads between writes see a
//! consistent snapshot. Peer data learned over the network is computed
//! first and committed here afterwards, so no lock is ever held across I/O.

use super::types::{Metadata, NodeName};
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct NodeRegistry {
    self_name: NodeName,
    nodes: RwLock<HashMap<NodeName, Metadata>>,
}

impl NodeRegistry {
    pub fn new(self_name: NodeName, self_metadata: Metadata) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(self_name.clone(), self_metadata);

        Self {
            self_name,
            nodes: RwLock::new(nodes),
        }
    }

    pub fn self_name(&self) -> &NodeName {
        &self.self_name
    }

    /// Snapshot of the whole membership map, self included.
    pub async fn get(&self) -> HashMap<NodeName, Metadata> {
        self.nodes.read().await.clone()
    }

    pub async fn get_one(&self, name: &NodeName) -> Option<Metadata> {
        self.nodes.read().await.get(name).cloned()
    }

    /// All known names, self included.
    pub async fn names(&self) -> Vec<NodeName> {
        self.nodes.read().await.keys().cloned().collect()
    }

    /// All known names except this node's own.
    pub async fn peer_names(&self) -> Vec<NodeName> {
        self.nodes
            .read()
            .await
            .keys()
            .filter(|name| **name != self.self_name)
            .cloned()
            .collect()
    }

    pub async fn self_metadata(&self) -> Metadata {
        self.nodes
            .read()
            .await
            .get(&self.self_name)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn set_self_metadata(&self, metadata: Metadata) {
        self.nodes
            .write()
            .await
            .insert(self.self_name.clone(), metadata);
    }

    pub async fn set_peer_metadata(&self, name: NodeName, metadata: Metadata) {
        self.nodes.write().await.insert(name, metadata);
    }

    /// Replaces the peer portion of the map in one atomic write. The entry
    /// for this node survives with its current metadata regardless of what
    /// the incoming map claims about us.
    pub async fn replace_peers(&self, mut peers: HashMap<NodeName, Metadata>) {
        peers.remove(&self.self_name);

        let mut nodes = self.nodes.write().await;
        let self_metadata = nodes.remove(&self.self_name).unwrap_or_default();

        *nodes = peers;
        nodes.insert(self.self_name.clone(), self_metadata);
    }

    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }
}
