//! Periodic membership reconciliation.
//!
//! Ping converges liveness cheaply; sync propagates transitive discovery:
//! if A knows B and B knows C, A learns of C here by pulling B's registry
//! and union-merging it into its own. Later fetches win on conflicting
//! metadata. Unreachable peers are simply skipped; dropping the dead is the
//! ping task's job.

use super::registry::NodeRegistry;
use crate::config::MeshConfig;
use crate::rpc::client::PeerClient;

use std::sync::Arc;
use std::time::Duration;

pub struct SyncTask {
    registry: Arc<NodeRegistry>,
    config: Arc<MeshConfig>,
    client: PeerClient,
}

impl SyncTask {
    pub fn new(registry: Arc<NodeRegistry>, config: Arc<MeshConfig>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            config,
            client: PeerClient::new(),
        })
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.sync_latency_ms));

        loop {
            interval.tick().await;
            self.cycle().await;
        }
    }

    pub async fn cycle(&self) {
        let peers = self.registry.peer_names().await;
        if peers.is_empty() {
            return;
        }

        let mut merged = self.registry.get().await;
        for peer in peers {
            match self.client.fetch_registry(&peer).await {
                Ok(view) => {
                    merged.extend(view);
                }
                Err(e) => {
                    tracing::debug!("Sync skipped unreachable peer {}: {}", peer, e);
                }
            }
        }

        self.registry.replace_peers(merged).await;
    }
}
