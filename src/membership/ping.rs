//! Periodic liveness prober.
//!
//! Every cycle the task merges three sources of candidate peers (the
//! persisted list from the last run, the current registry, the configured
//! referrals), probes each with a liveness ping, and rebuilds the registry
//! peer map from the responders. Self-metadata is then pushed to every
//! responder so a peer learns of this node even when it never seeded us.
//! The sorted reachable list is persisted whenever it changes, which is
//! what lets a restarted node rejoin without referrals.

use super::persist;
use super::registry::NodeRegistry;
use super::types::NodeName;
use crate::config::MeshConfig;
use crate::rpc::client::PeerClient;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

pub struct PingTask {
    registry: Arc<NodeRegistry>,
    config: Arc<MeshConfig>,
    client: PeerClient,
}

impl PingTask {
    pub fn new(registry: Arc<NodeRegistry>, config: Arc<MeshConfig>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            config,
            client: PeerClient::new(),
        })
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.ping_latency_ms));

        loop {
            interval.tick().await;
            self.cycle().await;
        }
    }

    /// One full probe cycle. Public so tests can drive it without the loop.
    pub async fn cycle(&self) {
        let persisted = persist::read_nodes(&self.config.persist_path);

        let mut candidates: BTreeSet<NodeName> = BTreeSet::new();
        candidates.extend(persisted.iter().cloned());
        candidates.extend(self.registry.peer_names().await);
        candidates.extend(self.config.referrals.iter().cloned());
        candidates.remove(self.registry.self_name());

        let mut probes = JoinSet::new();
        for name in candidates {
            let client = self.client.clone();
            probes.spawn(async move {
                let alive = client.ping(&name).await;
                (name, alive)
            });
        }

        let mut reachable: Vec<NodeName> = Vec::new();
        while let Some(result) = probes.join_next().await {
            if let Ok((name, true)) = result {
                reachable.push(name);
            }
        }
        reachable.sort();

        // Metadata is looked up (or fetched) before the registry is touched.
        let mut peers = HashMap::new();
        for name in &reachable {
            let metadata = match self.registry.get_one(name).await {
                Some(metadata) => metadata,
                None => self.client.fetch_metadata(name).await.unwrap_or_default(),
            };
            peers.insert(name.clone(), metadata);
        }

        self.registry.replace_peers(peers).await;

        let self_name = self.registry.self_name().clone();
        let self_metadata = self.registry.self_metadata().await;
        for name in &reachable {
            let client = self.client.clone();
            let peer = name.clone();
            let from = self_name.clone();
            let metadata = self_metadata.clone();

            tokio::spawn(async move {
                if let Err(e) = client.push_metadata(&peer, &from, metadata).await {
                    tracing::debug!("Metadata push to {} failed: {}", peer, e);
                }
            });
        }

        let mut previous = persisted;
        previous.sort();
        if reachable != previous {
            match persist::write_nodes(&self.config.persist_path, &reachable) {
                Ok(()) => {
                    tracing::debug!("Persisted {} reachable node(s)", reachable.len());
                }
                Err(e) => {
                    tracing::warn!("Failed to persist node list: {}", e);
                }
            }
        }
    }
}
