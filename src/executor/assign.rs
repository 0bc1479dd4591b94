//! Originator-side scheduler.
//!
//! Every cycle, each pending request is scored by every known node: a local
//! call for this node, an RPC for peers. `None` scores and RPC errors both
//! mean ineligible. The surviving maximum wins; this node picks locally,
//! any other winner gets the request delegated. Assignment is opportunistic
//! and unsynchronized, so a lost `pick` race is logged and forgotten: the
//! id-idempotent store operations bound the damage to duplicate execution.

use crate::config::MeshConfig;
use crate::membership::registry::NodeRegistry;
use crate::membership::types::NodeName;
use crate::rpc::client::PeerClient;
use crate::store::store::RequestStore;
use crate::store::types::Request;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

pub struct AssignTask {
    registry: Arc<NodeRegistry>,
    store: Arc<RequestStore>,
    config: Arc<MeshConfig>,
    client: PeerClient,
}

/// Picks the executor from the polled scores: maximum score, ties broken by
/// the lexicographically greatest name so every assigner that saw the same
/// scores reaches the same verdict.
pub fn select_executor(scores: Vec<(NodeName, Option<i64>)>) -> Option<NodeName> {
    scores
        .into_iter()
        .filter_map(|(name, score)| score.map(|s| (s, name)))
        .max()
        .map(|(_, name)| name)
}

impl AssignTask {
    pub fn new(
        registry: Arc<NodeRegistry>,
        store: Arc<RequestStore>,
        config: Arc<MeshConfig>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            store,
            config,
            client: PeerClient::new(),
        })
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.assign_latency_ms));

        loop {
            interval.tick().await;
            self.cycle().await;
        }
    }

    pub async fn cycle(&self) {
        let pending = self.store.get_pending().await;
        if pending.is_empty() {
            return;
        }

        let nodes = self.registry.names().await;
        for request in pending {
            self.assign(&request, &nodes).await;
        }
    }

    async fn assign(&self, request: &Request, nodes: &[NodeName]) {
        let self_name = self.registry.self_name();

        let mut polls = JoinSet::new();
        for node in nodes {
            let node = node.clone();
            let request = request.clone();

            if node == *self_name {
                let store = self.store.clone();
                polls.spawn(async move {
                    let score = store.acceptance_priority(&request).await;
                    (node, score)
                });
            } else {
                let client = self.client.clone();
                polls.spawn(async move {
                    // An RPC failure and an ineligible peer look the same.
                    let score = client
                        .acceptance_priority(&node, &request)
                        .await
                        .ok()
                        .flatten();
                    (node, score)
                });
            }
        }

        let mut scores = Vec::new();
        while let Some(result) = polls.join_next().await {
            if let Ok(scored) = result {
                scores.push(scored);
            }
        }

        let Some(winner) = select_executor(scores) else {
            // Nobody can serve this yet; retried next cycle.
            return;
        };

        if winner == *self_name {
            match self.store.pick(&request.id).await {
                Ok(_) => {
                    tracing::debug!("Picked request {} locally", request.id.0);
                }
                Err(e) => {
                    tracing::debug!("Lost pick race for {}: {}", request.id.0, e);
                }
            }
        } else {
            match self.store.delegate(&winner, request).await {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(
                        "Delegation of {} to {} failed, leaving pending: {}",
                        request.id.0,
                        winner,
                        e
                    );
                }
            }
        }
    }
}
