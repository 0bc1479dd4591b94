//! Executor-side worker pool.
//!
//! Every cycle the task snapshots the handling list, spawns one independent
//! worker per request, and immediately removes the dispatched requests from
//! the local store, so a request is executed at most once here even if a
//! worker dies mid-flight. Each worker invokes the callable, ships the
//! result envelope to the originator's waiting caller, and then clears the
//! request from the originator's store. When the originator is this node
//! both steps short-circuit to local calls.

use super::caller::ResponseRouter;
use super::protocol::ResponseEnvelope;
use super::registry::FunctionRegistry;
use crate::config::MeshConfig;
use crate::membership::types::NodeName;
use crate::rpc::client::PeerClient;
use crate::store::store::RequestStore;
use crate::store::types::Request;

use std::sync::Arc;
use std::time::Duration;

pub struct HandleTask {
    self_name: NodeName,
    store: Arc<RequestStore>,
    functions: Arc<FunctionRegistry>,
    router: Arc<ResponseRouter>,
    config: Arc<MeshConfig>,
    client: PeerClient,
}

impl HandleTask {
    pub fn new(
        self_name: NodeName,
        store: Arc<RequestStore>,
        functions: Arc<FunctionRegistry>,
        router: Arc<ResponseRouter>,
        config: Arc<MeshConfig>,
    ) -> Arc<Self> {
        Arc::new(Self {
            self_name,
            store,
            functions,
            router,
            config,
            client: PeerClient::new(),
        })
    }

    pub async fn run(self: Arc<Self>) {
        let mut interval =
            tokio::time::interval(Duration::from_millis(self.config.handle_latency_ms));

        loop {
            interval.tick().await;
            self.clone().cycle().await;
        }
    }

    pub async fn cycle(self: Arc<Self>) {
        let batch = self.store.get_handling().await;
        if batch.is_empty() {
            return;
        }

        for request in &batch {
            let task = self.clone();
            let request = request.clone();
            tokio::spawn(async move {
                task.execute_and_respond(request).await;
            });
        }

        // At-most-once locally: dispatched requests leave the store now,
        // whatever becomes of their workers.
        for request in &batch {
            self.store.remove(&request.id).await;
        }
    }

    async fn execute_and_respond(&self, request: Request) {
        tracing::debug!(
            "Executing request {} ({}.{}/{})",
            request.id.0,
            request.module,
            request.function,
            request.arity()
        );

        let envelope = match self.functions.invoke(&request).await {
            Ok(result) => ResponseEnvelope::Response {
                id: request.id.clone(),
                node: self.self_name.clone(),
                result,
            },
            Err(e) => {
                tracing::warn!("Request {} failed: {}", request.id.0, e);
                ResponseEnvelope::Error {
                    request: request.clone(),
                    node: self.self_name.clone(),
                    reason: e.to_string(),
                }
            }
        };

        if request.origin_node == self.self_name {
            self.router.deliver(&request.caller_handle, envelope);
            self.store.remove(&request.id).await;
            return;
        }

        if let Err(e) = self
            .client
            .deliver_response(&request.origin_node, &request.caller_handle, &envelope)
            .await
        {
            tracing::warn!(
                "Failed to deliver response for {} to {}: {}",
                request.id.0,
                request.origin_node,
                e
            );
        }

        if let Err(e) = self
            .client
            .remove_request(&request.origin_node, &request.id)
            .await
        {
            tracing::debug!(
                "Failed to clear {} from originator {}: {}",
                request.id.0,
                request.origin_node,
                e
            );
        }
    }
}
