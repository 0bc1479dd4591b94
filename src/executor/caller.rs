//! The call site and its response plumbing.
//!
//! A caller registers a oneshot channel under a fresh handle, enqueues the
//! request, and waits on the channel with a timeout. Whichever node executes
//! the request addresses the envelope to `(origin_node, caller_handle)`; the
//! delivery handler completes the channel. If the caller gave up first the
//! handle is gone and the envelope is dropped on the floor, which is the
//! specified fate of late responses.

use super::protocol::ResponseEnvelope;
use crate::config::DEFAULT_CALL_TIMEOUT_MS;
use crate::membership::types::NodeName;
use crate::store::store::RequestStore;
use crate::store::types::Request;

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Successful call outcome.
#[derive(Debug, Clone)]
pub struct CallReply {
    pub result: serde_json::Value,
    pub executing_node: NodeName,
}

#[derive(Debug, Error)]
pub enum CallError {
    /// The receive window elapsed before any envelope arrived. The mesh may
    /// still execute the request; its response will be discarded.
    #[error("request timed out")]
    Timeout,

    /// The executing node reported a failure.
    #[error("execution failed on {node}: {reason}")]
    Execution { node: NodeName, reason: String },
}

/// Routes incoming response envelopes to the callers waiting on them.
pub struct ResponseRouter {
    waiting: DashMap<String, oneshot::Sender<ResponseEnvelope>>,
}

impl ResponseRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            waiting: DashMap::new(),
        })
    }

    pub fn register(&self, caller_handle: &str) -> oneshot::Receiver<ResponseEnvelope> {
        let (tx, rx) = oneshot::channel();
        self.waiting.insert(caller_handle.to_string(), tx);
        rx
    }

    /// Completes the waiting caller, if any. Envelopes for unknown handles
    /// are dropped silently: the caller already timed out.
    pub fn deliver(&self, caller_handle: &str, envelope: ResponseEnvelope) {
        if let Some((_, tx)) = self.waiting.remove(caller_handle) {
            let _ = tx.send(envelope);
        } else {
            tracing::debug!("Dropped response for absent caller {}", caller_handle);
        }
    }

    pub fn forget(&self, caller_handle: &str) {
        self.waiting.remove(caller_handle);
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}

/// The synchronous-looking entry point application code calls to run a
/// function somewhere on the mesh.
pub struct Caller {
    self_name: NodeName,
    store: Arc<RequestStore>,
    router: Arc<ResponseRouter>,
}

impl Caller {
    pub fn new(
        self_name: NodeName,
        store: Arc<RequestStore>,
        router: Arc<ResponseRouter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            self_name,
            store,
            router,
        })
    }

    pub fn default_timeout() -> Duration {
        Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)
    }

    /// Asks the mesh to compute `module.function(args)` and waits for the
    /// result. The request is scheduled by the assignment task; this only
    /// enqueues and blocks on the response channel.
    pub async fn make_it_so(
        &self,
        module: &str,
        function: &str,
        args: Vec<serde_json::Value>,
        timeout: Duration,
    ) -> Result<CallReply, CallError> {
        let caller_handle = uuid::Uuid::new_v4().to_string();
        let rx = self.router.register(&caller_handle);

        let request = Request::new(
            self.self_name.clone(),
            caller_handle.clone(),
            module,
            function,
            args,
        );
        let id = request.id.clone();
        self.store.add(request).await;

        tracing::debug!("Enqueued request {} for {}.{}", id.0, module, function);

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(ResponseEnvelope::Response { result, node, .. })) => Ok(CallReply {
                result,
                executing_node: node,
            }),
            Ok(Ok(ResponseEnvelope::Error { node, reason, .. })) => {
                Err(CallError::Execution { node, reason })
            }
            Ok(Err(_closed)) => {
                // Sender dropped without an envelope; indistinguishable from
                // a lost response for the caller.
                Err(CallError::Timeout)
            }
            Err(_elapsed) => {
                self.router.forget(&caller_handle);
                Err(CallError::Timeout)
            }
        }
    }
}
