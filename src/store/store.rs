//! Request state container.
//!
//! Tracks the requests this node originated (pending) and the requests it
//! is executing (handling), plus the mutable base busyness that biases the
//! node's scheduling score. All lifecycle transitions run under one lock so
//! a request is observably in at most one list at any instant, and the lock
//! is never held across network I/O: `delegate` completes its remote insert
//! before touching local state.

use super::types::{Request, RequestId};
use crate::config::{CostRule, MeshConfig, DEFAULT_BUSYNESS_STEP, DEFAULT_BUSYNESS_WEIGHT};
use crate::executor::registry::FunctionRegistry;
use crate::membership::types::NodeName;
use crate::rpc::client::PeerClient;

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct StoreInner {
    pending: Vec<Request>,
    handling: Vec<Request>,
    base_busyness: i64,
}

pub struct RequestStore {
    inner: Mutex<StoreInner>,
    functions: Arc<FunctionRegistry>,
    config: Arc<MeshConfig>,
    client: PeerClient,
}

impl RequestStore {
    pub fn new(functions: Arc<FunctionRegistry>, config: Arc<MeshConfig>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(StoreInner::default()),
            functions,
            config,
            client: PeerClient::new(),
        })
    }

    /// Enqueues a request this node originated. Idempotent on id: any
    /// previous entry with the same id is dropped first.
    pub async fn add(&self, request: Request) {
        let mut inner = self.inner.lock().await;
        inner.pending.retain(|r| r.id != request.id);
        inner.handling.retain(|r| r.id != request.id);
        inner.pending.insert(0, request);
    }

    /// Inserts a request into the handling list. This is the delegation
    /// target: the originator pushes the request here via RPC.
    pub async fn insert_handling(&self, request: Request) {
        let mut inner = self.inner.lock().await;
        inner.pending.retain(|r| r.id != request.id);
        inner.handling.retain(|r| r.id != request.id);
        inner.handling.insert(0, request);
    }

    /// Deletes a request from both lists. No-op if absent.
    pub async fn remove(&self, id: &RequestId) {
        let mut inner = self.inner.lock().await;
        inner.pending.retain(|r| r.id != *id);
        inner.handling.retain(|r| r.id != *id);
    }

    /// Moves a request from pending to handling. Errors when the id is not
    /// pending, which signals a lost assignment race or an unknown id.
    pub async fn pick(&self, id: &RequestId) -> Result<Request> {
        let mut inner = self.inner.lock().await;

        let position = inner
            .pending
            .iter()
            .position(|r| r.id == *id)
            .ok_or_else(|| anyhow!("request {} is not pending", id.0))?;

        let request = inner.pending.remove(position);
        inner.handling.retain(|r| r.id != request.id);
        inner.handling.insert(0, request.clone());

        Ok(request)
    }

    /// Pushes a request onto a peer's handling list, then forgets it
    /// locally. The remote insert happens first; if it fails the request
    /// stays pending and the next assignment cycle retries.
    pub async fn delegate(&self, peer: &NodeName, request: &Request) -> Result<()> {
        self.client.insert_handling(peer, request).await?;
        self.remove(&request.id).await;

        tracing::debug!("Delegated request {} to {}", request.id.0, peer);
        Ok(())
    }

    pub async fn get(&self) -> (Vec<Request>, Vec<Request>) {
        let inner = self.inner.lock().await;
        (inner.pending.clone(), inner.handling.clone())
    }

    pub async fn get_pending(&self) -> Vec<Request> {
        self.inner.lock().await.pending.clone()
    }

    pub async fn get_handling(&self) -> Vec<Request> {
        self.inner.lock().await.handling.clone()
    }

    pub async fn get_one(&self, id: &RequestId) -> Option<Request> {
        let inner = self.inner.lock().await;
        inner
            .pending
            .iter()
            .chain(inner.handling.iter())
            .find(|r| r.id == *id)
            .cloned()
    }

    pub async fn base_busyness(&self) -> i64 {
        self.inner.lock().await.base_busyness
    }

    /// Raises base busyness by the default step.
    pub async fn base_busyness_increase(&self) {
        self.base_busyness_increase_by(DEFAULT_BUSYNESS_STEP).await;
    }

    pub async fn base_busyness_increase_by(&self, amount: i64) {
        self.inner.lock().await.base_busyness += amount;
    }

    /// Lowers base busyness by the default step.
    pub async fn base_busyness_decrease(&self) {
        self.base_busyness_decrease_by(DEFAULT_BUSYNESS_STEP).await;
    }

    pub async fn base_busyness_decrease_by(&self, amount: i64) {
        self.inner.lock().await.base_busyness -= amount;
    }

    /// The scheduling load signal: base busyness plus the configured weight
    /// of everything currently handled.
    pub async fn busyness(&self) -> i64 {
        let inner = self.inner.lock().await;
        let handled: i64 = inner
            .handling
            .iter()
            .map(|r| self.weight_of(r).unwrap_or(0))
            .sum();

        inner.base_busyness + handled
    }

    /// The score this node reports for a candidate request, computed
    /// against its own state only. `None` means ineligible: the function is
    /// not resolvable here, or its offset rule says reject. Busyness is
    /// negated so "least busy, most eager" is the maximum.
    pub async fn acceptance_priority(&self, request: &Request) -> Option<i64> {
        if !self
            .functions
            .resolves(&request.module, &request.function, request.arity())
        {
            return None;
        }

        let base = self.inner.lock().await.base_busyness;
        match MeshConfig::lookup_rule(
            &self.config.busyness_offsets,
            &request.module,
            &request.function,
        ) {
            None => Some(-base),
            Some(CostRule::Reject) => None,
            Some(CostRule::Cost(offset)) => Some(-(base + offset)),
        }
    }

    /// The per-request busyness contribution. `None` means the request does
    /// not count here (not resolvable, or its weight rule says reject).
    pub fn busyness_weight(&self, request: &Request) -> Option<i64> {
        if !self
            .functions
            .resolves(&request.module, &request.function, request.arity())
        {
            return None;
        }

        self.weight_of(request)
    }

    fn weight_of(&self, request: &Request) -> Option<i64> {
        match MeshConfig::lookup_rule(
            &self.config.busyness_weights,
            &request.module,
            &request.function,
        ) {
            None => Some(DEFAULT_BUSYNESS_WEIGHT),
            Some(CostRule::Reject) => None,
            Some(CostRule::Cost(weight)) => Some(*weight),
        }
    }
}
