//! Node assembly.
//!
//! Wires the state containers, the HTTP surface, and the four periodic
//! components into one mesh node. The listener is bound before anything
//! else so that binding port 0 still yields the real advertised name, which
//! doubles as the node's identity everywhere.

use crate::config::MeshConfig;
use crate::executor::assign::AssignTask;
use crate::executor::caller::{CallError, CallReply, Caller, ResponseRouter};
use crate::executor::handle::HandleTask;
use crate::executor::handlers::{handle_call, handle_respond};
use crate::executor::protocol::{ENDPOINT_CALL, ENDPOINT_RESPOND};
use crate::executor::registry::FunctionRegistry;
use crate::membership::handlers::{
    handle_metadata_get, handle_metadata_push, handle_ping, handle_registry_get,
};
use crate::membership::ping::PingTask;
use crate::membership::protocol::{ENDPOINT_METADATA, ENDPOINT_PING, ENDPOINT_REGISTRY};
use crate::membership::registry::NodeRegistry;
use crate::membership::sync::SyncTask;
use crate::membership::types::NodeName;
use crate::store::handlers::{handle_acceptance, handle_insert_handling, handle_remove};
use crate::store::protocol::{ENDPOINT_ACCEPTANCE, ENDPOINT_HANDLE, ENDPOINT_REMOVE};
use crate::store::store::RequestStore;
use crate::supervisor::spawn_supervised;

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use sysinfo::{CpuExt, System, SystemExt};

pub struct MeshNode {
    pub name: NodeName,
    pub config: Arc<MeshConfig>,
    pub registry: Arc<NodeRegistry>,
    pub store: Arc<RequestStore>,
    pub functions: Arc<FunctionRegistry>,
    pub responses: Arc<ResponseRouter>,
    pub caller: Arc<Caller>,
}

impl MeshNode {
    /// Binds the HTTP listener, assembles all components, spawns the server
    /// and the supervised periodic tasks, and returns the running node.
    pub async fn start(
        config: MeshConfig,
        functions: Arc<FunctionRegistry>,
    ) -> anyhow::Result<Arc<Self>> {
        let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
        let addr = listener.local_addr()?;
        let name = NodeName::from(addr);

        tracing::info!("Node {} starting", name);
        if !config.referrals.is_empty() {
            tracing::info!("Referrals: {:?}", config.referrals);
        }

        let config = Arc::new(config);
        let registry = Arc::new(NodeRegistry::new(name.clone(), config.metadata.clone()));
        let store = RequestStore::new(functions.clone(), config.clone());
        let responses = ResponseRouter::new();
        let caller = Caller::new(name.clone(), store.clone(), responses.clone());

        let node = Arc::new(Self {
            name,
            config,
            registry,
            store,
            functions,
            responses,
            caller,
        });

        let app = node.http_router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server terminated: {}", e);
            }
        });

        node.spawn_components();

        Ok(node)
    }

    /// The full RPC surface plus the public call facade and health stats.
    pub fn http_router(&self) -> Router {
        Router::new()
            .route(ENDPOINT_PING, get(handle_ping))
            .route(ENDPOINT_REGISTRY, get(handle_registry_get))
            .route(
                ENDPOINT_METADATA,
                get(handle_metadata_get).post(handle_metadata_push),
            )
            .route(ENDPOINT_ACCEPTANCE, post(handle_acceptance))
            .route(ENDPOINT_HANDLE, post(handle_insert_handling))
            .route(ENDPOINT_REMOVE, post(handle_remove))
            .route(ENDPOINT_RESPOND, post(handle_respond))
            .route(ENDPOINT_CALL, post(handle_call))
            .route("/health/stats", get(handle_stats))
            .layer(Extension(self.registry.clone()))
            .layer(Extension(self.store.clone()))
            .layer(Extension(self.functions.clone()))
            .layer(Extension(self.responses.clone()))
            .layer(Extension(self.caller.clone()))
    }

    fn spawn_components(&self) {
        let ping = PingTask::new(self.registry.clone(), self.config.clone());
        spawn_supervised("ping", move || ping.clone().run());

        let sync = SyncTask::new(self.registry.clone(), self.config.clone());
        spawn_supervised("sync", move || sync.clone().run());

        let assign = AssignTask::new(
            self.registry.clone(),
            self.store.clone(),
            self.config.clone(),
        );
        spawn_supervised("assign_requests", move || assign.clone().run());

        let handle = HandleTask::new(
            self.name.clone(),
            self.store.clone(),
            self.functions.clone(),
            self.responses.clone(),
            self.config.clone(),
        );
        spawn_supervised("handle_requests", move || handle.clone().run());
    }

    /// Asks the mesh to compute `module.function(args)`; blocks the caller
    /// until a result envelope arrives or the timeout fires.
    pub async fn make_it_so(
        &self,
        module: &str,
        function: &str,
        args: Vec<serde_json::Value>,
        timeout: Duration,
    ) -> Result<CallReply, CallError> {
        self.caller.make_it_so(module, function, args, timeout).await
    }
}

#[derive(Serialize)]
struct StatsResponse {
    node: String,
    known_nodes: usize,
    peers: Vec<String>,
    pending: usize,
    handling: usize,
    base_busyness: i64,
    busyness: i64,
    callables: usize,
    waiting_callers: usize,
    cpu_usage: f32,
    mem_used_mb: u64,
    mem_total_mb: u64,
}

async fn handle_stats(
    Extension(registry): Extension<Arc<NodeRegistry>>,
    Extension(store): Extension<Arc<RequestStore>>,
    Extension(functions): Extension<Arc<FunctionRegistry>>,
    Extension(responses): Extension<Arc<ResponseRouter>>,
) -> Json<StatsResponse> {
    let (pending, handling) = store.get().await;
    let peers = registry
        .peer_names()
        .await
        .into_iter()
        .map(|name| name.0)
        .collect();

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    let cpu_usage = sys.global_cpu_info().cpu_usage();
    // sysinfo reports memory in bytes.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(StatsResponse {
        node: registry.self_name().0.clone(),
        known_nodes: registry.len().await,
        peers,
        pending: pending.len(),
        handling: handling.len(),
        base_busyness: store.base_busyness().await,
        busyness: store.busyness().await,
        callables: functions.len(),
        waiting_callers: responses.waiting_count(),
        cpu_usage,
        mem_used_mb,
        mem_total_mb,
    })
}
