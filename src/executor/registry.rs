//! Callable registry.
//!
//! Maps `module.function/arity` to executable Rust code. A request is
//! resolvable on a node exactly when a callable with a matching key was
//! registered there; the scheduler treats unresolvable requests as
//! ineligible rather than erroring.

use crate::store::types::Request;

use anyhow::Result;
use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type MeshFn = Arc<
    dyn Fn(Vec<serde_json::Value>) -> Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send>>
        + Send
        + Sync,
>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FunctionKey {
    module: String,
    function: String,
    arity: usize,
}

pub struct FunctionRegistry {
    functions: DashMap<FunctionKey, MeshFn>,
}

impl FunctionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            functions: DashMap::new(),
        })
    }

    pub fn register<F, Fut>(&self, module: &str, function: &str, arity: usize, callable: F)
    where
        F: Fn(Vec<serde_json::Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value>> + Send + 'static,
    {
        let callable: MeshFn = Arc::new(move |args| {
            Box::pin(callable(args))
                as Pin<Box<dyn Future<Output = Result<serde_json::Value>> + Send>>
        });

        let key = FunctionKey {
            module: module.to_string(),
            function: function.to_string(),
            arity,
        };
        self.functions.insert(key, callable);

        tracing::info!("Registered callable {}.{}/{}", module, function, arity);
    }

    pub fn resolves(&self, module: &str, function: &str, arity: usize) -> bool {
        let key = FunctionKey {
            module: module.to_string(),
            function: function.to_string(),
            arity,
        };
        self.functions.contains_key(&key)
    }

    /// Resolves and invokes the callable for a request. The callable is
    /// cloned out of the map before it is awaited so no map guard is held
    /// during execution.
    pub async fn invoke(&self, request: &Request) -> Result<serde_json::Value> {
        let key = FunctionKey {
            module: request.module.clone(),
            function: request.function.clone(),
            arity: request.arity(),
        };

        let callable = self
            .functions
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no callable for {}.{}/{}",
                    request.module,
                    request.function,
                    request.arity()
                )
            })?;

        callable(request.args.clone()).await
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }
}
