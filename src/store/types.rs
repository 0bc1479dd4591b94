use crate::membership::types::NodeName;
use serde::{Deserialize, Serialize};

/// Unique identifier of a request, random per creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// A deferred invocation record routed across the mesh.
///
/// `origin_node` never changes after creation; delegation only moves which
/// node holds the request in its handling list. `caller_handle` addresses
/// the waiting caller on the origin node and is opaque everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub origin_node: NodeName,
    pub caller_handle: String,
    pub module: String,
    pub function: String,
    pub args: Vec<serde_json::Value>,
}

impl Request {
    pub fn new(
        origin_node: NodeName,
        caller_handle: String,
        module: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            origin_node,
            caller_handle,
            module: module.to_string(),
            function: function.to_string(),
            args,
        }
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }
}
