use crate::membership::types::NodeName;
use crate::store::types::{Request, RequestId};
use serde::{Deserialize, Serialize};

// Endpoints
pub const ENDPOINT_RESPOND: &str = "/internal/respond";
pub const ENDPOINT_CALL: &str = "/call";

/// The result envelope an executor ships back to the originator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseEnvelope {
    /// Successful execution: the value plus the node that computed it.
    Response {
        id: RequestId,
        node: NodeName,
        result: serde_json::Value,
    },
    /// Execution failed: the full request for diagnosis, the node where the
    /// failure occurred, and the stringified cause.
    Error {
        request: Request,
        node: NodeName,
        reason: String,
    },
}

/// Delivery of an envelope to the waiting caller on the origin node.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliverResponseRequest {
    pub caller_handle: String,
    pub envelope: ResponseEnvelope,
}

/// HTTP facade over the call site, so an operator can originate a request
/// with curl.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallRequest {
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallResponse {
    Ok {
        result: serde_json::Value,
        executing_node: NodeName,
    },
    Timeout,
    Error {
        executing_node: NodeName,
        reason: String,
    },
}
