use super::types::{Request, RequestId};
use serde::{Deserialize, Serialize};

// Endpoints
pub const ENDPOINT_ACCEPTANCE: &str = "/internal/acceptance";
pub const ENDPOINT_HANDLE: &str = "/internal/handle";
pub const ENDPOINT_REMOVE: &str = "/internal/remove";

/// Score poll issued by an assigner for one pending request.
#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptanceRequest {
    pub request: Request,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptanceResponse {
    /// Higher is preferred; `None` means ineligible.
    pub priority: Option<i64>,
}

/// Delegation push: insert the request into the receiver's handling list.
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertHandlingRequest {
    pub request: Request,
}

/// Completion cleanup: remove the request from both of the receiver's lists.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub id: RequestId,
}
