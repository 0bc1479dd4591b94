//! HTTP handlers for response delivery and the public call facade.

use super::caller::{CallError, Caller, ResponseRouter};
use super::protocol::*;

use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;
use std::time::Duration;

/// Completes the caller waiting on the delivered envelope. Always 200: a
/// missing caller just means the response arrived after the timeout.
pub async fn handle_respond(
    Extension(router): Extension<Arc<ResponseRouter>>,
    Json(req): Json<DeliverResponseRequest>,
) -> StatusCode {
    router.deliver(&req.caller_handle, req.envelope);
    StatusCode::OK
}

/// Originates a request from an HTTP client instead of embedded code.
pub async fn handle_call(
    Extension(caller): Extension<Arc<Caller>>,
    Json(req): Json<CallRequest>,
) -> (StatusCode, Json<CallResponse>) {
    let timeout = req
        .timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(Caller::default_timeout);

    match caller
        .make_it_so(&req.module, &req.function, req.args, timeout)
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(CallResponse::Ok {
                result: reply.result,
                executing_node: reply.executing_node,
            }),
        ),
        Err(CallError::Timeout) => (StatusCode::GATEWAY_TIMEOUT, Json(CallResponse::Timeout)),
        Err(CallError::Execution { node, reason }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(CallResponse::Error {
                executing_node: node,
                reason,
            }),
        ),
    }
}
