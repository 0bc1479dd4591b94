//! HTTP client side of the node-to-node RPC surface.
//!
//! A node name is its HTTP address, so building a URL is string formatting.
//! All calls funnel through one retry loop that is generic over the request
//! being sent: mutating calls get a few jittered-backoff attempts, score
//! polls a single short one because the next assignment cycle repeats them
//! anyway, and the liveness ping is a plain yes/no probe.

use crate::executor::protocol::{DeliverResponseRequest, ResponseEnvelope, ENDPOINT_RESPOND};
use crate::membership::protocol::{
    MetadataResponse, PushMetadataRequest, RegistryResponse, ENDPOINT_METADATA, ENDPOINT_PING,
    ENDPOINT_REGISTRY,
};
use crate::membership::types::{Metadata, NodeName};
use crate::store::protocol::{
    AcceptanceRequest, AcceptanceResponse, InsertHandlingRequest, RemoveRequest,
    ENDPOINT_ACCEPTANCE, ENDPOINT_HANDLE, ENDPOINT_REMOVE,
};
use crate::store::types::{Request, RequestId};

use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

const PING_TIMEOUT: Duration = Duration::from_millis(500);
const POLL_TIMEOUT: Duration = Duration::from_millis(250);
const RPC_TIMEOUT: Duration = Duration::from_millis(500);
const RPC_ATTEMPTS: usize = 3;

const RETRY_BACKOFF_START_MS: u64 = 100;
const RETRY_BACKOFF_CAP_MS: u64 = 1000;
const RETRY_JITTER_MS: u64 = 25;

#[derive(Clone)]
pub struct PeerClient {
    http: reqwest::Client,
}

impl PeerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, node: &NodeName, path: &str) -> String {
        format!("http://{}{}", node.0, path)
    }

    /// Liveness probe. Any response with a success status counts.
    pub async fn ping(&self, node: &NodeName) -> bool {
        let response = self
            .http
            .get(self.url(node, ENDPOINT_PING))
            .timeout(PING_TIMEOUT)
            .send()
            .await;

        matches!(response, Ok(resp) if resp.status().is_success())
    }

    pub async fn fetch_registry(&self, node: &NodeName) -> Result<HashMap<NodeName, Metadata>> {
        let response = self
            .send_with_retry(
                || {
                    self.http
                        .get(self.url(node, ENDPOINT_REGISTRY))
                        .timeout(RPC_TIMEOUT)
                },
                RPC_ATTEMPTS,
            )
            .await?;

        let body: RegistryResponse = response.json().await?;
        Ok(body
            .nodes
            .into_iter()
            .map(|(name, metadata)| (NodeName(name), metadata))
            .collect())
    }

    pub async fn fetch_metadata(&self, node: &NodeName) -> Result<Metadata> {
        let response = self
            .send_with_retry(
                || {
                    self.http
                        .get(self.url(node, ENDPOINT_METADATA))
                        .timeout(RPC_TIMEOUT)
                },
                RPC_ATTEMPTS,
            )
            .await?;

        let body: MetadataResponse = response.json().await?;
        Ok(body.metadata)
    }

    pub async fn push_metadata(
        &self,
        node: &NodeName,
        from: &NodeName,
        metadata: Metadata,
    ) -> Result<()> {
        let payload = PushMetadataRequest {
            node: from.0.clone(),
            metadata,
        };
        self.send_with_retry(
            || {
                self.http
                    .post(self.url(node, ENDPOINT_METADATA))
                    .json(&payload)
                    .timeout(RPC_TIMEOUT)
            },
            RPC_ATTEMPTS,
        )
        .await?;

        Ok(())
    }

    /// Polls a peer's acceptance score for one request. Single short
    /// attempt; failures read as ineligible at the call site.
    pub async fn acceptance_priority(
        &self,
        node: &NodeName,
        request: &Request,
    ) -> Result<Option<i64>> {
        let payload = AcceptanceRequest {
            request: request.clone(),
        };
        let response = self
            .send_with_retry(
                || {
                    self.http
                        .post(self.url(node, ENDPOINT_ACCEPTANCE))
                        .json(&payload)
                        .timeout(POLL_TIMEOUT)
                },
                1,
            )
            .await?;

        let body: AcceptanceResponse = response.json().await?;
        Ok(body.priority)
    }

    /// Delegation push into a peer's handling list.
    pub async fn insert_handling(&self, node: &NodeName, request: &Request) -> Result<()> {
        let payload = InsertHandlingRequest {
            request: request.clone(),
        };
        self.send_with_retry(
            || {
                self.http
                    .post(self.url(node, ENDPOINT_HANDLE))
                    .json(&payload)
                    .timeout(RPC_TIMEOUT)
            },
            RPC_ATTEMPTS,
        )
        .await?;

        Ok(())
    }

    /// Completion cleanup on the originator.
    pub async fn remove_request(&self, node: &NodeName, id: &RequestId) -> Result<()> {
        let payload = RemoveRequest { id: id.clone() };
        self.send_with_retry(
            || {
                self.http
                    .post(self.url(node, ENDPOINT_REMOVE))
                    .json(&payload)
                    .timeout(RPC_TIMEOUT)
            },
            RPC_ATTEMPTS,
        )
        .await?;

        Ok(())
    }

    /// Ships a result envelope to the caller waiting on the origin node.
    pub async fn deliver_response(
        &self,
        node: &NodeName,
        caller_handle: &str,
        envelope: &ResponseEnvelope,
    ) -> Result<()> {
        let payload = DeliverResponseRequest {
            caller_handle: caller_handle.to_string(),
            envelope: envelope.clone(),
        };
        self.send_with_retry(
            || {
                self.http
                    .post(self.url(node, ENDPOINT_RESPOND))
                    .json(&payload)
                    .timeout(RPC_TIMEOUT)
            },
            RPC_ATTEMPTS,
        )
        .await?;

        Ok(())
    }

    /// Sends the request produced by `build`, retrying transport failures
    /// with jittered exponential backoff. Non-success statuses are returned
    /// as errors without retry: on this internal surface a 4xx/5xx is a peer
    /// answering, not a flaky link.
    async fn send_with_retry<F>(&self, build: F, attempts: usize) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut backoff = RETRY_BACKOFF_START_MS;

        for attempt in 1..=attempts {
            match build().send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    return Err(anyhow::anyhow!("{} returned {}", resp.url(), resp.status()));
                }
                Err(e) if attempt == attempts => return Err(anyhow::anyhow!(e)),
                Err(_) => {
                    let jitter = rand::random::<u64>() % RETRY_JITTER_MS;
                    tokio::time::sleep(Duration::from_millis(backoff + jitter)).await;
                    backoff = (backoff * 2).min(RETRY_BACKOFF_CAP_MS);
                }
            }
        }

        Err(anyhow::anyhow!("retry attempts exhausted"))
    }
}

impl Default for PeerClient {
    fn default() -> Self {
        Self::new()
    }
}
