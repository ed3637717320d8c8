//! JSON-RPC 2.0 over HTTP POST.
//!
//! Servers may answer with a plain JSON body or with an event stream whose
//! `data:` payloads carry the response.

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sse_stream::SseStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::observability::metrics;

use super::error::PlaygroundError;

pub const JSONRPC_VERSION: &str = "2.0";

const EVENT_STREAM: &str = "text/event-stream";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    /// Absent for notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn into_result(self) -> Result<Value, PlaygroundError> {
        match (self.error, self.result) {
            (Some(error), _) => Err(PlaygroundError::Rpc(error)),
            (None, result) => Ok(result.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// POSTs JSON-RPC envelopes to one endpoint.
#[derive(Debug)]
pub struct RpcTransport {
    http: reqwest::Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl RpcTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, PlaygroundError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| PlaygroundError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| PlaygroundError::Transport {
                url: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            endpoint,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request and wait for its result.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, PlaygroundError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            method: method.to_string(),
            params,
        };
        tracing::debug!(endpoint = %self.endpoint, method, id, "rpc call");

        let result = self
            .exchange(&request, id)
            .await
            .and_then(JsonRpcResponse::into_result);

        metrics::record_rpc_call(method.to_string(), result.is_ok());
        result
    }

    async fn exchange(&self, request: &JsonRpcRequest, id: u64) -> Result<JsonRpcResponse, PlaygroundError> {
        let transport = |source| PlaygroundError::Transport {
            url: self.endpoint.to_string(),
            source,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(transport)?;
            return Err(PlaygroundError::Status {
                url: self.endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let streamed = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(EVENT_STREAM));
        if streamed {
            return read_event_stream(response, id).await;
        }

        let body = response.text().await.map_err(transport)?;
        parse_body(&body)
    }
}

fn parse_body(body: &str) -> Result<JsonRpcResponse, PlaygroundError> {
    serde_json::from_str(body).map_err(|e| PlaygroundError::Malformed(e.to_string()))
}

/// Wraps body errors so the event parser can box them.
#[derive(Debug)]
struct BodyError(reqwest::Error);

impl std::fmt::Display for BodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Reads events until the one answering `id`; progress notifications and
/// unrelated messages are skipped.
async fn read_event_stream(response: reqwest::Response, id: u64) -> Result<JsonRpcResponse, PlaygroundError> {
    let mut events = std::pin::pin!(SseStream::from_byte_stream(
        response.bytes_stream().map(|r| r.map_err(BodyError))
    ));
    let wanted = Value::from(id);

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| PlaygroundError::Malformed(e.to_string()))?;
        let Some(data) = event.data else {
            continue;
        };
        match serde_json::from_str::<JsonRpcResponse>(&data) {
            Ok(response) if response.id == wanted => return Ok(response),
            Ok(_) => continue,
            Err(e) => tracing::debug!(error = %e, "skipping non-JSON event"),
        }
    }

    Err(PlaygroundError::Malformed(
        "event stream ended without a JSON-RPC response".into(),
    ))
}
