//! Tool-invocation (MCP) client over streamable HTTP.

use rmcp::service::RunningService;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use url::Url;

use crate::observability::metrics;

use super::error::PlaygroundError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default)]
    pub structured_content: Option<Value>,
    #[serde(default)]
    is_error: Option<bool>,
}

impl CallToolResult {
    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Concatenated text of all `text` content items.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|c| c.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An initialized MCP session. Dropping it tears the session down; `close`
/// waits for that to finish.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
    endpoint: Url,
    timeout: Duration,
    server_info: Value,
}

impl McpClient {
    /// Connect and run the initialize handshake.
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, PlaygroundError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| PlaygroundError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        let transport = StreamableHttpClientTransport::from_config(StreamableHttpClientTransportConfig::with_uri(
            endpoint.to_string(),
        ));

        let service = within(timeout, "initialize", ().serve(transport))
            .await?
            .map_err(|e| PlaygroundError::Handshake(e.to_string()))?;

        let server_info = service
            .peer_info()
            .and_then(|info| serde_json::to_value(info).ok())
            .and_then(|info| info.get("serverInfo").cloned())
            .unwrap_or(Value::Null);

        tracing::info!(
            endpoint = %endpoint,
            server = server_info.get("name").and_then(serde_json::Value::as_str).unwrap_or("unknown"),
            "mcp session initialized"
        );
        Ok(Self {
            service,
            endpoint,
            timeout,
            server_info,
        })
    }

    /// The server's `serverInfo` from the handshake, or null.
    pub fn server_info(&self) -> &Value {
        &self.server_info
    }

    /// All tools, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, PlaygroundError> {
        let result = async {
            let tools = within(self.timeout, "tools/list", self.service.peer().list_all_tools()).await??;
            serde_json::to_value(tools)
                .and_then(serde_json::from_value)
                .map_err(|e| PlaygroundError::Malformed(e.to_string()))
        }
        .await;

        metrics::record_rpc_call("tools/list".to_string(), result.is_ok());
        result
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, PlaygroundError> {
        let arguments = match arguments {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(PlaygroundError::Malformed(format!(
                    "tool arguments must be a JSON object, got {}",
                    other
                )))
            }
        };
        let params = serde_json::from_value(json!({"name": name, "arguments": arguments}))
            .map_err(|e| PlaygroundError::Malformed(e.to_string()))?;

        let result = async {
            let result = within(self.timeout, "tools/call", self.service.peer().call_tool(params)).await??;
            serde_json::to_value(result)
                .and_then(serde_json::from_value)
                .map_err(|e| PlaygroundError::Malformed(e.to_string()))
        }
        .await;

        metrics::record_rpc_call("tools/call".to_string(), result.is_ok());
        result
    }

    /// End the session and wait for the transport to shut down.
    pub async fn close(self) {
        if let Err(e) = self.service.cancel().await {
            tracing::debug!(endpoint = %self.endpoint, error = %e, "mcp session did not shut down cleanly");
        }
    }
}

async fn within<F: Future>(timeout: Duration, operation: &'static str, future: F) -> Result<F::Output, PlaygroundError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| PlaygroundError::Timeout { operation, timeout })
}
