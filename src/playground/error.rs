use std::time::Duration;
use thiserror::Error;

use super::jsonrpc::JsonRpcError;

#[derive(Debug, Error)]
pub enum PlaygroundError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The server answered with a JSON-RPC error object.
    #[error(transparent)]
    Rpc(#[from] JsonRpcError),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("invalid endpoint: {0}")]
    InvalidUrl(String),

    /// The MCP initialize exchange did not complete.
    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    /// The MCP session failed outside a JSON-RPC error reply.
    #[error("MCP session error: {0}")]
    Session(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl From<rmcp::ServiceError> for PlaygroundError {
    fn from(error: rmcp::ServiceError) -> Self {
        match error {
            rmcp::ServiceError::McpError(data) => PlaygroundError::Rpc(JsonRpcError {
                code: i64::from(data.code.0),
                message: data.message.to_string(),
                data: data.data,
            }),
            other => PlaygroundError::Session(other.to_string()),
        }
    }
}
