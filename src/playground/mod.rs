//! Playground clients for exercising configured endpoints.
//!
//! # Data Flow
//! ```text
//! CLI (tools, call-tool, send-message)
//!     → McpClient (rmcp streamable-HTTP session)
//!     → A2aClient → RpcTransport (JSON-RPC 2.0 over POST, JSON or SSE reply)
//!     → gateway listener → MCP / A2A backend
//! ```
//!
//! # Design Decisions
//! - MCP sessions are owned by rmcp; this layer only bounds each call with
//!   the configured timeout and reshapes results
//! - A2A is plain request/response; event-stream replies are read until
//!   the matching response arrives
//! - Results other than tool lists and tasks stay untyped JSON

pub mod a2a;
pub mod error;
pub mod jsonrpc;
pub mod mcp;

pub use a2a::{A2aClient, AgentCard, AgentSkill, SendResult, Task, TaskStatus};
pub use error::PlaygroundError;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcTransport};
pub use mcp::{CallToolResult, McpClient, Tool};
