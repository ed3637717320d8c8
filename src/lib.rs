//! Administration console library for an agent gateway.
//!
//! Fetches the gateway's configuration graph, maps its config dump, applies
//! structural edits under the backend-policy rules and writes the graph back.

pub mod client;
pub mod config;
pub mod editor;
pub mod mapper;
pub mod model;
pub mod observability;
pub mod playground;
pub mod policy;

pub use client::{ClientError, GatewayClient, Snapshot};
pub use config::ConsoleConfig;
pub use editor::EditorError;
pub use mapper::config_dump_to_local_config;
pub use model::LocalConfig;
