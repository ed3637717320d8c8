//! Gateway HTTP client.
//!
//! # Data Flow
//! ```text
//! static mode: GET /config ──▶ EditableConfig (graph + ETag)
//!                  edit in memory
//!              POST /config (If-Match: ETag) ──▶ new ETag | Conflict
//!
//! dump mode:   GET <dump_path> ──mapper──▶ ReadOnlyConfig
//!              POST refused with ClientError::ReadOnly
//! ```
//!
//! # Design Decisions
//! - Whole-graph reads and writes; the gateway is the only source of truth
//! - HTTP 500 on read is a configuration error, distinct from connectivity
//! - No automatic retries; callers re-fetch and reapply after a conflict

pub mod error;
pub mod gateway;
pub mod legacy;
pub mod snapshot;

pub use error::ClientError;
pub use gateway::GatewayClient;
pub use legacy::LegacyResource;
pub use snapshot::{EditableConfig, ReadOnlyConfig, Snapshot};
