//! Configuration graph domain model.
//!
//! # Data Flow
//! ```text
//! GET /config (JSON)  ──serde──▶ LocalConfig
//! config dump (JSON)  ──mapper─▶ LocalConfig
//!
//! LocalConfig
//!     → binds (by port)
//!         → listeners (by name, "unnamed" when absent)
//!             → routes / tcpRoutes (by index or ElementId)
//!                 → backends (by index or ElementId)
//! ```
//!
//! # Design Decisions
//! - Backends are a sum type; exactly one kind per backend is a type-level fact
//! - Routes and backends carry a stable `ElementId` that is never serialized
//! - Policy payloads stay opaque JSON, unknown keys are preserved

pub mod backend;
pub mod graph;
pub mod ids;
pub mod policies;

pub use backend::{
    AiBackend, Backend, BackendKind, HttpTargetSpec, McpBackend, McpTarget, McpTargetSpec,
    NamespacedHostname, RouteBackend, SimpleBackend, TcpRouteBackend,
};
pub use graph::{
    Bind, HeaderMatch, Listener, ListenerProtocol, LocalConfig, PathMatch, QueryMatch, Route,
    RouteKind, RouteMatch, TcpRoute, TlsConfig, ValueMatch, UNNAMED_LISTENER,
};
pub use ids::{ElementId, Identified};
pub use policies::{Policies, PolicyKind, TcpPolicies};
