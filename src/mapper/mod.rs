//! Translation between the gateway's config dump and the local graph.
//!
//! # Data Flow
//! ```text
//! GET <dump_path> (loosely typed JSON)
//!     → map_backends (flat list, malformed entries dropped)
//!     → PolicyIndex (top-level policies keyed by route / backend)
//!     → binds → listeners → routes / tcpRoutes
//!         → backend refs resolved by name, unknown names inlined as host
//!     → LocalConfig
//! ```
//!
//! # Design Decisions
//! - Never fails; degraded input produces a smaller graph, drops are logged
//! - Service names are split heuristically (see `NamespacedHostname::from_service_name`)
//! - `local_config_to_dump` exists for round-trip checks, not for writing to the gateway

pub mod dump;
pub mod reverse;

pub use dump::{config_dump_to_local_config, map_backends, NamedBackend};
pub use reverse::local_config_to_dump;
