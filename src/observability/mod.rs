//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client, editor, mapper, playground
//!     → tracing events (structured fields)   → logging.rs (fmt subscriber)
//!     → metrics counters (metrics facade)    → whatever recorder the host installs
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or recorder is the binary's job
//! - `RUST_LOG` wins over the configured level
//! - No exporter by default, counters are no-ops until a recorder exists

pub mod logging;
pub mod metrics;
