//! Console configuration subsystem.
//!
//! # Data Flow
//! ```text
//! console.toml (optional)
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → GATEWAY_CONSOLE_API_URL override
//!     → validation.rs (semantic checks)
//!     → ConsoleConfig
//!     → CLI flags override individual fields
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_or_default, ConfigError};
pub use schema::{ConfigMode, ConsoleConfig, GatewaySettings, ObservabilitySettings};
pub use validation::{validate_config, ValidationError};
