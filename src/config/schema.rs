//! Configuration schema definitions.
//!
//! Settings for the console itself: where the gateway lives and how to talk
//! to it. The gateway's own configuration graph lives in `crate::model`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Gateway connection settings.
    pub gateway: GatewaySettings,

    /// Observability settings.
    pub observability: ObservabilitySettings,
}

/// How the gateway exposes its configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConfigMode {
    /// Editable graph via `GET/POST /config`.
    #[default]
    Static,
    /// Read-only introspection dump, managed externally.
    Dump,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GatewaySettings {
    /// Base URL of the gateway admin API (e.g., "http://localhost:15000").
    pub api_base_url: String,

    pub mode: ConfigMode,

    /// Path of the config dump endpoint, used in dump mode.
    pub dump_path: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl GatewaySettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:15000".to_string(),
            mode: ConfigMode::Static,
            dump_path: "/config_dump".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Log level filter for this crate (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ConsoleConfig = toml::from_str("").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.gateway.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            [gateway]
            api_base_url = "http://gw.internal:15000"
            mode = "dump"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.mode, ConfigMode::Dump);
        assert_eq!(config.gateway.dump_path, "/config_dump");
        assert_eq!(config.observability.log_level, "info");
    }
}
