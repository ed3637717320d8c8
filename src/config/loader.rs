//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ConsoleConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `gateway.api_base_url`.
pub const API_URL_ENV: &str = "GATEWAY_CONSOLE_API_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file, then apply environment
/// overrides.
pub fn load_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ConsoleConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finish(config)
}

/// Like `load_config`, but a missing path means defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<ConsoleConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finish(ConsoleConfig::default()),
    }
}

fn finish(mut config: ConsoleConfig) -> Result<ConsoleConfig, ConfigError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        api_base_url = %config.gateway.api_base_url,
        mode = ?config.gateway.mode,
        "console configuration loaded"
    );
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut ConsoleConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
        config.gateway.api_base_url = url.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_replaces_api_url() {
        let mut config = ConsoleConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == API_URL_ENV).then(|| " http://10.0.0.5:15000 ".to_string())
        });
        assert_eq!(config.gateway.api_base_url, "http://10.0.0.5:15000");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = ConsoleConfig::default();
        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.gateway.api_base_url, "http://localhost:15000");
    }

    #[test]
    fn test_load_reports_validation_errors() {
        let dir = std::env::temp_dir().join(format!("console-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("console.toml");
        fs::write(&path, "[gateway]\nrequest_timeout_secs = 0\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.contains(&ValidationError::ZeroTimeout)));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/console.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
