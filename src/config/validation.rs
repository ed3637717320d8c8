//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConsoleConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ConsoleConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gateway.api_base_url '{url}' is not a valid URL: {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("gateway.api_base_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("gateway.dump_path must start with '/', got '{0}'")]
    InvalidDumpPath(String),

    #[error("gateway.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let gateway = &config.gateway;

    match Url::parse(&gateway.api_base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidApiUrl {
            url: gateway.api_base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if !gateway.dump_path.starts_with('/') {
        errors.push(ValidationError::InvalidDumpPath(gateway.dump_path.clone()));
    }

    if gateway.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
