use thiserror::Error;

/// Failures talking to the gateway.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout; the gateway may not be running.
    #[error("could not reach gateway at {url}: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered the config read with HTTP 500; the body explains
    /// what is wrong with its configuration.
    #[error("gateway configuration error: {0}")]
    Configuration(String),

    #[error("gateway returned {status} for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// The graph changed on the gateway since it was fetched.
    #[error("configuration changed since it was fetched (version {expected:?}); re-fetch and reapply the edit")]
    Conflict { expected: Option<String> },

    #[error("configuration is managed externally and is read-only")]
    ReadOnly,

    #[error("could not decode gateway response: {0}")]
    Decode(String),

    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Short label used in metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ClientError::Connectivity { .. } => "connectivity",
            ClientError::Configuration(_) => "configuration",
            ClientError::Status { .. } => "status",
            ClientError::Conflict { .. } => "conflict",
            ClientError::ReadOnly => "read_only",
            ClientError::Decode(_) => "decode",
            ClientError::InvalidUrl(_) => "invalid_url",
        }
    }
}
