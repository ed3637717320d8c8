//! Capability-typed configuration snapshots.
//!
//! A graph fetched in static mode can be edited and written back; a graph
//! mapped from the config dump can only be read. The distinction lives in
//! the type, so `GatewayClient::update` cannot be handed a read-only graph.

use crate::model::LocalConfig;

use super::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Editable(EditableConfig),
    ReadOnly(ReadOnlyConfig),
}

impl Snapshot {
    pub fn config(&self) -> &LocalConfig {
        match self {
            Snapshot::Editable(e) => e.config(),
            Snapshot::ReadOnly(r) => r.config(),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Snapshot::Editable(_))
    }

    /// Unwrap the editable graph, or fail with `ClientError::ReadOnly`.
    pub fn into_editable(self) -> Result<EditableConfig, ClientError> {
        match self {
            Snapshot::Editable(e) => Ok(e),
            Snapshot::ReadOnly(_) => Err(ClientError::ReadOnly),
        }
    }

    pub fn into_config(self) -> LocalConfig {
        match self {
            Snapshot::Editable(e) => e.config,
            Snapshot::ReadOnly(r) => r.config,
        }
    }
}

/// Graph that may be edited and written back, with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct EditableConfig {
    config: LocalConfig,
    version: Option<String>,
}

impl EditableConfig {
    pub fn new(config: LocalConfig, version: Option<String>) -> Self {
        Self { config, version }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LocalConfig {
        &mut self.config
    }

    /// `ETag` of the fetch, sent back as `If-Match` on update.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub(crate) fn set_version(&mut self, version: Option<String>) {
        self.version = version;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOnlyConfig {
    config: LocalConfig,
}

impl ReadOnlyConfig {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }
}
