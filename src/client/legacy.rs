//! Per-resource REST endpoints kept for older call paths.
//!
//! These are convenience views over the same graph `GET /config` returns.
//! Payloads stay untyped JSON.

use serde_json::Value;
use std::fmt;
use url::Url;

use super::error::ClientError;
use super::gateway::{expect_success, record, GatewayClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyResource {
    Listeners,
    McpTargets,
    A2aTargets,
}

impl LegacyResource {
    pub fn path(&self) -> &'static str {
        match self {
            LegacyResource::Listeners => "listeners",
            LegacyResource::McpTargets => "targets/mcp",
            LegacyResource::A2aTargets => "targets/a2a",
        }
    }
}

impl fmt::Display for LegacyResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl GatewayClient {
    /// `GET /<resource>`.
    pub async fn list(&self, resource: LegacyResource) -> Result<Value, ClientError> {
        let url = self.url(resource.path())?;
        let result = self.get_json(&url).await;
        record("legacy_list", &result);
        result
    }

    /// `GET /<resource>/<name>`.
    pub async fn get(&self, resource: LegacyResource, name: &str) -> Result<Value, ClientError> {
        let url = self.named_url(resource, name)?;
        let result = self.get_json(&url).await;
        record("legacy_get", &result);
        result
    }

    /// `POST /<resource>` with the item as body.
    pub async fn create(&self, resource: LegacyResource, item: &Value) -> Result<(), ClientError> {
        let url = self.url(resource.path())?;
        tracing::info!(resource = %resource, "creating item");

        let result = async {
            let response = self.send(&url, self.http().post(url.clone()).json(item)).await?;
            expect_success(&url, response).await.map(|_| ())
        }
        .await;
        record("legacy_create", &result);
        result
    }

    /// `DELETE /<resource>/<name>`.
    pub async fn delete(&self, resource: LegacyResource, name: &str) -> Result<(), ClientError> {
        let url = self.named_url(resource, name)?;
        tracing::info!(resource = %resource, name, "deleting item");

        let result = async {
            let response = self.send(&url, self.http().delete(url.clone())).await?;
            expect_success(&url, response).await.map(|_| ())
        }
        .await;
        record("legacy_delete", &result);
        result
    }

    fn named_url(&self, resource: LegacyResource, name: &str) -> Result<Url, ClientError> {
        let mut url = self.url(resource.path())?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(url_text(resource, name)))?
            .push(name);
        Ok(url)
    }
}

fn url_text(resource: LegacyResource, name: &str) -> String {
    format!("{}/{}", resource.path(), name)
}
