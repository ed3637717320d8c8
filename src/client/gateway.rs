//! HTTP client for the gateway's configuration API.

use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::{ConfigMode, GatewaySettings};
use crate::mapper::config_dump_to_local_config;
use crate::model::LocalConfig;
use crate::observability::metrics;

use super::error::ClientError;
use super::snapshot::{EditableConfig, ReadOnlyConfig, Snapshot};

const CONFIG_PATH: &str = "config";

#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base: Url,
    mode: ConfigMode,
    dump_path: String,
}

impl GatewayClient {
    pub fn new(settings: &GatewaySettings) -> Result<Self, ClientError> {
        let base = normalize_base(&settings.api_base_url)?;
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|source| ClientError::Connectivity {
                url: base.to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base,
            mode: settings.mode,
            dump_path: settings.dump_path.clone(),
        })
    }

    pub fn mode(&self) -> ConfigMode {
        self.mode
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch the whole graph, editable or not depending on the mode.
    pub async fn fetch(&self) -> Result<Snapshot, ClientError> {
        match self.mode {
            ConfigMode::Static => self.fetch_config().await.map(Snapshot::Editable),
            ConfigMode::Dump => self.fetch_dump().await.map(Snapshot::ReadOnly),
        }
    }

    /// `GET /config`.
    pub async fn fetch_config(&self) -> Result<EditableConfig, ClientError> {
        let url = self.url(CONFIG_PATH)?;
        tracing::debug!(url = %url, "fetching configuration");

        let result = async {
            let response = self.send(&url, self.http.get(url.clone())).await?;
            let status = response.status();
            let version = header_text(&response, ETAG);
            let body = read_body(&url, response).await?;

            if status == StatusCode::INTERNAL_SERVER_ERROR {
                return Err(ClientError::Configuration(body));
            }
            if !status.is_success() {
                return Err(status_error(status, &url, body));
            }

            let config: LocalConfig =
                serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
            Ok::<_, ClientError>(EditableConfig::new(config, version))
        }
        .await;

        record("config_read", &result);
        result
    }

    /// Fetch the config dump and map it into a read-only graph.
    pub async fn fetch_dump(&self) -> Result<ReadOnlyConfig, ClientError> {
        let dump = self.fetch_raw_dump().await?;
        Ok(ReadOnlyConfig::new(config_dump_to_local_config(&dump)))
    }

    /// The config dump as returned by the gateway.
    pub async fn fetch_raw_dump(&self) -> Result<Value, ClientError> {
        let url = self.url(&self.dump_path)?;
        tracing::debug!(url = %url, "fetching config dump");

        let result = self.get_json(&url).await;
        record("config_dump", &result);
        result
    }

    /// `POST /config` with the whole graph.
    ///
    /// Sends the fetched version as `If-Match` when there is one and stores
    /// the version the gateway returns, so the same `EditableConfig` can be
    /// edited and written again.
    pub async fn update(&self, editable: &mut EditableConfig) -> Result<(), ClientError> {
        if self.mode == ConfigMode::Dump {
            tracing::warn!("refusing to write configuration in dump mode");
            return Err(ClientError::ReadOnly);
        }

        let url = self.url(CONFIG_PATH)?;
        let mut request = self.http.post(url.clone()).json(editable.config());
        if let Some(version) = editable.version() {
            request = request.header(IF_MATCH, version);
        }
        tracing::info!(
            url = %url,
            binds = editable.config().binds.len(),
            version = ?editable.version(),
            "writing configuration"
        );

        let result = async {
            let response = self.send(&url, request).await?;
            let status = response.status();
            let version = header_text(&response, ETAG);

            if status == StatusCode::CONFLICT || status == StatusCode::PRECONDITION_FAILED {
                return Err(ClientError::Conflict {
                    expected: editable.version().map(str::to_string),
                });
            }
            if !status.is_success() {
                let body = read_body(&url, response).await?;
                return Err(status_error(status, &url, body));
            }
            Ok::<_, ClientError>(version)
        }
        .await;

        record("config_write", &result);
        editable.set_version(result?);
        Ok(())
    }

    pub(crate) fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub(crate) async fn send(&self, url: &Url, request: RequestBuilder) -> Result<Response, ClientError> {
        request.send().await.map_err(|source| {
            tracing::warn!(url = %url, error = %source, "gateway request failed");
            ClientError::Connectivity {
                url: url.to_string(),
                source,
            }
        })
    }

    pub(crate) async fn get_json(&self, url: &Url) -> Result<Value, ClientError> {
        let response = self.send(url, self.http.get(url.clone())).await?;
        let body = expect_success(url, response).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Parse the base URL and make sure relative joins append to its path.
fn normalize_base(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn header_text(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn read_body(url: &Url, response: Response) -> Result<String, ClientError> {
    response.text().await.map_err(|source| ClientError::Connectivity {
        url: url.to_string(),
        source,
    })
}

pub(crate) async fn expect_success(url: &Url, response: Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = read_body(url, response).await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(status_error(status, url, body))
    }
}

fn status_error(status: StatusCode, url: &Url, body: String) -> ClientError {
    ClientError::Status {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    }
}

pub(crate) fn record<T>(endpoint: &'static str, result: &Result<T, ClientError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics::record_gateway_request(endpoint, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> GatewaySettings {
        GatewaySettings {
            api_base_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = GatewayClient::new(&settings("http://localhost:15000/api")).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:15000/api/");
        assert_eq!(
            client.url("/config").unwrap().as_str(),
            "http://localhost:15000/api/config"
        );
    }

    #[test]
    fn test_dump_path_joins_under_base() {
        let client = GatewayClient::new(&settings("http://gw:15000")).unwrap();
        assert_eq!(
            client.url("/config_dump").unwrap().as_str(),
            "http://gw:15000/config_dump"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            GatewayClient::new(&settings("::nope")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_update_refused_in_dump_mode() {
        let client = GatewayClient::new(&GatewaySettings {
            mode: ConfigMode::Dump,
            ..Default::default()
        })
        .unwrap();
        let mut editable = EditableConfig::new(LocalConfig::default(), None);
        assert!(matches!(
            client.update(&mut editable).await,
            Err(ClientError::ReadOnly)
        ));
    }
}
