//! Backend definitions.
//!
//! A backend is exactly one of service, host, mcp, ai or dynamic. Route
//! backends wrap it with a weight and a stable id.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::ids::{ElementId, Identified};

/// Kubernetes-style service name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamespacedHostname {
    pub namespace: String,
    pub hostname: String,
}

impl NamespacedHostname {
    pub fn new(namespace: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            hostname: hostname.into(),
        }
    }

    /// Recover namespace and hostname from a combined service name.
    ///
    /// `ns/host` splits on the first `/`. A dotted FQDN keeps only its first
    /// label as the hostname, with an empty namespace. Anything else is a bare
    /// hostname. Lossy for multi-segment FQDNs.
    pub fn from_service_name(name: &str) -> Self {
        if let Some((namespace, hostname)) = name.split_once('/') {
            return Self::new(namespace, hostname);
        }
        match name.split_once('.') {
            Some((first, _)) => Self::new("", first),
            None => Self::new("", name),
        }
    }
}

impl fmt::Display for NamespacedHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.hostname)
        } else {
            write!(f, "{}/{}", self.namespace, self.hostname)
        }
    }
}

impl Serialize for NamespacedHostname {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NamespacedHostname {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Parts {
                #[serde(default)]
                namespace: String,
                hostname: String,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) if s.is_empty() => Err(de::Error::custom("empty service name")),
            Repr::Text(s) => Ok(Self::from_service_name(&s)),
            Repr::Parts { namespace, hostname } => Ok(Self { namespace, hostname }),
        }
    }
}

/// Traffic destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Backend {
    /// Reference to a service known to the gateway.
    Service { name: NamespacedHostname, port: u16 },
    /// Static hostname or IP with port, e.g. `example.com:443`.
    Host(String),
    /// Set of tool-invocation targets.
    Mcp(McpBackend),
    /// Model provider.
    Ai(AiBackend),
    Dynamic {},
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Service { .. } => BackendKind::Service,
            Backend::Host(_) => BackendKind::Host,
            Backend::Mcp(_) => BackendKind::Mcp,
            Backend::Ai(_) => BackendKind::Ai,
            Backend::Dynamic {} => BackendKind::Dynamic,
        }
    }

    /// Short human readable target, used in tables.
    pub fn describe(&self) -> String {
        match self {
            Backend::Service { name, port } => format!("{}:{}", name, port),
            Backend::Host(target) => target.clone(),
            Backend::Mcp(mcp) => {
                let names: Vec<&str> = mcp.targets.iter().map(|t| t.name.as_str()).collect();
                format!("{} target(s): {}", names.len(), names.join(", "))
            }
            Backend::Ai(ai) => ai.provider_name().unwrap_or("unknown").to_string(),
            Backend::Dynamic {} => "dynamic".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Service,
    Host,
    Mcp,
    Ai,
    Dynamic,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Service => "service",
            BackendKind::Host => "host",
            BackendKind::Mcp => "mcp",
            BackendKind::Ai => "ai",
            BackendKind::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpBackend {
    #[serde(default)]
    pub targets: Vec<McpTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stateful: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTarget {
    pub name: String,
    #[serde(flatten)]
    pub spec: McpTargetSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum McpTargetSpec {
    Sse(HttpTargetSpec),
    Mcp(HttpTargetSpec),
    Stdio {
        cmd: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    Openapi(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpTargetSpec {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiBackend {
    /// Provider block, e.g. `{"openAI": {"model": "gpt-4o"}}`.
    pub provider: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_override: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tokenize: bool,
}

impl AiBackend {
    pub fn provider_name(&self) -> Option<&str> {
        self.provider
            .as_object()
            .and_then(|o| o.keys().next())
            .map(String::as_str)
    }
}

fn default_weight() -> u32 {
    1
}

/// A backend as attached to an HTTP route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBackend {
    #[serde(skip)]
    pub id: ElementId,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(flatten)]
    pub backend: Backend,
}

impl RouteBackend {
    pub fn new(backend: Backend) -> Self {
        Self {
            id: ElementId::new(),
            weight: default_weight(),
            backend,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }
}

impl Identified for RouteBackend {
    fn id(&self) -> ElementId {
        self.id
    }
}

/// Backends allowed on TCP routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleBackend {
    Service { name: NamespacedHostname, port: u16 },
    Host(String),
}

impl TryFrom<Backend> for SimpleBackend {
    type Error = BackendKind;

    fn try_from(value: Backend) -> Result<Self, Self::Error> {
        match value {
            Backend::Service { name, port } => Ok(SimpleBackend::Service { name, port }),
            Backend::Host(target) => Ok(SimpleBackend::Host(target)),
            other => Err(other.kind()),
        }
    }
}

impl From<SimpleBackend> for Backend {
    fn from(value: SimpleBackend) -> Self {
        match value {
            SimpleBackend::Service { name, port } => Backend::Service { name, port },
            SimpleBackend::Host(target) => Backend::Host(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcpRouteBackend {
    #[serde(skip)]
    pub id: ElementId,
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub backend: SimpleBackend,
}

impl TcpRouteBackend {
    pub fn new(backend: SimpleBackend) -> Self {
        Self {
            id: ElementId::new(),
            weight: default_weight(),
            backend,
        }
    }
}

impl Identified for TcpRouteBackend {
    fn id(&self) -> ElementId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_name_heuristic() {
        assert_eq!(
            NamespacedHostname::from_service_name("default/httpbin"),
            NamespacedHostname::new("default", "httpbin")
        );
        assert_eq!(
            NamespacedHostname::from_service_name("httpbin.default.svc.cluster.local"),
            NamespacedHostname::new("", "httpbin")
        );
        assert_eq!(
            NamespacedHostname::from_service_name("httpbin"),
            NamespacedHostname::new("", "httpbin")
        );
        // Only the first slash splits
        assert_eq!(
            NamespacedHostname::from_service_name("a/b/c"),
            NamespacedHostname::new("a", "b/c")
        );
    }

    #[test]
    fn test_route_backend_wire_shape() {
        let rb: RouteBackend = serde_json::from_value(json!({
            "weight": 3,
            "service": {"name": "default/httpbin", "port": 8000}
        }))
        .unwrap();
        assert_eq!(rb.weight, 3);
        assert_eq!(
            rb.backend,
            Backend::Service {
                name: NamespacedHostname::new("default", "httpbin"),
                port: 8000
            }
        );

        let host: RouteBackend = serde_json::from_value(json!({"host": "example.com:443"})).unwrap();
        assert_eq!(host.weight, 1);
        assert_eq!(host.backend, Backend::Host("example.com:443".into()));

        let out = serde_json::to_value(&host).unwrap();
        assert_eq!(out, json!({"weight": 1, "host": "example.com:443"}));
    }

    #[test]
    fn test_mcp_and_dynamic_backends() {
        let rb: RouteBackend = serde_json::from_value(json!({
            "mcp": {"targets": [
                {"name": "everything", "stdio": {"cmd": "npx", "args": ["server-everything"]}},
                {"name": "remote", "mcp": {"host": "mcp.example.com", "port": 443, "path": "/mcp"}}
            ]}
        }))
        .unwrap();
        let Backend::Mcp(mcp) = &rb.backend else {
            panic!("expected mcp backend");
        };
        assert_eq!(mcp.targets.len(), 2);
        assert_eq!(rb.backend.kind(), BackendKind::Mcp);
        assert!(rb.backend.describe().contains("everything"));

        let dynamic: RouteBackend = serde_json::from_value(json!({"dynamic": {}})).unwrap();
        assert_eq!(dynamic.backend, Backend::Dynamic {});
    }

    #[test]
    fn test_simple_backend_conversion() {
        let ai = Backend::Ai(AiBackend {
            provider: json!({"openAI": {}}),
            host_override: None,
            tokenize: false,
        });
        assert_eq!(SimpleBackend::try_from(ai), Err(BackendKind::Ai));
        let host = SimpleBackend::try_from(Backend::Host("10.0.0.1:80".into())).unwrap();
        assert_eq!(host, SimpleBackend::Host("10.0.0.1:80".into()));
    }
}
