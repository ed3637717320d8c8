//! Configuration graph: binds, listeners, routes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::backend::{RouteBackend, TcpRouteBackend};
use super::ids::{ElementId, Identified};
use super::policies::{Policies, TcpPolicies};

/// Display and matching fallback for listeners without a name.
pub const UNNAMED_LISTENER: &str = "unnamed";

/// Root of the local configuration graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfig {
    #[serde(default)]
    pub binds: Vec<Bind>,

    /// Top-level sections owned by the gateway (workloads, services, ...).
    /// Carried through so a whole-graph write does not drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl LocalConfig {
    pub fn bind(&self, port: u16) -> Option<&Bind> {
        self.binds.iter().find(|b| b.port == port)
    }

    pub fn ports(&self) -> Vec<u16> {
        self.binds.iter().map(|b| b.port).collect()
    }
}

/// A port and the listeners attached to it. Unique by port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bind {
    pub port: u16,
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

impl Bind {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            listeners: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenerProtocol {
    #[default]
    Http,
    Https,
    Tls,
    Tcp,
    Hbone,
}

impl ListenerProtocol {
    /// Route kind a listener of this protocol owns. HBONE owns none.
    pub fn route_kind(&self) -> Option<RouteKind> {
        match self {
            ListenerProtocol::Http | ListenerProtocol::Https => Some(RouteKind::Http),
            ListenerProtocol::Tls | ListenerProtocol::Tcp => Some(RouteKind::Tcp),
            ListenerProtocol::Hbone => None,
        }
    }

    pub fn requires_tls(&self) -> bool {
        matches!(self, ListenerProtocol::Https | ListenerProtocol::Tls)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerProtocol::Http => "HTTP",
            ListenerProtocol::Https => "HTTPS",
            ListenerProtocol::Tls => "TLS",
            ListenerProtocol::Tcp => "TCP",
            ListenerProtocol::Hbone => "HBONE",
        }
    }

    pub fn from_tag(tag: &str) -> Option<ListenerProtocol> {
        match tag.to_ascii_uppercase().as_str() {
            "HTTP" => Some(ListenerProtocol::Http),
            "HTTPS" => Some(ListenerProtocol::Https),
            "TLS" => Some(ListenerProtocol::Tls),
            "TCP" => Some(ListenerProtocol::Tcp),
            "HBONE" => Some(ListenerProtocol::Hbone),
            _ => None,
        }
    }
}

impl fmt::Display for ListenerProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Http,
    Tcp,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Http => f.pad("HTTP"),
            RouteKind::Tcp => f.pad("TCP"),
        }
    }
}

/// TLS server certificate and key (PEM paths).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_name: Option<String>,
    /// Can be a wildcard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub protocol: ListenerProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_routes: Option<Vec<TcpRoute>>,
}

impl Listener {
    pub fn new(name: Option<String>, protocol: ListenerProtocol) -> Self {
        Self {
            name,
            protocol,
            ..Default::default()
        }
    }

    /// Name used for display and for matching in locators.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_LISTENER)
    }

    pub fn route_kind(&self) -> Option<RouteKind> {
        self.protocol.route_kind()
    }

    pub fn routes(&self) -> &[Route] {
        self.routes.as_deref().unwrap_or(&[])
    }

    pub fn tcp_routes(&self) -> &[TcpRoute] {
        self.tcp_routes.as_deref().unwrap_or(&[])
    }

    /// Kinds of routes the listener currently owns.
    pub fn owned_route_kinds(&self) -> Vec<RouteKind> {
        let mut kinds = Vec::new();
        if !self.routes().is_empty() {
            kinds.push(RouteKind::Http);
        }
        if !self.tcp_routes().is_empty() {
            kinds.push(RouteKind::Tcp);
        }
        kinds
    }
}

pub(crate) fn default_matches() -> Vec<RouteMatch> {
    vec![RouteMatch::prefix("/")]
}

/// HTTP route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(skip)]
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    /// Exact or wildcard hostnames.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
    #[serde(default = "default_matches")]
    pub matches: Vec<RouteMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<Policies>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<RouteBackend>,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            id: ElementId::new(),
            name: None,
            rule_name: None,
            hostnames: Vec::new(),
            matches: default_matches(),
            policies: None,
            backends: Vec::new(),
        }
    }
}

impl Route {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Identified for Route {
    fn id(&self) -> ElementId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatch>,
    pub path: PathMatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryMatch>,
}

impl RouteMatch {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            headers: Vec::new(),
            path: PathMatch::PathPrefix(prefix.into()),
            method: None,
            query: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMatch {
    Exact(String),
    PathPrefix(String),
    /// Pattern and the length of the literal prefix used for ranking.
    Regex(String, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueMatch {
    Exact(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    pub value: ValueMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub name: String,
    pub value: ValueMatch,
}

/// TCP or TLS route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    #[serde(skip)]
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    /// Only meaningful for TLS listeners (SNI).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<TcpPolicies>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<TcpRouteBackend>,
}

impl Identified for TcpRoute {
    fn id(&self) -> ElementId {
        self.id
    }
}
