//! Config dump → local configuration graph.
//!
//! The dump is whatever the gateway's introspection endpoint returns. Every
//! field is optional and every list may arrive as an array or as an object
//! keyed by internal identifiers. Nothing here fails: malformed entries are
//! dropped and logged.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::model::graph::default_matches;
use crate::model::{
    Backend, Bind, Listener, ListenerProtocol, LocalConfig, NamespacedHostname, Policies,
    PolicyKind, Route, RouteBackend, RouteMatch, SimpleBackend, TcpPolicies, TcpRoute,
    TcpRouteBackend, TlsConfig,
};

/// Entry of the dump's top-level backend list.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedBackend {
    pub name: Option<String>,
    pub backend: Backend,
}

/// Map a config dump into the local graph.
pub fn config_dump_to_local_config(dump: &Value) -> LocalConfig {
    let backends = map_backends(dump.get("backends"));
    let policies = PolicyIndex::from_dump(dump.get("policies"));

    let mut config = LocalConfig::default();
    for value in items(dump.get("binds")) {
        let Some(port) = bind_port(value) else {
            warn!(bind = %value, "skipping bind without a recoverable port");
            continue;
        };
        let listeners = items(value.get("listeners"))
            .into_iter()
            .map(|l| map_listener(l, &backends, &policies));

        match config.binds.iter_mut().find(|b| b.port == port) {
            Some(existing) => existing.listeners.extend(listeners),
            None => config.binds.push(Bind {
                port,
                listeners: listeners.collect(),
            }),
        }
    }

    debug!(
        binds = config.binds.len(),
        backends = backends.len(),
        "mapped config dump"
    );
    config
}

/// Map the dump's flat backend list, skipping malformed entries.
pub fn map_backends(value: Option<&Value>) -> Vec<NamedBackend> {
    items(value)
        .into_iter()
        .filter_map(|entry| {
            let mapped = map_backend_entry(entry);
            if mapped.is_none() {
                debug!(entry = %entry, "dropping malformed backend");
            }
            mapped
        })
        .collect()
}

fn map_backend_entry(entry: &Value) -> Option<NamedBackend> {
    if entry.as_str() == Some("dynamic") {
        return Some(NamedBackend {
            name: None,
            backend: Backend::Dynamic {},
        });
    }

    let (kind, body) = entry.as_object()?.iter().next()?;
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    let backend = match kind.as_str() {
        "service" => Backend::Service {
            name: serde_json::from_value::<NamespacedHostname>(body.get("name")?.clone()).ok()?,
            port: port_value(body.get("port")?)?,
        },
        "host" => Backend::Host(host_target(body)?),
        "mcp" => Backend::Mcp(serde_json::from_value(payload(body).clone()).ok()?),
        "ai" => Backend::Ai(serde_json::from_value(payload(body).clone()).ok()?),
        "dynamic" => Backend::Dynamic {},
        _ => return None,
    };

    Some(NamedBackend { name, backend })
}

/// `{"name", "target"}` in the dump, the bare value inline.
fn payload(body: &Value) -> &Value {
    body.get("target").unwrap_or(body)
}

fn host_target(body: &Value) -> Option<String> {
    let target = match body {
        Value::String(_) => body,
        _ => body.get("target")?,
    };
    match target {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(o) => o
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn port_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn bind_port(value: &Value) -> Option<u16> {
    if let Some(port) = value.get("port").and_then(port_value) {
        return Some(port);
    }
    let from_address = value
        .get("address")
        .and_then(Value::as_str)
        .and_then(|a| a.rsplit(':').next())
        .and_then(|p| p.parse().ok());
    from_address.or_else(|| {
        value
            .get("key")
            .and_then(Value::as_str)
            .and_then(|k| k.strip_prefix("bind/"))
            .and_then(|p| p.parse().ok())
    })
}

fn map_listener(value: &Value, backends: &[NamedBackend], policies: &PolicyIndex) -> Listener {
    let routes: Vec<Route> = items(value.get("routes"))
        .into_iter()
        .map(|r| map_route(r, backends, policies))
        .collect();
    let tcp_routes: Vec<TcpRoute> = items(value.get("tcpRoutes"))
        .into_iter()
        .map(|r| map_tcp_route(r, backends, policies))
        .collect();

    Listener {
        name: text(value, "name"),
        gateway_name: text(value, "gatewayName"),
        hostname: text(value, "hostname"),
        protocol: protocol(value.get("protocol")),
        tls: value
            .get("tls")
            .and_then(|t| serde_json::from_value::<TlsConfig>(t.clone()).ok()),
        routes: (!routes.is_empty()).then_some(routes),
        tcp_routes: (!tcp_routes.is_empty()).then_some(tcp_routes),
    }
}

/// Protocol as a plain tag (`"HTTP"`) or a single-key object (`{"HTTPS": {...}}`).
fn protocol(value: Option<&Value>) -> ListenerProtocol {
    let tag = match value {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(o)) => o.keys().next().map(String::as_str),
        _ => None,
    };
    tag.and_then(ListenerProtocol::from_tag).unwrap_or_default()
}

fn map_route(value: &Value, backends: &[NamedBackend], index: &PolicyIndex) -> Route {
    let refs = items(value.get("backends"));
    let policies = route_policies(value, &refs, index);

    let mut matches: Vec<RouteMatch> = items(value.get("matches"))
        .into_iter()
        .filter_map(|m| serde_json::from_value(m.clone()).ok())
        .collect();
    if matches.is_empty() {
        matches = default_matches();
    }

    Route {
        name: route_name(value),
        rule_name: text(value, "ruleName"),
        hostnames: strings(value.get("hostnames")),
        matches,
        policies: (!policies.is_empty()).then_some(policies),
        backends: refs
            .into_iter()
            .filter_map(|r| {
                let backend = resolve_backend_ref(r, backends)?;
                Some(RouteBackend::new(backend).with_weight(weight(r)))
            })
            .collect(),
        ..Default::default()
    }
}

fn map_tcp_route(value: &Value, backends: &[NamedBackend], index: &PolicyIndex) -> TcpRoute {
    let refs = items(value.get("backends"));
    let mut policies = route_policies(value, &refs, index);
    let backend_tls = policies.remove(PolicyKind::BackendTls);
    if !policies.is_empty() {
        debug!(kinds = ?policies.kinds(), "dropping policies not supported on tcp routes");
    }

    TcpRoute {
        name: route_name(value),
        rule_name: text(value, "ruleName"),
        hostnames: strings(value.get("hostnames")),
        policies: backend_tls.map(|tls| TcpPolicies {
            backend_tls: Some(tls),
        }),
        backends: refs
            .into_iter()
            .filter_map(|r| {
                let backend = resolve_backend_ref(r, backends)?;
                match SimpleBackend::try_from(backend) {
                    Ok(simple) => Some(TcpRouteBackend {
                        weight: weight(r),
                        ..TcpRouteBackend::new(simple)
                    }),
                    Err(kind) => {
                        debug!(%kind, "dropping backend not supported on tcp routes");
                        None
                    }
                }
            })
            .collect(),
        ..Default::default()
    }
}

/// Resolve a route's backend reference.
///
/// Named references resolve against the mapped backend list; an unknown name
/// is inlined as a host backend. `invalid` references are dropped.
fn resolve_backend_ref(item: &Value, backends: &[NamedBackend]) -> Option<Backend> {
    if item.as_str() == Some("invalid") || item.get("invalid").is_some() {
        debug!("dropping invalid backend reference");
        return None;
    }

    match item.get("backend") {
        Some(Value::String(name)) => {
            let found = backends
                .iter()
                .find(|b| b.name.as_deref() == Some(name.as_str()));
            Some(match found {
                Some(named) => named.backend.clone(),
                None => {
                    warn!(backend = %name, "unresolved backend reference, inlining as host");
                    Backend::Host(name.clone())
                }
            })
        }
        // TCP route shape: {"weight", "backend": {"service"|"host": ...}}
        Some(inner @ Value::Object(_)) => map_backend_entry(inner).map(|b| b.backend),
        _ => {
            let mut inline: Map<String, Value> = item.as_object()?.clone();
            inline.remove("weight");
            let mapped = map_backend_entry(&Value::Object(inline)).map(|b| b.backend);
            if mapped.is_none() {
                debug!(reference = %item, "dropping unrecognized backend reference");
            }
            mapped
        }
    }
}

fn route_policies(value: &Value, refs: &[&Value], index: &PolicyIndex) -> Policies {
    let mut policies = Policies::default();

    for filter in items(value.get("filters")) {
        if let Some(obj) = filter.as_object() {
            for (key, payload) in obj {
                policies.set_by_key(key, payload.clone());
            }
        }
    }

    // Traffic policy: timeout and retry. Empty payloads mean unset.
    if let Some(obj) = value.get("policies").and_then(Value::as_object) {
        for (key, payload) in obj {
            if is_blank(payload) {
                debug!(policy = %key, "skipping empty traffic policy");
                continue;
            }
            policies.set_by_key(key, payload.clone());
        }
    }

    let names: Vec<&str> = refs
        .iter()
        .filter_map(|r| r.get("backend").and_then(Value::as_str))
        .collect();
    index.apply(&mut policies, value.get("key").and_then(Value::as_str), &names);
    policies
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Top-level policies, grouped by the route or backend they target.
#[derive(Debug, Default)]
struct PolicyIndex {
    by_route: BTreeMap<String, Vec<(String, Value)>>,
    by_backend: BTreeMap<String, Vec<(String, Value)>>,
}

impl PolicyIndex {
    fn from_dump(value: Option<&Value>) -> Self {
        let mut index = PolicyIndex::default();
        for item in items(value) {
            let Some(policy) = item.get("policy").and_then(Value::as_object) else {
                debug!(policy = %item, "dropping policy without a body");
                continue;
            };
            let entries = policy.iter().map(|(k, v)| (k.clone(), v.clone()));
            let target = item.get("target");

            if let Some(rule) = target.and_then(|t| t.get("routeRule")).and_then(Value::as_str) {
                index.by_route.entry(rule.to_string()).or_default().extend(entries);
            } else if let Some(backend) = target.and_then(|t| t.get("backend")).and_then(Value::as_str)
            {
                index.by_backend.entry(backend.to_string()).or_default().extend(entries);
            } else {
                debug!(policy = %item, "dropping policy with unsupported target");
            }
        }
        index
    }

    fn apply(&self, policies: &mut Policies, route_key: Option<&str>, backend_names: &[&str]) {
        let route = route_key.and_then(|k| self.by_route.get(k));
        // Inline backends are named after their route.
        let backends = route_key
            .into_iter()
            .chain(backend_names.iter().copied())
            .filter_map(|name| self.by_backend.get(name));

        for (key, payload) in route.into_iter().chain(backends).flatten() {
            if payload.is_null() {
                continue;
            }
            policies.set_by_key(key, payload.clone());
        }
    }
}

fn route_name(value: &Value) -> Option<String> {
    text(value, "routeName").or_else(|| text(value, "name"))
}

fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    items(value)
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn weight(item: &Value) -> u32 {
    item.get("weight")
        .and_then(Value::as_u64)
        .and_then(|w| u32::try_from(w).ok())
        .unwrap_or(1)
}

/// Arrays as-is, keyed objects by value, anything else empty.
fn items(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    }
}
