//! Local configuration graph → config dump.
//!
//! Produces the shape `config_dump_to_local_config` reads, so a graph can be
//! pushed through the mapper and compared with itself.

use serde_json::{json, Map, Value};

use crate::model::{Backend, Listener, LocalConfig, Route, RouteBackend, SimpleBackend, TcpRoute};

pub fn local_config_to_dump(config: &LocalConfig) -> Value {
    let mut out = DumpWriter::default();

    let binds: Vec<Value> = config
        .binds
        .iter()
        .map(|bind| {
            let bind_key = format!("bind/{}", bind.port);
            let mut listeners = Map::new();
            for (i, listener) in bind.listeners.iter().enumerate() {
                let listener_key = format!("{}/{}/{}", bind_key, i, listener.display_name());
                let value = out.listener(&listener_key, listener);
                listeners.insert(listener_key, value);
            }
            json!({
                "key": bind_key,
                "address": format!("[::]:{}", bind.port),
                "listeners": listeners,
            })
        })
        .collect();

    json!({
        "binds": binds,
        "policies": out.policies,
        "backends": out.backends,
    })
}

#[derive(Default)]
struct DumpWriter {
    backends: Vec<Value>,
    policies: Vec<Value>,
}

impl DumpWriter {
    fn listener(&mut self, key: &str, listener: &Listener) -> Value {
        let mut out = Map::new();
        out.insert("key".into(), json!(key));
        if let Some(name) = &listener.name {
            out.insert("name".into(), json!(name));
        }
        if let Some(gateway) = &listener.gateway_name {
            out.insert("gatewayName".into(), json!(gateway));
        }
        if let Some(hostname) = &listener.hostname {
            out.insert("hostname".into(), json!(hostname));
        }
        out.insert("protocol".into(), json!(listener.protocol.as_str()));
        if let Some(tls) = &listener.tls {
            out.insert("tls".into(), json!(tls));
        }

        let mut routes = Map::new();
        for (i, route) in listener.routes().iter().enumerate() {
            let route_key = route_key(key, "route", i, route.name.as_deref(), route.rule_name.as_deref());
            let value = self.route(&route_key, route);
            routes.insert(route_key, value);
        }
        if !routes.is_empty() {
            out.insert("routes".into(), Value::Object(routes));
        }

        let mut tcp_routes = Map::new();
        for (i, route) in listener.tcp_routes().iter().enumerate() {
            let route_key = route_key(key, "tcp", i, route.name.as_deref(), route.rule_name.as_deref());
            let value = self.tcp_route(&route_key, route);
            tcp_routes.insert(route_key, value);
        }
        if !tcp_routes.is_empty() {
            out.insert("tcpRoutes".into(), Value::Object(tcp_routes));
        }

        Value::Object(out)
    }

    fn route(&mut self, key: &str, route: &Route) -> Value {
        let backends: Vec<Value> = route
            .backends
            .iter()
            .enumerate()
            .map(|(i, rb)| self.backend_ref(key, i, route.backends.len(), rb))
            .collect();

        if let Some(policies) = &route.policies {
            for kind in policies.kinds() {
                if let Some(payload) = policies.get(kind) {
                    self.policy(key, kind.as_str(), payload);
                }
            }
            for (other, payload) in &policies.other {
                self.policy(key, other, payload);
            }
        }

        json!({
            "key": key,
            "routeName": route.name,
            "ruleName": route.rule_name,
            "hostnames": route.hostnames,
            "matches": route.matches,
            "backends": backends,
        })
    }

    fn tcp_route(&mut self, key: &str, route: &TcpRoute) -> Value {
        let backends: Vec<Value> = route
            .backends
            .iter()
            .map(|tb| match &tb.backend {
                SimpleBackend::Service { name, port } => json!({
                    "weight": tb.weight,
                    "backend": {"service": {"name": name, "port": port}},
                }),
                SimpleBackend::Host(target) => json!({
                    "weight": tb.weight,
                    "backend": {"host": target},
                }),
            })
            .collect();

        if let Some(tls) = route.policies.as_ref().and_then(|p| p.backend_tls.as_ref()) {
            self.policy(key, "backendTLS", tls);
        }

        json!({
            "key": key,
            "routeName": route.name,
            "ruleName": route.rule_name,
            "hostnames": route.hostnames,
            "backends": backends,
        })
    }

    /// Services stay inline; every other backend moves to the top-level list
    /// and is referenced by name.
    fn backend_ref(&mut self, route_key: &str, index: usize, total: usize, rb: &RouteBackend) -> Value {
        let name = if total == 1 {
            route_key.to_string()
        } else {
            format!("{}/{}", route_key, index)
        };
        let entry = match &rb.backend {
            Backend::Service { name, port } => {
                return json!({
                    "weight": rb.weight,
                    "service": {"name": name, "port": port},
                });
            }
            Backend::Host(target) => json!({"host": {"name": name, "target": target}}),
            Backend::Mcp(mcp) => json!({"mcp": {"name": name, "target": mcp}}),
            Backend::Ai(ai) => json!({"ai": {"name": name, "target": ai}}),
            Backend::Dynamic {} => json!({"dynamic": {"name": name}}),
        };
        self.backends.push(entry);

        json!({"weight": rb.weight, "backend": name})
    }

    fn policy(&mut self, route_key: &str, kind: &str, payload: &Value) {
        let mut body = Map::new();
        body.insert(kind.to_string(), payload.clone());
        self.policies.push(json!({
            "name": format!("{}:{}", route_key, kind),
            "target": {"routeRule": route_key},
            "policy": body,
        }));
    }
}

/// Keys carry the route's position so repeated or missing names stay unique.
fn route_key(listener_key: &str, kind: &str, index: usize, name: Option<&str>, rule: Option<&str>) -> String {
    format!(
        "{}/{}{}/{}/{}",
        listener_key,
        kind,
        index,
        name.unwrap_or("unnamed"),
        rule.unwrap_or("default")
    )
}
