//! Whole-graph check of the one-backend rule.

use crate::model::{LocalConfig, PolicyKind, RouteKind};

use super::checker::BackendPolicyScope;

/// A route whose backend policies require one backend but which has another count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub bind_port: u16,
    pub listener: String,
    pub kind: RouteKind,
    pub route_index: usize,
    pub route_name: Option<String>,
    pub policies: Vec<PolicyKind>,
    pub backend_count: usize,
}

/// List every constrained route not at exactly one backend.
pub fn audit(config: &LocalConfig) -> Vec<AuditFinding> {
    let mut findings = Vec::new();
    for bind in &config.binds {
        for listener in &bind.listeners {
            let routes = listener
                .routes()
                .iter()
                .map(|r| (RouteKind::Http, r.name.clone(), r as &dyn BackendPolicyScope));
            let tcp_routes = listener
                .tcp_routes()
                .iter()
                .map(|r| (RouteKind::Tcp, r.name.clone(), r as &dyn BackendPolicyScope));

            let mut http_idx = 0;
            let mut tcp_idx = 0;
            for (kind, name, scope) in routes.chain(tcp_routes) {
                let idx = match kind {
                    RouteKind::Http => &mut http_idx,
                    RouteKind::Tcp => &mut tcp_idx,
                };
                let route_index = *idx;
                *idx += 1;

                let policies = scope.backend_policy_types();
                let backend_count = scope.backend_count();
                if policies.is_empty() || backend_count == 1 {
                    continue;
                }
                tracing::debug!(
                    port = bind.port,
                    listener = listener.display_name(),
                    route_index,
                    backend_count,
                    "route violates one-backend rule"
                );
                findings.push(AuditFinding {
                    bind_port: bind.port,
                    listener: listener.display_name().to_string(),
                    kind,
                    route_index,
                    route_name: name,
                    policies,
                    backend_count,
                });
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Backend, Bind, Listener, ListenerProtocol, Policies, Route, RouteBackend};
    use serde_json::json;

    #[test]
    fn test_audit_reports_over_populated_route() {
        let mut policies = Policies::default();
        policies.set(PolicyKind::A2a, json!({}));
        let constrained = Route {
            name: Some("agents".into()),
            policies: Some(policies),
            backends: vec![
                RouteBackend::new(Backend::Host("a:80".into())),
                RouteBackend::new(Backend::Host("b:80".into())),
            ],
            ..Default::default()
        };
        let fine = Route {
            backends: vec![RouteBackend::new(Backend::Host("c:80".into()))],
            ..Default::default()
        };
        let mut listener = Listener::new(None, ListenerProtocol::Http);
        listener.routes = Some(vec![fine, constrained]);
        let config = LocalConfig {
            binds: vec![Bind {
                port: 3000,
                listeners: vec![listener],
            }],
            ..Default::default()
        };

        let findings = audit(&config);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.bind_port, 3000);
        assert_eq!(f.listener, "unnamed");
        assert_eq!(f.route_index, 1);
        assert_eq!(f.route_name.as_deref(), Some("agents"));
        assert_eq!(f.policies, vec![PolicyKind::A2a]);
        assert_eq!(f.backend_count, 2);
    }

    #[test]
    fn test_audit_empty_config() {
        assert!(audit(&LocalConfig::default()).is_empty());
    }
}
