//! Input validation applied before any edit touches the graph.

use thiserror::Error;

use crate::model::{
    Backend, Listener, McpTargetSpec, Route, RouteBackend, SimpleBackend, TcpRoute,
    TcpRouteBackend,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("invalid weight '{0}': expected a non-negative integer")]
    InvalidWeight(String),

    #[error("invalid port {0}")]
    InvalidPort(u16),

    #[error("HTTP routes need at least one match")]
    NoMatches,
}

/// Parse a weight as typed into a form.
pub fn parse_weight(input: &str) -> Result<u32, FormError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| FormError::InvalidWeight(input.to_string()))
}

pub fn validate_backend(backend: &RouteBackend) -> Result<(), FormError> {
    match &backend.backend {
        Backend::Service { name, port } => validate_service(&name.hostname, *port),
        Backend::Host(target) => validate_host(target),
        Backend::Mcp(mcp) => {
            if mcp.targets.is_empty() {
                return Err(FormError::MissingField { field: "mcp targets" });
            }
            for target in &mcp.targets {
                if target.name.trim().is_empty() {
                    return Err(FormError::MissingField { field: "mcp target name" });
                }
                match &target.spec {
                    McpTargetSpec::Sse(spec) | McpTargetSpec::Mcp(spec) => {
                        if spec.host.trim().is_empty() {
                            return Err(FormError::MissingField { field: "mcp target host" });
                        }
                    }
                    McpTargetSpec::Stdio { cmd, .. } => {
                        if cmd.trim().is_empty() {
                            return Err(FormError::MissingField { field: "mcp target command" });
                        }
                    }
                    McpTargetSpec::Openapi(_) => {}
                }
            }
            Ok(())
        }
        Backend::Ai(ai) => {
            if ai.provider.is_null() {
                return Err(FormError::MissingField { field: "ai provider" });
            }
            Ok(())
        }
        Backend::Dynamic {} => Ok(()),
    }
}

fn validate_service(hostname: &str, port: u16) -> Result<(), FormError> {
    if hostname.trim().is_empty() {
        return Err(FormError::MissingField { field: "service name" });
    }
    if port == 0 {
        return Err(FormError::InvalidPort(port));
    }
    Ok(())
}

fn validate_host(target: &str) -> Result<(), FormError> {
    if target.trim().is_empty() {
        return Err(FormError::MissingField { field: "host" });
    }
    Ok(())
}

pub fn validate_route(route: &Route) -> Result<(), FormError> {
    if route.matches.is_empty() {
        return Err(FormError::NoMatches);
    }
    route.backends.iter().try_for_each(validate_backend)
}

pub fn validate_tcp_route(route: &TcpRoute) -> Result<(), FormError> {
    route.backends.iter().try_for_each(validate_tcp_backend)
}

pub fn validate_tcp_backend(backend: &TcpRouteBackend) -> Result<(), FormError> {
    match &backend.backend {
        SimpleBackend::Service { name, port } => validate_service(&name.hostname, *port),
        SimpleBackend::Host(target) => validate_host(target),
    }
}

/// Listener settings only; routes are validated by their own operations.
pub fn validate_listener(listener: &Listener) -> Result<(), FormError> {
    if listener.protocol.requires_tls() {
        match &listener.tls {
            Some(tls) if !tls.cert.trim().is_empty() && !tls.key.trim().is_empty() => {}
            _ => return Err(FormError::MissingField { field: "tls" }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListenerProtocol, McpBackend, NamespacedHostname, TlsConfig};

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("3"), Ok(3));
        assert_eq!(parse_weight(" 10 "), Ok(10));
        assert_eq!(parse_weight("-1"), Err(FormError::InvalidWeight("-1".into())));
        assert!(parse_weight("1.5").is_err());
        assert!(parse_weight("").is_err());
    }

    #[test]
    fn test_backend_required_fields() {
        let empty_host = RouteBackend::new(Backend::Host("  ".into()));
        assert_eq!(
            validate_backend(&empty_host),
            Err(FormError::MissingField { field: "host" })
        );

        let zero_port = RouteBackend::new(Backend::Service {
            name: NamespacedHostname::new("default", "httpbin"),
            port: 0,
        });
        assert_eq!(validate_backend(&zero_port), Err(FormError::InvalidPort(0)));

        let no_targets = RouteBackend::new(Backend::Mcp(McpBackend::default()));
        assert!(validate_backend(&no_targets).is_err());

        assert!(validate_backend(&RouteBackend::new(Backend::Dynamic {})).is_ok());
    }

    #[test]
    fn test_route_needs_match() {
        let mut route = Route::default();
        assert!(validate_route(&route).is_ok());
        route.matches.clear();
        assert_eq!(validate_route(&route), Err(FormError::NoMatches));
    }

    #[test]
    fn test_tls_listener_needs_certificates() {
        let mut listener = Listener::new(Some("secure".into()), ListenerProtocol::Https);
        assert!(validate_listener(&listener).is_err());
        listener.tls = Some(TlsConfig {
            cert: "/certs/tls.crt".into(),
            key: "/certs/tls.key".into(),
        });
        assert!(validate_listener(&listener).is_ok());
    }
}
