//! Locating binds, listeners, routes and backends.
//!
//! # Design Decisions
//! - Binds match by exact port
//! - Listeners match by exact name; an absent name matches `UNNAMED_LISTENER`
//! - Routes and backends match by index or by stable id

use std::fmt;

use crate::model::{
    Bind, ElementId, Identified, Listener, LocalConfig, Route, RouteBackend, RouteKind, TcpRoute,
};

use super::error::EditorError;

/// Position or identity of a route or backend within its parent list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Index(usize),
    Id(ElementId),
}

impl ElementRef {
    /// Resolve against a list, returning the current index.
    pub fn resolve<T: Identified>(&self, items: &[T]) -> Option<usize> {
        match *self {
            ElementRef::Index(i) if i < items.len() => Some(i),
            ElementRef::Index(_) => None,
            ElementRef::Id(id) => items.iter().position(|item| item.id() == id),
        }
    }
}

impl From<usize> for ElementRef {
    fn from(value: usize) -> Self {
        ElementRef::Index(value)
    }
}

impl From<ElementId> for ElementRef {
    fn from(value: ElementId) -> Self {
        ElementRef::Id(value)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Index(i) => write!(f, "index {}", i),
            ElementRef::Id(id) => write!(f, "id {}", id),
        }
    }
}

/// A listener within a bind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerAddress {
    pub port: u16,
    pub listener: String,
}

impl ListenerAddress {
    pub fn new(port: u16, listener: impl Into<String>) -> Self {
        Self {
            port,
            listener: listener.into(),
        }
    }

    pub fn route(&self, route: impl Into<ElementRef>) -> RouteAddress {
        RouteAddress {
            listener: self.clone(),
            route: route.into(),
        }
    }
}

/// A route (HTTP or TCP, depending on the operation) within a listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteAddress {
    pub listener: ListenerAddress,
    pub route: ElementRef,
}

impl RouteAddress {
    pub fn backend(&self, backend: impl Into<ElementRef>) -> BackendAddress {
        BackendAddress {
            route: self.clone(),
            backend: backend.into(),
        }
    }

    pub(crate) fn not_found(&self, kind: RouteKind) -> EditorError {
        EditorError::RouteNotFound {
            port: self.listener.port,
            listener: self.listener.listener.clone(),
            kind,
            route: self.route,
        }
    }
}

/// A backend within an HTTP route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendAddress {
    pub route: RouteAddress,
    pub backend: ElementRef,
}

impl BackendAddress {
    pub(crate) fn not_found(&self) -> EditorError {
        EditorError::BackendNotFound {
            port: self.route.listener.port,
            listener: self.route.listener.listener.clone(),
            route: self.route.route,
            backend: self.backend,
        }
    }
}

pub fn listener_matches(listener: &Listener, name: &str) -> bool {
    listener.display_name() == name
}

pub fn find_bind(config: &LocalConfig, port: u16) -> Result<&Bind, EditorError> {
    config
        .binds
        .iter()
        .find(|b| b.port == port)
        .ok_or(EditorError::BindNotFound { port })
}

pub fn find_bind_mut(config: &mut LocalConfig, port: u16) -> Result<&mut Bind, EditorError> {
    config
        .binds
        .iter_mut()
        .find(|b| b.port == port)
        .ok_or(EditorError::BindNotFound { port })
}

pub fn find_listener<'a>(
    config: &'a LocalConfig,
    at: &ListenerAddress,
) -> Result<&'a Listener, EditorError> {
    find_bind(config, at.port)?
        .listeners
        .iter()
        .find(|l| listener_matches(l, &at.listener))
        .ok_or_else(|| listener_not_found(at))
}

pub fn find_listener_mut<'a>(
    config: &'a mut LocalConfig,
    at: &ListenerAddress,
) -> Result<&'a mut Listener, EditorError> {
    find_bind_mut(config, at.port)?
        .listeners
        .iter_mut()
        .find(|l| listener_matches(l, &at.listener))
        .ok_or_else(|| listener_not_found(at))
}

fn listener_not_found(at: &ListenerAddress) -> EditorError {
    EditorError::ListenerNotFound {
        port: at.port,
        listener: at.listener.clone(),
    }
}

pub fn find_route<'a>(config: &'a LocalConfig, at: &RouteAddress) -> Result<&'a Route, EditorError> {
    let routes = find_listener(config, &at.listener)?.routes();
    at.route
        .resolve(routes)
        .map(|i| &routes[i])
        .ok_or_else(|| at.not_found(RouteKind::Http))
}

pub fn find_route_mut<'a>(
    config: &'a mut LocalConfig,
    at: &RouteAddress,
) -> Result<&'a mut Route, EditorError> {
    let not_found = at.not_found(RouteKind::Http);
    let routes = find_listener_mut(config, &at.listener)?
        .routes
        .as_mut()
        .ok_or_else(|| not_found.clone())?;
    let idx = at.route.resolve(routes.as_slice()).ok_or(not_found)?;
    Ok(&mut routes[idx])
}

pub fn find_backend<'a>(
    config: &'a LocalConfig,
    at: &BackendAddress,
) -> Result<&'a RouteBackend, EditorError> {
    let backends = &find_route(config, &at.route)?.backends;
    at.backend
        .resolve(backends.as_slice())
        .map(|i| &backends[i])
        .ok_or_else(|| at.not_found())
}

pub fn find_tcp_route<'a>(
    config: &'a LocalConfig,
    at: &RouteAddress,
) -> Result<&'a TcpRoute, EditorError> {
    let routes = find_listener(config, &at.listener)?.tcp_routes();
    at.route
        .resolve(routes)
        .map(|i| &routes[i])
        .ok_or_else(|| at.not_found(RouteKind::Tcp))
}

pub fn find_tcp_route_mut<'a>(
    config: &'a mut LocalConfig,
    at: &RouteAddress,
) -> Result<&'a mut TcpRoute, EditorError> {
    let not_found = at.not_found(RouteKind::Tcp);
    let routes = find_listener_mut(config, &at.listener)?
        .tcp_routes
        .as_mut()
        .ok_or_else(|| not_found.clone())?;
    let idx = at.route.resolve(routes.as_slice()).ok_or(not_found)?;
    Ok(&mut routes[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListenerProtocol;

    fn config() -> LocalConfig {
        let mut named = Listener::new(Some("public".into()), ListenerProtocol::Http);
        named.routes = Some(vec![Route::named("a"), Route::named("b")]);
        let unnamed = Listener::new(None, ListenerProtocol::Tcp);
        LocalConfig {
            binds: vec![Bind {
                port: 8080,
                listeners: vec![named, unnamed],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_find_listener_by_name_and_placeholder() {
        let config = config();
        let l = find_listener(&config, &ListenerAddress::new(8080, "public")).unwrap();
        assert_eq!(l.name.as_deref(), Some("public"));

        let l = find_listener(&config, &ListenerAddress::new(8080, "unnamed")).unwrap();
        assert_eq!(l.protocol, ListenerProtocol::Tcp);

        assert_eq!(
            find_listener(&config, &ListenerAddress::new(9090, "public")).unwrap_err(),
            EditorError::BindNotFound { port: 9090 }
        );
        assert!(matches!(
            find_listener(&config, &ListenerAddress::new(8080, "private")),
            Err(EditorError::ListenerNotFound { .. })
        ));
    }

    #[test]
    fn test_find_route_by_index_and_id() {
        let config = config();
        let at = ListenerAddress::new(8080, "public");
        let second = find_route(&config, &at.route(1)).unwrap();
        assert_eq!(second.name.as_deref(), Some("b"));

        let by_id = find_route(&config, &at.route(second.id)).unwrap();
        assert_eq!(by_id.name.as_deref(), Some("b"));

        assert!(matches!(
            find_route(&config, &at.route(2)),
            Err(EditorError::RouteNotFound { kind: RouteKind::Http, .. })
        ));
        assert!(find_route(&config, &at.route(ElementId::new())).is_err());
    }

    #[test]
    fn test_missing_route_list_is_not_found() {
        let mut config = config();
        let at = ListenerAddress::new(8080, "unnamed").route(0);
        assert!(find_route_mut(&mut config, &at).is_err());
        assert!(find_tcp_route_mut(&mut config, &at).is_err());
    }
}
