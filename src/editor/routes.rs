//! HTTP and TCP route edits.

use crate::model::{ElementId, Listener, LocalConfig, Route, RouteKind, TcpRoute};
use crate::observability::metrics;

use super::error::EditorError;
use super::locate::{find_listener_mut, ListenerAddress, RouteAddress};
use super::validate::{validate_route, validate_tcp_route};

fn ensure_kind(listener: &Listener, kind: RouteKind) -> Result<(), EditorError> {
    if listener.route_kind() == Some(kind) {
        Ok(())
    } else {
        Err(EditorError::RouteKindMismatch {
            listener: listener.display_name().to_string(),
            protocol: listener.protocol,
            kind,
        })
    }
}

pub fn add_route(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    route: Route,
) -> Result<ElementId, EditorError> {
    let result = try_add_route(config, at, route);
    metrics::record_edit("add_route", result.is_ok());
    result
}

fn try_add_route(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    route: Route,
) -> Result<ElementId, EditorError> {
    validate_route(&route)?;
    let listener = find_listener_mut(config, at)?;
    ensure_kind(listener, RouteKind::Http)?;
    let id = route.id;
    listener.routes.get_or_insert_with(Vec::new).push(route);
    Ok(id)
}

/// Replace the route at `at`, keeping its id.
pub fn edit_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
    route: Route,
) -> Result<(), EditorError> {
    let result = try_edit_route(config, at, route);
    metrics::record_edit("edit_route", result.is_ok());
    result
}

fn try_edit_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
    mut route: Route,
) -> Result<(), EditorError> {
    validate_route(&route)?;
    let listener = find_listener_mut(config, &at.listener)?;
    let routes = listener.routes.as_mut().ok_or_else(|| at.not_found(RouteKind::Http))?;
    let idx = at.route.resolve(routes.as_slice()).ok_or_else(|| at.not_found(RouteKind::Http))?;
    route.id = routes[idx].id;
    routes[idx] = route;
    Ok(())
}

pub fn delete_route(config: &mut LocalConfig, at: &RouteAddress) -> Result<Route, EditorError> {
    let result = try_delete_route(config, at);
    metrics::record_edit("delete_route", result.is_ok());
    result
}

fn try_delete_route(config: &mut LocalConfig, at: &RouteAddress) -> Result<Route, EditorError> {
    let listener = find_listener_mut(config, &at.listener)?;
    let routes = listener.routes.as_mut().ok_or_else(|| at.not_found(RouteKind::Http))?;
    let idx = at.route.resolve(routes.as_slice()).ok_or_else(|| at.not_found(RouteKind::Http))?;
    Ok(routes.remove(idx))
}

pub fn add_tcp_route(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    route: TcpRoute,
) -> Result<ElementId, EditorError> {
    let result = try_add_tcp_route(config, at, route);
    metrics::record_edit("add_tcp_route", result.is_ok());
    result
}

fn try_add_tcp_route(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    route: TcpRoute,
) -> Result<ElementId, EditorError> {
    validate_tcp_route(&route)?;
    let listener = find_listener_mut(config, at)?;
    ensure_kind(listener, RouteKind::Tcp)?;
    let id = route.id;
    listener.tcp_routes.get_or_insert_with(Vec::new).push(route);
    Ok(id)
}

pub fn edit_tcp_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
    route: TcpRoute,
) -> Result<(), EditorError> {
    let result = try_edit_tcp_route(config, at, route);
    metrics::record_edit("edit_tcp_route", result.is_ok());
    result
}

fn try_edit_tcp_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
    mut route: TcpRoute,
) -> Result<(), EditorError> {
    validate_tcp_route(&route)?;
    let listener = find_listener_mut(config, &at.listener)?;
    let routes = listener.tcp_routes.as_mut().ok_or_else(|| at.not_found(RouteKind::Tcp))?;
    let idx = at.route.resolve(routes.as_slice()).ok_or_else(|| at.not_found(RouteKind::Tcp))?;
    route.id = routes[idx].id;
    routes[idx] = route;
    Ok(())
}

pub fn delete_tcp_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
) -> Result<TcpRoute, EditorError> {
    let result = try_delete_tcp_route(config, at);
    metrics::record_edit("delete_tcp_route", result.is_ok());
    result
}

fn try_delete_tcp_route(
    config: &mut LocalConfig,
    at: &RouteAddress,
) -> Result<TcpRoute, EditorError> {
    let listener = find_listener_mut(config, &at.listener)?;
    let routes = listener.tcp_routes.as_mut().ok_or_else(|| at.not_found(RouteKind::Tcp))?;
    let idx = at.route.resolve(routes.as_slice()).ok_or_else(|| at.not_found(RouteKind::Tcp))?;
    Ok(routes.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::locate::{find_listener, find_route};
    use crate::model::{
        Backend, Bind, ListenerProtocol, NamespacedHostname, RouteBackend, SimpleBackend,
        TcpRouteBackend,
    };

    fn config() -> LocalConfig {
        LocalConfig {
            binds: vec![Bind {
                port: 8080,
                listeners: vec![
                    Listener::new(Some("web".into()), ListenerProtocol::Http),
                    Listener::new(Some("db".into()), ListenerProtocol::Tcp),
                ],
            }],
            ..Default::default()
        }
    }

    fn web() -> ListenerAddress {
        ListenerAddress::new(8080, "web")
    }

    fn db() -> ListenerAddress {
        ListenerAddress::new(8080, "db")
    }

    #[test]
    fn test_add_edit_delete_route() {
        let mut config = config();
        let a = add_route(&mut config, &web(), Route::named("a")).unwrap();
        add_route(&mut config, &web(), Route::named("b")).unwrap();

        let mut replacement = Route::named("a2");
        replacement.backends.push(RouteBackend::new(Backend::Host("a:80".into())));
        edit_route(&mut config, &web().route(0), replacement).unwrap();
        let edited = find_route(&config, &web().route(0)).unwrap();
        assert_eq!(edited.id, a);
        assert_eq!(edited.name.as_deref(), Some("a2"));

        let removed = delete_route(&mut config, &web().route(a)).unwrap();
        assert_eq!(removed.name.as_deref(), Some("a2"));
        let remaining = find_listener(&config, &web()).unwrap().routes();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name.as_deref(), Some("b"));
    }

    #[test]
    fn test_route_kind_follows_protocol() {
        let mut config = config();
        let err = add_route(&mut config, &db(), Route::named("x")).unwrap_err();
        assert_eq!(
            err,
            EditorError::RouteKindMismatch {
                listener: "db".into(),
                protocol: ListenerProtocol::Tcp,
                kind: RouteKind::Http,
            }
        );
        assert!(add_tcp_route(&mut config, &web(), TcpRoute::default()).is_err());
        assert!(find_listener(&config, &db()).unwrap().routes.is_none());
    }

    #[test]
    fn test_route_without_matches_is_rejected() {
        let mut config = config();
        let mut route = Route::named("empty");
        route.matches.clear();
        assert!(matches!(
            add_route(&mut config, &web(), route),
            Err(EditorError::Invalid(_))
        ));
    }

    #[test]
    fn test_tcp_route_lifecycle() {
        let mut config = config();
        let route = TcpRoute {
            name: Some("postgres".into()),
            backends: vec![TcpRouteBackend::new(SimpleBackend::Service {
                name: NamespacedHostname::new("data", "postgres"),
                port: 5432,
            })],
            ..Default::default()
        };
        let id = add_tcp_route(&mut config, &db(), route).unwrap();

        let replacement = TcpRoute {
            name: Some("pg".into()),
            ..Default::default()
        };
        edit_tcp_route(&mut config, &db().route(0), replacement).unwrap();
        let listener = find_listener(&config, &db()).unwrap();
        assert_eq!(listener.tcp_routes()[0].id, id);
        assert_eq!(listener.tcp_routes()[0].name.as_deref(), Some("pg"));

        delete_tcp_route(&mut config, &db().route(0)).unwrap();
        assert!(find_listener(&config, &db()).unwrap().tcp_routes().is_empty());
        assert!(matches!(
            delete_tcp_route(&mut config, &db().route(0)),
            Err(EditorError::RouteNotFound { kind: RouteKind::Tcp, .. })
        ));
    }
}
