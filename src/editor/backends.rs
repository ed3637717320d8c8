//! Backend edits on HTTP and TCP routes.

use crate::model::{ElementId, LocalConfig, RouteBackend, TcpRouteBackend};
use crate::observability::metrics;
use crate::policy;

use super::error::EditorError;
use super::locate::{find_route_mut, find_tcp_route_mut, BackendAddress, RouteAddress};
use super::validate::{validate_backend, validate_tcp_backend};

/// Append a backend to a route. Not blocked by backend policies.
pub fn add_backend(
    config: &mut LocalConfig,
    at: &RouteAddress,
    backend: RouteBackend,
) -> Result<ElementId, EditorError> {
    let result = try_add_backend(config, at, backend);
    metrics::record_edit("add_backend", result.is_ok());
    result
}

fn try_add_backend(
    config: &mut LocalConfig,
    at: &RouteAddress,
    backend: RouteBackend,
) -> Result<ElementId, EditorError> {
    validate_backend(&backend)?;
    let route = find_route_mut(config, at)?;
    let id = backend.id;
    route.backends.push(backend);
    if policy::has_backend_policies(&*route) && route.backends.len() > 1 {
        tracing::warn!(
            port = at.listener.port,
            listener = %at.listener.listener,
            backends = route.backends.len(),
            "backend added to a route whose backend policies expect exactly one backend"
        );
    }
    Ok(id)
}

/// Replace the backend at `at`, keeping its id and its route.
pub fn edit_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
    backend: RouteBackend,
) -> Result<(), EditorError> {
    let result = try_edit_backend(config, at, backend);
    metrics::record_edit("edit_backend", result.is_ok());
    result
}

fn try_edit_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
    mut backend: RouteBackend,
) -> Result<(), EditorError> {
    validate_backend(&backend)?;
    let route = find_route_mut(config, &at.route)?;
    let idx = at
        .backend
        .resolve(&route.backends)
        .ok_or_else(|| at.not_found())?;
    backend.id = route.backends[idx].id;
    route.backends[idx] = backend;
    Ok(())
}

/// Remove the backend at `at` if the route's backend policies allow it.
pub fn delete_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
) -> Result<RouteBackend, EditorError> {
    let result = try_delete_backend(config, at);
    if let Err(e) = &result {
        tracing::debug!(error = %e, "backend delete rejected");
    }
    metrics::record_edit("delete_backend", result.is_ok());
    result
}

fn try_delete_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
) -> Result<RouteBackend, EditorError> {
    let route = find_route_mut(config, &at.route)?;
    let idx = at
        .backend
        .resolve(&route.backends)
        .ok_or_else(|| at.not_found())?;
    policy::can_delete_backend(&*route, route.backends.len())?;
    Ok(route.backends.remove(idx))
}

pub fn add_tcp_backend(
    config: &mut LocalConfig,
    at: &RouteAddress,
    backend: TcpRouteBackend,
) -> Result<ElementId, EditorError> {
    let result = try_add_tcp_backend(config, at, backend);
    metrics::record_edit("add_tcp_backend", result.is_ok());
    result
}

fn try_add_tcp_backend(
    config: &mut LocalConfig,
    at: &RouteAddress,
    backend: TcpRouteBackend,
) -> Result<ElementId, EditorError> {
    validate_tcp_backend(&backend)?;
    let route = find_tcp_route_mut(config, at)?;
    let id = backend.id;
    route.backends.push(backend);
    if policy::has_backend_policies(&*route) && route.backends.len() > 1 {
        tracing::warn!(
            port = at.listener.port,
            listener = %at.listener.listener,
            backends = route.backends.len(),
            "backend added to a TCP route with backendTLS"
        );
    }
    Ok(id)
}

pub fn edit_tcp_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
    backend: TcpRouteBackend,
) -> Result<(), EditorError> {
    let result = try_edit_tcp_backend(config, at, backend);
    metrics::record_edit("edit_tcp_backend", result.is_ok());
    result
}

fn try_edit_tcp_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
    mut backend: TcpRouteBackend,
) -> Result<(), EditorError> {
    validate_tcp_backend(&backend)?;
    let route = find_tcp_route_mut(config, &at.route)?;
    let idx = at
        .backend
        .resolve(&route.backends)
        .ok_or_else(|| at.not_found())?;
    backend.id = route.backends[idx].id;
    route.backends[idx] = backend;
    Ok(())
}

/// Remove a TCP route backend. `backendTLS` constrains it like any backend policy.
pub fn delete_tcp_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
) -> Result<TcpRouteBackend, EditorError> {
    let result = try_delete_tcp_backend(config, at);
    metrics::record_edit("delete_tcp_backend", result.is_ok());
    result
}

fn try_delete_tcp_backend(
    config: &mut LocalConfig,
    at: &BackendAddress,
) -> Result<TcpRouteBackend, EditorError> {
    let route = find_tcp_route_mut(config, &at.route)?;
    let idx = at
        .backend
        .resolve(&route.backends)
        .ok_or_else(|| at.not_found())?;
    policy::can_delete_backend(&*route, route.backends.len())?;
    Ok(route.backends.remove(idx))
}
