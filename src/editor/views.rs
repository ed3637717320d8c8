//! Derived table views over the graph.
//!
//! Recomputed from the graph on every call; nothing is cached.

use std::collections::BTreeMap;

use crate::model::{
    ElementId, ListenerProtocol, LocalConfig, Route, RouteBackend, RouteKind, TcpRoute,
};

use super::locate::{BackendAddress, ListenerAddress, RouteAddress};

/// Records that know which bind they came from.
pub trait BindScoped {
    fn bind_port(&self) -> u16;
}

/// A backend together with where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendContext<'a> {
    pub bind_port: u16,
    pub listener: &'a str,
    pub route_index: usize,
    pub route_id: ElementId,
    pub route_name: Option<&'a str>,
    pub backend_index: usize,
    pub backend: &'a RouteBackend,
}

impl BackendContext<'_> {
    /// Address for feeding this row back into an edit, by stable id.
    pub fn address(&self) -> BackendAddress {
        ListenerAddress::new(self.bind_port, self.listener)
            .route(self.route_id)
            .backend(self.backend.id)
    }
}

impl BindScoped for BackendContext<'_> {
    fn bind_port(&self) -> u16 {
        self.bind_port
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouteView<'a> {
    Http(&'a Route),
    Tcp(&'a TcpRoute),
}

impl RouteView<'_> {
    pub fn kind(&self) -> RouteKind {
        match self {
            RouteView::Http(_) => RouteKind::Http,
            RouteView::Tcp(_) => RouteKind::Tcp,
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            RouteView::Http(r) => r.id,
            RouteView::Tcp(r) => r.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RouteView::Http(r) => r.name.as_deref(),
            RouteView::Tcp(r) => r.name.as_deref(),
        }
    }

    pub fn hostnames(&self) -> &[String] {
        match self {
            RouteView::Http(r) => &r.hostnames,
            RouteView::Tcp(r) => &r.hostnames,
        }
    }

    pub fn backend_count(&self) -> usize {
        match self {
            RouteView::Http(r) => r.backends.len(),
            RouteView::Tcp(r) => r.backends.len(),
        }
    }
}

/// A route together with where it lives.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteContext<'a> {
    pub bind_port: u16,
    pub listener: &'a str,
    pub protocol: ListenerProtocol,
    pub route_index: usize,
    pub route: RouteView<'a>,
}

impl RouteContext<'_> {
    pub fn address(&self) -> RouteAddress {
        ListenerAddress::new(self.bind_port, self.listener).route(self.route.id())
    }
}

impl BindScoped for RouteContext<'_> {
    fn bind_port(&self) -> u16 {
        self.bind_port
    }
}

/// Every HTTP route backend in graph order.
pub fn backend_contexts(config: &LocalConfig) -> Vec<BackendContext<'_>> {
    let mut out = Vec::new();
    for bind in &config.binds {
        for listener in &bind.listeners {
            for (route_index, route) in listener.routes().iter().enumerate() {
                for (backend_index, backend) in route.backends.iter().enumerate() {
                    out.push(BackendContext {
                        bind_port: bind.port,
                        listener: listener.display_name(),
                        route_index,
                        route_id: route.id,
                        route_name: route.name.as_deref(),
                        backend_index,
                        backend,
                    });
                }
            }
        }
    }
    out
}

/// Every HTTP and TCP route in graph order, HTTP first within a listener.
pub fn route_contexts(config: &LocalConfig) -> Vec<RouteContext<'_>> {
    let mut out = Vec::new();
    for bind in &config.binds {
        for listener in &bind.listeners {
            let http = listener.routes().iter().map(RouteView::Http);
            let tcp = listener.tcp_routes().iter().map(RouteView::Tcp);
            let http_count = listener.routes().len();
            for (i, route) in http.chain(tcp).enumerate() {
                let route_index = if i < http_count { i } else { i - http_count };
                out.push(RouteContext {
                    bind_port: bind.port,
                    listener: listener.display_name(),
                    protocol: listener.protocol,
                    route_index,
                    route,
                });
            }
        }
    }
    out
}

pub fn group_by_bind<T: BindScoped>(records: Vec<T>) -> BTreeMap<u16, Vec<T>> {
    let mut grouped: BTreeMap<u16, Vec<T>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.bind_port()).or_default().push(record);
    }
    grouped
}

pub fn backends_by_bind(config: &LocalConfig) -> BTreeMap<u16, Vec<BackendContext<'_>>> {
    group_by_bind(backend_contexts(config))
}

pub fn routes_by_bind(config: &LocalConfig) -> BTreeMap<u16, Vec<RouteContext<'_>>> {
    group_by_bind(route_contexts(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::backends::edit_backend;
    use crate::model::{Backend, Bind, Listener, TcpRoute};

    fn config() -> LocalConfig {
        let mut web = Listener::new(None, ListenerProtocol::Http);
        web.routes = Some(vec![
            Route {
                name: Some("a".into()),
                backends: vec![
                    RouteBackend::new(Backend::Host("a1:80".into())),
                    RouteBackend::new(Backend::Host("a2:80".into())),
                ],
                ..Default::default()
            },
            Route::named("b"),
        ]);
        let mut tcp = Listener::new(Some("tcp".into()), ListenerProtocol::Tcp);
        tcp.tcp_routes = Some(vec![TcpRoute::default()]);
        let mut other = Listener::new(None, ListenerProtocol::Http);
        other.routes = Some(vec![Route {
            backends: vec![RouteBackend::new(Backend::Dynamic {})],
            ..Default::default()
        }]);
        LocalConfig {
            binds: vec![
                Bind {
                    port: 9000,
                    listeners: vec![web, tcp],
                },
                Bind {
                    port: 80,
                    listeners: vec![other],
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_backends_grouped_by_port() {
        let config = config();
        let grouped = backends_by_bind(&config);
        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![80, 9000]);
        let rows = &grouped[&9000];
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].backend_index, 1);
        assert_eq!(rows[1].route_name, Some("a"));
        assert_eq!(rows[1].listener, "unnamed");
    }

    #[test]
    fn test_routes_grouped_by_port() {
        let config = config();
        let grouped = routes_by_bind(&config);
        let rows = &grouped[&9000];
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].route_index, 1);
        assert_eq!(rows[2].route.kind(), RouteKind::Tcp);
        assert_eq!(rows[2].route_index, 0);
        assert_eq!(rows[2].listener, "tcp");
        assert_eq!(grouped[&80][0].route.backend_count(), 1);
    }

    #[test]
    fn test_context_address_round_trips_into_edit() {
        let mut config = config();
        let address = backend_contexts(&config)[1].address();
        edit_backend(
            &mut config,
            &address,
            RouteBackend::new(Backend::Host("replaced:80".into())),
        )
        .unwrap();
        assert_eq!(
            backend_contexts(&config)[1].backend.backend,
            Backend::Host("replaced:80".into())
        );
    }
}
