//! Bind and listener edits.

use crate::model::{Bind, Listener, ListenerProtocol, LocalConfig, RouteKind, TlsConfig};
use crate::observability::metrics;

use super::error::EditorError;
use super::locate::{find_bind_mut, find_listener, listener_matches, ListenerAddress};
use super::validate::validate_listener;

/// Listener fields editable without touching its routes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListenerSettings {
    pub name: Option<String>,
    pub gateway_name: Option<String>,
    pub hostname: Option<String>,
    pub protocol: ListenerProtocol,
    pub tls: Option<TlsConfig>,
}

impl From<&Listener> for ListenerSettings {
    fn from(l: &Listener) -> Self {
        Self {
            name: l.name.clone(),
            gateway_name: l.gateway_name.clone(),
            hostname: l.hostname.clone(),
            protocol: l.protocol,
            tls: l.tls.clone(),
        }
    }
}

pub fn add_bind(config: &mut LocalConfig, port: u16) -> Result<(), EditorError> {
    let result = if config.bind(port).is_some() {
        Err(EditorError::BindExists { port })
    } else {
        config.binds.push(Bind::new(port));
        Ok(())
    };
    metrics::record_edit("add_bind", result.is_ok());
    result
}

pub fn delete_bind(config: &mut LocalConfig, port: u16) -> Result<Bind, EditorError> {
    let result = match config.binds.iter().position(|b| b.port == port) {
        Some(idx) => Ok(config.binds.remove(idx)),
        None => Err(EditorError::BindNotFound { port }),
    };
    metrics::record_edit("delete_bind", result.is_ok());
    result
}

/// Attach a listener to the bind on `port`, creating the bind if needed.
pub fn add_listener(
    config: &mut LocalConfig,
    port: u16,
    listener: Listener,
) -> Result<(), EditorError> {
    let result = try_add_listener(config, port, listener);
    metrics::record_edit("add_listener", result.is_ok());
    result
}

fn try_add_listener(
    config: &mut LocalConfig,
    port: u16,
    listener: Listener,
) -> Result<(), EditorError> {
    validate_listener(&listener)?;
    check_route_kinds(&listener, listener.protocol)?;
    if let Some(bind) = config.bind(port) {
        if bind
            .listeners
            .iter()
            .any(|l| listener_matches(l, listener.display_name()))
        {
            return Err(EditorError::ListenerExists {
                port,
                listener: listener.display_name().to_string(),
            });
        }
    } else {
        config.binds.push(Bind::new(port));
    }
    find_bind_mut(config, port)?.listeners.push(listener);
    Ok(())
}

/// Update listener settings; its routes stay in place.
pub fn edit_listener(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    settings: ListenerSettings,
) -> Result<(), EditorError> {
    let result = try_edit_listener(config, at, settings);
    metrics::record_edit("edit_listener", result.is_ok());
    result
}

fn try_edit_listener(
    config: &mut LocalConfig,
    at: &ListenerAddress,
    settings: ListenerSettings,
) -> Result<(), EditorError> {
    let current = find_listener(config, at)?;

    let mut updated = current.clone();
    updated.name = settings.name;
    updated.gateway_name = settings.gateway_name;
    updated.hostname = settings.hostname;
    updated.protocol = settings.protocol;
    updated.tls = settings.tls;
    validate_listener(&updated)?;
    check_route_kinds(current, updated.protocol)?;

    let new_name = updated.display_name().to_string();
    let bind = find_bind_mut(config, at.port)?;
    if new_name != at.listener && bind.listeners.iter().any(|l| listener_matches(l, &new_name)) {
        return Err(EditorError::ListenerExists {
            port: at.port,
            listener: new_name,
        });
    }
    let slot = bind
        .listeners
        .iter_mut()
        .find(|l| listener_matches(l, &at.listener))
        .ok_or_else(|| EditorError::ListenerNotFound {
            port: at.port,
            listener: at.listener.clone(),
        })?;
    *slot = updated;
    Ok(())
}

pub fn delete_listener(
    config: &mut LocalConfig,
    at: &ListenerAddress,
) -> Result<Listener, EditorError> {
    let result = find_bind_mut(config, at.port).and_then(|bind| {
        let idx = bind
            .listeners
            .iter()
            .position(|l| listener_matches(l, &at.listener))
            .ok_or_else(|| EditorError::ListenerNotFound {
                port: at.port,
                listener: at.listener.clone(),
            })?;
        Ok(bind.listeners.remove(idx))
    });
    metrics::record_edit("delete_listener", result.is_ok());
    result
}

/// A listener may only own routes of the kind its protocol implies.
fn check_route_kinds(listener: &Listener, protocol: ListenerProtocol) -> Result<(), EditorError> {
    for kind in listener.owned_route_kinds() {
        if protocol.route_kind() != Some(kind) {
            return Err(EditorError::RouteKindMismatch {
                listener: listener.display_name().to_string(),
                protocol,
                kind,
            });
        }
    }
    Ok(())
}
