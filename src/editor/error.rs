//! Editor error definitions.

use thiserror::Error;

use crate::model::{ListenerProtocol, RouteKind};
use crate::policy::PolicyViolation;

use super::locate::ElementRef;
use super::validate::FormError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("no bind on port {port}")]
    BindNotFound { port: u16 },

    #[error("a bind on port {port} already exists")]
    BindExists { port: u16 },

    #[error("no listener '{listener}' on port {port}")]
    ListenerNotFound { port: u16, listener: String },

    #[error("a listener named '{listener}' already exists on port {port}")]
    ListenerExists { port: u16, listener: String },

    #[error("no {kind} route at {route} on listener '{listener}' (port {port})")]
    RouteNotFound {
        port: u16,
        listener: String,
        kind: RouteKind,
        route: ElementRef,
    },

    #[error("no backend at {backend} on route {route} of listener '{listener}' (port {port})")]
    BackendNotFound {
        port: u16,
        listener: String,
        route: ElementRef,
        backend: ElementRef,
    },

    #[error("{protocol} listener '{listener}' cannot own {kind} routes")]
    RouteKindMismatch {
        listener: String,
        protocol: ListenerProtocol,
        kind: RouteKind,
    },

    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error(transparent)]
    Invalid(#[from] FormError),
}
