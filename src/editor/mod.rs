//! Structural edits on the configuration graph.
//!
//! # Data Flow
//! ```text
//! operator action
//!     → locate.rs (bind by port → listener by name → route/backend by index or id)
//!     → validate.rs (form-level checks)
//!     → policy checker (backend deletions only)
//!     → mutate in place
//!     → caller writes the whole graph back to the gateway
//! ```
//!
//! # Design Decisions
//! - No I/O; callers own fetch and persist
//! - Every check runs before the first mutation, so a failed edit leaves the graph untouched
//! - Edits keep the element's `ElementId`, so applying the same edit twice is a no-op
//! - Route kind (HTTP vs TCP) must match the listener protocol

pub mod backends;
pub mod error;
pub mod listeners;
pub mod locate;
pub mod routes;
pub mod validate;
pub mod views;

pub use backends::{
    add_backend, add_tcp_backend, delete_backend, delete_tcp_backend, edit_backend,
    edit_tcp_backend,
};
pub use error::EditorError;
pub use listeners::{
    add_bind, add_listener, delete_bind, delete_listener, edit_listener, ListenerSettings,
};
pub use locate::{
    find_backend, find_bind, find_listener, find_route, find_tcp_route, BackendAddress, ElementRef,
    ListenerAddress, RouteAddress,
};
pub use routes::{
    add_route, add_tcp_route, delete_route, delete_tcp_route, edit_route, edit_tcp_route,
};
pub use validate::{
    parse_weight, validate_backend, validate_listener, validate_route, validate_tcp_backend,
    validate_tcp_route, FormError,
};
pub use views::{
    backend_contexts, backends_by_bind, group_by_bind, route_contexts, routes_by_bind,
    BackendContext, BindScoped, RouteContext, RouteView,
};
