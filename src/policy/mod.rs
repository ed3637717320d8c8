//! Backend-policy constraint checking.
//!
//! # Responsibilities
//! - Detect backend policies (MCP authn/authz, backend TLS/auth, AI, A2A) on a route
//! - Decide whether a backend deletion keeps a constrained route at one backend
//! - Report routes that currently violate the one-backend rule
//!
//! # Design Decisions
//! - Pure functions over an explicit route or graph; no state
//! - Enforced when deleting a backend only; adding is never blocked
//! - `audit` is diagnostic and never fails an edit

pub mod audit;
pub mod checker;

pub use audit::{audit, AuditFinding};
pub use checker::{
    backend_policy_types, can_delete_backend, has_backend_policies, BackendPolicyScope,
    PolicyViolation,
};
