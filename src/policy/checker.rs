//! Backend-policy predicates.

use thiserror::Error;

use crate::model::{PolicyKind, Route, TcpRoute};

/// Anything that can carry backend policies and own backends.
pub trait BackendPolicyScope {
    /// Present backend-policy kinds, in declaration order.
    fn backend_policy_types(&self) -> Vec<PolicyKind>;

    fn backend_count(&self) -> usize;
}

impl BackendPolicyScope for Route {
    fn backend_policy_types(&self) -> Vec<PolicyKind> {
        let Some(policies) = &self.policies else {
            return Vec::new();
        };
        policies
            .kinds()
            .into_iter()
            .filter(PolicyKind::is_backend_policy)
            .collect()
    }

    fn backend_count(&self) -> usize {
        self.backends.len()
    }
}

impl BackendPolicyScope for TcpRoute {
    fn backend_policy_types(&self) -> Vec<PolicyKind> {
        match &self.policies {
            Some(p) if p.backend_tls.is_some() => vec![PolicyKind::BackendTls],
            _ => Vec::new(),
        }
    }

    fn backend_count(&self) -> usize {
        self.backends.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error(
        "routes with backend policies ({}) must have exactly one backend; this change would leave {remaining}",
        join_kinds(.policies)
    )]
    BackendCount {
        policies: Vec<PolicyKind>,
        remaining: usize,
    },
}

fn join_kinds(kinds: &[PolicyKind]) -> String {
    kinds
        .iter()
        .map(PolicyKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn backend_policy_types<R: BackendPolicyScope>(route: &R) -> Vec<PolicyKind> {
    route.backend_policy_types()
}

pub fn has_backend_policies<R: BackendPolicyScope>(route: &R) -> bool {
    !route.backend_policy_types().is_empty()
}

/// Whether a route holding `current` backends may lose one.
///
/// Unconstrained routes may always shrink, down to zero. Constrained routes
/// may only shrink to exactly one backend.
pub fn can_delete_backend<R: BackendPolicyScope>(
    route: &R,
    current: usize,
) -> Result<(), PolicyViolation> {
    let policies = route.backend_policy_types();
    if policies.is_empty() {
        return Ok(());
    }
    let remaining = current.saturating_sub(1);
    if current.checked_sub(1) == Some(1) {
        Ok(())
    } else {
        Err(PolicyViolation::BackendCount {
            policies,
            remaining,
        })
    }
}
