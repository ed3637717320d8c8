//! Route policy bag.
//!
//! Policy payloads are kept as opaque JSON: the console edits their presence
//! and placement, the gateway owns their meaning.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Every named policy a route can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolicyKind {
    RequestHeaderModifier,
    ResponseHeaderModifier,
    RequestRedirect,
    UrlRewrite,
    RequestMirror,
    DirectResponse,
    Cors,
    McpAuthorization,
    McpAuthentication,
    A2a,
    Ai,
    BackendTls,
    BackendAuth,
    LocalRateLimit,
    RemoteRateLimit,
    JwtAuth,
    ExtAuthz,
    Timeout,
    Retry,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 19] = [
        PolicyKind::RequestHeaderModifier,
        PolicyKind::ResponseHeaderModifier,
        PolicyKind::RequestRedirect,
        PolicyKind::UrlRewrite,
        PolicyKind::RequestMirror,
        PolicyKind::DirectResponse,
        PolicyKind::Cors,
        PolicyKind::McpAuthorization,
        PolicyKind::McpAuthentication,
        PolicyKind::A2a,
        PolicyKind::Ai,
        PolicyKind::BackendTls,
        PolicyKind::BackendAuth,
        PolicyKind::LocalRateLimit,
        PolicyKind::RemoteRateLimit,
        PolicyKind::JwtAuth,
        PolicyKind::ExtAuthz,
        PolicyKind::Timeout,
        PolicyKind::Retry,
    ];

    /// Policies that only work when the route has exactly one backend.
    pub const BACKEND: [PolicyKind; 6] = [
        PolicyKind::McpAuthentication,
        PolicyKind::McpAuthorization,
        PolicyKind::BackendTls,
        PolicyKind::BackendAuth,
        PolicyKind::Ai,
        PolicyKind::A2a,
    ];

    /// Wire key of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::RequestHeaderModifier => "requestHeaderModifier",
            PolicyKind::ResponseHeaderModifier => "responseHeaderModifier",
            PolicyKind::RequestRedirect => "requestRedirect",
            PolicyKind::UrlRewrite => "urlRewrite",
            PolicyKind::RequestMirror => "requestMirror",
            PolicyKind::DirectResponse => "directResponse",
            PolicyKind::Cors => "cors",
            PolicyKind::McpAuthorization => "mcpAuthorization",
            PolicyKind::McpAuthentication => "mcpAuthentication",
            PolicyKind::A2a => "a2a",
            PolicyKind::Ai => "ai",
            PolicyKind::BackendTls => "backendTLS",
            PolicyKind::BackendAuth => "backendAuth",
            PolicyKind::LocalRateLimit => "localRateLimit",
            PolicyKind::RemoteRateLimit => "remoteRateLimit",
            PolicyKind::JwtAuth => "jwtAuth",
            PolicyKind::ExtAuthz => "extAuthz",
            PolicyKind::Timeout => "timeout",
            PolicyKind::Retry => "retry",
        }
    }

    /// Case-insensitive lookup, so `AI`, `backendTls` and `CORS` all resolve.
    pub fn from_key(key: &str) -> Option<PolicyKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(key))
    }

    pub fn is_backend_policy(&self) -> bool {
        Self::BACKEND.contains(self)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policies {
    // Filters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_header_modifier: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_header_modifier: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_redirect: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_rewrite: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_mirror: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<Value>,

    // Backend policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_authorization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_authentication: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a2a: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<Value>,
    #[serde(rename = "backendTLS", default, skip_serializing_if = "Option::is_none")]
    pub backend_tls: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_auth: Option<Value>,

    // Route policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_rate_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_rate_limit: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_auth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_authz: Option<Value>,

    // Traffic policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<Value>,

    /// Keys this console does not know about, carried through untouched.
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl Policies {
    pub fn get(&self, kind: PolicyKind) -> Option<&Value> {
        self.slot(kind).as_ref()
    }

    /// Set a policy payload. `null` clears the slot.
    pub fn set(&mut self, kind: PolicyKind, value: Value) {
        *self.slot_mut(kind) = if value.is_null() { None } else { Some(value) };
    }

    pub fn remove(&mut self, kind: PolicyKind) -> Option<Value> {
        self.slot_mut(kind).take()
    }

    /// Set by wire key, falling back to the passthrough map for unknown keys.
    pub fn set_by_key(&mut self, key: &str, value: Value) {
        match PolicyKind::from_key(key) {
            Some(kind) => self.set(kind, value),
            None if value.is_null() => {
                self.other.remove(key);
            }
            None => {
                self.other.insert(key.to_string(), value);
            }
        }
    }

    /// Present policies, in declaration order.
    pub fn kinds(&self) -> Vec<PolicyKind> {
        PolicyKind::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds().is_empty() && self.other.is_empty()
    }

    fn slot(&self, kind: PolicyKind) -> &Option<Value> {
        match kind {
            PolicyKind::RequestHeaderModifier => &self.request_header_modifier,
            PolicyKind::ResponseHeaderModifier => &self.response_header_modifier,
            PolicyKind::RequestRedirect => &self.request_redirect,
            PolicyKind::UrlRewrite => &self.url_rewrite,
            PolicyKind::RequestMirror => &self.request_mirror,
            PolicyKind::DirectResponse => &self.direct_response,
            PolicyKind::Cors => &self.cors,
            PolicyKind::McpAuthorization => &self.mcp_authorization,
            PolicyKind::McpAuthentication => &self.mcp_authentication,
            PolicyKind::A2a => &self.a2a,
            PolicyKind::Ai => &self.ai,
            PolicyKind::BackendTls => &self.backend_tls,
            PolicyKind::BackendAuth => &self.backend_auth,
            PolicyKind::LocalRateLimit => &self.local_rate_limit,
            PolicyKind::RemoteRateLimit => &self.remote_rate_limit,
            PolicyKind::JwtAuth => &self.jwt_auth,
            PolicyKind::ExtAuthz => &self.ext_authz,
            PolicyKind::Timeout => &self.timeout,
            PolicyKind::Retry => &self.retry,
        }
    }

    fn slot_mut(&mut self, kind: PolicyKind) -> &mut Option<Value> {
        match kind {
            PolicyKind::RequestHeaderModifier => &mut self.request_header_modifier,
            PolicyKind::ResponseHeaderModifier => &mut self.response_header_modifier,
            PolicyKind::RequestRedirect => &mut self.request_redirect,
            PolicyKind::UrlRewrite => &mut self.url_rewrite,
            PolicyKind::RequestMirror => &mut self.request_mirror,
            PolicyKind::DirectResponse => &mut self.direct_response,
            PolicyKind::Cors => &mut self.cors,
            PolicyKind::McpAuthorization => &mut self.mcp_authorization,
            PolicyKind::McpAuthentication => &mut self.mcp_authentication,
            PolicyKind::A2a => &mut self.a2a,
            PolicyKind::Ai => &mut self.ai,
            PolicyKind::BackendTls => &mut self.backend_tls,
            PolicyKind::BackendAuth => &mut self.backend_auth,
            PolicyKind::LocalRateLimit => &mut self.local_rate_limit,
            PolicyKind::RemoteRateLimit => &mut self.remote_rate_limit,
            PolicyKind::JwtAuth => &mut self.jwt_auth,
            PolicyKind::ExtAuthz => &mut self.ext_authz,
            PolicyKind::Timeout => &mut self.timeout,
            PolicyKind::Retry => &mut self.retry,
        }
    }
}

/// Policies allowed on TCP routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TcpPolicies {
    #[serde(rename = "backendTLS", default, skip_serializing_if = "Option::is_none")]
    pub backend_tls: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_resolve_case_insensitively() {
        assert_eq!(PolicyKind::from_key("backendTLS"), Some(PolicyKind::BackendTls));
        assert_eq!(PolicyKind::from_key("backendTls"), Some(PolicyKind::BackendTls));
        assert_eq!(PolicyKind::from_key("AI"), Some(PolicyKind::Ai));
        assert_eq!(PolicyKind::from_key("somethingElse"), None);
    }

    #[test]
    fn test_null_policies_are_absent() {
        let p: Policies = serde_json::from_value(json!({
            "ai": null,
            "cors": {"allowOrigins": ["*"]},
            "customThing": {"a": 1}
        }))
        .unwrap();
        assert_eq!(p.kinds(), vec![PolicyKind::Cors]);
        assert!(p.other.contains_key("customThing"));

        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(
            out,
            json!({"cors": {"allowOrigins": ["*"]}, "customThing": {"a": 1}})
        );
    }

    #[test]
    fn test_set_by_key() {
        let mut p = Policies::default();
        p.set_by_key("mcpAuthentication", json!({"issuer": "me"}));
        p.set_by_key("vendorExtension", json!(true));
        assert!(p.get(PolicyKind::McpAuthentication).is_some());
        assert_eq!(p.other.get("vendorExtension"), Some(&json!(true)));

        p.set_by_key("mcpAuthentication", Value::Null);
        assert!(p.get(PolicyKind::McpAuthentication).is_none());
        assert!(!p.is_empty());
    }

    #[test]
    fn test_backend_tls_wire_key() {
        let mut p = Policies::default();
        p.set(PolicyKind::BackendTls, json!({"insecure": true}));
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out, json!({"backendTLS": {"insecure": true}}));
    }
}
