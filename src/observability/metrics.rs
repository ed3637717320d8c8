//! Metric helpers.
//!
//! # Metrics
//! - `console_gateway_requests_total` (counter): gateway calls by endpoint, outcome
//! - `console_edits_total` (counter): editor operations by op, outcome
//! - `console_rpc_calls_total` (counter): playground RPC calls by method, outcome

pub const GATEWAY_REQUESTS: &str = "console_gateway_requests_total";
pub const EDITS: &str = "console_edits_total";
pub const RPC_CALLS: &str = "console_rpc_calls_total";

fn outcome_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_gateway_request(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!(GATEWAY_REQUESTS, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

pub fn record_edit(op: &'static str, ok: bool) {
    metrics::counter!(EDITS, "op" => op, "outcome" => outcome_label(ok)).increment(1);
}

pub fn record_rpc_call(method: String, ok: bool) {
    metrics::counter!(RPC_CALLS, "method" => method, "outcome" => outcome_label(ok)).increment(1);
}
