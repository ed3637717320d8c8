//! Fetch, edit, write back against a versioned mock gateway.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use gateway_console::client::{ClientError, GatewayClient};
use gateway_console::config::{ConfigMode, GatewaySettings};
use gateway_console::editor::{self, EditorError, ListenerAddress};
use gateway_console::model::{Backend, RouteBackend};
use gateway_console::policy::{self, PolicyViolation};

mod common;
use common::{start_programmable_gateway, MockGateway, MockResponse};

/// Gateway that stores the graph and bumps a version on every accepted write.
async fn versioned_gateway(initial: Value) -> MockGateway {
    let state = Arc::new(Mutex::new((1u64, initial)));
    start_programmable_gateway(move |req| {
        let mut state = state.lock().unwrap();
        let etag = format!("\"v{}\"", state.0);
        match req.method.as_str() {
            "GET" => MockResponse::json(200, &state.1).with_header("ETag", &etag),
            "POST" => {
                if req.header("if-match").is_some_and(|v| v != etag) {
                    return MockResponse::new(412, "version mismatch");
                }
                state.0 += 1;
                state.1 = req.json();
                MockResponse::new(200, "").with_header("ETag", &format!("\"v{}\"", state.0))
            }
            _ => MockResponse::new(404, ""),
        }
    })
    .await
}

fn client(gateway: &MockGateway) -> GatewayClient {
    GatewayClient::new(&GatewaySettings {
        api_base_url: gateway.url(),
        mode: ConfigMode::Static,
        ..Default::default()
    })
    .unwrap()
}

fn graph(policies: Value) -> Value {
    json!({
        "binds": [{
            "port": 8080,
            "listeners": [{
                "routes": [{
                    "name": "llm",
                    "policies": policies,
                    "backends": [
                        {"service": {"name": "default/httpbin", "port": 8000}},
                        {"host": "example.com:443"}
                    ]
                }]
            }]
        }]
    })
}

fn first_route_backends(gateway: &MockGateway) -> Vec<Value> {
    let post = gateway
        .requests()
        .into_iter()
        .filter(|r| r.method == "POST")
        .last()
        .unwrap();
    post.json()["binds"][0]["listeners"][0]["routes"][0]["backends"]
        .as_array()
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_delete_backend_round_trip() {
    let gateway = versioned_gateway(graph(json!({}))).await;
    let client = client(&gateway);

    let mut editable = client.fetch().await.unwrap().into_editable().unwrap();
    let at = ListenerAddress::new(8080, "unnamed").route(0).backend(0);
    editor::delete_backend(editable.config_mut(), &at).unwrap();
    client.update(&mut editable).await.unwrap();

    let backends = first_route_backends(&gateway);
    assert_eq!(backends.len(), 1);
    assert_eq!(backends[0]["host"], "example.com:443");

    // The write is visible on the next fetch
    let refetched = client.fetch_config().await.unwrap();
    assert_eq!(refetched.version(), Some("\"v2\""));
    assert_eq!(
        refetched.config().binds[0].listeners[0].routes()[0].backends.len(),
        1
    );
}

#[tokio::test]
async fn test_policy_rejection_never_writes() {
    let gateway = versioned_gateway(graph(json!({"ai": {"promptGuard": {}}}))).await;
    let client = client(&gateway);

    let mut editable = client.fetch().await.unwrap().into_editable().unwrap();
    let before = editable.config().clone();
    let route_at = ListenerAddress::new(8080, "unnamed").route(0);

    // Adding is never blocked; the graph now violates the rule
    editor::add_backend(
        editable.config_mut(),
        &route_at,
        RouteBackend::new(Backend::Host("backup.example.com:443".into())),
    )
    .unwrap();
    assert_eq!(policy::audit(editable.config()).len(), 1);

    // 3 → 2 is rejected
    let err = editor::delete_backend(editable.config_mut(), &route_at.backend(2)).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Policy(PolicyViolation::BackendCount { remaining: 2, .. })
    ));
    assert!(err.to_string().contains("ai"));

    assert_ne!(editable.config(), &before);
    assert!(gateway.requests().iter().all(|r| r.method == "GET"));
}

#[tokio::test]
async fn test_stale_write_is_rejected() {
    let gateway = versioned_gateway(graph(json!({}))).await;
    let client = client(&gateway);

    let mut first = client.fetch_config().await.unwrap();
    let mut second = client.fetch_config().await.unwrap();

    let weight_at = ListenerAddress::new(8080, "unnamed").route(0).backend(1);
    let updated = editor::find_backend(first.config(), &weight_at)
        .unwrap()
        .clone()
        .with_weight(4);
    editor::edit_backend(first.config_mut(), &weight_at, updated).unwrap();
    client.update(&mut first).await.unwrap();

    editor::delete_backend(second.config_mut(), &weight_at).unwrap();
    assert!(matches!(
        client.update(&mut second).await,
        Err(ClientError::Conflict { .. })
    ));

    // Only the first write landed
    let current = client.fetch_config().await.unwrap();
    let backends = &current.config().binds[0].listeners[0].routes()[0].backends;
    assert_eq!(backends.len(), 2);
    assert_eq!(backends[1].weight, 4);
    assert_eq!(gateway.requests().iter().filter(|r| r.method == "POST").count(), 2);
}

#[tokio::test]
async fn test_missing_listener_is_not_found() {
    let gateway = versioned_gateway(graph(json!({}))).await;
    let client = client(&gateway);

    let mut editable = client.fetch_config().await.unwrap();
    let at = ListenerAddress::new(8080, "web").route(0).backend(0);
    assert!(matches!(
        editor::delete_backend(editable.config_mut(), &at),
        Err(EditorError::ListenerNotFound { .. })
    ));
}
