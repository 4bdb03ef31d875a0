use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use k8s::NodeExt as _;
use k8s_nodes::ReflectorConfig;
use tower::ServiceExt as _;

use super::*;

/// Stands in for the API server: a node literally named `ready`, a missing node
/// `gone`, and an internal error for everything else, including list and watch.
async fn api_server(
    request: Request<kube::client::Body>,
) -> Result<Response<String>, Infallible> {
    let (code, body) = match request.uri().path() {
        "/api/v1/nodes/ready" => {
            let node = corev1::Node::new("ready");
            (200, serde_json::to_string(&node).unwrap())
        }
        "/api/v1/nodes/gone" => (404, api_status(404, "NotFound")),
        _ => (500, api_status(500, "InternalError")),
    };
    let response = Response::builder()
        .status(code)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    Ok(response)
}

fn api_status(code: u16, reason: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("{reason} from test API server"),
        "reason": reason,
        "code": code,
    })
    .to_string()
}

fn inventory() -> (Inventory, CancellationToken) {
    let client = kube::Client::new(tower::service_fn(api_server), "default");
    let api = Arc::new(KubeApi::with_client(client));
    let config = ReflectorConfig {
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(1),
        ..ReflectorConfig::default()
    };
    let cancel = CancellationToken::new();
    let inventory = NodeInventory::new(api, config, ReadinessPolicy::default(), cancel.clone());
    (Arc::new(inventory), cancel)
}

async fn fetch(app: Router, uri: &str) -> (http::StatusCode, serde_json::Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let code = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (code, serde_json::from_slice(&bytes).unwrap_or_default())
}

#[tokio::test]
async fn node_lookup_failure_is_unavailable_not_missing() {
    let (inventory, cancel) = inventory();
    let (code, body) = fetch(router(inventory), "/api/v1/nodes/node-1").await;
    assert_eq!(code, http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["reason"], "ServiceUnavailable");
    cancel.cancel();
}

#[tokio::test]
async fn missing_node_is_not_found() {
    let (inventory, cancel) = inventory();
    let (code, body) = fetch(router(inventory), "/api/v1/nodes/gone").await;
    assert_eq!(code, http::StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "NotFound");
    cancel.cancel();
}

#[tokio::test]
async fn node_named_ready_is_reachable() {
    let (inventory, cancel) = inventory();
    let (code, body) = fetch(router(inventory), "/api/v1/nodes/ready").await;
    assert_eq!(code, http::StatusCode::OK);
    assert_eq!(body["metadata"]["name"], "ready");
    cancel.cancel();
}

#[tokio::test]
async fn ready_nodes_fallback_failure_is_unavailable() {
    let (inventory, cancel) = inventory();
    let (code, body) = fetch(router(inventory), "/ready-nodes").await;
    assert_eq!(code, http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], 503);
    cancel.cancel();
}

#[tokio::test]
async fn readyz_reports_unsynced_cache() {
    let (inventory, cancel) = inventory();
    let (code, _) = fetch(router(inventory), "/readyz").await;
    assert_eq!(code, http::StatusCode::SERVICE_UNAVAILABLE);
    cancel.cancel();
}
