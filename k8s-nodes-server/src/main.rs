use std::sync::Arc;

use constcat::concat;
use k8s_nodes::NodeInventory;
use k8s_nodes::ReadinessPolicy;
use k8s_nodes_ext as k8s;
use k8s_nodes_kubeapi::KubeApi;
use tokio_util::sync::CancellationToken;

use k8s::StatusExt as _;
use k8s::corev1;
use k8s::metav1;
use k8s::openapi::List;
use k8s::openapi::Resource;

use axum::extract::Path;
use axum::extract::State;
use axum::http;
use axum::{Json, Router, response::IntoResponse, routing::get};

use config::Config;

mod config;

const CORE_API_ROOT: &str = concat!("/api/", <corev1::Node as Resource>::API_VERSION);

type Inventory = Arc<NodeInventory<KubeApi>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "Starting k8s-nodes-server");

    let cancel = CancellationToken::new();
    let api = Arc::new(KubeApi::new().await?);
    let inventory = NodeInventory::new(api, config.reflector, config.policy, cancel.clone());
    let inventory = Arc::new(inventory);

    let app = router(inventory);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown(cancel))
        .await?;

    Ok(())
}

fn router(inventory: Inventory) -> Router {
    let nodes = Router::new()
        .route("/nodes", get(all_nodes))
        .route("/nodes/{node}", get(node))
        .with_state(Arc::clone(&inventory));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/ready-nodes", get(ready_nodes))
        .route("/readiness-policy", get(readiness_policy))
        .with_state(inventory)
        .nest(CORE_API_ROOT, nodes)
}

async fn shutdown(cancel: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down, stopping node cache");
    cancel.cancel();
}

async fn all_nodes(State(inventory): State<Inventory>) -> Json<List<corev1::Node>> {
    let items = inventory.nodes().await;
    let list = List {
        metadata: metav1::ListMeta::default(),
        items,
    };
    Json(list)
}

async fn ready_nodes(
    State(inventory): State<Inventory>,
) -> Result<Json<List<corev1::Node>>, Unavailable> {
    let items = inventory
        .ready_nodes()
        .await
        .inspect_err(|err| tracing::error!(%err, "Failed to list nodes"))
        .map_err(|err| Unavailable(err.to_string()))?;
    let list = List {
        metadata: metav1::ListMeta::default(),
        items,
    };
    Ok(Json(list))
}

async fn node(
    Path(node): Path<String>,
    State(inventory): State<Inventory>,
) -> Result<Json<corev1::Node>, axum::response::Response> {
    if let Some(cached) = inventory.node(&node).await {
        return Ok(Json(cached));
    }
    if inventory.has_synced() {
        return Err(NotFound::<corev1::Node>::new(node).into_response());
    }
    // Cold start: ask the API server directly.
    match inventory.api().get_node(&node).await {
        Ok(Some(fetched)) => Ok(Json(fetched)),
        Ok(None) => Err(NotFound::<corev1::Node>::new(node).into_response()),
        Err(err) => {
            tracing::error!(node = node.as_str(), %err, "Failed to fetch node");
            Err(Unavailable(err.to_string()).into_response())
        }
    }
}

async fn readiness_policy(State(inventory): State<Inventory>) -> Json<ReadinessPolicy> {
    Json(inventory.policy().clone())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(inventory): State<Inventory>) -> (http::StatusCode, &'static str) {
    if inventory.has_synced() {
        (http::StatusCode::OK, "ok")
    } else {
        (http::StatusCode::SERVICE_UNAVAILABLE, "node cache not synced")
    }
}

struct NotFound<K> {
    name: String,
    resource: std::marker::PhantomData<K>,
}

impl<K> NotFound<K> {
    fn new(name: String) -> Self {
        Self {
            name,
            resource: std::marker::PhantomData,
        }
    }
}

impl<K> IntoResponse for NotFound<K>
where
    K: Resource,
{
    fn into_response(self) -> axum::response::Response {
        let code = http::StatusCode::NOT_FOUND;
        let status = metav1::Status::not_found::<K>(self.name);
        (code, Json(status)).into_response()
    }
}

struct Unavailable(String);

impl IntoResponse for Unavailable {
    fn into_response(self) -> axum::response::Response {
        let code = http::StatusCode::SERVICE_UNAVAILABLE;
        let status = metav1::Status::unavailable(self.0);
        (code, Json(status)).into_response()
    }
}

#[cfg(test)]
mod tests;
