use std::fmt::Debug;

use async_trait::async_trait;
use futures::StreamExt as _;
use k8s_nodes_ext as k8s;
use k8s_nodes_reflector as reflector;
use kube::api;

use k8s::corev1;
use reflector::EventStream;
use reflector::Listing;
use reflector::ResourceVersion;
use reflector::WatchEvent;

pub struct KubeApi {
    list_params: api::ListParams,
    watch_params: api::WatchParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi configured with a default Kubernetes client.
    ///
    /// On success, returns an initialized `KubeApi` wrapped in `kube::Result`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), kube::Error> {
    /// let api = k8s_nodes_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> kube::Result<Self> {
        kube::Client::try_default().await.map(Self::with_client)
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    ///
    /// The returned KubeApi lists and watches every Node in the cluster: no namespace,
    /// no label selector and no field selector are applied.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = kube::Client::try_default().await?;
    /// let api = k8s_nodes_kubeapi::KubeApi::with_client(client);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            list_params: api::ListParams::default(),
            watch_params: api::WatchParams::default(),
            client,
        }
    }

    /// Fetches a single Node by name, bypassing any cache.
    ///
    /// Returns `Ok(None)` when the Node does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(api: &k8s_nodes_kubeapi::KubeApi) -> kube::Result<()> {
    /// if let Some(node) = api.get_node("node-1").await? {
    ///     println!("{:?}", node.status);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_node(&self, name: &str) -> kube::Result<Option<corev1::Node>> {
        self.nodes().get_opt(name).await
    }

    /// Returns an Api handle scoped to all Nodes using the configured Kubernetes client.
    fn nodes(&self) -> api::Api<corev1::Node> {
        api::Api::all(self.client.clone())
    }

    /// Accesses the default list query parameters used by this API client.
    fn list_params(&self) -> &api::ListParams {
        &self.list_params
    }

    fn watch_params(&self) -> &api::WatchParams {
        &self.watch_params
    }
}

#[async_trait]
impl reflector::Lister<corev1::Node> for KubeApi {
    /// Lists every Node in the cluster along with the list's resource version.
    async fn list(&self) -> reflector::Result<Listing<corev1::Node>> {
        let lp = self.list_params();
        let list = self.nodes().list(lp).await?;
        let version = list.metadata.resource_version.unwrap_or_default();
        tracing::debug!(count = list.items.len(), version, "Listed nodes");
        Ok(Listing::new(list.items, version))
    }
}

#[async_trait]
impl reflector::Watcher<corev1::Node> for KubeApi {
    /// Opens a watch on all Nodes starting right after `from`.
    async fn watch(&self, from: &ResourceVersion) -> reflector::Result<EventStream<corev1::Node>> {
        let wp = self.watch_params();
        let stream = self.nodes().watch(wp, from.as_str()).await?;
        tracing::debug!(%from, "Watching nodes");
        Ok(stream.map(watch_event).boxed())
    }
}

/// Translates a raw kube watch event. A server-sent error object ends the watch.
fn watch_event(
    event: kube::Result<api::WatchEvent<corev1::Node>>,
) -> reflector::Result<WatchEvent<corev1::Node>> {
    match event? {
        api::WatchEvent::Added(node) => Ok(WatchEvent::Added(node)),
        api::WatchEvent::Modified(node) => Ok(WatchEvent::Modified(node)),
        api::WatchEvent::Deleted(node) => Ok(WatchEvent::Deleted(node)),
        api::WatchEvent::Bookmark(bookmark) => {
            let version = bookmark.metadata.resource_version;
            Ok(WatchEvent::Bookmark(version.into()))
        }
        api::WatchEvent::Error(err) => {
            let reason = format!("{err:?}");
            Err(reflector::Error::WatchTerminated(reason))
        }
    }
}

impl Debug for KubeApi {
    /// Formats the `KubeApi` for debugging, redacting the `client`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("list_params", &self.list_params)
            .field("watch_params", &self.watch_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}

#[cfg(test)]
mod tests;
