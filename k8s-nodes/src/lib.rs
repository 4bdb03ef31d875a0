//! Cached view of every Node in the cluster, and the readiness filter applied to it.

use std::sync::Arc;

use k8s_nodes_ext as k8s;
use k8s_nodes_reflector as reflector;

use k8s::corev1;
use reflector::Lister;

pub use cache::ClusterApi;
pub use cache::NodeCache;
pub use readiness::Criterion;
pub use readiness::ParsePolicyError;
pub use readiness::ReadinessPolicy;
pub use readiness::is_ready;
pub use reflector::Error;
pub use reflector::ReflectorConfig;

mod cache;
mod readiness;


pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Ready nodes under the default readiness policy.
///
/// Reads the cache snapshot; when the cache holds no nodes at all, performs one
/// direct list against `api` instead. An error from that direct list is the only
/// error this returns. The fallback result is not written back into the cache.
pub async fn list_ready_nodes<A>(cache: &NodeCache, api: &A) -> Result<Vec<corev1::Node>>
where
    A: Lister<corev1::Node> + ?Sized,
{
    list_ready_nodes_with(cache, api, &ReadinessPolicy::default()).await
}

pub async fn list_ready_nodes_with<A>(
    cache: &NodeCache,
    api: &A,
    policy: &ReadinessPolicy,
) -> Result<Vec<corev1::Node>>
where
    A: Lister<corev1::Node> + ?Sized,
{
    let mut nodes = cache.list().await;
    if nodes.is_empty() {
        tracing::debug!("Node cache is empty, listing nodes directly");
        nodes = api.list().await?.items;
    }
    let ready = nodes
        .into_iter()
        .filter(|node| policy.is_ready(node))
        .collect();
    Ok(ready)
}

/// Query facade owning a [`NodeCache`], the API it falls back to, and a readiness policy.
#[derive(Debug)]
pub struct NodeInventory<A> {
    cache: NodeCache,
    api: Arc<A>,
    policy: ReadinessPolicy,
}

impl<A> NodeInventory<A>
where
    A: ClusterApi,
{
    /// Starts a cache against `api` that lives until `cancel` fires.
    pub fn new(
        api: Arc<A>,
        config: ReflectorConfig,
        policy: ReadinessPolicy,
        cancel: tokio_util::sync::CancellationToken,
    ) -> Self {
        let cache = NodeCache::with_config(Arc::clone(&api), config, cancel);
        Self::with_cache(cache, api, policy)
    }

    pub fn with_cache(cache: NodeCache, api: Arc<A>, policy: ReadinessPolicy) -> Self {
        Self { cache, api, policy }
    }

    pub async fn ready_nodes(&self) -> Result<Vec<corev1::Node>> {
        list_ready_nodes_with(&self.cache, self.api.as_ref(), &self.policy).await
    }

    /// Every cached node, ready or not.
    pub async fn nodes(&self) -> Vec<corev1::Node> {
        self.cache.list().await
    }

    pub async fn node(&self, name: &str) -> Option<corev1::Node> {
        self.cache.get(name).await
    }

    pub fn policy(&self) -> &ReadinessPolicy {
        &self.policy
    }

    pub fn has_synced(&self) -> bool {
        self.cache.has_synced()
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}
