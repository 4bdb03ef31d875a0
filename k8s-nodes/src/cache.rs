use reflector::Reflector;
use reflector::Store;
use reflector::Watcher;
use tokio_util::sync::CancellationToken;

use super::*;

/// Everything a [`NodeCache`] needs from the cluster control plane.
pub trait ClusterApi: Lister<corev1::Node> + Watcher<corev1::Node> + 'static {}

impl<T> ClusterApi for T where T: Lister<corev1::Node> + Watcher<corev1::Node> + 'static {}

/// Live, non-authoritative mirror of all cluster Nodes.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone, Debug)]
pub struct NodeCache {
    store: Store<corev1::Node>,
}

impl NodeCache {
    /// Starts synchronizing against `api` with the default resync and backoff settings.
    ///
    /// Construction never fails: an unreachable API leaves the cache empty while the
    /// background task keeps retrying until `cancel` fires.
    pub fn new<A: ClusterApi>(api: Arc<A>, cancel: CancellationToken) -> Self {
        Self::with_config(api, ReflectorConfig::default(), cancel)
    }

    pub fn with_config<A: ClusterApi>(
        api: Arc<A>,
        config: ReflectorConfig,
        cancel: CancellationToken,
    ) -> Self {
        let store = Store::new();
        let reflector = Reflector::new(api, store.clone(), config, cancel);
        reflector.spawn();
        Self { store }
    }

    /// A cache with no synchronization behind it. It stays empty forever.
    pub fn disconnected() -> Self {
        let store = Store::new();
        Self { store }
    }

    /// Snapshot of every cached node; empty until the first successful sync.
    pub async fn list(&self) -> Vec<corev1::Node> {
        self.store.list().await
    }

    pub async fn get(&self, name: &str) -> Option<corev1::Node> {
        self.store.get(name).await
    }

    pub fn has_synced(&self) -> bool {
        self.store.has_synced()
    }

    pub async fn wait_until_synced(&self) {
        self.store.wait_until_synced().await;
    }

    pub fn store(&self) -> &Store<corev1::Node> {
        &self.store
    }
}
