use std::collections::HashMap;
use std::sync::Arc;

use kube::Resource;
use kube::ResourceExt as _;
use tokio::sync::RwLock;
use tokio::sync::watch;

use super::*;

/// Cloneable handle to a keyed, in-memory mirror of a resource collection.
///
/// Objects are keyed by `namespace/name`, or by `name` alone for cluster-scoped
/// resources. Every mutation happens under one write lock, so readers always see
/// either the state before or after an event, never a partial one.
#[derive(Debug)]
pub struct Store<K> {
    objects: Arc<RwLock<HashMap<String, K>>>,
    synced: Arc<watch::Sender<bool>>,
    generation: Arc<watch::Sender<u64>>,
}

impl<K> Clone for Store<K> {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
            synced: Arc::clone(&self.synced),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<K> Default for Store<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Store<K> {
    pub fn new() -> Self {
        let (synced, _) = watch::channel(false);
        let (generation, _) = watch::channel(0);
        Self {
            objects: Arc::default(),
            synced: Arc::new(synced),
            generation: Arc::new(generation),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Whether at least one full listing has been stored.
    pub fn has_synced(&self) -> bool {
        *self.synced.borrow()
    }

    /// Resolves once the first full listing has been stored.
    pub async fn wait_until_synced(&self) {
        let mut synced = self.synced.subscribe();
        // The sender lives as long as `self`, so this cannot fail while we wait.
        let _ = synced.wait_for(|synced| *synced).await;
    }

    /// Number of mutations applied so far.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Receiver notified after every mutation with the new generation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }

    /// Drops every object and returns to the never-synced state.
    pub async fn clear(&self) {
        self.objects.write().await.clear();
        self.synced.send_replace(false);
        self.bump();
    }

    fn bump(&self) {
        self.generation.send_modify(|generation| *generation += 1);
    }
}

impl<K> Store<K>
where
    K: Resource + Clone,
{
    /// Applies one watch event: `Added` and `Modified` replace the stored object
    /// wholesale, `Deleted` removes it, `Bookmark` leaves the store untouched.
    pub async fn apply(&self, event: WatchEvent<K>) {
        match event {
            WatchEvent::Added(object) | WatchEvent::Modified(object) => {
                let key = key(&object);
                self.objects.write().await.insert(key, object);
            }
            WatchEvent::Deleted(object) => {
                let key = key(&object);
                self.objects.write().await.remove(&key);
            }
            WatchEvent::Bookmark(_) => return,
        }
        self.bump();
    }

    /// Swaps in the given listing as the complete store contents.
    pub async fn replace(&self, items: Vec<K>) {
        let objects = items
            .into_iter()
            .map(|object| (key(&object), object))
            .collect::<HashMap<_, _>>();
        *self.objects.write().await = objects;
        self.synced.send_replace(true);
        self.bump();
    }

    /// Point-in-time copy of every stored object, in no particular order.
    pub async fn list(&self) -> Vec<K> {
        let objects = self.objects.read().await;
        objects.values().cloned().collect()
    }

    pub async fn get(&self, key: &str) -> Option<K> {
        self.objects.read().await.get(key).cloned()
    }
}

/// Cache key of an object: `namespace/name`, or `name` when not namespaced.
pub(crate) fn key<K: Resource>(object: &K) -> String {
    let name = object.name_any();
    match object.namespace() {
        Some(namespace) => format!("{namespace}/{name}"),
        None => name,
    }
}
