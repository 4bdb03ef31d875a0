//! In-memory [`Lister`] + [`Watcher`] for driving a [`Reflector`] without a cluster.
//!
//! Listings are served from a queue; once the queue is drained the last successful
//! listing is served again. Every `watch` call opens a fresh channel, and events
//! pushed with [`FakeSource::emit`] go to the most recently opened one.

use std::collections::VecDeque;

use futures::StreamExt as _;
use futures::stream;
use tokio::sync::Mutex;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::*;

type EventSender<K> = mpsc::UnboundedSender<Result<WatchEvent<K>>>;

#[derive(Debug)]
pub struct FakeSource<K> {
    listings: Mutex<VecDeque<Result<Listing<K>>>>,
    last_listing: Mutex<Option<Listing<K>>>,
    watch_errors: Mutex<VecDeque<Error>>,
    sender: Mutex<Option<EventSender<K>>>,
    watched_from: Mutex<Vec<ResourceVersion>>,
    lists: watch::Sender<usize>,
    list_gate: watch::Sender<bool>,
    watches: watch::Sender<usize>,
}

impl<K> Default for FakeSource<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FakeSource<K> {
    pub fn new() -> Self {
        let (lists, _) = watch::channel(0);
        let (list_gate, _) = watch::channel(true);
        let (watches, _) = watch::channel(0);
        Self {
            listings: Mutex::default(),
            last_listing: Mutex::default(),
            watch_errors: Mutex::default(),
            sender: Mutex::default(),
            watched_from: Mutex::default(),
            lists,
            list_gate,
            watches,
        }
    }

    /// Queues a successful listing.
    pub async fn push_listing(&self, items: Vec<K>, version: impl Into<ResourceVersion>) {
        let listing = Listing::new(items, version);
        self.listings.lock().await.push_back(Ok(listing));
    }

    /// Queues a failed listing.
    pub async fn push_list_error(&self, message: impl ToString) {
        let error = Error::Unavailable(message.to_string());
        self.listings.lock().await.push_back(Err(error));
    }

    /// Makes the next `watch` call fail instead of opening a stream.
    pub async fn push_watch_error(&self, message: impl ToString) {
        let error = Error::Unavailable(message.to_string());
        self.watch_errors.lock().await.push_back(error);
    }

    /// Delivers an event on the most recently opened watch. Returns `false` if no
    /// watch is open.
    pub async fn emit(&self, event: WatchEvent<K>) -> bool {
        self.send(Ok(event)).await
    }

    /// Terminates the open watch with an error item.
    pub async fn fail_watch(&self, message: impl ToString) -> bool {
        let error = Error::WatchTerminated(message.to_string());
        let sent = self.send(Err(error)).await;
        self.sender.lock().await.take();
        sent
    }

    /// Ends the open watch cleanly.
    pub async fn close_watch(&self) {
        self.sender.lock().await.take();
    }

    /// Makes every `list` call block until [`FakeSource::release_lists`].
    pub fn hold_lists(&self) {
        self.list_gate.send_replace(false);
    }

    pub fn release_lists(&self) {
        self.list_gate.send_replace(true);
    }

    pub fn list_calls(&self) -> usize {
        *self.lists.borrow()
    }

    /// Resolves once at least `count` list calls have started.
    pub async fn wait_for_list(&self, count: usize) {
        let mut lists = self.lists.subscribe();
        let _ = lists.wait_for(|started| *started >= count).await;
    }

    pub fn watch_calls(&self) -> usize {
        *self.watches.borrow()
    }

    /// Resource versions every successful `watch` call started from, in call order.
    pub async fn watched_from(&self) -> Vec<ResourceVersion> {
        self.watched_from.lock().await.clone()
    }

    /// Resolves once at least `count` watches have been opened.
    pub async fn wait_for_watch(&self, count: usize) {
        let mut watches = self.watches.subscribe();
        let _ = watches.wait_for(|opened| *opened >= count).await;
    }

    async fn send(&self, item: Result<WatchEvent<K>>) -> bool {
        self.sender
            .lock()
            .await
            .as_ref()
            .is_some_and(|sender| sender.send(item).is_ok())
    }
}

#[async_trait]
impl<K> Lister<K> for FakeSource<K>
where
    K: Clone + Send + Sync,
{
    async fn list(&self) -> Result<Listing<K>> {
        self.lists.send_modify(|started| *started += 1);
        let mut gate = self.list_gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;
        let queued = self.listings.lock().await.pop_front();
        let mut last = self.last_listing.lock().await;
        match queued {
            Some(Ok(listing)) => {
                *last = Some(listing.clone());
                Ok(listing)
            }
            Some(Err(err)) => Err(err),
            None => last
                .clone()
                .ok_or_else(|| Error::Unavailable("no listing queued".to_string())),
        }
    }
}

#[async_trait]
impl<K> Watcher<K> for FakeSource<K>
where
    K: Send + Sync + 'static,
{
    async fn watch(&self, from: &ResourceVersion) -> Result<EventStream<K>> {
        if let Some(err) = self.watch_errors.lock().await.pop_front() {
            return Err(err);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().await = Some(tx);
        self.watched_from.lock().await.push(from.clone());
        self.watches.send_modify(|opened| *opened += 1);
        let events = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(events.boxed())
    }
}
