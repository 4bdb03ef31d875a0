use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use kube::Resource;
use time::ext::NumericalStdDuration as _;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::*;

#[derive(Clone, Debug)]
pub struct ReflectorConfig {
    /// Upper bound on staleness: a full relist is forced this often even when
    /// the watch stays healthy.
    pub resync_period: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            resync_period: 1.std_hours(),
            initial_backoff: 1.std_seconds(),
            max_backoff: 30.std_seconds(),
        }
    }
}

/// Keeps a [`Store`] in sync with a [`Lister`] + [`Watcher`] source until cancelled.
#[derive(Debug)]
pub struct Reflector<K, S> {
    source: Arc<S>,
    store: Store<K>,
    config: ReflectorConfig,
    cancel: CancellationToken,
}

/// How a single list-and-watch cycle ended.
#[derive(Debug)]
enum Cycle {
    Cancelled,
    ResyncDue,
    Failed(Error),
}

impl<K, S> Reflector<K, S>
where
    K: Resource + Clone + Send + Sync + 'static,
    S: Lister<K> + Watcher<K> + 'static,
{
    pub fn new(
        source: Arc<S>,
        store: Store<K>,
        config: ReflectorConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            store,
            config,
            cancel,
        }
    }

    /// Runs the synchronization loop on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs the synchronization loop until the cancellation token fires, then
    /// clears the store.
    pub async fn run(self) {
        let mut backoff = Backoff::new(self.config.initial_backoff, self.config.max_backoff);
        loop {
            match self.list_and_watch(&mut backoff).await {
                Cycle::Cancelled => break,
                Cycle::ResyncDue => {
                    let period = self.config.resync_period;
                    tracing::debug!(?period, "Resync period elapsed, relisting");
                }
                Cycle::Failed(err) => {
                    let delay = backoff.next_delay();
                    let attempt = backoff.attempts();
                    tracing::warn!(%err, ?delay, attempt, "List/watch failed, resynchronizing");
                    tokio::select! {
                        biased;
                        () = self.cancel.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
        self.store.clear().await;
        tracing::info!("Reflector stopped");
    }

    async fn list_and_watch(&self, backoff: &mut Backoff) -> Cycle {
        let listing = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Cycle::Cancelled,
            listing = self.source.list() => listing,
        };
        let listing = match listing {
            Ok(listing) => listing,
            Err(err) => return Cycle::Failed(err),
        };

        let mut version = listing.resource_version;
        let count = listing.items.len();
        self.store.replace(listing.items).await;
        tracing::debug!(%version, count, "Stored full listing");

        let resync = tokio::time::sleep(self.config.resync_period);
        tokio::pin!(resync);

        let stream = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Cycle::Cancelled,
            () = &mut resync => return Cycle::ResyncDue,
            stream = self.source.watch(&version) => stream,
        };
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(err) => return Cycle::Failed(err),
        };
        // The control plane answered both calls; a later stream end is not an outage.
        backoff.reset();

        loop {
            let event = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Cycle::Cancelled,
                () = &mut resync => return Cycle::ResyncDue,
                event = stream.next() => event,
            };
            match event {
                Some(Ok(event)) => {
                    tracing::trace!(kind = event.kind(), %version, "Applying watch event");
                    if let WatchEvent::Bookmark(bookmark) = &event {
                        version = bookmark.clone();
                    }
                    self.store.apply(event).await;
                }
                Some(Err(err)) => return Cycle::Failed(err),
                None => return Cycle::Failed(Error::WatchClosed),
            }
        }
    }
}
