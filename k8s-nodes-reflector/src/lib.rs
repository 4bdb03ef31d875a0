//! List-then-watch synchronization of a local cache against a remote resource collection.
//!
//! A [`Reflector`] owns a single background task that lists the collection, replaces the
//! contents of its [`Store`] with the listing, then applies watch events in the order they
//! arrive. Whenever the watch stream ends, the reflector backs off and starts over with a
//! fresh list. A full relist is also forced every [`ReflectorConfig::resync_period`].
//!
//! The remote side is abstracted by the [`Lister`] and [`Watcher`] traits so the same loop
//! drives a real cluster API client or the in-memory [`fake::FakeSource`].

use async_trait::async_trait;
use futures::stream::BoxStream;

pub use backoff::Backoff;
pub use error::Error;
pub use event::Listing;
pub use event::ResourceVersion;
pub use event::WatchEvent;
pub use reflector::Reflector;
pub use reflector::ReflectorConfig;
pub use store::Store;

pub mod fake;

mod backoff;
mod error;
mod event;
mod reflector;
mod store;


pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stream of watch events; an `Err` item terminates the watch.
pub type EventStream<K> = BoxStream<'static, Result<WatchEvent<K>>>;

/// Full, unfiltered enumeration of a resource collection.
#[async_trait]
pub trait Lister<K>: Send + Sync {
    async fn list(&self) -> Result<Listing<K>>;
}

/// Incremental change feed of a resource collection, resumed from a resource version.
#[async_trait]
pub trait Watcher<K>: Send + Sync {
    async fn watch(&self, from: &ResourceVersion) -> Result<EventStream<K>>;
}
