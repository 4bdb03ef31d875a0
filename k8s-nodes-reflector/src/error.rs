use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cluster API request failed: {0}")]
    Kube(#[from] kube::Error),

    /// The server ended the watch with an error object, typically `410 Gone`
    /// once the requested resource version has been compacted away.
    #[error("watch terminated by server: {0}")]
    WatchTerminated(String),

    #[error("watch stream closed")]
    WatchClosed,

    #[error("cluster API unavailable: {0}")]
    Unavailable(String),
}
