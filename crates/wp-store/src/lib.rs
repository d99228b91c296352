//! wp-store: saved-plot persistence and the local cache.
//!
//! The remote store keeps the saved-plot list of a session on the plotting
//! endpoint; the local cache keeps the last session id and the last settings
//! snapshot between runs.

pub mod cache;
pub mod endpoint;
pub mod memory;
pub mod remote;
pub mod types;

pub use cache::{CacheKey, FileCache, LocalCache, MemoryCache};
pub use endpoint::Endpoint;
pub use memory::MemoryRemoteStore;
pub use remote::{HttpRemoteStore, RemoteStore, decode_saved_plots, encode_saved_plots};
pub use types::*;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} {reason}: {body}")]
    Server {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid session id {id:?}: at least {min_len} characters required")]
    InvalidSessionId { id: String, min_len: usize },

    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Invalid saved plot entry: {0}")]
    InvalidEntry(String),

    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
