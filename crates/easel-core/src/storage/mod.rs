//! Persistence seam for canvas documents.
//!
//! The editor never performs I/O itself; hosts hand a [`CanvasDocument`] to a
//! [`Storage`] backend and hydrate an editor from what it returns. Both
//! bundled backends keep documents in their JSON form and refuse documents
//! that would not hydrate into a valid scene.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::canvas::CanvasDocument;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    /// The document could not be encoded or decoded, or breaks model invariants.
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Future returned by [`Storage`] operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A place canvas documents are kept between sessions.
///
/// Saving stamps the stored copy's `updated_at`; the caller's document is
/// left as is.
pub trait Storage: Send + Sync {
    /// Save a document under `id`, replacing any previous version.
    fn save(&self, id: &str, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>>;

    /// Deleting a missing document is not an error.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Stored ids in ascending order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Save a document under its own id.
    fn save_document(&self, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>> {
        self.save(&document.id, document)
    }
}

/// Stored form of a document: validated, stamped as modified now, pretty JSON.
fn encode(document: &CanvasDocument) -> StorageResult<String> {
    validate(document)?;
    let mut stored = document.clone();
    stored.touch();
    Ok(stored.to_json()?)
}

/// Parse a stored document, rejecting ones that break model invariants.
fn decode(json: &str) -> StorageResult<CanvasDocument> {
    let document = CanvasDocument::from_json(json)?;
    validate(&document)?;
    Ok(document)
}

fn validate(document: &CanvasDocument) -> StorageResult<()> {
    document
        .to_scene()
        .map(drop)
        .map_err(|e| StorageError::Serialization(format!("Invalid canvas '{}': {e}", document.name)))
}

/// Drive a storage future to completion on the current thread.
///
/// The bundled backends never suspend, so this is enough for synchronous
/// hosts and tests. Futures that wait on external wakeups will spin.
pub fn block_on<F: Future>(future: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    let mut future = std::pin::pin!(future);
    loop {
        if let Poll::Ready(result) = future.as_mut().poll(&mut cx) {
            return result;
        }
        std::thread::yield_now();
    }
}
