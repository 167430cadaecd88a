//! Volatile storage for tests and throwaway sessions.

use super::{BoxFuture, Storage, StorageError, StorageResult, decode, encode};
use crate::canvas::CanvasDocument;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

fn poisoned<T>(err: PoisonError<T>) -> StorageError {
    StorageError::Other(format!("Lock error: {err}"))
}

/// Documents held as encoded JSON, so every load hands out a fresh copy
/// that went through the same checks as a file round trip.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded size of a stored document in bytes.
    pub fn stored_size(&self, id: &str) -> StorageResult<Option<usize>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(id).map(String::len))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &CanvasDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let encoded = encode(document);
        Box::pin(async move {
            let json = encoded?;
            self.entries.write().map_err(poisoned)?.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<CanvasDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            match entries.get(&id) {
                Some(json) => decode(json),
                None => Err(StorageError::NotFound(id)),
            }
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.entries.write().map_err(poisoned)?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries = self.entries.read().map_err(poisoned)?;
            Ok(entries.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.entries.read().map_err(poisoned)?.contains_key(&id)) })
    }
}
