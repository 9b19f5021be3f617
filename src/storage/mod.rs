//! Durable key-value store shared by the favourites and preference repositories.
//!
//! A [`PersistentStore`] is only a handle. Reading or writing requires the
//! [`ReadyStore`] returned by [`PersistentStore::init`], so nothing can reach
//! the backend before it has been opened.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};

use crate::error::{RecipeError, Result};

/// Snapshot of every key held by a backend
pub type Entries = BTreeMap<String, Value>;

/// Failures reported by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store contents are not a JSON object")]
    Corrupt,
}

/// Platform storage medium behind a [`PersistentStore`]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Backend name used in log lines
    fn name(&self) -> &str;

    /// Open the medium and read everything it currently holds
    async fn open(&self) -> std::result::Result<Entries, StorageError>;

    /// Replace the medium's contents with `entries`
    async fn persist(&self, entries: &Entries) -> std::result::Result<(), StorageError>;
}

/// Lazily-initialised store handle; clones share one backend and one readiness state
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn StorageBackend>,
    ready: Arc<OnceCell<std::result::Result<ReadyStore, String>>>,
}

impl PersistentStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        PersistentStore {
            backend: Arc::new(backend),
            ready: Arc::new(OnceCell::new()),
        }
    }

    /// Volatile store, nothing survives the process
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    /// Open the backend once and hand out the ready handle
    ///
    /// Concurrent callers wait on the same initialisation. The outcome is
    /// cached, so an unavailable medium stays unavailable for the rest of
    /// the session instead of being opened again on every call.
    pub async fn init(&self) -> Result<ReadyStore> {
        let outcome = self
            .ready
            .get_or_init(|| async {
                match self.backend.open().await {
                    Ok(entries) => {
                        debug!(
                            "Opened {} store with {} key(s)",
                            self.backend.name(),
                            entries.len()
                        );
                        Ok(ReadyStore {
                            backend: Arc::clone(&self.backend),
                            entries: Arc::new(RwLock::new(entries)),
                        })
                    }
                    Err(e) => {
                        warn!("Could not open {} store: {}", self.backend.name(), e);
                        Err(e.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(store) => Ok(store.clone()),
            Err(message) => Err(RecipeError::StorageUnavailable(message.clone())),
        }
    }
}

/// Store handle that is guaranteed to be initialised
#[derive(Clone)]
pub struct ReadyStore {
    backend: Arc<dyn StorageBackend>,
    entries: Arc<RwLock<Entries>>,
}

impl ReadyStore {
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    /// Update `key` and flush the whole store to the backend
    ///
    /// The write lock is held across the flush so flushes land in order. If
    /// the flush fails the new value is still visible to later reads.
    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        self.backend.persist(&entries).await.map_err(|e| {
            warn!("Failed to persist '{}' to {} store: {}", key, self.backend.name(), e);
            RecipeError::StorageUnavailable(e.to_string())
        })
    }
}
