use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use super::{Entries, StorageBackend, StorageError};

/// Backend that keeps everything in process memory
///
/// Clones share the same contents, which lets tests reopen a store and
/// observe what a previous [`super::PersistentStore`] flushed.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryBackend {
    pub fn with_entries(entries: Entries) -> Self {
        MemoryBackend {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Contents as of the last flush
    pub fn snapshot(&self) -> Entries {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open(&self) -> Result<Entries, StorageError> {
        Ok(self.snapshot())
    }

    async fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        *self.entries.lock().unwrap_or_else(PoisonError::into_inner) = entries.clone();
        Ok(())
    }
}
