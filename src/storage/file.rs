use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Entries, StorageBackend, StorageError};

/// Backend that keeps the store as one JSON object on disk
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn name(&self) -> &str {
        "file"
    }

    async fn open(&self) -> Result<Entries, StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No store at {}, starting empty", self.path.display());
                return Ok(Entries::new());
            }
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }

        // Refuse to open anything else rather than overwrite it on the next flush
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(StorageError::Corrupt),
        }
    }

    async fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(entries)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, body).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("nested").join("store.json"));
        assert!(backend.open().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persist_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("store.json"));

        let mut entries = Entries::new();
        entries.insert("measurementUnit".to_string(), json!("us"));
        backend.persist(&entries).await.unwrap();

        let reopened = FileBackend::new(backend.path().to_path_buf());
        assert_eq!(reopened.open().await.unwrap(), entries);
        assert!(!backend.temp_path().exists());
    }

    #[tokio::test]
    async fn test_non_object_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = FileBackend::new(path).open().await;
        assert!(matches!(result, Err(StorageError::Corrupt)));
    }

    #[tokio::test]
    async fn test_unparseable_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = FileBackend::new(path).open().await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
