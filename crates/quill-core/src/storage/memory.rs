//! In-memory storage implementation for testing

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::traits::{StorageError, StorageIo, StorageResult, StoredFile};

/// In-memory storage fake
///
/// Dialogs return scripted answers; files live in a map. Useful for
/// exercising import/export flows without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, String>>,
    open_answer: RwLock<Vec<String>>,
    save_answer: RwLock<Option<String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file
    pub fn put_file(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.write().insert(path.into(), content.into());
    }

    /// Script the next open-dialog answer (empty = user cancels)
    pub fn script_open_dialog(&self, paths: Vec<String>) {
        *self.open_answer.write() = paths;
    }

    /// Script the next save-dialog answer (`None` = user cancels)
    pub fn script_save_dialog(&self, path: Option<String>) {
        *self.save_answer.write() = path;
    }
}

#[async_trait]
impl StorageIo for MemoryStorage {
    async fn read(&self, path: &str) -> StorageResult<StoredFile> {
        self.files
            .read()
            .get(path)
            .map(|content| StoredFile {
                content: content.clone(),
                modified_at: Some(Utc::now()),
            })
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, content: &str) -> StorageResult<()> {
        self.files.write().insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn open_dialog(&self) -> StorageResult<Vec<String>> {
        Ok(self.open_answer.read().clone())
    }

    async fn save_dialog(&self, _suggested_name: &str) -> StorageResult<Option<String>> {
        Ok(self.save_answer.read().clone())
    }

    async fn reveal(&self, path: &str) -> StorageResult<()> {
        if self.files.read().contains_key(path) {
            Ok(())
        } else {
            Err(StorageError::NotFound(path.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_write() {
        let storage = MemoryStorage::new();
        storage.write("/tmp/a.md", "hello").await.unwrap();

        let file = storage.read("/tmp/a.md").await.unwrap();
        assert_eq!(file.content, "hello");
        assert!(file.modified_at.is_some());

        let err = storage.read("/tmp/missing.md").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_dialog_cancellation_is_not_an_error() {
        let storage = MemoryStorage::new();
        // Unscripted dialogs behave like a user cancelling
        assert!(storage.open_dialog().await.unwrap().is_empty());
        assert!(storage.save_dialog("a.md").await.unwrap().is_none());

        storage.script_open_dialog(vec!["/tmp/a.md".to_string()]);
        assert_eq!(storage.open_dialog().await.unwrap().len(), 1);
    }
}
