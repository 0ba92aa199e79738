//! Storage I/O trait definition

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A file read from external storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Text content
    pub content: String,
    /// Last-modified time, when the backend reports one
    pub modified_at: Option<DateTime<Utc>>,
}

/// External storage collaborator
///
/// Implemented by the host (platform file APIs and native dialogs). The
/// core only depends on this contract, never on the platform directly.
#[async_trait]
pub trait StorageIo: Send + Sync {
    /// Read a file's content and timestamp
    async fn read(&self, path: &str) -> StorageResult<StoredFile>;

    /// Write content to a file
    async fn write(&self, path: &str, content: &str) -> StorageResult<()>;

    /// Show an open dialog; an empty list means the user cancelled
    async fn open_dialog(&self) -> StorageResult<Vec<String>>;

    /// Show a save dialog; `None` means the user cancelled
    async fn save_dialog(&self, suggested_name: &str) -> StorageResult<Option<String>>;

    /// Reveal a path in the platform file manager
    async fn reveal(&self, path: &str) -> StorageResult<()>;
}
