//! Document node: a file or folder in the workspace tree

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ChatMessage;

/// Kind of a document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A text document
    #[default]
    File,
    /// A folder grouping other documents
    Folder,
}

fn default_modified_at() -> DateTime<Utc> {
    Utc::now()
}

/// A file or folder node in the workspace tree
///
/// Every optional field has a serde default so snapshots written by older
/// versions deserialize without error: `kind` falls back to `file`,
/// `parentId` to null, `expanded` to false, `transcript` to empty and
/// `dirty` to false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Text content (empty for folders)
    #[serde(default)]
    pub content: String,
    /// File or folder
    #[serde(default)]
    pub kind: DocumentKind,
    /// Id of the containing folder, null for root-level nodes
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    /// Last modification time
    #[serde(rename = "modifiedAt", default = "default_modified_at")]
    pub modified_at: DateTime<Utc>,
    /// Path of the backing file on disk, if imported/exported
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Whether this folder is expanded in the sidebar (folders only)
    #[serde(default)]
    pub expanded: bool,
    /// Per-document AI conversation transcript
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<ChatMessage>,
    /// Whether the content has unsaved changes
    #[serde(default)]
    pub dirty: bool,
}

impl Document {
    /// Create a new document with a fresh id and current timestamp
    pub fn new(kind: DocumentKind, name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            content: String::new(),
            kind,
            parent_id,
            modified_at: Utc::now(),
            file_path: None,
            expanded: false,
            transcript: Vec::new(),
            dirty: false,
        }
    }

    /// Whether this node is a folder
    pub fn is_folder(&self) -> bool {
        self.kind == DocumentKind::Folder
    }

    /// Whether this node is a file
    pub fn is_file(&self) -> bool {
        self.kind == DocumentKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new(DocumentKind::File, "notes.md", None);
        assert!(doc.is_file());
        assert!(!doc.is_folder());
        assert!(doc.parent_id.is_none());
        assert!(doc.transcript.is_empty());
        assert!(!doc.dirty);
    }

    #[test]
    fn test_fresh_ids() {
        let a = Document::new(DocumentKind::File, "a.md", None);
        let b = Document::new(DocumentKind::File, "a.md", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_migration_defaults() {
        // A minimal payload from an older snapshot version
        let doc: Document = serde_json::from_str(r#"{"id":"d1","name":"Old note"}"#).unwrap();
        assert_eq!(doc.kind, DocumentKind::File);
        assert!(doc.parent_id.is_none());
        assert!(!doc.expanded);
        assert!(doc.transcript.is_empty());
        assert!(!doc.dirty);
        assert_eq!(doc.content, "");
    }

    #[test]
    fn test_kind_serialization() {
        let folder = Document::new(DocumentKind::Folder, "Notes", None);
        let json = serde_json::to_string(&folder).unwrap();
        assert!(json.contains("\"kind\":\"folder\""));
    }
}
