//! Workspace persistence: JSON snapshot of tree, tabs and transcripts
//!
//! The snapshot is forward-compatible on load: every field added after the
//! first release carries a serde default, so older payloads deserialize
//! cleanly (see `Document` for the per-field defaults). Tab and active ids
//! that no longer resolve against the tree are pruned.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::document::Document;
use super::selection::SelectionController;
use super::tree::DocumentTree;

/// Serialized workspace state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    /// All documents, in insertion order
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Ordered ids of the open tabs
    #[serde(rename = "openTabs", default)]
    pub open_tabs: Vec<String>,
    /// Id of the active document
    #[serde(rename = "activeId", default)]
    pub active_id: Option<String>,
}

impl WorkspaceSnapshot {
    /// Capture the current tree and tab state
    pub fn capture(tree: &DocumentTree, selection: &SelectionController) -> Self {
        Self {
            documents: tree.documents().to_vec(),
            open_tabs: selection.tabs().to_vec(),
            active_id: selection.active().map(str::to_string),
        }
    }

    /// Restore the tree and tab state, pruning ids the tree no longer holds
    pub fn restore(self) -> (DocumentTree, SelectionController) {
        let tree = DocumentTree::from_documents(self.documents);
        let selection = SelectionController::restore(&tree, self.open_tabs, self.active_id);
        (tree, selection)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// File-backed snapshot store under the platform config directory
pub struct WorkspaceStore {
    path: PathBuf,
}

impl WorkspaceStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default store location (`<config dir>/quill/workspace.json`)
    pub fn default_location() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("quill").join("workspace.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the snapshot; a missing file yields an empty workspace
    pub fn load(&self) -> std::io::Result<WorkspaceSnapshot> {
        if !self.path.exists() {
            return Ok(WorkspaceSnapshot::default());
        }
        let content = fs::read_to_string(&self.path)?;
        WorkspaceSnapshot::from_json(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Persist the snapshot, creating parent directories as needed
    pub fn save(&self, snapshot: &WorkspaceSnapshot) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = snapshot
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use crate::workspace::document::DocumentKind;
    use crate::workspace::selection::ClickModifiers;

    fn sample_workspace() -> (DocumentTree, SelectionController) {
        let mut tree = DocumentTree::new();
        let folder = tree.create(DocumentKind::Folder, None).unwrap().id.clone();
        tree.rename(&folder, "Notes");
        let doc = tree.create(DocumentKind::File, Some(&folder)).unwrap().id.clone();
        tree.rename(&doc, "todo.md");
        tree.set_content(&doc, "- buy milk");
        tree.get_mut(&doc)
            .unwrap()
            .transcript
            .push(ChatMessage::assistant("Hello! How can I help?"));

        let mut sel = SelectionController::new();
        sel.click_sidebar(&mut tree, &doc, ClickModifiers::none(), None);
        (tree, sel)
    }

    #[test]
    fn test_round_trip() {
        let (tree, sel) = sample_workspace();
        let doc_id = sel.active().unwrap().to_string();

        let json = WorkspaceSnapshot::capture(&tree, &sel).to_json().unwrap();
        let (tree2, sel2) = WorkspaceSnapshot::from_json(&json).unwrap().restore();

        assert_eq!(tree2.len(), tree.len());
        let doc = tree2.get(&doc_id).unwrap();
        assert_eq!(doc.content, "- buy milk");
        assert_eq!(doc.transcript.len(), 1);
        assert!(doc.dirty);
        assert_eq!(sel2.tabs(), sel.tabs());
        assert_eq!(sel2.active(), sel.active());
    }

    #[test]
    fn test_load_fills_missing_fields() {
        // A payload from before tabs, transcripts and expansion existed
        let json = r#"{
            "documents": [
                {"id": "d1", "name": "Old note", "content": "text"},
                {"id": "f1", "name": "Folder", "kind": "folder"}
            ]
        }"#;
        let (tree, sel) = WorkspaceSnapshot::from_json(json).unwrap().restore();

        let doc = tree.get("d1").unwrap();
        assert_eq!(doc.kind, DocumentKind::File);
        assert!(doc.parent_id.is_none());
        assert!(doc.transcript.is_empty());
        assert!(!doc.dirty);
        assert!(!tree.get("f1").unwrap().expanded);
        assert!(sel.tabs().is_empty());
        assert_eq!(sel.active(), None);
    }

    #[test]
    fn test_restore_prunes_unknown_tab_ids() {
        let json = r#"{
            "documents": [{"id": "d1", "name": "a.md"}],
            "openTabs": ["d1", "gone"],
            "activeId": "d1"
        }"#;
        let (_, sel) = WorkspaceSnapshot::from_json(json).unwrap().restore();
        assert_eq!(sel.tabs(), &["d1".to_string()]);
        assert_eq!(sel.active(), Some("d1"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = WorkspaceStore::new(dir.path().join("nested").join("workspace.json"));

        // Missing file yields an empty workspace
        assert!(!store.exists());
        assert!(store.load().unwrap().documents.is_empty());

        let (tree, sel) = sample_workspace();
        store.save(&WorkspaceSnapshot::capture(&tree, &sel)).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.documents.len(), 2);
        assert_eq!(loaded.open_tabs.len(), 1);
    }
}
