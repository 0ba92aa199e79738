//! Import/export flows between the document tree and external storage
//!
//! The host supplies the `StorageIo` collaborator (platform file APIs and
//! native dialogs); this module owns the core-side flow: which documents
//! get created, when the dirty flag clears, and how dialog cancellation
//! behaves (always a silent no-op).

use std::sync::Arc;

use crate::logging::Logger;
use crate::storage::{StorageIo, StorageResult};

use super::document::{Document, DocumentKind};
use super::tree::DocumentTree;

/// Drives import, save and reveal against the storage collaborator
pub struct WorkspaceIo {
    storage: Arc<dyn StorageIo>,
    logger: Arc<dyn Logger>,
}

impl WorkspaceIo {
    /// Create a new workspace IO driver
    pub fn new(storage: Arc<dyn StorageIo>, logger: Arc<dyn Logger>) -> Self {
        Self { storage, logger }
    }

    /// Import external files via the open dialog
    ///
    /// Each picked path becomes a file document under `parent_id` with its
    /// content loaded and its backing path recorded. Cancellation returns
    /// an empty list; a path that fails to read is skipped with a log
    /// entry rather than aborting the rest of the batch. Returns the ids
    /// of the imported documents.
    pub async fn import(
        &self,
        tree: &mut DocumentTree,
        parent_id: Option<&str>,
    ) -> StorageResult<Vec<String>> {
        let paths = self.storage.open_dialog().await?;
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let mut imported = Vec::new();
        for path in paths {
            let file = match self.storage.read(&path).await {
                Ok(file) => file,
                Err(e) => {
                    self.logger
                        .error(&format!("[WorkspaceIo] Failed to read '{}': {}", path, e));
                    continue;
                }
            };

            let name = path
                .rsplit(['/', '\\'])
                .next()
                .filter(|n| !n.is_empty())
                .unwrap_or("Untitled.md")
                .to_string();
            let mut doc = Document::new(DocumentKind::File, name, parent_id.map(str::to_string));
            doc.content = file.content;
            if let Some(ts) = file.modified_at {
                doc.modified_at = ts;
            }
            doc.file_path = Some(path);
            imported.push(doc.id.clone());
            tree.insert(doc);
        }

        self.logger
            .info(&format!("[WorkspaceIo] Imported {} document(s)", imported.len()));
        Ok(imported)
    }

    /// Save a document's content to its backing file
    ///
    /// A document without a backing path goes through the save dialog
    /// first; cancelling it is a silent no-op (returns false). On success
    /// the dirty flag clears. Folders and unknown ids are no-ops.
    pub async fn save(&self, tree: &mut DocumentTree, id: &str) -> StorageResult<bool> {
        let Some(doc) = tree.get(id) else {
            return Ok(false);
        };
        if !doc.is_file() {
            return Ok(false);
        }

        let path = match &doc.file_path {
            Some(path) => path.clone(),
            None => match self.storage.save_dialog(&doc.name).await? {
                Some(path) => path,
                None => return Ok(false),
            },
        };

        let content = doc.content.clone();
        self.storage.write(&path, &content).await?;

        if let Some(doc) = tree.get_mut(id) {
            doc.file_path = Some(path);
            doc.dirty = false;
        }
        Ok(true)
    }

    /// Reveal a document's backing file in the platform file manager
    ///
    /// Documents without a backing path are a no-op.
    pub async fn reveal(&self, tree: &DocumentTree, id: &str) -> StorageResult<()> {
        let Some(path) = tree.get(id).and_then(|d| d.file_path.clone()) else {
            return Ok(());
        };
        self.storage.reveal(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::storage::MemoryStorage;

    fn io(storage: &Arc<MemoryStorage>) -> WorkspaceIo {
        WorkspaceIo::new(
            Arc::clone(storage) as Arc<dyn StorageIo>,
            Arc::new(NoOpLogger),
        )
    }

    #[tokio::test]
    async fn test_import_creates_documents() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put_file("/docs/readme.md", "# Readme");
        storage.put_file("/docs/plan.md", "# Plan");
        storage.script_open_dialog(vec![
            "/docs/readme.md".to_string(),
            "/docs/plan.md".to_string(),
        ]);

        let mut tree = DocumentTree::new();
        let imported = io(&storage).import(&mut tree, None).await.unwrap();
        assert_eq!(imported.len(), 2);

        let doc = tree.get(&imported[0]).unwrap();
        assert_eq!(doc.name, "readme.md");
        assert_eq!(doc.content, "# Readme");
        assert_eq!(doc.file_path.as_deref(), Some("/docs/readme.md"));
    }

    #[tokio::test]
    async fn test_import_cancellation_is_silent() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tree = DocumentTree::new();

        let imported = io(&storage).import(&mut tree, None).await.unwrap();
        assert!(imported.is_empty());
        assert!(tree.is_empty());
    }

    #[tokio::test]
    async fn test_import_skips_unreadable_paths() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put_file("/docs/good.md", "ok");
        storage.script_open_dialog(vec![
            "/docs/missing.md".to_string(),
            "/docs/good.md".to_string(),
        ]);

        let mut tree = DocumentTree::new();
        let imported = io(&storage).import(&mut tree, None).await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(tree.get(&imported[0]).unwrap().name, "good.md");
    }

    #[tokio::test]
    async fn test_save_clears_dirty_flag() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tree = DocumentTree::new();
        let id = tree.create(DocumentKind::File, None).unwrap().id.clone();
        tree.set_content(&id, "draft text");
        tree.get_mut(&id).unwrap().file_path = Some("/docs/a.md".to_string());

        let saved = io(&storage).save(&mut tree, &id).await.unwrap();
        assert!(saved);
        assert!(!tree.get(&id).unwrap().dirty);
        assert_eq!(storage.read("/docs/a.md").await.unwrap().content, "draft text");
    }

    #[tokio::test]
    async fn test_save_without_path_uses_dialog() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tree = DocumentTree::new();
        let id = tree.create(DocumentKind::File, None).unwrap().id.clone();
        tree.set_content(&id, "text");

        // Cancelled dialog: silent no-op, document stays dirty
        let saved = io(&storage).save(&mut tree, &id).await.unwrap();
        assert!(!saved);
        assert!(tree.get(&id).unwrap().dirty);

        storage.script_save_dialog(Some("/docs/picked.md".to_string()));
        let saved = io(&storage).save(&mut tree, &id).await.unwrap();
        assert!(saved);
        assert_eq!(
            tree.get(&id).unwrap().file_path.as_deref(),
            Some("/docs/picked.md")
        );
        assert_eq!(storage.read("/docs/picked.md").await.unwrap().content, "text");
    }

    #[tokio::test]
    async fn test_reveal_without_backing_path_is_noop() {
        let storage = Arc::new(MemoryStorage::new());
        let mut tree = DocumentTree::new();
        let id = tree.create(DocumentKind::File, None).unwrap().id.clone();
        io(&storage).reveal(&tree, &id).await.unwrap();
    }
}
