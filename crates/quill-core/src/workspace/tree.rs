//! Document store: a flat, id-keyed collection with parent back-references
//!
//! Hierarchy is derived from parent links rather than nested ownership,
//! which keeps cycle detection a simple ancestor walk and lookup O(n) over
//! a small collection. Insertion order is the stable tie-break for the
//! sorted sidebar listing.

use thiserror::Error;

use super::document::{Document, DocumentKind};

/// Extensions recognized as document files; anything else gets `.md` on rename
const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Structural errors raised by the document store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The requested parent does not exist or is not a folder
    #[error("Invalid parent: {0}")]
    InvalidParent(String),
}

pub type TreeResult<T> = Result<T, TreeError>;

/// The full ordered-by-insertion collection of documents
#[derive(Debug, Default, Clone)]
pub struct DocumentTree {
    documents: Vec<Document>,
}

impl DocumentTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tree from a previously serialized document list
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Number of documents in the tree
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the tree is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document by id
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Look up a document mutably by id
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    /// Whether a document with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterate all documents in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    /// Create a new document under the given parent
    ///
    /// Fails with `InvalidParent` when the parent id references a missing
    /// document or a file.
    pub fn create(&mut self, kind: DocumentKind, parent_id: Option<&str>) -> TreeResult<&Document> {
        if let Some(pid) = parent_id {
            match self.get(pid) {
                Some(parent) if parent.is_folder() => {}
                _ => return Err(TreeError::InvalidParent(pid.to_string())),
            }
        }

        let name = match kind {
            DocumentKind::File => "Untitled.md",
            DocumentKind::Folder => "New folder",
        };
        let doc = Document::new(kind, name, parent_id.map(str::to_string));
        self.documents.push(doc);
        Ok(self.documents.last().unwrap())
    }

    /// Insert an externally built document (e.g. from an import)
    pub fn insert(&mut self, doc: Document) {
        self.documents.push(doc);
    }

    /// Rename a document
    ///
    /// Empty or whitespace-only names are rejected as a no-op (returns
    /// false). File names without a recognized document extension are
    /// normalized by appending `.md`.
    pub fn rename(&mut self, id: &str, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return false;
        }

        let Some(doc) = self.get_mut(id) else {
            return false;
        };

        let mut name = trimmed.to_string();
        if doc.is_file() && !has_document_extension(&name) {
            name.push_str(".md");
        }
        doc.name = name;
        doc.modified_at = chrono::Utc::now();
        true
    }

    /// Whether `ancestor_id` appears on `id`'s parent chain (or equals it)
    pub fn is_self_or_ancestor(&self, ancestor_id: &str, id: &str) -> bool {
        let mut current = Some(id.to_string());
        while let Some(cid) = current {
            if cid == ancestor_id {
                return true;
            }
            current = self.get(&cid).and_then(|d| d.parent_id.clone());
        }
        false
    }

    /// Reparent a set of documents under a target folder (or the root)
    ///
    /// Each id is moved independently: ids that would create a cycle
    /// (target lies inside the moved subtree), self-targets, and unknown
    /// ids are skipped silently. A non-folder target skips every id. A
    /// folder target is forced into expanded state as a side effect.
    /// Returns the ids that actually moved.
    pub fn move_documents(&mut self, ids: &[String], target_id: Option<&str>) -> Vec<String> {
        if let Some(tid) = target_id {
            match self.get(tid) {
                Some(target) if target.is_folder() => {}
                _ => return Vec::new(),
            }
        }

        let mut moved = Vec::new();
        for id in ids {
            if !self.contains(id) {
                continue;
            }
            // Cycle check: walk the target's ancestor chain looking for id
            if let Some(tid) = target_id {
                if self.is_self_or_ancestor(id, tid) {
                    continue;
                }
            }
            if let Some(doc) = self.get_mut(id) {
                doc.parent_id = target_id.map(str::to_string);
                moved.push(id.clone());
            }
        }

        if !moved.is_empty() {
            if let Some(tid) = target_id {
                if let Some(target) = self.get_mut(tid) {
                    target.expanded = true;
                }
            }
        }
        moved
    }

    /// Flip a folder's expansion flag; no-op on files
    pub fn toggle_expanded(&mut self, id: &str) {
        if let Some(doc) = self.get_mut(id) {
            if doc.is_folder() {
                doc.expanded = !doc.expanded;
            }
        }
    }

    /// Replace a document's content, bumping timestamp and unsaved flag
    pub fn set_content(&mut self, id: &str, text: impl Into<String>) {
        if let Some(doc) = self.get_mut(id) {
            doc.content = text.into();
            doc.modified_at = chrono::Utc::now();
            doc.dirty = true;
        }
    }

    /// Force-expand every collapsed ancestor folder of `id`
    ///
    /// Called whenever an id must become visible in the sidebar, e.g. after
    /// tab-driven or search-driven activation.
    pub fn ensure_visible(&mut self, id: &str) {
        let mut current = self.get(id).and_then(|d| d.parent_id.clone());
        while let Some(pid) = current {
            let next = match self.get_mut(&pid) {
                Some(parent) => {
                    if parent.is_folder() {
                        parent.expanded = true;
                    }
                    parent.parent_id.clone()
                }
                None => None,
            };
            current = next;
        }
    }

    /// Remove a document and all of its transitive descendants
    ///
    /// Returns the removed ids (explicit close-and-discard; tab closing
    /// never calls this).
    pub fn remove(&mut self, id: &str) -> Vec<String> {
        let doomed: Vec<String> = self
            .documents
            .iter()
            .filter(|d| self.is_self_or_ancestor(id, &d.id))
            .map(|d| d.id.clone())
            .collect();
        self.documents.retain(|d| !doomed.contains(&d.id));
        doomed
    }

    /// Children of a parent, folders first, case-insensitive by name
    ///
    /// The underlying sort is stable, so insertion order breaks ties.
    pub fn children_sorted(&self, parent_id: Option<&str>) -> Vec<&Document> {
        let mut children: Vec<&Document> = self
            .documents
            .iter()
            .filter(|d| d.parent_id.as_deref() == parent_id)
            .collect();
        children.sort_by(|a, b| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        children
    }

    /// Depth-first pre-order ids of everything visible in the sidebar
    ///
    /// Folders that are collapsed contribute themselves but not their
    /// contents.
    pub fn visible_order(&self) -> Vec<String> {
        let mut order = Vec::new();
        self.collect_visible(None, &mut order);
        order
    }

    fn collect_visible(&self, parent_id: Option<&str>, out: &mut Vec<String>) {
        for child in self.children_sorted(parent_id) {
            out.push(child.id.clone());
            if child.is_folder() && child.expanded {
                self.collect_visible(Some(&child.id), out);
            }
        }
    }

    /// Ids whose names match a search query, in full-tree pre-order
    ///
    /// Expansion state is ignored: a match inside a collapsed folder is
    /// still a match. Search-mode and tree-mode orderings are mutually
    /// exclusive (query non-empty vs. empty).
    pub fn search_order(&self, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut order = Vec::new();
        self.collect_all(None, &mut order);
        order.retain(|id| {
            self.get(id)
                .map(|d| d.name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
        order
    }

    fn collect_all(&self, parent_id: Option<&str>, out: &mut Vec<String>) {
        for child in self.children_sorted(parent_id) {
            out.push(child.id.clone());
            if child.is_folder() {
                self.collect_all(Some(&child.id), out);
            }
        }
    }

    /// Consume the tree into its document list (for serialization)
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Borrow the document list (for serialization)
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

fn has_document_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
