//! Selection & tab controller
//!
//! State machine over (active id, tab set, selection set, anchor id).
//! Tab order drives shift-ranges on the tab strip; the sidebar uses the
//! visible-id ordering instead (search-match list when a query is active,
//! expanded pre-order otherwise). A plain click always leaves exactly the
//! clicked id selected; only ctrl-toggles may empty the selection.

use std::collections::HashSet;

use super::tree::DocumentTree;

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ClickModifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, shift: false }
    }

    pub fn shift() -> Self {
        Self { ctrl: false, shift: true }
    }

    pub fn ctrl_shift() -> Self {
        Self { ctrl: true, shift: true }
    }

    fn is_plain(&self) -> bool {
        !self.ctrl && !self.shift
    }
}

/// Derived UI state: open tabs, active document, multi-selection, anchor
#[derive(Debug, Default, Clone)]
pub struct SelectionController {
    tabs: Vec<String>,
    active: Option<String>,
    selection: HashSet<String>,
    anchor: Option<String>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore tab state from a snapshot, dropping ids missing from the tree
    pub fn restore(tree: &DocumentTree, tabs: Vec<String>, active: Option<String>) -> Self {
        let tabs: Vec<String> = tabs.into_iter().filter(|id| tree.contains(id)).collect();
        let active = active.filter(|id| tabs.contains(id));
        let selection = active.iter().cloned().collect();
        Self {
            anchor: active.clone(),
            tabs,
            active,
            selection,
        }
    }

    /// Open tab ids in order
    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    /// The document shown in the main pane
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Currently highlighted ids
    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    /// Anchor for shift-range selection
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Open a document: append a tab if absent, activate, select, anchor
    pub fn activate(&mut self, tree: &mut DocumentTree, id: &str) {
        if !tree.contains(id) {
            return;
        }
        if !self.tabs.iter().any(|t| t == id) {
            self.tabs.push(id.to_string());
        }
        self.active = Some(id.to_string());
        self.selection = HashSet::from([id.to_string()]);
        self.anchor = Some(id.to_string());
        tree.ensure_visible(id);
    }

    /// Close a tab without discarding the document
    ///
    /// Closing the active tab activates the last remaining tab (or clears
    /// everything when the tab set empties); selection follows the new
    /// active id. Closing an inactive tab only drops it from the
    /// selection.
    pub fn close_tab(&mut self, id: &str) {
        let was_active = self.active.as_deref() == Some(id);
        self.tabs.retain(|t| t != id);

        if was_active {
            self.active = self.tabs.last().cloned();
            self.selection = self.active.iter().cloned().collect();
            self.anchor = self.active.clone();
        } else {
            self.selection.remove(id);
        }
    }

    /// Click on a tab in the tab strip
    pub fn click_tab(&mut self, tree: &mut DocumentTree, id: &str, mods: ClickModifiers) {
        if !self.tabs.iter().any(|t| t == id) {
            return;
        }
        self.active = Some(id.to_string());
        tree.ensure_visible(id);

        let order = self.tabs.clone();
        self.apply_click_selection(id, mods, &order);
    }

    /// Click on an item in the sidebar listing
    ///
    /// `query` selects the visible-id ordering: the search-match list when
    /// non-empty, the expanded pre-order traversal otherwise. A plain
    /// click on a file also opens it as a tab and activates it.
    pub fn click_sidebar(
        &mut self,
        tree: &mut DocumentTree,
        id: &str,
        mods: ClickModifiers,
        query: Option<&str>,
    ) {
        if !tree.contains(id) {
            return;
        }

        let order = match query.filter(|q| !q.trim().is_empty()) {
            Some(q) => tree.search_order(q),
            None => tree.visible_order(),
        };
        self.apply_click_selection(id, mods, &order);

        if mods.is_plain() && tree.get(id).map(|d| d.is_file()).unwrap_or(false) {
            if !self.tabs.iter().any(|t| t == id) {
                self.tabs.push(id.to_string());
            }
            self.active = Some(id.to_string());
            tree.ensure_visible(id);
        }
    }

    /// Shared modifier logic: shift-range against `order`, ctrl-toggle,
    /// plain single-select. The anchor is preserved by a shift-click with
    /// a valid anchor and moves to the clicked id otherwise.
    fn apply_click_selection(&mut self, id: &str, mods: ClickModifiers, order: &[String]) {
        let anchor_idx = self
            .anchor
            .as_ref()
            .and_then(|a| order.iter().position(|o| o == a));
        let target_idx = order.iter().position(|o| o == id);

        if mods.shift {
            if let (Some(ai), Some(ti)) = (anchor_idx, target_idx) {
                let (lo, hi) = if ai <= ti { (ai, ti) } else { (ti, ai) };
                let range: HashSet<String> = order[lo..=hi].iter().cloned().collect();
                if mods.ctrl {
                    self.selection.extend(range);
                } else {
                    self.selection = range;
                }
                return;
            }
            // No valid anchor: the clicked id becomes both target and anchor
            self.selection = HashSet::from([id.to_string()]);
            self.anchor = Some(id.to_string());
            return;
        }

        if mods.ctrl {
            if !self.selection.remove(id) {
                self.selection.insert(id.to_string());
            }
            self.anchor = Some(id.to_string());
            return;
        }

        self.selection = HashSet::from([id.to_string()]);
        self.anchor = Some(id.to_string());
    }
}
