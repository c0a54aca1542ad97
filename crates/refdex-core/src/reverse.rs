//! Reverse lookup from element identity to registered paths.
//!
//! Entries hold weak element handles, so the side-table never keeps a
//! detached element alive on its own. An entry exists exactly while the
//! element appears somewhere in the path store; once its last path is
//! forgotten the entry is deleted, never left empty.

use refdex_dom::{Element, ElementId, WeakElement};
use std::collections::HashMap;

struct ReverseEntry {
    element: WeakElement,
    /// Insertion-ordered, duplicate-free
    paths: Vec<String>,
}

/// Identity-keyed mapping from element to its registered paths.
#[derive(Default)]
pub struct ReverseIndex {
    entries: HashMap<ElementId, ReverseEntry>,
}

impl ReverseIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `element` is registered under `path`. Returns true iff
    /// this exact (element, path) pair was not already recorded; callers
    /// use that to suppress duplicate bookkeeping and notifications.
    pub fn record(&mut self, element: &Element, path: &str) -> bool {
        let entry = self
            .entries
            .entry(element.id())
            .or_insert_with(|| ReverseEntry {
                element: element.downgrade(),
                paths: Vec::new(),
            });
        if entry.paths.iter().any(|p| p == path) {
            false
        } else {
            entry.paths.push(path.to_string());
            true
        }
    }

    /// Forget one path for an element. Deletes the whole entry once its
    /// path list empties. Returns whether the path was present.
    pub fn forget(&mut self, id: ElementId, path: &str) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        let before = entry.paths.len();
        entry.paths.retain(|p| p != path);
        let removed = entry.paths.len() != before;
        if entry.paths.is_empty() {
            self.entries.remove(&id);
        }
        removed
    }

    /// Take all paths for an element, deleting its entry.
    pub fn remove_entry(&mut self, id: ElementId) -> Option<Vec<String>> {
        self.entries.remove(&id).map(|entry| entry.paths)
    }

    /// The paths an element is registered under, in insertion order.
    pub fn paths_of(&self, id: ElementId) -> Option<Vec<String>> {
        self.entries.get(&id).map(|entry| entry.paths.clone())
    }

    /// Whether the (element, path) pair is recorded.
    pub fn contains(&self, id: ElementId, path: &str) -> bool {
        self.entries
            .get(&id)
            .map(|entry| entry.paths.iter().any(|p| p == path))
            .unwrap_or(false)
    }

    /// Recover the element handle for an entry, if it is still alive.
    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.entries.get(&id).and_then(|entry| entry.element.upgrade())
    }

    /// Number of elements with at least one registered path.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no element is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for ReverseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (id, entry) in &self.entries {
            map.entry(id, &entry.paths);
        }
        map.finish()
    }
}
