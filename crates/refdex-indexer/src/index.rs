//! Shared index state: the path store and reverse index pair, plus the
//! registration engine used by both the bulk indexer and the synchronizer.

use crate::classify::{RefAction, RefMode};
use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use refdex_core::{PathStore, RefChange, RefChangeKind, RefValue, ReverseIndex};
use refdex_dom::Element;
use std::sync::Arc;
use tracing::debug;

/// The mutually consistent (path store, reverse index) pair.
///
/// For every path entry, every element inside it has that path listed in
/// the reverse index; the registration and unregistration paths below keep
/// that invariant after every batch. The one documented exception is
/// last-wins single overwrites, which leave the displaced element's
/// reverse path stale until that element is unregistered (the stale path
/// is then skipped silently).
pub struct RefIndex {
    /// Path-addressed references
    pub store: PathStore,
    /// Element identity to registered paths
    pub reverse: ReverseIndex,
    /// When this index was built
    pub created_at: DateTime<Utc>,
    /// Last registration or removal
    pub updated_at: DateTime<Utc>,
}

impl RefIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            store: PathStore::new(),
            reverse: ReverseIndex::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply classification actions for one element. Returns the changes
    /// actually applied; re-registering an existing (element, path) pair
    /// is a no-op and produces none.
    pub fn apply(&mut self, element: &Element, actions: &[RefAction]) -> Vec<RefChange> {
        let mut changes = Vec::new();

        for action in actions {
            match action.mode {
                RefMode::Set => {
                    self.store.set(&action.path, element.clone());
                }
                RefMode::Append => {
                    self.store.append(&action.path, element.clone());
                }
            }

            if self.reverse.record(element, &action.path) {
                debug!(element = ?element, path = %action.path, "Registered");
                changes.push(RefChange {
                    kind: RefChangeKind::Added,
                    element: element.clone(),
                    path: action.path.clone(),
                });
            }
        }

        if !changes.is_empty() {
            self.updated_at = Utc::now();
        }
        changes
    }

    /// Unregister an element from every path its reverse entry lists,
    /// deleting the entry. Paths that no longer resolve to the element
    /// (destructive repair, last-wins overwrites) are skipped silently and
    /// produce no change.
    pub fn unregister(&mut self, element: &Element) -> Vec<RefChange> {
        let Some(paths) = self.reverse.remove_entry(element.id()) else {
            return Vec::new();
        };

        let mut changes = Vec::new();
        for path in paths {
            if self.store.remove(&path, element) {
                debug!(element = ?element, path = %path, "Unregistered");
                changes.push(RefChange {
                    kind: RefChangeKind::Removed,
                    element: element.clone(),
                    path,
                });
            }
        }

        if !changes.is_empty() {
            self.updated_at = Utc::now();
        }
        changes
    }
}

impl Default for RefIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap-to-clone handle to a shared [`RefIndex`].
///
/// The handle is what `build` returns and what synchronizers are attached
/// to; all of them operate on the same pair. Only one synchronizer should
/// be attached to a handle at a time.
#[derive(Clone)]
pub struct IndexHandle {
    shared: Arc<RwLock<RefIndex>>,
}

impl IndexHandle {
    pub(crate) fn new(index: RefIndex) -> Self {
        Self {
            shared: Arc::new(RwLock::new(index)),
        }
    }

    /// Read access to the underlying index, for inspection.
    pub fn read(&self) -> RwLockReadGuard<'_, RefIndex> {
        self.shared.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, RefIndex> {
        self.shared.write()
    }

    /// The value at a dotted path, if any.
    pub fn get(&self, path: &str) -> Option<RefValue> {
        self.shared.read().store.get(path).cloned()
    }

    /// The single element at a path.
    pub fn single(&self, path: &str) -> Option<Element> {
        self.shared.read().store.single(path)
    }

    /// The collection at a path.
    pub fn many(&self, path: &str) -> Option<Vec<Element>> {
        self.shared.read().store.many(path)
    }

    /// The paths an element is registered under, in insertion order, or
    /// `None` when it has no reverse entry at all.
    pub fn paths_of(&self, element: &Element) -> Option<Vec<String>> {
        self.shared.read().reverse.paths_of(element.id())
    }

    /// Number of top-level path entries.
    pub fn len(&self) -> usize {
        self.shared.read().store.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.shared.read().store.is_empty()
    }

    /// When the index was built.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.shared.read().created_at
    }

    /// Empty the path store's top-level entries. The reverse index is
    /// deliberately left untouched (source-compatible asymmetry); stale
    /// reverse paths are skipped silently at removal time.
    pub fn clear(&self) {
        self.shared.write().store.clear();
    }
}
