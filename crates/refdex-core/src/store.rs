//! The path store: a nested mapping from dot-separated keys to elements.
//!
//! A full path is the dot-joined sequence of segments from the root to a
//! leaf. Intermediate nodes are created lazily and never user-supplied.
//! Descending through a segment that currently holds a leaf or a
//! collection silently replaces it with a fresh intermediate node; this
//! destructive repair is preserved from the source system and means a
//! later registration can discard an earlier leaf.

use refdex_dom::Element;
use std::collections::HashMap;
use tracing::debug;

/// A value stored at a path.
#[derive(Debug, Clone)]
pub enum RefValue {
    /// A single owned reference
    Single(Element),
    /// An ordered collection of references
    Many(Vec<Element>),
    /// A further nested store
    Nested(PathStore),
}

impl RefValue {
    /// The single element, if this is a `Single`.
    pub fn as_single(&self) -> Option<&Element> {
        match self {
            RefValue::Single(el) => Some(el),
            _ => None,
        }
    }

    /// The collection, if this is a `Many`.
    pub fn as_many(&self) -> Option<&[Element]> {
        match self {
            RefValue::Many(els) => Some(els),
            _ => None,
        }
    }

    /// The nested store, if this is a `Nested`.
    pub fn as_nested(&self) -> Option<&PathStore> {
        match self {
            RefValue::Nested(store) => Some(store),
            _ => None,
        }
    }
}

/// Nested mapping from path segments to values.
#[derive(Debug, Clone, Default)]
pub struct PathStore {
    entries: HashMap<String, RefValue>,
}

impl PathStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single value at the dotted path, replacing whatever was there.
    pub fn set(&mut self, path: &str, element: Element) {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, intermediates) = segments.split_last().expect("split always yields one");

        let node = intermediates
            .iter()
            .fold(self, |node, segment| node.descend(segment));
        node.entries.insert((*last).to_string(), RefValue::Single(element));
    }

    /// Append an element to the collection at the dotted path. A non-
    /// collection value at the leaf is replaced by a fresh collection
    /// first. Appending an element already present (by identity) is a
    /// no-op; returns whether the element was actually added.
    pub fn append(&mut self, path: &str, element: Element) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, intermediates) = segments.split_last().expect("split always yields one");

        let node = intermediates
            .iter()
            .fold(self, |node, segment| node.descend(segment));

        let entry = node
            .entries
            .entry((*last).to_string())
            .or_insert_with(|| RefValue::Many(Vec::new()));
        if !matches!(entry, RefValue::Many(_)) {
            debug!(path, "Replacing non-collection leaf with a collection");
            *entry = RefValue::Many(Vec::new());
        }

        match entry {
            RefValue::Many(els) => {
                if els.contains(&element) {
                    false
                } else {
                    els.push(element);
                    true
                }
            }
            _ => unreachable!("leaf was just repaired to a collection"),
        }
    }

    /// Look up the value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&RefValue> {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, intermediates) = segments.split_last()?;

        let mut node = self;
        for segment in intermediates {
            node = node.entries.get(*segment)?.as_nested()?;
        }
        node.entries.get(*last)
    }

    /// The single element at a path, if the path resolves to a `Single`.
    pub fn single(&self, path: &str) -> Option<Element> {
        self.get(path)?.as_single().cloned()
    }

    /// The collection at a path, if the path resolves to a `Many`.
    pub fn many(&self, path: &str) -> Option<Vec<Element>> {
        self.get(path)?.as_many().map(<[Element]>::to_vec)
    }

    /// Remove `element` from the value at the path: deletes the leaf when
    /// it is that exact single value, or removes the element from the
    /// collection there (deleting the leaf once the collection empties).
    /// Intermediate nodes emptied by the removal are pruned bottom-up.
    ///
    /// Returns whether anything was removed. A path that no longer
    /// resolves (for example after a destructive repair) removes nothing.
    pub fn remove(&mut self, path: &str, element: &Element) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        let removed = self.remove_at(&segments, element);
        if !removed {
            debug!(path, element = ?element, "Path did not resolve to the element; skipping");
        }
        removed
    }

    /// Remove all top-level entries. Nested stores reachable only through
    /// them are dropped as well; the reverse index is deliberately not
    /// touched by this operation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level keys, unordered.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Walk to (or create) the intermediate node for one segment. Anything
    /// other than a nested node at that key is overwritten with a fresh
    /// empty one.
    fn descend(&mut self, segment: &str) -> &mut PathStore {
        let entry = self
            .entries
            .entry(segment.to_string())
            .or_insert_with(|| RefValue::Nested(PathStore::new()));
        if !matches!(entry, RefValue::Nested(_)) {
            debug!(segment, "Overwriting leaf with an intermediate node");
            *entry = RefValue::Nested(PathStore::new());
        }
        match entry {
            RefValue::Nested(store) => store,
            _ => unreachable!("entry was just repaired to a nested node"),
        }
    }

    fn remove_at(&mut self, segments: &[&str], element: &Element) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return false;
        };

        if rest.is_empty() {
            return match self.entries.get_mut(*head) {
                Some(RefValue::Single(el)) if el == element => {
                    self.entries.remove(*head);
                    true
                }
                Some(RefValue::Many(els)) => {
                    let before = els.len();
                    els.retain(|el| el != element);
                    let removed = els.len() != before;
                    if els.is_empty() {
                        self.entries.remove(*head);
                    }
                    removed
                }
                _ => false,
            };
        }

        match self.entries.get_mut(*head) {
            Some(RefValue::Nested(child)) => {
                let removed = child.remove_at(rest, element);
                if removed && child.is_empty() {
                    self.entries.remove(*head);
                }
                removed
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_flat() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        store.set("header", el.clone());
        assert_eq!(store.single("header"), Some(el));
    }

    #[test]
    fn test_nested_round_trip() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        store.set("a.b.c", el.clone());

        // Reading back segment by segment yields the original element,
        // and the intermediate entries are store nodes, not elements.
        let a = store.get("a").unwrap().as_nested().unwrap();
        let b = a.get("b").unwrap().as_nested().unwrap();
        assert_eq!(b.single("c"), Some(el.clone()));
        assert_eq!(store.single("a.b.c"), Some(el));
    }

    #[test]
    fn test_set_last_wins() {
        let mut store = PathStore::new();
        let first = Element::new("div");
        let second = Element::new("div");
        store.set("header", first);
        store.set("header", second.clone());
        assert_eq!(store.single("header"), Some(second));
    }

    #[test]
    fn test_destructive_repair_of_leaf() {
        let mut store = PathStore::new();
        let leaf = Element::new("div");
        let nested = Element::new("span");

        store.set("a", leaf);
        store.set("a.b", nested.clone());

        // The old leaf at "a" was discarded for an intermediate node.
        assert!(store.get("a").unwrap().as_nested().is_some());
        assert_eq!(store.single("a.b"), Some(nested));
    }

    #[test]
    fn test_destructive_repair_of_collection() {
        let mut store = PathStore::new();
        store.append("items", Element::new("li"));
        store.set("items.first", Element::new("li"));
        assert!(store.get("items").unwrap().as_nested().is_some());
    }

    #[test]
    fn test_append_creates_collection() {
        let mut store = PathStore::new();
        let a = Element::new("li");
        let b = Element::new("li");
        assert!(store.append("items.list", a.clone()));
        assert!(store.append("items.list", b.clone()));
        assert_eq!(store.many("items.list"), Some(vec![a, b]));
    }

    #[test]
    fn test_append_is_idempotent() {
        let mut store = PathStore::new();
        let el = Element::new("li");
        assert!(store.append("items", el.clone()));
        assert!(!store.append("items", el.clone()));
        assert_eq!(store.many("items"), Some(vec![el]));
    }

    #[test]
    fn test_append_replaces_single_leaf() {
        let mut store = PathStore::new();
        let old = Element::new("div");
        let new = Element::new("li");
        store.set("items", old);
        store.append("items", new.clone());
        assert_eq!(store.many("items"), Some(vec![new]));
    }

    #[test]
    fn test_remove_single() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        store.set("header", el.clone());

        assert!(store.remove("header", &el));
        assert!(store.get("header").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_single_wrong_element() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        let other = Element::new("div");
        store.set("header", el.clone());

        assert!(!store.remove("header", &other));
        assert_eq!(store.single("header"), Some(el));
    }

    #[test]
    fn test_remove_from_collection_preserves_order() {
        let mut store = PathStore::new();
        let a = Element::new("li");
        let b = Element::new("li");
        let c = Element::new("li");
        store.append("items", a.clone());
        store.append("items", b.clone());
        store.append("items", c.clone());

        assert!(store.remove("items", &b));
        assert_eq!(store.many("items"), Some(vec![a.clone(), c.clone()]));

        assert!(store.remove("items", &a));
        assert!(store.remove("items", &c));
        assert!(store.get("items").is_none());
    }

    #[test]
    fn test_remove_prunes_empty_intermediates() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        store.set("dynamic.test", el.clone());

        assert!(store.remove("dynamic.test", &el));
        assert!(store.get("dynamic").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_keeps_populated_intermediates() {
        let mut store = PathStore::new();
        let a = Element::new("div");
        let b = Element::new("div");
        store.set("nav.menu", a.clone());
        store.set("nav.logo", b.clone());

        assert!(store.remove("nav.menu", &a));
        assert_eq!(store.single("nav.logo"), Some(b));
    }

    #[test]
    fn test_remove_unresolvable_path() {
        let mut store = PathStore::new();
        let el = Element::new("div");
        store.set("a", el.clone());
        // "a" is a leaf, so "a.b" does not resolve.
        assert!(!store.remove("a.b", &el));
        assert_eq!(store.single("a"), Some(el));
    }

    #[test]
    fn test_clear_is_shallow_over_top_level() {
        let mut store = PathStore::new();
        store.set("a.b", Element::new("div"));
        store.set("c", Element::new("div"));
        assert_eq!(store.len(), 2);

        store.clear();
        assert!(store.is_empty());
        assert!(store.get("a.b").is_none());
    }
}
