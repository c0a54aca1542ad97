//! Element handles for the in-memory tree.
//!
//! An [`Element`] is a cheap cloneable handle; two handles are equal when
//! they point at the same node. Identity is a process-wide monotonically
//! assigned id that is never reused, so index side-tables can key by it
//! safely across detach/reattach cycles.

use crate::selector::SelectorList;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::warn;

/// Unique identifier for an element.
pub type ElementId = u64;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct ElementInner {
    id: ElementId,
    tag: String,
    attributes: RwLock<HashMap<String, String>>,
    parent: RwLock<Weak<ElementInner>>,
    children: RwLock<Vec<Element>>,
}

/// A node in the element tree.
#[derive(Clone)]
pub struct Element {
    inner: Arc<ElementInner>,
}

/// A weak handle to an element. Holding one does not keep the element
/// alive; side-tables use this so detached elements can be reclaimed.
#[derive(Clone)]
pub struct WeakElement {
    inner: Weak<ElementInner>,
}

impl Element {
    /// Create a detached element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ElementInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                tag: tag.into(),
                attributes: RwLock::new(HashMap::new()),
                parent: RwLock::new(Weak::new()),
                children: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Stable identity of this element.
    pub fn id(&self) -> ElementId {
        self.inner.id
    }

    /// Tag name.
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Read an attribute value.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner.attributes.read().get(name).cloned()
    }

    /// Set an attribute value, replacing any previous value.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .attributes
            .write()
            .insert(name.into(), value.into());
    }

    /// Remove an attribute. Returns the previous value, if any.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        self.inner.attributes.write().remove(name)
    }

    /// Parent element, if attached.
    pub fn parent(&self) -> Option<Element> {
        self.inner.parent.read().upgrade().map(|inner| Element { inner })
    }

    /// Direct children, in document order.
    pub fn children(&self) -> Vec<Element> {
        self.inner.children.read().clone()
    }

    /// All descendants in document (preorder) order, excluding `self`.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Whether `other` is this element or one of its descendants.
    pub fn contains(&self, other: &Element) -> bool {
        let mut current = Some(other.clone());
        while let Some(el) = current {
            if el.id() == self.id() {
                return true;
            }
            current = el.parent();
        }
        false
    }

    /// Whether this element matches the selector. An unparseable selector
    /// matches nothing and is never surfaced as an error.
    pub fn matches(&self, selector: &str) -> bool {
        match SelectorList::parse(selector) {
            Ok(list) => list.matches(self),
            Err(e) => {
                warn!(selector, error = %e, "Ignoring invalid selector");
                false
            }
        }
    }

    /// All descendants matching the selector, in document order. The
    /// element itself is never included. An unparseable selector yields an
    /// empty result.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        let list = match SelectorList::parse(selector) {
            Ok(list) => list,
            Err(e) => {
                warn!(selector, error = %e, "Ignoring invalid selector");
                return Vec::new();
            }
        };

        self.descendants()
            .into_iter()
            .filter(|el| list.matches(el))
            .collect()
    }

    /// Downgrade to a weak handle.
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Detach from the current parent, if any. Returns the old parent.
    pub(crate) fn detach(&self) -> Option<Element> {
        let parent = self.parent()?;
        parent
            .inner
            .children
            .write()
            .retain(|c| c.id() != self.id());
        *self.inner.parent.write() = Weak::new();
        Some(parent)
    }

    /// Append `child` to this element's child list and re-point its parent.
    /// Callers are responsible for detaching first and for cycle checks.
    pub(crate) fn push_child(&self, child: &Element) {
        *child.inner.parent.write() = Arc::downgrade(&self.inner);
        self.inner.children.write().push(child.clone());
    }
}

fn collect_descendants(element: &Element, out: &mut Vec<Element>) {
    for child in element.children() {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

impl WeakElement {
    /// Try to recover a strong handle.
    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(|inner| Element { inner })
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Element {}

impl std::hash::Hash for Element {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}>", self.inner.tag, self.inner.id)
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(el) => write!(f, "Weak({:?})", el),
            None => write!(f, "Weak(<dropped>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = Element::new("div");
        let b = Element::new("div");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_attributes() {
        let el = Element::new("div");
        assert_eq!(el.attribute("data-ref"), None);

        el.set_attribute("data-ref", "header");
        assert_eq!(el.attribute("data-ref").as_deref(), Some("header"));

        el.set_attribute("data-ref", "footer");
        assert_eq!(el.attribute("data-ref").as_deref(), Some("footer"));

        assert_eq!(el.remove_attribute("data-ref").as_deref(), Some("footer"));
        assert_eq!(el.attribute("data-ref"), None);
    }

    #[test]
    fn test_descendants_preorder() {
        let root = Element::new("root");
        let a = Element::new("a");
        let b = Element::new("b");
        let a1 = Element::new("a1");

        root.push_child(&a);
        root.push_child(&b);
        a.push_child(&a1);

        let order: Vec<_> = root.descendants().iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![a.id(), a1.id(), b.id()]);
    }

    #[test]
    fn test_contains() {
        let root = Element::new("root");
        let child = Element::new("div");
        let grandchild = Element::new("span");
        root.push_child(&child);
        child.push_child(&grandchild);

        assert!(root.contains(&root));
        assert!(root.contains(&grandchild));
        assert!(!child.contains(&root));
    }

    #[test]
    fn test_query_all_excludes_self() {
        let root = Element::new("div");
        root.set_attribute("data-ref", "outer");
        let inner = Element::new("div");
        inner.set_attribute("data-ref", "inner");
        root.push_child(&inner);

        let found = root.query_all("[data-ref]");
        assert_eq!(found, vec![inner]);
    }

    #[test]
    fn test_invalid_selector_matches_nothing() {
        let el = Element::new("div");
        el.set_attribute("data-ref", "x");
        assert!(!el.matches("[unclosed"));
        assert!(el.query_all("[unclosed").is_empty());
    }

    #[test]
    fn test_weak_element_reclaimed() {
        let weak = {
            let el = Element::new("div");
            el.downgrade()
        };
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_detach() {
        let parent = Element::new("div");
        let child = Element::new("span");
        parent.push_child(&child);
        assert_eq!(child.parent(), Some(parent.clone()));

        let old = child.detach();
        assert_eq!(old, Some(parent.clone()));
        assert!(child.parent().is_none());
        assert!(parent.children().is_empty());
    }
}
