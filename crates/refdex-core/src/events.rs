//! Change notification names and payloads.

use refdex_dom::Element;

/// Event name dispatched when a path is newly registered for an element.
pub const REF_ADDED: &str = "ref-added";

/// Event name dispatched when a path is removed for an element.
pub const REF_REMOVED: &str = "ref-removed";

/// Direction of an applied index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefChangeKind {
    /// The (element, path) pair was newly registered
    Added,
    /// The (element, path) pair was unregistered
    Removed,
}

/// One applied registration or unregistration. No-op operations (for
/// example re-registering an identical pair) produce no change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefChange {
    /// What happened
    pub kind: RefChangeKind,
    /// The element involved
    pub element: Element,
    /// The dotted path involved
    pub path: String,
}

impl RefChange {
    /// The event name this change dispatches under.
    pub fn event_name(&self) -> &'static str {
        match self.kind {
            RefChangeKind::Added => REF_ADDED,
            RefChangeKind::Removed => REF_REMOVED,
        }
    }
}
