//! Mutation observation primitives.
//!
//! Structure mutations performed through a [`Document`](crate::Document)
//! queue a [`MutationRecord`] on every observer whose scope covers the
//! mutation target. Records sit in per-observer queues until the document's
//! delivery checkpoint hands each observer its batch in one callback.

use crate::document::Document;
use crate::element::Element;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Unique identifier for an observer registration.
pub type ObserverId = u64;

/// What an observer is interested in.
#[derive(Debug, Clone, Copy)]
pub struct ObserveOptions {
    /// Report child-list changes (additions/removals of direct children)
    pub child_list: bool,
    /// Report changes anywhere under the scope, not just on it
    pub subtree: bool,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            child_list: true,
            subtree: true,
        }
    }
}

/// One recorded child-list mutation. Exactly one of `added`/`removed` is
/// non-empty for records produced by this host.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// The parent whose child list changed
    pub target: Element,
    /// Nodes appended to the target, in insertion order
    pub added: Vec<Element>,
    /// Nodes detached from the target, in removal order
    pub removed: Vec<Element>,
}

pub(crate) type ObserverCallback = Box<dyn FnMut(&[MutationRecord]) + Send + 'static>;

pub(crate) struct ObserverReg {
    pub(crate) id: ObserverId,
    pub(crate) scope: Element,
    pub(crate) options: ObserveOptions,
    pub(crate) connected: AtomicBool,
    pub(crate) queue: Mutex<Vec<MutationRecord>>,
    pub(crate) callback: Mutex<ObserverCallback>,
}

impl ObserverReg {
    /// Whether a mutation on `target` falls inside this observer's scope.
    pub(crate) fn covers(&self, target: &Element) -> bool {
        if !self.options.child_list || !self.connected.load(Ordering::Relaxed) {
            return false;
        }
        if self.options.subtree {
            self.scope.contains(target)
        } else {
            self.scope.id() == target.id()
        }
    }
}

/// Handle to an active observer registration.
///
/// Dropping the handle does not disconnect the observer; call
/// [`disconnect`](Self::disconnect) to stop delivery. Disconnecting twice
/// is a no-op.
pub struct ObserverHandle {
    document: Document,
    id: ObserverId,
}

impl ObserverHandle {
    pub(crate) fn new(document: Document, id: ObserverId) -> Self {
        Self { document, id }
    }

    /// Permanently stop delivery and drop any pending records.
    pub fn disconnect(&self) {
        self.document.disconnect_observer(self.id);
    }
}
