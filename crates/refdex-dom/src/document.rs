//! The document: tree mutations, observer delivery, and the event bus.

use crate::element::Element;
use crate::error::DomError;
use crate::observer::{
    MutationRecord, ObserveOptions, ObserverCallback, ObserverHandle, ObserverId, ObserverReg,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Identifier for a registered event listener.
pub type ListenerId = u64;

/// Payload carried by a dispatched event.
#[derive(Debug, Clone)]
pub struct EventDetail {
    /// The element the event is about
    pub element: Element,
    /// The key (path) the event is about
    pub key: String,
}

type ListenerCallback = Box<dyn Fn(&EventDetail) + Send + Sync + 'static>;

struct Listener {
    id: ListenerId,
    event: String,
    callback: ListenerCallback,
}

struct DocumentInner {
    root: Element,
    observers: RwLock<Vec<Arc<ObserverReg>>>,
    listeners: RwLock<Vec<Listener>>,
    next_observer_id: AtomicU64,
    next_listener_id: AtomicU64,
}

/// A document owning a root element, observer registrations, and event
/// listeners. Cloning produces another handle to the same document.
///
/// All structure mutations must go through [`append_child`](Self::append_child)
/// and [`remove_child`](Self::remove_child) so observers see them.
#[derive(Clone)]
pub struct Document {
    inner: Arc<DocumentInner>,
}

impl Document {
    /// Create a document with an empty root element.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DocumentInner {
                root: Element::new("root"),
                observers: RwLock::new(Vec::new()),
                listeners: RwLock::new(Vec::new()),
                next_observer_id: AtomicU64::new(1),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// The root element.
    pub fn root(&self) -> Element {
        self.inner.root.clone()
    }

    /// Descendants of the root matching the selector, in document order.
    /// An invalid selector matches nothing.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        self.inner.root.query_all(selector)
    }

    /// Append `child` under `parent`. If the child is currently attached
    /// elsewhere it is detached first, and the removal record is queued
    /// before the addition record; batch consumers rely on that order to
    /// handle moves.
    pub fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        if child.contains(parent) {
            return Err(DomError::Hierarchy);
        }

        if let Some(old_parent) = child.detach() {
            self.queue_record(MutationRecord {
                target: old_parent,
                added: Vec::new(),
                removed: vec![child.clone()],
            });
        }

        parent.push_child(child);
        self.queue_record(MutationRecord {
            target: parent.clone(),
            added: vec![child.clone()],
            removed: Vec::new(),
        });
        Ok(())
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        if child.parent().map(|p| p.id()) != Some(parent.id()) {
            return Err(DomError::NotAChild);
        }

        child.detach();
        self.queue_record(MutationRecord {
            target: parent.clone(),
            added: Vec::new(),
            removed: vec![child.clone()],
        });
        Ok(())
    }

    /// Register an observer for child-list mutations under `scope`.
    pub fn observe<F>(&self, scope: &Element, options: ObserveOptions, callback: F) -> ObserverHandle
    where
        F: FnMut(&[MutationRecord]) + Send + 'static,
    {
        let id = self.inner.next_observer_id.fetch_add(1, Ordering::Relaxed);
        let reg = Arc::new(ObserverReg {
            id,
            scope: scope.clone(),
            options,
            connected: AtomicBool::new(true),
            queue: Mutex::new(Vec::new()),
            callback: Mutex::new(Box::new(callback) as ObserverCallback),
        });

        self.inner.observers.write().push(reg);
        debug!(observer = id, scope = ?scope, "Observer registered");
        ObserverHandle::new(self.clone(), id)
    }

    /// Deliver every observer's queued records as one batch per observer,
    /// in registration order. This is the host's microtask checkpoint;
    /// mutations performed inside a callback queue records for the next
    /// delivery.
    pub fn deliver_mutations(&self) {
        let observers: Vec<Arc<ObserverReg>> = self.inner.observers.read().clone();

        for reg in observers {
            let batch = std::mem::take(&mut *reg.queue.lock());
            if batch.is_empty() || !reg.connected.load(Ordering::Relaxed) {
                continue;
            }
            debug!(observer = reg.id, records = batch.len(), "Delivering mutation batch");
            (reg.callback.lock())(&batch);
        }
    }

    /// Register a listener for a named event.
    pub fn add_listener<F>(&self, event: impl Into<String>, callback: F) -> ListenerId
    where
        F: Fn(&EventDetail) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push(Listener {
            id,
            event: event.into(),
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a previously registered listener. Unknown ids are ignored.
    pub fn remove_listener(&self, id: ListenerId) {
        self.inner.listeners.write().retain(|l| l.id != id);
    }

    /// Synchronously invoke every listener registered for `event`, in
    /// registration order.
    pub fn dispatch(&self, event: &str, detail: &EventDetail) {
        let listeners = self.inner.listeners.read();
        for listener in listeners.iter() {
            if listener.event == event {
                (listener.callback)(detail);
            }
        }
    }

    pub(crate) fn disconnect_observer(&self, id: ObserverId) {
        let mut observers = self.inner.observers.write();
        if let Some(pos) = observers.iter().position(|reg| reg.id == id) {
            let reg = observers.remove(pos);
            reg.connected.store(false, Ordering::Relaxed);
            debug!(observer = id, "Observer disconnected");
        }
    }

    fn queue_record(&self, record: MutationRecord) {
        let observers = self.inner.observers.read();
        for reg in observers.iter() {
            if reg.covers(&record.target) {
                reg.queue.lock().push(record.clone());
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
