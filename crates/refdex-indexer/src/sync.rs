//! Incremental synchronization of the index with tree mutations.

use crate::classify::classify;
use crate::index::{IndexHandle, RefIndex};
use refdex_core::{RefChange, RefChangeKind, RefOptions};
use refdex_dom::{Document, Element, EventDetail, MutationRecord, ObserverHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Snapshot of a synchronizer's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStats {
    /// Mutation batches processed
    pub batches: u64,
    /// (element, path) registrations applied
    pub registered: u64,
    /// (element, path) removals applied
    pub unregistered: u64,
}

#[derive(Default)]
pub(crate) struct SyncCounters {
    batches: AtomicU64,
    registered: AtomicU64,
    unregistered: AtomicU64,
}

impl SyncCounters {
    fn snapshot(&self) -> SyncStats {
        SyncStats {
            batches: self.batches.load(Ordering::Relaxed),
            registered: self.registered.load(Ordering::Relaxed),
            unregistered: self.unregistered.load(Ordering::Relaxed),
        }
    }
}

/// Handle to an active synchronizer.
///
/// [`stop`](Self::stop) permanently disconnects it; the index keeps its
/// last-synchronized state. Stopping more than once is a no-op.
pub struct WatchHandle {
    observer: ObserverHandle,
    counters: Arc<SyncCounters>,
}

impl WatchHandle {
    pub(crate) fn new(observer: ObserverHandle, counters: Arc<SyncCounters>) -> Self {
        Self { observer, counters }
    }

    /// Disconnect from the mutation stream. No further batches are
    /// processed; there is no rollback of already-applied changes.
    pub fn stop(&self) {
        self.observer.disconnect();
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> SyncStats {
        self.counters.snapshot()
    }
}

/// Process one delivered mutation batch.
///
/// Records are handled in arrival order; within a record, removed nodes
/// are unregistered before added nodes are registered. The host emits the
/// removal record before the addition record when a node is re-parented,
/// so a node moved within one batch ends up registered exactly once.
pub(crate) fn process_batch(
    handle: &IndexHandle,
    options: &RefOptions,
    document: &Document,
    notify: bool,
    records: &[MutationRecord],
    counters: &SyncCounters,
) {
    let selector = options.effective_selector();
    let mut changes = Vec::new();

    {
        let mut index = handle.write();
        for record in records {
            for element in &record.removed {
                changes.extend(unregister_subtree(&mut index, element));
            }
            for element in &record.added {
                changes.extend(register_subtree(&mut index, element, &selector, options));
            }
        }
    }

    let registered = changes
        .iter()
        .filter(|c| c.kind == RefChangeKind::Added)
        .count() as u64;
    let unregistered = changes.len() as u64 - registered;

    counters.batches.fetch_add(1, Ordering::Relaxed);
    counters.registered.fetch_add(registered, Ordering::Relaxed);
    counters
        .unregistered
        .fetch_add(unregistered, Ordering::Relaxed);

    debug!(
        records = records.len(),
        registered, unregistered, "Mutation batch applied"
    );

    if notify {
        dispatch_changes(document, &changes);
    }
}

/// Dispatch applied changes on the document bus, in application order.
pub(crate) fn dispatch_changes(document: &Document, changes: &[RefChange]) {
    for change in changes {
        document.dispatch(
            change.event_name(),
            &EventDetail {
                element: change.element.clone(),
                key: change.path.clone(),
            },
        );
    }
}

/// Register one added subtree root: the element itself when it matches the
/// selector, then every matching descendant, in document order.
fn register_subtree(
    index: &mut RefIndex,
    element: &Element,
    selector: &str,
    options: &RefOptions,
) -> Vec<RefChange> {
    let mut changes = Vec::new();
    if element.matches(selector) {
        changes.extend(index.apply(element, &classify(element, options)));
    }
    for descendant in element.query_all(selector) {
        changes.extend(index.apply(&descendant, &classify(&descendant, options)));
    }
    changes
}

/// Unregister one removed subtree root and every descendant via the
/// reverse index. Unfiltered: the reverse lookup is a no-op for elements
/// that were never registered.
fn unregister_subtree(index: &mut RefIndex, element: &Element) -> Vec<RefChange> {
    let mut changes = index.unregister(element);
    for descendant in element.descendants() {
        changes.extend(index.unregister(&descendant));
    }
    changes
}
