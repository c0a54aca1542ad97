//! The indexer: one-shot scan plus incremental watch.

use crate::classify::classify;
use crate::index::{IndexHandle, RefIndex};
use crate::sync::{self, SyncCounters, WatchHandle};
use refdex_core::RefOptions;
use refdex_dom::{Document, Element, ObserveOptions};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Builds ref indexes over a document and keeps them synchronized.
pub struct RefIndexer {
    document: Document,
    options: RefOptions,
    notify: bool,
}

impl RefIndexer {
    /// Create an indexer with default options.
    pub fn new(document: Document) -> Self {
        Self::with_options(document, RefOptions::default())
    }

    /// Create an indexer with custom naming options.
    pub fn with_options(document: Document, options: RefOptions) -> Self {
        Self {
            document,
            options,
            notify: false,
        }
    }

    /// Enable change notifications: every applied registration and removal
    /// is dispatched on the document bus under
    /// [`REF_ADDED`](refdex_core::REF_ADDED) /
    /// [`REF_REMOVED`](refdex_core::REF_REMOVED).
    pub fn notifying(mut self) -> Self {
        self.notify = true;
        self
    }

    /// The options this indexer registers with.
    pub fn options(&self) -> &RefOptions {
        &self.options
    }

    /// One-shot scan: query `scope` with the effective selector and apply
    /// every match in document order, later matches winning single-path
    /// ties. An invalid selector yields an empty index, not an error.
    pub fn build(&self, scope: &Element) -> IndexHandle {
        let start = Instant::now();
        let selector = self.options.effective_selector();

        let matches = scope.query_all(&selector);
        let matched = matches.len();

        let mut index = RefIndex::new();
        let mut changes = Vec::new();
        for element in &matches {
            changes.extend(index.apply(element, &classify(element, &self.options)));
        }

        info!(
            scope = ?scope,
            matched,
            registered = changes.len(),
            paths = index.store.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Initial index built"
        );

        if self.notify {
            sync::dispatch_changes(&self.document, &changes);
        }

        IndexHandle::new(index)
    }

    /// Attach an incremental synchronizer to `handle`, observing child-list
    /// changes at any depth under `scope`. Added subtrees are classified
    /// and registered, removed subtrees unregistered via the reverse index,
    /// one delivered batch at a time.
    ///
    /// The synchronizer must use the same options the handle was built
    /// with, which this method guarantees by reusing the indexer's own.
    /// Attaching more than one synchronizer to the same handle is
    /// unsupported and will double-register additions.
    pub fn watch(&self, handle: &IndexHandle, scope: &Element) -> WatchHandle {
        let shared = handle.clone();
        let options = self.options.clone();
        let document = self.document.clone();
        let notify = self.notify;
        let counters = Arc::new(SyncCounters::default());
        let cb_counters = counters.clone();

        let observer = self.document.observe(
            scope,
            ObserveOptions {
                child_list: true,
                subtree: true,
            },
            move |records| {
                sync::process_batch(&shared, &options, &document, notify, records, &cb_counters);
            },
        );

        info!(scope = ?scope, "Synchronizer attached");
        WatchHandle::new(observer, counters)
    }
}
