//! Refdex indexing engine
//!
//! Maintains a queryable index from declarative string keys, carried in
//! element attributes or identifiers, to the elements declaring them:
//! - Classification of one element into registration actions, honoring
//!   the array/single/identifier precedence rules
//! - A one-shot initial indexer over a scoped subtree
//! - An incremental synchronizer applying mutation batches to the same
//!   path store / reverse index pair
//! - Optional change notifications on the document event bus
//!
//! ```
//! use refdex_dom::{Document, Element};
//! use refdex_indexer::RefIndexer;
//!
//! let doc = Document::new();
//! let header = Element::new("div");
//! header.set_attribute("data-ref", "layout.header");
//! doc.append_child(&doc.root(), &header).unwrap();
//!
//! let indexer = RefIndexer::new(doc.clone());
//! let index = indexer.build(&doc.root());
//! assert_eq!(index.single("layout.header"), Some(header));
//!
//! let watch = indexer.watch(&index, &doc.root());
//! // ...mutate the tree, then let the host deliver the batch:
//! doc.deliver_mutations();
//! watch.stop();
//! ```

mod classify;
mod index;
mod indexer;
mod sync;

pub use classify::{classify, split_paths, RefAction, RefMode};
pub use index::{IndexHandle, RefIndex};
pub use indexer::RefIndexer;
pub use sync::{SyncStats, WatchHandle};
