//! Refdex host tree
//!
//! This crate provides the document tree Refdex indexes against:
//! - Cheap-to-clone element handles with stable identity and attributes
//! - A small CSS-like selector engine (tag, `#id`, `.class`, `[attr]`,
//!   `[attr=value]`, comma-separated lists)
//! - MutationObserver-style subscriptions with queued batch delivery
//! - A named-event dispatch bus for change notifications
//!
//! The indexing layer treats this crate as the host interface: `query_all`
//! and `matches` never fail on bad selectors (they match nothing), and all
//! structure mutations flow through [`Document`] so observers see them.

mod document;
mod element;
mod error;
mod observer;
mod selector;

pub use document::{Document, EventDetail, ListenerId};
pub use element::{Element, ElementId, WeakElement};
pub use error::{DomError, SelectorError};
pub use observer::{MutationRecord, ObserveOptions, ObserverHandle, ObserverId};
pub use selector::SelectorList;
