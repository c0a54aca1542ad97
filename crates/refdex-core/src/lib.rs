//! Refdex core state
//!
//! This crate provides the shared state the indexing engine operates on:
//! - [`RefOptions`]: which attributes carry registrations and the
//!   eligibility selector
//! - [`PathStore`]: the nested, dot-addressed mapping from keys to elements
//! - [`ReverseIndex`]: the identity-keyed side table driving safe removal
//! - Change notification names and the [`RefChange`] payload

mod config;
mod error;
mod events;
mod reverse;
mod store;

pub use config::RefOptions;
pub use error::ConfigError;
pub use events::{RefChange, RefChangeKind, REF_ADDED, REF_REMOVED};
pub use reverse::ReverseIndex;
pub use store::{PathStore, RefValue};
