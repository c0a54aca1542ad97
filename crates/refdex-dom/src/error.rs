//! Host tree error types.

use thiserror::Error;

/// Errors that can occur during selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector string (or one list item) was empty
    #[error("empty selector")]
    Empty,

    /// An attribute selector was not closed with ']'
    #[error("unclosed attribute selector in {0:?}")]
    UnclosedAttribute(String),

    /// A '#' or '.' prefix with no name following it
    #[error("missing name after {prefix:?} in {input:?}")]
    MissingName { prefix: char, input: String },

    /// A character that cannot start a simple selector
    #[error("unexpected character {found:?} in {input:?}")]
    UnexpectedChar { found: char, input: String },
}

/// Errors that can occur when mutating the element tree.
#[derive(Debug, Error)]
pub enum DomError {
    /// Inserting a node under one of its own descendants
    #[error("hierarchy violation: cannot insert an ancestor under its descendant")]
    Hierarchy,

    /// Removing a node that is not a child of the given parent
    #[error("node is not a child of the given parent")]
    NotAChild,
}
