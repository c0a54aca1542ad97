//! Element classification: which registrations does one element declare.

use refdex_core::RefOptions;
use refdex_dom::Element;

/// How a path registers its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefMode {
    /// Set the single value at the path
    Set,
    /// Append to the collection at the path
    Append,
}

/// One registration action produced by classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefAction {
    /// Dotted path to register under
    pub path: String,
    /// Registration mode
    pub mode: RefMode,
}

impl RefAction {
    fn set(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: RefMode::Set,
        }
    }

    fn append(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: RefMode::Append,
        }
    }
}

/// Determine the registration actions for one element.
///
/// Precedence, evaluated per element independently:
/// 1. The array attribute contributes one append action per surviving
///    comma-separated token.
/// 2. The single attribute contributes exactly one set action and
///    suppresses the identifier fallback; it does not suppress the array
///    actions, so both can fire on the same element.
/// 3. Otherwise a non-empty identifier attribute contributes one set
///    action.
pub fn classify(element: &Element, options: &RefOptions) -> Vec<RefAction> {
    let mut actions = Vec::new();

    if let Some(value) = element.attribute(&options.ref_array_attr) {
        for path in split_paths(&value) {
            actions.push(RefAction::append(path));
        }
    }

    if let Some(value) = element.attribute(&options.ref_attr) {
        actions.push(RefAction::set(value));
    } else if let Some(id) = element.attribute(&options.id_attr) {
        if !id.is_empty() {
            actions.push(RefAction::set(id));
        }
    }

    actions
}

/// Split a comma-separated path list, trimming whitespace and discarding
/// empty tokens.
pub fn split_paths(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
