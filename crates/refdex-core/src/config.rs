//! Naming configuration for the indexer.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Names the indexer reads registrations from.
///
/// An indexer and every synchronizer attached to the same index must use
/// the same `RefOptions` value; mixing configurations leaves the index
/// inconsistent. This is a usage precondition, not something the engine
/// guards against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOptions {
    /// Attribute holding a single dotted path
    #[serde(default = "default_ref_attr")]
    pub ref_attr: String,

    /// Attribute holding comma-separated array paths
    #[serde(default = "default_ref_array_attr")]
    pub ref_array_attr: String,

    /// Attribute used as the fallback identifier
    #[serde(default = "default_id_attr")]
    pub id_attr: String,

    /// Selector restricting which elements are eligible. `None` composes
    /// the default from the three attribute names.
    #[serde(default)]
    pub selector: Option<String>,
}

fn default_ref_attr() -> String {
    "data-ref".to_string()
}

fn default_ref_array_attr() -> String {
    "data-ref-array".to_string()
}

fn default_id_attr() -> String {
    "id".to_string()
}

impl Default for RefOptions {
    fn default() -> Self {
        Self {
            ref_attr: default_ref_attr(),
            ref_array_attr: default_ref_array_attr(),
            id_attr: default_id_attr(),
            selector: None,
        }
    }
}

impl RefOptions {
    /// The selector used to find eligible elements: the configured one, or
    /// "carries any of the three configured attributes".
    pub fn effective_selector(&self) -> String {
        match &self.selector {
            Some(selector) => selector.clone(),
            None => format!(
                "[{}], [{}], [{}]",
                self.ref_attr, self.ref_array_attr, self.id_attr
            ),
        }
    }

    /// Parse options from YAML, keeping defaults for missing fields.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load options from a YAML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RefOptions::default();
        assert_eq!(options.ref_attr, "data-ref");
        assert_eq!(options.ref_array_attr, "data-ref-array");
        assert_eq!(options.id_attr, "id");
        assert_eq!(options.selector, None);
    }

    #[test]
    fn test_effective_selector_default() {
        let options = RefOptions::default();
        assert_eq!(
            options.effective_selector(),
            "[data-ref], [data-ref-array], [id]"
        );
    }

    #[test]
    fn test_effective_selector_override() {
        let options = RefOptions {
            selector: Some("[data-ref]".to_string()),
            ..Default::default()
        };
        assert_eq!(options.effective_selector(), "[data-ref]");
    }

    #[test]
    fn test_from_yaml_partial() {
        let options = RefOptions::from_yaml("ref_attr: data-bind\n").unwrap();
        assert_eq!(options.ref_attr, "data-bind");
        assert_eq!(options.ref_array_attr, "data-ref-array");
    }

    #[test]
    fn test_options_serialization() {
        let options = RefOptions::default();
        let json = serde_json::to_string(&options).unwrap();
        let parsed: RefOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(options, parsed);
    }
}
