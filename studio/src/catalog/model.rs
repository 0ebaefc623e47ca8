use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::trigger::TriggerWords;

/// One selectable generation backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfig {
    /// Unique within the catalog.
    pub id: String,
    pub name: String,
    /// `owner/name:version`.
    pub endpoint: String,
    /// Marks the backend selected on first load. The first flagged entry wins.
    pub default: bool,
    pub trigger_words: Option<TriggerWords>,
    pub description: Option<String>,
    pub default_settings: BTreeMap<String, Value>,
}

impl ModelConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
            default: false,
            trigger_words: None,
            description: None,
            default_settings: BTreeMap::new(),
        }
    }

    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }

    /// Name for display, falling back to the id when the name is blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
