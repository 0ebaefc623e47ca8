use std::collections::BTreeMap;

use serde::Serialize;

use crate::form::{SettingKey, SettingValue};
use crate::trigger::{TriggerPosition, TriggerWords};

/// Named bundle of trigger words and setting overrides for one backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    /// Backend this preset belongs to.
    pub model_id: String,
    /// Chosen over list order when a backend has several presets.
    pub default: bool,
    pub trigger_words: Option<TriggerWords>,
    pub trigger_words_position: TriggerPosition,
    /// Subset of the overridable settings, already type-checked.
    pub settings: BTreeMap<SettingKey, SettingValue>,
}

impl Preset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model_id: model_id.into(),
            default: false,
            trigger_words: None,
            trigger_words_position: TriggerPosition::Prepend,
            settings: BTreeMap::new(),
        }
    }

    /// Formatted trigger text, empty when the preset has none.
    pub fn trigger_text(&self) -> String {
        self.trigger_words
            .as_ref()
            .map(TriggerWords::format)
            .unwrap_or_default()
    }
}

/// Presets grouped by `model_id`, each group in document order.
///
/// A backend without presets has no group; [`PresetIndex::presets_for`] returns an empty
/// slice for it, so "absent" and "empty" read the same.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PresetIndex {
    by_model: BTreeMap<String, Vec<Preset>>,
}

impl PresetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `preset` to its backend's group.
    pub fn push(&mut self, preset: Preset) {
        self.by_model
            .entry(preset.model_id.clone())
            .or_default()
            .push(preset);
    }

    pub fn presets_for(&self, model_id: &str) -> &[Preset] {
        self.by_model.get(model_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Preset used for a backend: the first flagged `default`, else the first in the group.
    pub fn active_preset(&self, model_id: &str) -> Option<&Preset> {
        let group = self.presets_for(model_id);
        group.iter().find(|p| p.default).or_else(|| group.first())
    }

    /// Backend ids that have at least one preset.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.by_model.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Preset])> {
        self.by_model.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of backends with presets.
    pub fn len(&self) -> usize {
        self.by_model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_model.is_empty()
    }

    /// Total number of presets across all backends.
    pub fn preset_count(&self) -> usize {
        self.by_model.values().map(Vec::len).sum()
    }
}

impl FromIterator<Preset> for PresetIndex {
    fn from_iter<I: IntoIterator<Item = Preset>>(iter: I) -> Self {
        let mut index = PresetIndex::new();
        for preset in iter {
            index.push(preset);
        }
        index
    }
}
