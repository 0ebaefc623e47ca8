//! Per-session state carried across reruns. Only [`SessionEngine`](super::SessionEngine)
//! mutates it; everything else reads through the getters.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::catalog::ModelConfig;
use crate::form::{FormValues, SettingKey, SettingValue};
use crate::notice::Notice;
use crate::preset::PresetIndex;

/// Where the active catalog came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    /// `models.yaml` loaded cleanly (possibly with zero models).
    File,
    /// Synthesized from the legacy endpoint secret.
    Fallback,
    /// Nothing usable; generation is disabled.
    Unavailable,
}

/// Exactly what a preset wrote for one backend; the baseline for edit detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PresetSnapshot {
    pub prompt: String,
    pub settings: BTreeMap<SettingKey, SettingValue>,
}

/// Which fields the user has edited away from the preset baseline, per backend.
///
/// Flags only ever turn on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModifiedFields {
    pub prompt_modified: bool,
    pub settings_modified: bool,
    pub modified_setting_keys: BTreeSet<SettingKey>,
}

impl ModifiedFields {
    pub fn any(&self) -> bool {
        self.prompt_modified || self.settings_modified
    }

    pub(crate) fn merge(&mut self, other: &ModifiedFields) {
        self.prompt_modified |= other.prompt_modified;
        self.settings_modified |= other.settings_modified;
        self.modified_setting_keys
            .extend(other.modified_setting_keys.iter().copied());
    }
}

/// Long-lived session state. `Default` is the uninitialized state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(crate) catalog_source: Option<CatalogSource>,
    pub(crate) model_configs: Vec<ModelConfig>,
    pub(crate) presets: Option<PresetIndex>,
    pub(crate) selected_model: Option<ModelConfig>,
    pub(crate) preset_applied_for: Option<String>,
    pub(crate) preset_baselines: HashMap<String, PresetSnapshot>,
    pub(crate) user_modified: HashMap<String, ModifiedFields>,
    pub(crate) form: FormValues,
    pub(crate) preserved: Option<FormValues>,
    pub(crate) notices: Vec<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a catalog decision has been made, whatever its outcome.
    pub fn is_ready(&self) -> bool {
        self.catalog_source.is_some()
    }

    pub fn catalog_source(&self) -> Option<CatalogSource> {
        self.catalog_source
    }

    pub fn model_configs(&self) -> &[ModelConfig] {
        &self.model_configs
    }

    /// Presets grouped by backend, `None` until loaded.
    pub fn presets(&self) -> Option<&PresetIndex> {
        self.presets.as_ref()
    }

    pub fn selected_model(&self) -> Option<&ModelConfig> {
        self.selected_model.as_ref()
    }

    /// Backend the last preset injection happened for in the current switch episode.
    pub fn preset_applied_for(&self) -> Option<&str> {
        self.preset_applied_for.as_deref()
    }

    pub fn preset_baseline(&self, model_id: &str) -> Option<&PresetSnapshot> {
        self.preset_baselines.get(model_id)
    }

    /// Modification flags for `model_id`; all clear when never recorded.
    pub fn modified_fields(&self, model_id: &str) -> ModifiedFields {
        self.user_modified.get(model_id).cloned().unwrap_or_default()
    }

    pub fn form(&self) -> &FormValues {
        &self.form
    }

    /// Form values captured at the last backend switch, if not yet taken.
    pub fn preserved(&self) -> Option<&FormValues> {
        self.preserved.as_ref()
    }

    /// Hands the preserved buffer to the UI once; later calls return `None`.
    pub fn take_preserved(&mut self) -> Option<FormValues> {
        self.preserved.take()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Endpoint of the selected backend; `None` means generation is disabled.
    pub fn generation_endpoint(&self) -> Option<&str> {
        self.selected_model.as_ref().map(|m| m.endpoint.as_str())
    }

    /// `(id, display name)` pairs for the backend selector, in catalog order.
    pub fn backend_choices(&self) -> Vec<(&str, &str)> {
        self.model_configs
            .iter()
            .map(|m| (m.id.as_str(), m.display_name()))
            .collect()
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        if !self.notices.contains(&notice) {
            self.notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_uninitialized() {
        let state = SessionState::new();
        assert!(!state.is_ready());
        assert!(state.selected_model().is_none());
        assert!(state.generation_endpoint().is_none());
        assert_eq!(state.modified_fields("m1"), ModifiedFields::default());
        assert_eq!(state.form(), &FormValues::default());
    }

    #[test]
    fn duplicate_notices_are_kept_once() {
        let mut state = SessionState::new();
        state.push_notice(Notice::empty_catalog());
        state.push_notice(Notice::empty_catalog());
        assert_eq!(state.notices().len(), 1);
    }

    #[test]
    fn merge_only_turns_flags_on() {
        let mut flags = ModifiedFields {
            prompt_modified: true,
            ..Default::default()
        };
        let mut width = ModifiedFields {
            settings_modified: true,
            ..Default::default()
        };
        width.modified_setting_keys.insert(SettingKey::Width);
        flags.merge(&width);
        flags.merge(&ModifiedFields::default());
        assert!(flags.prompt_modified);
        assert!(flags.settings_modified);
        assert_eq!(
            flags.modified_setting_keys.into_iter().collect::<Vec<_>>(),
            vec![SettingKey::Width]
        );
    }

    #[test]
    fn take_preserved_empties_the_buffer() {
        let mut state = SessionState::new();
        state.preserved = Some(FormValues::default().with_prompt("kept"));
        assert_eq!(state.take_preserved().unwrap().prompt, "kept");
        assert!(state.take_preserved().is_none());
    }
}
