//! Session resolution engine: the entry points the UI calls on every rerun.
//!
//! Every method takes the [`SessionState`] explicitly and is safe to call repeatedly with
//! the same arguments; a second identical call is a no-op.

use std::path::{Path, PathBuf};

use env_config::SecretSource;

use super::state::{CatalogSource, ModifiedFields, PresetSnapshot, SessionState};
use crate::catalog::{default_model, load_models, DEFAULT_MODELS_FILE};
use crate::error::SelectionError;
use crate::fallback::resolve_fallback;
use crate::form::FormValues;
use crate::notice::Notice;
use crate::preset::{load_presets, Preset, DEFAULT_PRESETS_FILE};
use crate::trigger::splice;

/// Env var replacing the default catalog path.
pub const MODELS_FILE_ENV: &str = "STUDIO_MODELS_FILE";
/// Env var replacing the default presets path.
pub const PRESETS_FILE_ENV: &str = "STUDIO_PRESETS_FILE";

/// Where the engine reads its documents from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub models_path: PathBuf,
    pub presets_path: PathBuf,
    /// Check preset `model_id`s against the catalog when it came from `models.yaml`.
    pub validate_preset_refs: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            models_path: PathBuf::from(DEFAULT_MODELS_FILE),
            presets_path: PathBuf::from(DEFAULT_PRESETS_FILE),
            validate_preset_refs: true,
        }
    }
}

impl EngineOptions {
    /// Default file names resolved against `dir`, unless [`MODELS_FILE_ENV`] /
    /// [`PRESETS_FILE_ENV`] name another file (relative values are also taken from `dir`).
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let resolve = |env_key: &str, default: &str| {
            let file = std::env::var(env_key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default));
            dir.join(file)
        };
        Self {
            models_path: resolve(MODELS_FILE_ENV, DEFAULT_MODELS_FILE),
            presets_path: resolve(PRESETS_FILE_ENV, DEFAULT_PRESETS_FILE),
            validate_preset_refs: true,
        }
    }

    pub fn with_models_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.models_path = path.into();
        self
    }

    pub fn with_presets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.presets_path = path.into();
        self
    }

    pub fn with_validate_preset_refs(mut self, validate: bool) -> Self {
        self.validate_preset_refs = validate;
        self
    }
}

/// Why a due-looking preset was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Already injected in the current switch episode.
    AlreadyApplied,
    /// The user edited the prompt or a setting for this backend.
    UserModified,
}

/// Result of [`SessionEngine::apply_preset_if_due`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresetApplication {
    /// The preset was injected into the form.
    Applied(Preset),
    NotApplied { preset_id: String, reason: SkipReason },
    /// The backend has no presets.
    NoPreset,
}

impl PresetApplication {
    pub fn is_applied(&self) -> bool {
        matches!(self, PresetApplication::Applied(_))
    }
}

/// What the UI reports on one rerun.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RerunEvent {
    /// Backend chosen in the selector; `None` keeps the current one.
    pub backend_id: Option<String>,
    /// Live widget values; `None` on the very first render.
    pub form: Option<FormValues>,
}

/// What the UI should render after one rerun.
#[derive(Debug, Clone, PartialEq)]
pub struct RerunOutcome {
    /// Authoritative form values.
    pub form: FormValues,
    /// `None` when no backend is selected.
    pub application: Option<PresetApplication>,
    pub selection_error: Option<SelectionError>,
}

/// Drives [`SessionState`] through load, selection, preset injection and edit tracking.
#[derive(Debug, Clone)]
pub struct SessionEngine<S> {
    options: EngineOptions,
    secrets: S,
}

impl<S: SecretSource> SessionEngine<S> {
    pub fn new(options: EngineOptions, secrets: S) -> Self {
        Self { options, secrets }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Loads the catalog (or its fallback) and presets, then selects the default backend.
    ///
    /// On an already initialized session only presets are loaded, and only if they were
    /// never loaded before. Never fails: every problem becomes a [`Notice`].
    pub fn initialize(&self, state: &mut SessionState) -> CatalogSource {
        if let Some(source) = state.catalog_source {
            if state.presets.is_none() {
                self.load_presets_into(state, source);
            }
            return source;
        }

        let source = match load_models(&self.options.models_path) {
            Ok(models) => {
                if models.is_empty() {
                    tracing::warn!(path = %self.options.models_path.display(), "catalog is empty");
                    state.push_notice(Notice::empty_catalog());
                }
                state.model_configs = models;
                CatalogSource::File
            }
            Err(err) => {
                state.push_notice(Notice::catalog_failure(&err));
                match resolve_fallback(&self.secrets) {
                    Some(model) => {
                        state.push_notice(Notice::fallback_active(&model.endpoint));
                        state.model_configs = vec![model];
                        CatalogSource::Fallback
                    }
                    None => {
                        state.push_notice(Notice::no_fallback());
                        state.model_configs = Vec::new();
                        CatalogSource::Unavailable
                    }
                }
            }
        };

        state.selected_model = default_model(&state.model_configs).cloned();
        state.catalog_source = Some(source);
        tracing::info!(
            source = ?source,
            models = state.model_configs.len(),
            selected = state.selected_model.as_ref().map(|m| m.id.as_str()).unwrap_or("none"),
            "session initialized"
        );

        self.load_presets_into(state, source);
        source
    }

    fn load_presets_into(&self, state: &mut SessionState, source: CatalogSource) {
        let ids: Vec<String>;
        let valid = if self.options.validate_preset_refs && source == CatalogSource::File {
            ids = state.model_configs.iter().map(|m| m.id.clone()).collect();
            Some(ids.as_slice())
        } else {
            None
        };
        match load_presets(&self.options.presets_path, valid) {
            Ok(index) => state.presets = Some(index),
            Err(err) => {
                tracing::warn!(error = %err, "continuing without presets");
                state.push_notice(Notice::presets_unavailable(&err));
                state.presets = Some(Default::default());
            }
        }
    }

    /// Makes `id` the selected backend and applies its preset when due.
    ///
    /// On a real switch the live form is copied into the preserved buffer and the
    /// per-episode "already applied" marker is cleared. An unknown id leaves the state
    /// untouched.
    pub fn select_backend(
        &self,
        state: &mut SessionState,
        id: &str,
    ) -> Result<PresetApplication, SelectionError> {
        let Some(model) = state.model_configs.iter().find(|m| m.id == id).cloned() else {
            return Err(if state.model_configs.is_empty() {
                SelectionError::NoBackends { id: id.to_string() }
            } else {
                SelectionError::UnknownBackend {
                    id: id.to_string(),
                    available: state.model_configs.iter().map(|m| m.id.clone()).collect(),
                }
            });
        };

        let changed = state
            .selected_model
            .as_ref()
            .map_or(true, |current| current.id != model.id);
        if changed {
            tracing::debug!(
                from = state.selected_model.as_ref().map(|m| m.id.as_str()).unwrap_or("none"),
                to = %model.id,
                "backend switched"
            );
            state.preserved = Some(state.form.clone());
            state.preset_applied_for = None;
        }
        state.selected_model = Some(model);

        Ok(self.apply_preset_if_due(state, id))
    }

    /// Injects the active preset for `model_id` unless it already ran this episode or the
    /// user has edited any field for that backend.
    pub fn apply_preset_if_due(&self, state: &mut SessionState, model_id: &str) -> PresetApplication {
        let Some(preset) = state
            .presets
            .as_ref()
            .and_then(|index| index.active_preset(model_id))
            .cloned()
        else {
            return PresetApplication::NoPreset;
        };

        if state.preset_applied_for.as_deref() == Some(model_id) {
            return PresetApplication::NotApplied {
                preset_id: preset.id,
                reason: SkipReason::AlreadyApplied,
            };
        }
        let modified = state.modified_fields(model_id);
        if modified.any() {
            tracing::debug!(model_id, preset_id = %preset.id, "preset skipped; user edits present");
            return PresetApplication::NotApplied {
                preset_id: preset.id,
                reason: SkipReason::UserModified,
            };
        }

        let trigger = preset.trigger_text();
        state.form.prompt = splice(&state.form.prompt, &trigger, preset.trigger_words_position);

        let mut snapshot = PresetSnapshot {
            prompt: state.form.prompt.clone(),
            ..Default::default()
        };
        for (key, value) in &preset.settings {
            if modified.modified_setting_keys.contains(key) {
                continue;
            }
            state.form.set(*key, value.clone());
            snapshot.settings.insert(*key, value.clone());
        }

        state.preset_baselines.insert(model_id.to_string(), snapshot);
        state.preset_applied_for = Some(model_id.to_string());
        tracing::debug!(model_id, preset_id = %preset.id, "preset applied");
        PresetApplication::Applied(preset)
    }

    /// Compares `live` against the preset baseline for `model_id`, turns on flags for
    /// differing fields, and stores `live` as the current form.
    ///
    /// Returns the accumulated flags for the backend.
    pub fn record_user_edits(
        &self,
        state: &mut SessionState,
        model_id: &str,
        live: &FormValues,
    ) -> ModifiedFields {
        let mut detected = ModifiedFields::default();
        if let Some(baseline) = state.preset_baselines.get(model_id) {
            if live.prompt != baseline.prompt {
                detected.prompt_modified = true;
            }
            for (key, value) in &baseline.settings {
                if live.get(*key) != value {
                    detected.settings_modified = true;
                    detected.modified_setting_keys.insert(*key);
                }
            }
        }

        let flags = state.user_modified.entry(model_id.to_string()).or_default();
        let before = flags.clone();
        flags.merge(&detected);
        if *flags != before {
            tracing::debug!(
                model_id,
                prompt = flags.prompt_modified,
                settings = ?flags.modified_setting_keys,
                "user edits detected"
            );
        }
        let flags = flags.clone();
        state.form = live.clone();
        flags
    }

    /// One full rerun: initialize, record the reported values against the backend they
    /// were edited under, then select the requested (or current) backend.
    pub fn rerun(&self, state: &mut SessionState, event: RerunEvent) -> RerunOutcome {
        self.initialize(state);

        if let Some(live) = &event.form {
            match state.selected_model.as_ref().map(|m| m.id.clone()) {
                Some(current) => {
                    self.record_user_edits(state, &current, live);
                }
                None => state.form = live.clone(),
            }
        }

        let target = event
            .backend_id
            .or_else(|| state.selected_model.as_ref().map(|m| m.id.clone()));
        let (application, selection_error) = match target {
            Some(id) => match self.select_backend(state, &id) {
                Ok(application) => (Some(application), None),
                Err(err) => {
                    tracing::warn!(error = %err, "backend selection rejected");
                    (None, Some(err))
                }
            },
            None => (None, None),
        };

        RerunOutcome {
            form: state.form.clone(),
            application,
            selection_error,
        }
    }
}
