//! # Studio
//!
//! Configuration resolution for a multi-backend image-generation UI: a backend catalog and
//! per-backend presets loaded from YAML, plus the per-session state machine that keeps the
//! form consistent across backend switches without clobbering user edits.
//!
//! The host UI re-executes its whole control flow on every interaction, so every engine
//! entry point is idempotent: calling it again with the same inputs changes nothing.
//!
//! ## Main modules
//!
//! - [`catalog`]: [`ModelConfig`], [`load_models`] for `models.yaml`.
//! - [`preset`]: [`Preset`], [`PresetIndex`], [`load_presets`] for `presets.yaml`.
//! - [`fallback`]: single-backend catalog from the legacy endpoint secret ([`resolve_fallback`]).
//! - [`session`]: [`SessionState`] and [`SessionEngine`] (`initialize`, `select_backend`,
//!   `apply_preset_if_due`, `record_user_edits`, `rerun`).
//! - [`form`]: overridable [`SettingKey`]s, typed [`SettingValue`]s and live [`FormValues`].
//! - [`trigger`]: trigger-word formatting and prompt splicing.
//! - [`notice`]: human-readable messages for each degradation path.
//! - [`validate`]: collect-all validation reports for operators.
//!
//! ## Example
//!
//! ```no_run
//! use studio::{EngineOptions, RerunEvent, SessionEngine, SessionState};
//!
//! let engine = SessionEngine::new(EngineOptions::in_dir("."), env_config::EnvSecrets);
//! let mut state = SessionState::new();
//! let outcome = engine.rerun(&mut state, RerunEvent::default());
//! println!("{}", outcome.form.prompt);
//! ```

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod form;
pub mod notice;
pub mod preset;
pub mod session;
pub mod trigger;
pub mod validate;

mod yaml;

pub use catalog::{default_model, load_models, validate_model_config, ModelConfig};
pub use error::{LoadError, SelectionError};
pub use fallback::{api_token_configured, resolve_fallback};
pub use form::{FormValues, SettingKey, SettingValue};
pub use notice::{Notice, NoticeKind, NoticeLevel};
pub use preset::{load_presets, validate_preset_config, Preset, PresetIndex};
pub use session::{
    CatalogSource, EngineOptions, ModifiedFields, PresetApplication, RerunEvent, RerunOutcome,
    SessionEngine, SessionState, SkipReason,
};
pub use trigger::{TriggerPosition, TriggerWords};
pub use validate::{validate_models_document, validate_presets_document, ValidationReport};
