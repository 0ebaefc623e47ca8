//! Session state and the engine that resolves it on every rerun.

mod engine;
mod state;

pub use engine::{
    EngineOptions, PresetApplication, RerunEvent, RerunOutcome, SessionEngine, SkipReason,
    MODELS_FILE_ENV, PRESETS_FILE_ENV,
};
pub use state::{CatalogSource, ModifiedFields, PresetSnapshot, SessionState};
