//! Operator commands for Studio: `validate` and `inspect`.
//!
//! The binary in `main.rs` parses arguments and installs logging; everything that
//! touches the catalog lives here so it can be tested without spawning a process.

pub mod check;
pub mod inspect;

use std::path::{Path, PathBuf};

use studio::EngineOptions;
use thiserror::Error;

pub use check::{run_validate, ValidateOptions};
pub use inspect::{build_report, run_inspect, InspectReport};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("secrets: {0}")]
    Secrets(#[from] config::LoadError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Document locations for one command run.
///
/// Explicit paths win; otherwise the defaults (or `STUDIO_MODELS_FILE` /
/// `STUDIO_PRESETS_FILE`) are resolved against `project_dir`.
#[derive(Debug, Clone, Default)]
pub struct ProjectPaths {
    pub project_dir: Option<PathBuf>,
    pub models: Option<PathBuf>,
    pub presets: Option<PathBuf>,
}

impl ProjectPaths {
    pub fn dir(&self) -> &Path {
        self.project_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn engine_options(&self) -> EngineOptions {
        let mut options = EngineOptions::in_dir(self.dir());
        if let Some(models) = &self.models {
            options = options.with_models_path(models);
        }
        if let Some(presets) = &self.presets {
            options = options.with_presets_path(presets);
        }
        options
    }
}
