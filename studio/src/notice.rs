//! Human-readable messages for every degradation path, so an operator can tell which tier failed.

use std::fmt;

use serde::Serialize;

use crate::error::LoadError;
use crate::fallback::LEGACY_ENDPOINT_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Which tier produced the notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// `models.yaml` does not exist.
    CatalogMissing,
    /// `models.yaml` is not valid YAML.
    CatalogSyntax,
    /// `models.yaml` parsed but has the wrong shape, or could not be read.
    CatalogInvalid,
    /// The single-endpoint fallback catalog is in use.
    FallbackActive,
    /// Catalog unusable and no fallback endpoint; generation is disabled.
    NoFallback,
    /// `models.yaml` is valid but lists no models.
    EmptyCatalog,
    /// `presets.yaml` could not be used; continuing without presets.
    PresetsUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, level: NoticeLevel, message: String) -> Self {
        Self {
            kind,
            level,
            message,
        }
    }

    pub fn catalog_failure(err: &LoadError) -> Self {
        match err {
            LoadError::NotFound { path } => Self::new(
                NoticeKind::CatalogMissing,
                NoticeLevel::Warning,
                format!(
                    "Model configuration file not found: {path}. \
                     Please ensure models.yaml exists at the project root."
                ),
            ),
            LoadError::Syntax { .. } => Self::new(
                NoticeKind::CatalogSyntax,
                NoticeLevel::Error,
                format!("Error loading model configuration: {err}"),
            ),
            LoadError::Schema(_) | LoadError::Read { .. } => Self::new(
                NoticeKind::CatalogInvalid,
                NoticeLevel::Error,
                format!("Invalid model configuration: {err}"),
            ),
        }
    }

    pub fn fallback_active(endpoint: &str) -> Self {
        Self::new(
            NoticeKind::FallbackActive,
            NoticeLevel::Info,
            format!("Using the single model endpoint from secrets.toml: {endpoint}"),
        )
    }

    pub fn no_fallback() -> Self {
        Self::new(
            NoticeKind::NoFallback,
            NoticeLevel::Error,
            format!(
                "No models configured and no fallback endpoint ({LEGACY_ENDPOINT_KEY}) in \
                 secrets.toml or the environment. Image generation is disabled until the \
                 configuration is fixed."
            ),
        )
    }

    pub fn empty_catalog() -> Self {
        Self::new(
            NoticeKind::EmptyCatalog,
            NoticeLevel::Warning,
            "No models found in configuration. The model selector is disabled.".to_string(),
        )
    }

    pub fn presets_unavailable(err: &LoadError) -> Self {
        Self::new(
            NoticeKind::PresetsUnavailable,
            NoticeLevel::Warning,
            format!("Presets are unavailable, continuing without them: {err}"),
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{level}] {}", self.message)
    }
}
