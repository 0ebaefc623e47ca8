//! Error taxonomy for loading configuration documents and selecting backends.

use thiserror::Error;

/// Failure to load a YAML configuration document (catalog or presets).
///
/// Loads are all-or-nothing: on any of these errors no partial catalog is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The document does not exist.
    #[error("configuration file not found: {path}")]
    NotFound { path: String },
    /// The document is not well-formed YAML. `line`/`column` are 1-based when known.
    #[error("{}", syntax_message(.path, .line, .column, .message))]
    Syntax {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },
    /// Well-formed YAML that violates the required shape, including bad cross references.
    #[error("{0}")]
    Schema(String),
    /// The document exists but could not be read.
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

fn syntax_message(
    path: &str,
    line: &Option<usize>,
    column: &Option<usize>,
    message: &str,
) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!("Invalid YAML syntax in {path} at line {l}, column {c}: {message}"),
        _ => format!("Invalid YAML syntax in {path}: {message}"),
    }
}

impl LoadError {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        LoadError::Schema(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}

/// The UI asked for a backend that is not in the loaded catalog.
///
/// Returned by [`SessionEngine::select_backend`](crate::SessionEngine::select_backend);
/// session state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("invalid model selection '{id}'; valid model ids: {}", .available.join(", "))]
    UnknownBackend { id: String, available: Vec<String> },
    #[error("no models configured; cannot select '{id}'")]
    NoBackends { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_message_includes_location_when_known() {
        let e = LoadError::Syntax {
            path: "models.yaml".into(),
            line: Some(3),
            column: Some(7),
            message: "did not find expected key".into(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid YAML syntax in models.yaml at line 3, column 7: did not find expected key"
        );
    }

    #[test]
    fn syntax_message_without_location() {
        let e = LoadError::Syntax {
            path: "presets.yaml".into(),
            line: None,
            column: None,
            message: "bad".into(),
        };
        assert_eq!(e.to_string(), "Invalid YAML syntax in presets.yaml: bad");
    }

    #[test]
    fn unknown_backend_lists_valid_ids() {
        let e = SelectionError::UnknownBackend {
            id: "flux".into(),
            available: vec!["sdxl".into(), "helldiver".into()],
        };
        assert_eq!(
            e.to_string(),
            "invalid model selection 'flux'; valid model ids: sdxl, helldiver"
        );
    }
}
