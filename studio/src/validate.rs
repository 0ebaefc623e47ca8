//! Whole-document validation for operators.
//!
//! Unlike the loaders, which stop at the first problem, these functions keep going and
//! report every problem they can find in one pass.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::LoadError;
use crate::yaml::{read_document, root_list};
use crate::{catalog, preset};

/// Outcome of validating one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Number of entries in the document's root list.
    pub entry_count: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn fail(mut self, err: LoadError) -> Self {
        self.errors.push(err.to_string());
        self
    }
}

/// Reads `path` and returns its root list, or a report holding the reason it has none.
fn document_entries(path: &Path, key: &str, missing_is_error: bool) -> Result<Vec<Value>, ValidationReport> {
    let report = ValidationReport::default();
    let document = match read_document(path) {
        Ok(Some(document)) => document,
        Ok(None) if missing_is_error => {
            return Err(report.fail(LoadError::NotFound {
                path: path.display().to_string(),
            }))
        }
        Ok(None) => {
            let mut report = report;
            report
                .warnings
                .push(format!("{} not found; no presets will be available", path.display()));
            return Err(report);
        }
        Err(err) => return Err(report.fail(err)),
    };
    root_list(document, key).map_err(|err| report.fail(err))
}

fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("id").and_then(Value::as_str)
}

/// Validates a catalog document, requiring at least `min_models` entries.
pub fn validate_models_document(path: impl AsRef<Path>, min_models: usize) -> ValidationReport {
    let entries = match document_entries(path.as_ref(), "models", true) {
        Ok(entries) => entries,
        Err(report) => return report,
    };
    let mut report = ValidationReport {
        entry_count: entries.len(),
        ..Default::default()
    };
    if entries.len() < min_models {
        report.errors.push(format!(
            "At least {min_models} model(s) required, found {}",
            entries.len()
        ));
    }

    let mut seen = HashSet::new();
    let mut defaults = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        let label = format!("Model {}", idx + 1);
        match catalog::parse_entry(entry, &label) {
            Ok(model) if model.default => defaults.push(model.id),
            Ok(_) => {}
            Err(err) => report.errors.push(err.to_string()),
        }
        if let Some(id) = entry_id(entry) {
            if !seen.insert(id) {
                report.errors.push(format!("{label}: duplicate id '{id}'"));
            }
        }
    }
    if defaults.len() > 1 {
        report.warnings.push(format!(
            "{} models are marked default ({}); '{}' will be selected",
            defaults.len(),
            defaults.join(", "),
            defaults[0]
        ));
    }
    report
}

/// Validates a presets document. A missing file is only a warning.
///
/// When `valid_model_ids` is given, each preset's `model_id` must be among them.
pub fn validate_presets_document(
    path: impl AsRef<Path>,
    valid_model_ids: Option<&[String]>,
) -> ValidationReport {
    let entries = match document_entries(path.as_ref(), "presets", false) {
        Ok(entries) => entries,
        Err(report) => return report,
    };
    let mut report = ValidationReport {
        entry_count: entries.len(),
        ..Default::default()
    };

    let mut seen = HashSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        let label = format!("Preset {}", idx + 1);
        let checked = preset::parse_entry(entry, &label).and_then(|p| match valid_model_ids {
            Some(valid) => preset::check_model_ref(&p, valid),
            None => Ok(()),
        });
        if let Err(err) = checked {
            report.errors.push(err.to_string());
        }
        if let Some(id) = entry_id(entry) {
            if !seen.insert(id) {
                report.errors.push(format!("{label}: duplicate id '{id}'"));
            }
        }
    }
    report
}
