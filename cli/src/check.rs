//! `studio validate`: strict, collect-all validation of both documents.

use std::io::Write;

use serde::Serialize;
use studio::{load_models, validate_models_document, validate_presets_document, ValidationReport};

use crate::{CliError, ProjectPaths};

#[derive(Debug, Clone)]
pub struct ValidateOptions {
    pub paths: ProjectPaths,
    /// Minimum number of models the catalog must list.
    pub min_models: usize,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ValidateOutput<'a> {
    valid: bool,
    models: &'a ValidationReport,
    presets: &'a ValidationReport,
}

/// Validates the catalog and presets and writes the result to `out`.
///
/// Presets are cross-checked against the catalog ids only when the catalog itself loads.
/// Returns whether both documents are valid.
pub fn run_validate(opts: &ValidateOptions, out: &mut impl Write) -> Result<bool, CliError> {
    let engine_opts = opts.paths.engine_options();
    let models = validate_models_document(&engine_opts.models_path, opts.min_models);
    let ids: Option<Vec<String>> = load_models(&engine_opts.models_path)
        .ok()
        .map(|m| m.into_iter().map(|m| m.id).collect());
    let presets = validate_presets_document(&engine_opts.presets_path, ids.as_deref());
    let valid = models.is_valid() && presets.is_valid();
    tracing::info!(
        valid,
        model_errors = models.errors.len(),
        preset_errors = presets.errors.len(),
        "validation finished"
    );

    if opts.json {
        let output = ValidateOutput {
            valid,
            models: &models,
            presets: &presets,
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(valid);
    }

    write_section(out, &engine_opts.models_path.display().to_string(), &models)?;
    if models.is_valid() {
        writeln!(out, "  - model count: {}", models.entry_count)?;
    }
    write_section(out, &engine_opts.presets_path.display().to_string(), &presets)?;
    if presets.is_valid() {
        writeln!(out, "  - preset count: {}", presets.entry_count)?;
    }
    Ok(valid)
}

fn write_section(out: &mut impl Write, path: &str, report: &ValidationReport) -> std::io::Result<()> {
    if report.is_valid() {
        writeln!(out, "{path}: ok")?;
    } else {
        writeln!(out, "{path}: {} error(s)", report.errors.len())?;
    }
    for error in &report.errors {
        writeln!(out, "  error: {error}")?;
    }
    for warning in &report.warnings {
        writeln!(out, "  warning: {warning}")?;
    }
    Ok(())
}
