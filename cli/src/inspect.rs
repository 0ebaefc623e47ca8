//! `studio inspect`: run `initialize` on a fresh session and show what the UI would see.

use std::collections::BTreeMap;
use std::io::Write;

use config::{SecretSource, Secrets};
use serde::Serialize;
use studio::fallback::api_token_configured;
use studio::{CatalogSource, EngineOptions, Notice, SessionEngine, SessionState};

use crate::{CliError, ProjectPaths};

#[derive(Debug, Serialize)]
pub struct BackendSummary {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PresetSummary {
    pub id: String,
    pub name: String,
    /// The preset that would be injected for its backend.
    pub active: bool,
    pub trigger_words: String,
    pub position: String,
    pub settings: Vec<String>,
}

/// Everything `inspect` prints, in JSON-ready form.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub models_path: String,
    pub presets_path: String,
    pub catalog_source: CatalogSource,
    pub backends: Vec<BackendSummary>,
    pub presets: BTreeMap<String, Vec<PresetSummary>>,
    pub generation_endpoint: Option<String>,
    pub api_token_configured: bool,
    pub notices: Vec<Notice>,
}

/// Initializes a fresh session with `options` and `secrets` and summarizes it.
pub fn build_report<S: SecretSource>(options: EngineOptions, secrets: S) -> InspectReport {
    let token = api_token_configured(&secrets);
    let engine = SessionEngine::new(options, secrets);
    let mut state = SessionState::new();
    let source = engine.initialize(&mut state);
    let selected = state.selected_model().map(|m| m.id.clone());

    let backends = state
        .model_configs()
        .iter()
        .map(|m| BackendSummary {
            id: m.id.clone(),
            name: m.display_name().to_string(),
            endpoint: m.endpoint.clone(),
            selected: selected.as_deref() == Some(m.id.as_str()),
            description: m.description.clone(),
        })
        .collect();

    let mut presets = BTreeMap::new();
    if let Some(index) = state.presets() {
        for (model_id, group) in index.iter() {
            let active = index.active_preset(model_id).map(|p| p.id.as_str());
            let summaries = group
                .iter()
                .map(|p| PresetSummary {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    active: active == Some(p.id.as_str()),
                    trigger_words: p.trigger_text(),
                    position: p.trigger_words_position.to_string(),
                    settings: p.settings.iter().map(|(k, v)| format!("{k}={v}")).collect(),
                })
                .collect();
            presets.insert(model_id.to_string(), summaries);
        }
    }

    InspectReport {
        models_path: engine.options().models_path.display().to_string(),
        presets_path: engine.options().presets_path.display().to_string(),
        catalog_source: source,
        backends,
        presets,
        generation_endpoint: state.generation_endpoint().map(str::to_string),
        api_token_configured: token,
        notices: state.notices().to_vec(),
    }
}

/// Discovers `secrets.toml` under the project directory and writes the report to `out`.
pub fn run_inspect(paths: &ProjectPaths, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let secrets = Secrets::discover(paths.dir())?;
    if let Some(path) = secrets.path() {
        tracing::info!(path = %path.display(), "secrets file loaded");
    }
    let report = build_report(paths.engine_options(), secrets);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_text(&report, out)?;
    }
    Ok(())
}

fn write_text(report: &InspectReport, out: &mut impl Write) -> std::io::Result<()> {
    let source = match report.catalog_source {
        CatalogSource::File => "models file",
        CatalogSource::Fallback => "fallback endpoint from secrets",
        CatalogSource::Unavailable => "unavailable",
    };
    writeln!(out, "catalog: {source} ({})", report.models_path)?;

    if report.backends.is_empty() {
        writeln!(out, "backends: none")?;
    } else {
        writeln!(out, "backends:")?;
        let width = report.backends.iter().map(|b| b.id.len()).max().unwrap_or(2);
        for b in &report.backends {
            let marker = if b.selected { '*' } else { ' ' };
            writeln!(out, "  {marker} {:<width$}  {}  [{}]", b.id, b.name, b.endpoint)?;
        }
    }

    if report.presets.is_empty() {
        writeln!(out, "presets: none ({})", report.presets_path)?;
    } else {
        writeln!(out, "presets ({}):", report.presets_path)?;
        for (model_id, group) in &report.presets {
            writeln!(out, "  {model_id}:")?;
            for p in group {
                let marker = if p.active { '*' } else { ' ' };
                write!(out, "    {marker} {} ({})", p.id, p.name)?;
                if !p.trigger_words.is_empty() {
                    write!(out, " trigger: \"{}\" ({})", p.trigger_words, p.position)?;
                }
                if !p.settings.is_empty() {
                    write!(out, " settings: {}", p.settings.join(", "))?;
                }
                writeln!(out)?;
            }
        }
    }

    match &report.generation_endpoint {
        Some(endpoint) => writeln!(out, "generation: enabled ({endpoint})")?,
        None => writeln!(out, "generation: disabled")?,
    }
    let token = if report.api_token_configured { "set" } else { "not set" };
    writeln!(out, "api token: {token}")?;
    for notice in &report.notices {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}
