//! `models.yaml` loading and per-entry validation.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde_yaml::Value;

use super::ModelConfig;
use crate::error::LoadError;
use crate::trigger::TriggerWords;
use crate::yaml::{
    display_field, entry_mapping, kind_name, missing_fields, optional_bool, optional_string,
    read_document, required_string, root_list,
};

/// Default catalog location, relative to the project directory.
pub const DEFAULT_MODELS_FILE: &str = "models.yaml";

const REQUIRED_FIELDS: [&str; 3] = ["id", "name", "endpoint"];

/// Loads and validates the backend catalog at `path`.
///
/// Fails with [`LoadError::NotFound`] when the file is absent, [`LoadError::Syntax`] when it
/// is not YAML, and [`LoadError::Schema`] for any shape problem (root not a mapping, no
/// `models` list, an entry that is not a mapping, missing or mistyped fields, an endpoint
/// without `/`, duplicate ids). Optional fields are defaulted.
pub fn load_models(path: impl AsRef<Path>) -> Result<Vec<ModelConfig>, LoadError> {
    let path = path.as_ref();
    let Some(document) = read_document(path)? else {
        tracing::error!(path = %path.display(), "models file not found");
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    };

    let models = parse_document(document).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "invalid models file");
        e
    })?;

    let defaults = models.iter().filter(|m| m.default).count();
    if defaults > 1 {
        tracing::warn!(
            path = %path.display(),
            defaults,
            "more than one model has default: true; the first one wins"
        );
    }
    tracing::info!(path = %path.display(), count = models.len(), "models loaded");
    Ok(models)
}

fn parse_document(document: Value) -> Result<Vec<ModelConfig>, LoadError> {
    let entries = root_list(document, "models")?;
    let mut seen = HashSet::new();
    let mut models = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let model = parse_entry(entry, &format!("Model {}", idx + 1))?;
        if !seen.insert(model.id.clone()) {
            return Err(LoadError::schema(format!(
                "Model {}: duplicate id '{}'; model ids must be unique",
                idx + 1,
                model.id
            )));
        }
        models.push(model);
    }
    Ok(models)
}

/// Validates one raw catalog entry and converts it into a [`ModelConfig`].
pub fn validate_model_config(entry: &Value) -> Result<ModelConfig, LoadError> {
    parse_entry(entry, "Model")
}

pub(crate) fn parse_entry(entry: &Value, label: &str) -> Result<ModelConfig, LoadError> {
    let map = entry_mapping(entry, label)?;

    let missing = missing_fields(map, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        let id = display_field(map, "id").unwrap_or_else(|| label.to_string());
        let name = display_field(map, "name").unwrap_or_else(|| "Unknown".to_string());
        return Err(LoadError::schema(format!(
            "Model '{name}' (id: {id}): missing required fields: {}. \
             Every model in models.yaml needs 'id', 'name' and 'endpoint'.",
            missing.join(", ")
        )));
    }

    let id = required_string(map, "id", label)?;
    let name = required_string(map, "name", label)?;
    let endpoint = required_string(map, "endpoint", label)?;
    if !endpoint.contains('/') {
        return Err(LoadError::schema(format!(
            "Model '{name}' (id: {id}): invalid endpoint format '{endpoint}'. \
             Expected owner/model:version (e.g. 'stability-ai/sdxl:39ed52f2')."
        )));
    }

    let trigger_words = match map.get("trigger_words") {
        None | Some(Value::Null) => None,
        Some(v) => Some(TriggerWords::from_yaml(v, label)?),
    };

    let default_settings = match map.get("default_settings") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Mapping(m)) => m
            .iter()
            .map(|(k, v)| match k {
                Value::String(k) => Ok((k.clone(), v.clone())),
                other => Err(LoadError::schema(format!(
                    "{label}: 'default_settings' keys must be strings, got {}",
                    kind_name(other)
                ))),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(LoadError::schema(format!(
                "{label}: 'default_settings' must be a mapping, got {}",
                kind_name(other)
            )))
        }
    };

    Ok(ModelConfig {
        id,
        name,
        endpoint,
        default: optional_bool(map, "default", label)?,
        trigger_words,
        description: optional_string(map, "description", label)?,
        default_settings,
    })
}

/// The backend selected on first load: first entry flagged `default`, else the first entry.
pub fn default_model(models: &[ModelConfig]) -> Option<&ModelConfig> {
    models.iter().find(|m| m.default).or_else(|| models.first())
}
