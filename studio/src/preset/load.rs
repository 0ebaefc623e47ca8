//! `presets.yaml` loading, per-entry validation and `model_id` cross-reference checks.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde_yaml::Value;

use super::{Preset, PresetIndex};
use crate::error::LoadError;
use crate::form::{SettingKey, SettingValue};
use crate::trigger::{TriggerPosition, TriggerWords};
use crate::yaml::{
    display_field, entry_mapping, kind_name, missing_fields, optional_bool, read_document,
    required_string, root_list,
};

/// Default presets location, relative to the project directory.
pub const DEFAULT_PRESETS_FILE: &str = "presets.yaml";

const REQUIRED_FIELDS: [&str; 3] = ["id", "name", "model_id"];

/// Loads presets from `path`, grouped by `model_id`.
///
/// A missing file yields an empty index. When `valid_model_ids` is given, every preset's
/// `model_id` must be one of them, otherwise the load fails with [`LoadError::Schema`]
/// naming the offending id and the valid set.
pub fn load_presets(
    path: impl AsRef<Path>,
    valid_model_ids: Option<&[String]>,
) -> Result<PresetIndex, LoadError> {
    let path = path.as_ref();
    let Some(document) = read_document(path)? else {
        tracing::warn!(
            path = %path.display(),
            "presets file not found; continuing without presets"
        );
        return Ok(PresetIndex::new());
    };

    let index = parse_document(document, valid_model_ids).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "invalid presets file");
        e
    })?;
    tracing::info!(
        path = %path.display(),
        presets = index.preset_count(),
        models = index.len(),
        "presets loaded"
    );
    Ok(index)
}

fn parse_document(
    document: Value,
    valid_model_ids: Option<&[String]>,
) -> Result<PresetIndex, LoadError> {
    let entries = root_list(document, "presets")?;
    let mut seen = HashSet::new();
    let mut index = PresetIndex::new();
    for (idx, entry) in entries.iter().enumerate() {
        let label = format!("Preset {}", idx + 1);
        let preset = parse_entry(entry, &label)?;
        if let Some(valid) = valid_model_ids {
            check_model_ref(&preset, valid)?;
        }
        if !seen.insert(preset.id.clone()) {
            return Err(LoadError::schema(format!(
                "{label}: duplicate id '{}'; preset ids must be unique",
                preset.id
            )));
        }
        index.push(preset);
    }
    Ok(index)
}

pub(crate) fn check_model_ref(preset: &Preset, valid_model_ids: &[String]) -> Result<(), LoadError> {
    if valid_model_ids.iter().any(|id| *id == preset.model_id) {
        return Ok(());
    }
    Err(LoadError::schema(format!(
        "Preset '{}' (id: {}): invalid model_id '{}'. \
         model_id must reference a model id from models.yaml. Valid model IDs: {}",
        preset.name,
        preset.id,
        preset.model_id,
        valid_model_ids.join(", ")
    )))
}

/// Validates one raw preset entry, optionally checking `model_id` against `valid_model_ids`.
pub fn validate_preset_config(
    entry: &Value,
    valid_model_ids: Option<&[String]>,
) -> Result<Preset, LoadError> {
    let preset = parse_entry(entry, "Preset")?;
    if let Some(valid) = valid_model_ids {
        check_model_ref(&preset, valid)?;
    }
    Ok(preset)
}

pub(crate) fn parse_entry(entry: &Value, label: &str) -> Result<Preset, LoadError> {
    let map = entry_mapping(entry, label)?;

    let missing = missing_fields(map, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        let id = display_field(map, "id").unwrap_or_else(|| label.to_string());
        let name = display_field(map, "name").unwrap_or_else(|| "Unknown".to_string());
        return Err(LoadError::schema(format!(
            "Preset '{name}' (id: {id}): missing required fields: {}. \
             Every preset in presets.yaml needs 'id', 'name' and 'model_id'.",
            missing.join(", ")
        )));
    }

    let id = required_string(map, "id", label)?;
    let name = required_string(map, "name", label)?;
    let model_id = required_string(map, "model_id", label)?;

    let trigger_words = match map.get("trigger_words") {
        None | Some(Value::Null) => None,
        Some(v) => Some(TriggerWords::from_yaml(v, label)?),
    };

    let settings = match map.get("settings") {
        None | Some(Value::Null) => BTreeMap::new(),
        Some(Value::Mapping(m)) => parse_settings(m, label)?,
        Some(other) => {
            return Err(LoadError::schema(format!(
                "{label}: 'settings' must be a mapping, got {}",
                kind_name(other)
            )))
        }
    };

    Ok(Preset {
        id,
        name,
        model_id,
        default: optional_bool(map, "default", label)?,
        trigger_words,
        trigger_words_position: TriggerPosition::from_yaml(
            map.get("trigger_words_position"),
            label,
        )?,
        settings,
    })
}

fn parse_settings(
    map: &serde_yaml::Mapping,
    label: &str,
) -> Result<BTreeMap<SettingKey, SettingValue>, LoadError> {
    let mut settings = BTreeMap::new();
    for (k, v) in map {
        let Some(name) = k.as_str() else {
            return Err(LoadError::schema(format!(
                "{label}: 'settings' keys must be strings, got {}",
                kind_name(k)
            )));
        };
        let Some(key) = SettingKey::from_name(name) else {
            let known: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
            return Err(LoadError::schema(format!(
                "{label}: unknown setting '{name}'; overridable settings are: {}",
                known.join(", ")
            )));
        };
        let value = SettingValue::from_yaml(key, v)
            .map_err(|m| LoadError::schema(format!("{label}: {m}")))?;
        settings.insert(key, value);
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(DEFAULT_PRESETS_FILE);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn schema_message(body: &str, valid: Option<&[String]>) -> String {
        let dir = tempfile::tempdir().unwrap();
        match load_presets(write(&dir, body), valid) {
            Err(LoadError::Schema(m)) => m,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    const PRESETS: &str = r#"
presets:
  - id: helldiver-default
    name: Helldiver Default
    model_id: helldiver
    default: true
    trigger_words: [helldiver, tactical armor]
    settings:
      guidance_scale: 7
      num_inference_steps: 40
      scheduler: K_EULER
  - id: helldiver-wide
    name: Helldiver Wide
    model_id: helldiver
    trigger_words: helldiver
    trigger_words_position: append
    settings:
      width: 1344
      height: 768
  - id: sdxl-default
    name: SDXL Default
    model_id: sdxl
"#;

    #[test]
    fn groups_by_model_id_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let index = load_presets(write(&dir, PRESETS), None).unwrap();
        assert_eq!(index.presets_for("helldiver").len(), 2);
        assert_eq!(index.presets_for("sdxl").len(), 1);
        assert!(index.presets_for("trooper").is_empty());

        let wide = &index.presets_for("helldiver")[1];
        assert_eq!(wide.trigger_words_position, TriggerPosition::Append);
        assert_eq!(wide.settings.get(&SettingKey::Width), Some(&SettingValue::Integer(1344)));

        let first = &index.presets_for("helldiver")[0];
        assert!(first.default);
        assert_eq!(
            first.settings.get(&SettingKey::GuidanceScale),
            Some(&SettingValue::Float(7.0))
        );
        assert_eq!(first.trigger_words_position, TriggerPosition::Prepend);

        let plain = &index.presets_for("sdxl")[0];
        assert!(plain.settings.is_empty());
        assert!(plain.trigger_words.is_none());
    }

    #[test]
    fn grouping_counts_match_references() {
        let dir = tempfile::tempdir().unwrap();
        let body = "presets:\n  - {id: a, name: A, model_id: m1}\n  - {id: b, name: B, model_id: m1}\n  - {id: c, name: C, model_id: m2}\n";
        let index = load_presets(write(&dir, body), None).unwrap();
        assert_eq!(index.presets_for("m1").len(), 2);
        assert_eq!(index.presets_for("m2").len(), 1);
    }

    #[test]
    fn missing_file_is_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = load_presets(dir.path().join("presets.yaml"), None).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn malformed_yaml_is_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_presets(write(&dir, "presets: [ {id: a\n"), None).unwrap_err();
        assert!(matches!(err, LoadError::Syntax { .. }));
    }

    #[test]
    fn root_shape_errors() {
        assert_eq!(
            schema_message("models: []\n", None),
            "Missing required 'presets' key at root level"
        );
        assert_eq!(
            schema_message("presets: {a: 1}\n", None),
            "'presets' must be a list, got mapping"
        );
        assert_eq!(
            schema_message("presets:\n  - 3\n", None),
            "Preset 1: must be a mapping, got integer"
        );
    }

    #[test]
    fn missing_and_mistyped_fields() {
        let m = schema_message("presets:\n  - {id: a, name: A}\n", None);
        assert!(m.contains("Preset 'A' (id: a): missing required fields: model_id"), "{m}");

        let m = schema_message("presets:\n  - {id: a, name: A, model_id: [m]}\n", None);
        assert_eq!(m, "Preset 1: field 'model_id' must be a string, got list");

        let m = schema_message(
            "presets:\n  - {id: a, name: A, model_id: m, trigger_words: {x: 1}}\n",
            None,
        );
        assert_eq!(m, "Preset 1: 'trigger_words' must be a string or list, got mapping");

        let m = schema_message(
            "presets:\n  - {id: a, name: A, model_id: m, settings: [width]}\n",
            None,
        );
        assert_eq!(m, "Preset 1: 'settings' must be a mapping, got list");
    }

    #[test]
    fn settings_are_restricted_and_typed() {
        let m = schema_message(
            "presets:\n  - {id: a, name: A, model_id: m, settings: {seed: 4}}\n",
            None,
        );
        assert!(m.contains("unknown setting 'seed'"), "{m}");

        let m = schema_message(
            "presets:\n  - {id: a, name: A, model_id: m, settings: {width: wide}}\n",
            None,
        );
        assert_eq!(m, "Preset 1: setting 'width' must be an integer, got string");
    }

    #[test]
    fn invalid_model_reference_names_id_and_valid_set() {
        let valid = vec!["sdxl".to_string(), "helldiver".to_string()];
        let m = schema_message(
            "presets:\n  - {id: p, name: P, model_id: flux}\n",
            Some(valid.as_slice()),
        );
        assert!(m.contains("invalid model_id 'flux'"), "{m}");
        assert!(m.contains("Valid model IDs: sdxl, helldiver"), "{m}");
    }

    #[test]
    fn valid_model_references_pass() {
        let dir = tempfile::tempdir().unwrap();
        let valid = vec!["sdxl".to_string(), "helldiver".to_string()];
        let index = load_presets(write(&dir, PRESETS), Some(valid.as_slice())).unwrap();
        assert_eq!(index.preset_count(), 3);
    }

    #[test]
    fn duplicate_preset_ids_are_rejected() {
        let m = schema_message(
            "presets:\n  - {id: a, name: A, model_id: m}\n  - {id: a, name: B, model_id: m}\n",
            None,
        );
        assert!(m.contains("duplicate id 'a'"), "{m}");
    }

    #[test]
    fn validate_preset_config_checks_reference() {
        let entry: Value = serde_yaml::from_str("{id: p, name: P, model_id: m}").unwrap();
        assert!(validate_preset_config(&entry, None).is_ok());
        let valid = vec!["other".to_string()];
        assert!(validate_preset_config(&entry, Some(valid.as_slice())).is_err());
    }
}
