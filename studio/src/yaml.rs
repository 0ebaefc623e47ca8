//! Shared YAML document reading for the catalog and preset loaders.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::LoadError;

/// Reads and parses the YAML document at `path`.
///
/// Returns `Ok(None)` when the file does not exist so each loader decides what "missing" means.
/// An empty (or whitespace-only) file parses as `Value::Null`.
pub(crate) fn read_document(path: &Path) -> Result<Option<Value>, LoadError> {
    if !path.exists() {
        return Ok(None);
    }
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        path: display.clone(),
        message: e.to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(Some(Value::Null));
    }
    serde_yaml::from_str::<Value>(&content)
        .map(Some)
        .map_err(|e| {
            let location = e.location();
            LoadError::Syntax {
                path: display,
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
                message: e.to_string(),
            }
        })
}

/// Human-readable name of a YAML node's kind, for schema error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Unwraps the root `{ <key>: [ ... ] }` shape shared by both documents.
pub(crate) fn root_list(document: Value, key: &str) -> Result<Vec<Value>, LoadError> {
    let Value::Mapping(mut root) = document else {
        return Err(LoadError::schema(format!(
            "Root element must be a mapping, got {}",
            kind_name(&document)
        )));
    };
    match root.remove(key) {
        None => Err(LoadError::schema(format!(
            "Missing required '{key}' key at root level"
        ))),
        Some(Value::Sequence(items)) => Ok(items),
        Some(other) => Err(LoadError::schema(format!(
            "'{key}' must be a list, got {}",
            kind_name(&other)
        ))),
    }
}

/// Borrows an entry as a mapping or fails with `"<label>: must be a mapping"`.
pub(crate) fn entry_mapping<'a>(value: &'a Value, label: &str) -> Result<&'a Mapping, LoadError> {
    value.as_mapping().ok_or_else(|| {
        LoadError::schema(format!("{label}: must be a mapping, got {}", kind_name(value)))
    })
}

/// Names from `fields` that are absent from `map`.
pub(crate) fn missing_fields<'f>(map: &Mapping, fields: &[&'f str]) -> Vec<&'f str> {
    fields
        .iter()
        .copied()
        .filter(|f| !map.contains_key(*f))
        .collect()
}

/// Best-effort string for a field, used to name an entry in error messages.
pub(crate) fn display_field(map: &Mapping, field: &str) -> Option<String> {
    match map.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn required_string(map: &Mapping, field: &str, label: &str) -> Result<String, LoadError> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(LoadError::schema(format!(
            "{label}: field '{field}' must be a string, got {}",
            kind_name(other)
        ))),
        None => Err(LoadError::schema(format!(
            "{label}: missing required field '{field}'"
        ))),
    }
}

pub(crate) fn optional_string(
    map: &Mapping,
    field: &str,
    label: &str,
) -> Result<Option<String>, LoadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(LoadError::schema(format!(
            "{label}: field '{field}' must be a string, got {}",
            kind_name(other)
        ))),
    }
}

/// Absent or null reads as `false`.
pub(crate) fn optional_bool(map: &Mapping, field: &str, label: &str) -> Result<bool, LoadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(LoadError::schema(format!(
            "{label}: field '{field}' must be a boolean, got {}",
            kind_name(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_document(&dir.path().join("absent.yaml")).unwrap(), None);
    }

    #[test]
    fn blank_file_is_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.yaml");
        std::fs::write(&path, "  \n\n").unwrap();
        assert_eq!(read_document(&path).unwrap(), Some(Value::Null));
    }

    #[test]
    fn malformed_yaml_reports_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "models:\n  - id: a\n    name: [unclosed\n").unwrap();
        match read_document(&path).unwrap_err() {
            LoadError::Syntax { line, message, .. } => {
                assert!(line.is_some());
                assert!(!message.is_empty());
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn root_list_shapes() {
        let ok: Value = serde_yaml::from_str("models:\n  - a\n  - b\n").unwrap();
        assert_eq!(root_list(ok, "models").unwrap().len(), 2);

        let list: Value = serde_yaml::from_str("- a").unwrap();
        assert_eq!(
            root_list(list, "models").unwrap_err(),
            LoadError::Schema("Root element must be a mapping, got list".into())
        );

        let no_key: Value = serde_yaml::from_str("other: 1").unwrap();
        assert_eq!(
            root_list(no_key, "presets").unwrap_err(),
            LoadError::Schema("Missing required 'presets' key at root level".into())
        );

        let scalar: Value = serde_yaml::from_str("models: nope").unwrap();
        assert_eq!(
            root_list(scalar, "models").unwrap_err(),
            LoadError::Schema("'models' must be a list, got string".into())
        );
    }

    #[test]
    fn field_helpers() {
        let v: Value = serde_yaml::from_str("id: 7\nname: x\ndefault: yes-ish\n").unwrap();
        let m = v.as_mapping().unwrap();
        assert_eq!(missing_fields(m, &["id", "name", "endpoint"]), vec!["endpoint"]);
        assert_eq!(display_field(m, "id").as_deref(), Some("7"));
        assert!(required_string(m, "id", "Model 1").is_err());
        assert_eq!(required_string(m, "name", "Model 1").unwrap(), "x");
        assert_eq!(optional_string(m, "description", "Model 1").unwrap(), None);
        assert!(optional_bool(m, "default", "Model 1").is_err());
        assert!(!optional_bool(m, "missing", "Model 1").unwrap());
    }

    #[test]
    fn kind_names() {
        assert_eq!(kind_name(&Value::Null), "null");
        assert_eq!(kind_name(&serde_yaml::from_str("[1]").unwrap()), "list");
        assert_eq!(kind_name(&serde_yaml::from_str("1.5").unwrap()), "float");
        assert_eq!(kind_name(&serde_yaml::from_str("7").unwrap()), "integer");
        assert_eq!(kind_name(&serde_yaml::from_str("a: 1").unwrap()), "mapping");
    }
}
