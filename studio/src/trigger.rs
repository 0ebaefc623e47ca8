//! Trigger words: the text a preset (or model) injects into the prompt.

use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

use crate::error::LoadError;
use crate::yaml::kind_name;

/// Placed between trigger text and the user's prompt.
pub const TRIGGER_SEPARATOR: &str = ", ";

/// `trigger_words` as written in YAML: one string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TriggerWords {
    Single(String),
    List(Vec<String>),
}

impl TriggerWords {
    pub(crate) fn from_yaml(value: &Value, label: &str) -> Result<Self, LoadError> {
        match value {
            Value::String(s) => Ok(TriggerWords::Single(s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(LoadError::schema(format!(
                        "{label}: 'trigger_words' entries must be strings, got {}",
                        kind_name(other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(TriggerWords::List),
            other => Err(LoadError::schema(format!(
                "{label}: 'trigger_words' must be a string or list, got {}",
                kind_name(other)
            ))),
        }
    }

    /// Text to inject. Lists drop blank entries and join with `", "`; a bare string is used as-is.
    pub fn format(&self) -> String {
        match self {
            TriggerWords::Single(s) => s.clone(),
            TriggerWords::List(words) => words
                .iter()
                .map(|w| w.trim())
                .filter(|w| !w.is_empty())
                .collect::<Vec<_>>()
                .join(TRIGGER_SEPARATOR),
        }
    }
}

/// Where trigger text goes relative to the existing prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerPosition {
    #[default]
    Prepend,
    Append,
}

impl TriggerPosition {
    pub(crate) fn from_yaml(value: Option<&Value>, label: &str) -> Result<Self, LoadError> {
        match value {
            None | Some(Value::Null) => Ok(TriggerPosition::Prepend),
            Some(Value::String(s)) if s == "prepend" => Ok(TriggerPosition::Prepend),
            Some(Value::String(s)) if s == "append" => Ok(TriggerPosition::Append),
            Some(Value::String(s)) => Err(LoadError::schema(format!(
                "{label}: 'trigger_words_position' must be 'prepend' or 'append', got '{s}'"
            ))),
            Some(other) => Err(LoadError::schema(format!(
                "{label}: 'trigger_words_position' must be a string, got {}",
                kind_name(other)
            ))),
        }
    }
}

impl fmt::Display for TriggerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerPosition::Prepend => f.write_str("prepend"),
            TriggerPosition::Append => f.write_str("append"),
        }
    }
}

/// Splices `trigger` into `prompt` at `position`.
///
/// An empty prompt becomes the trigger text alone; any other prompt is kept verbatim,
/// whitespace included. A prompt that already is the trigger, or starts (prepend) or ends
/// (append) with the trigger as a whole separated token, is returned unchanged, so
/// re-applying a preset does not stack trigger words.
pub fn splice(prompt: &str, trigger: &str, position: TriggerPosition) -> String {
    if trigger.is_empty() {
        return prompt.to_string();
    }
    if prompt.is_empty() {
        return trigger.to_string();
    }
    if prompt == trigger {
        return prompt.to_string();
    }
    match position {
        TriggerPosition::Prepend => {
            if prompt.starts_with(&format!("{trigger}{TRIGGER_SEPARATOR}")) {
                prompt.to_string()
            } else {
                format!("{trigger}{TRIGGER_SEPARATOR}{prompt}")
            }
        }
        TriggerPosition::Append => {
            if prompt.ends_with(&format!("{TRIGGER_SEPARATOR}{trigger}")) {
                prompt.to_string()
            } else {
                format!("{prompt}{TRIGGER_SEPARATOR}{trigger}")
            }
        }
    }
}
