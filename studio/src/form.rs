//! Overridable generation settings and the live, user-editable form values.
//!
//! The set of keys a preset may override is fixed ([`SettingKey::ALL`]). The prompt is
//! tracked separately from the settings.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

/// Prompt shown before the user types anything.
pub const DEFAULT_PROMPT: &str = "An astronaut riding a rainbow unicorn, cinematic, dramatic";

/// One of the ten settings a preset may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    Width,
    Height,
    NumOutputs,
    Scheduler,
    NumInferenceSteps,
    GuidanceScale,
    PromptStrength,
    Refine,
    HighNoiseFrac,
    NegativePrompt,
}

/// Value type a setting accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Integer,
    Float,
    Text,
}

impl SettingKey {
    pub const ALL: [SettingKey; 10] = [
        SettingKey::Width,
        SettingKey::Height,
        SettingKey::NumOutputs,
        SettingKey::Scheduler,
        SettingKey::NumInferenceSteps,
        SettingKey::GuidanceScale,
        SettingKey::PromptStrength,
        SettingKey::Refine,
        SettingKey::HighNoiseFrac,
        SettingKey::NegativePrompt,
    ];

    /// Name used in YAML documents.
    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Width => "width",
            SettingKey::Height => "height",
            SettingKey::NumOutputs => "num_outputs",
            SettingKey::Scheduler => "scheduler",
            SettingKey::NumInferenceSteps => "num_inference_steps",
            SettingKey::GuidanceScale => "guidance_scale",
            SettingKey::PromptStrength => "prompt_strength",
            SettingKey::Refine => "refine",
            SettingKey::HighNoiseFrac => "high_noise_frac",
            SettingKey::NegativePrompt => "negative_prompt",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    pub fn kind(self) -> SettingKind {
        match self {
            SettingKey::Width
            | SettingKey::Height
            | SettingKey::NumOutputs
            | SettingKey::NumInferenceSteps => SettingKind::Integer,
            SettingKey::GuidanceScale | SettingKey::PromptStrength | SettingKey::HighNoiseFrac => {
                SettingKind::Float
            }
            SettingKey::Scheduler | SettingKey::Refine | SettingKey::NegativePrompt => {
                SettingKind::Text
            }
        }
    }

    /// Value used when nothing else (preset, preserved form, user) supplied one.
    pub fn default_value(self) -> SettingValue {
        match self {
            SettingKey::Width | SettingKey::Height => SettingValue::Integer(1024),
            SettingKey::NumOutputs => SettingValue::Integer(1),
            SettingKey::Scheduler => SettingValue::Text("DDIM".into()),
            SettingKey::NumInferenceSteps => SettingValue::Integer(50),
            SettingKey::GuidanceScale => SettingValue::Float(7.5),
            SettingKey::PromptStrength | SettingKey::HighNoiseFrac => SettingValue::Float(0.8),
            SettingKey::Refine => SettingValue::Text("expert_ensemble_refiner".into()),
            SettingKey::NegativePrompt => {
                SettingValue::Text("the absolute worst quality, distorted features".into())
            }
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar setting value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    /// Converts a YAML scalar into the kind `key` expects. Integers widen to floats;
    /// anything else that does not match yields a message naming the expected kind.
    pub fn from_yaml(key: SettingKey, value: &Value) -> Result<Self, String> {
        let converted = match (key.kind(), value) {
            (SettingKind::Integer, Value::Number(n)) => n.as_i64().map(SettingValue::Integer),
            (SettingKind::Float, Value::Number(n)) => n.as_f64().map(SettingValue::Float),
            (SettingKind::Text, Value::String(s)) => Some(SettingValue::Text(s.clone())),
            _ => None,
        };
        converted.ok_or_else(|| {
            let expected = match key.kind() {
                SettingKind::Integer => "an integer",
                SettingKind::Float => "a number",
                SettingKind::Text => "a string",
            };
            format!(
                "setting '{}' must be {}, got {}",
                key,
                expected,
                crate::yaml::kind_name(value)
            )
        })
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Integer(i) => Some(*i as f64),
            SettingValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Integer(i) => write!(f, "{i}"),
            SettingValue::Float(x) => write!(f, "{x}"),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// Prompt plus every overridable setting, as the form currently shows them.
///
/// Always holds a value for each [`SettingKey`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValues {
    pub prompt: String,
    settings: BTreeMap<SettingKey, SettingValue>,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            settings: SettingKey::ALL
                .into_iter()
                .map(|k| (k, k.default_value()))
                .collect(),
        }
    }
}

impl FormValues {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_setting(mut self, key: SettingKey, value: SettingValue) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: SettingKey) -> &SettingValue {
        // Every key is inserted on construction and never removed.
        &self.settings[&key]
    }

    /// Stores `value` for `key`. Integers given for a float setting are widened, so the
    /// form always holds the same variant a preset would write.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) {
        let value = match (key.kind(), value) {
            (SettingKind::Float, SettingValue::Integer(i)) => SettingValue::Float(i as f64),
            (_, value) => value,
        };
        self.settings.insert(key, value);
    }

    /// All settings in [`SettingKey`] order.
    pub fn settings(&self) -> impl Iterator<Item = (SettingKey, &SettingValue)> {
        self.settings.iter().map(|(k, v)| (*k, v))
    }
}
