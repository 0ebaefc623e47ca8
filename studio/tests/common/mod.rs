//! Shared fixtures: a project directory with `models.yaml` / `presets.yaml`.

use std::collections::HashMap;
use std::path::Path;

use studio::{EngineOptions, SessionEngine};
use tempfile::TempDir;

pub const MODELS: &str = r#"
models:
  - id: sdxl
    name: Stability AI SDXL
    endpoint: stability-ai/sdxl:39ed52f2
  - id: helldiver
    name: Helldiver Tactical Armor
    endpoint: acme/helldiver:1234
    default: true
    trigger_words: ["helldiver tactical armor", "  "]
  - id: lego
    name: Lego Minifig
    endpoint: acme/lego:5678
"#;

pub const PRESETS: &str = r#"
presets:
  - id: helldiver-portrait
    name: Helldiver Portrait
    model_id: helldiver
    trigger_words: helldiver tactical armor
    settings:
      width: 768
      guidance_scale: 8
  - id: lego-default
    name: Lego Default
    model_id: lego
    default: true
    trigger_words: [LEGO minifig, toy]
    trigger_words_position: append
    settings:
      num_inference_steps: 30
      negative_prompt: blurry
  - id: lego-alt
    name: Lego Alt
    model_id: lego
"#;

pub fn project(models: Option<&str>, presets: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    if let Some(body) = models {
        std::fs::write(dir.path().join("models.yaml"), body).unwrap();
    }
    if let Some(body) = presets {
        std::fs::write(dir.path().join("presets.yaml"), body).unwrap();
    }
    dir
}

pub fn engine(dir: &Path, secrets: &[(&str, &str)]) -> SessionEngine<HashMap<String, String>> {
    let options = EngineOptions::default()
        .with_models_path(dir.join("models.yaml"))
        .with_presets_path(dir.join("presets.yaml"));
    let secrets = secrets
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    SessionEngine::new(options, secrets)
}
