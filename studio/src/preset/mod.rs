//! Presets: the `presets.yaml` document, grouped per backend.
//!
//! A missing presets file is not an error; presets are optional enrichment on top of the
//! catalog. Syntax and shape problems are reported like the catalog's.

mod index;
mod load;

pub use index::{Preset, PresetIndex};
pub use load::{load_presets, validate_preset_config, DEFAULT_PRESETS_FILE};

pub(crate) use load::{check_model_ref, parse_entry};
