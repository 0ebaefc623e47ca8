//! Backend catalog: the `models.yaml` document and its typed records.
//!
//! [`load_models`] is all-or-nothing: it returns every entry in document order, or a
//! [`LoadError`](crate::LoadError) describing the first problem found.

mod load;
mod model;

pub use load::{default_model, load_models, validate_model_config, DEFAULT_MODELS_FILE};
pub use model::ModelConfig;

pub(crate) use load::parse_entry;
