//! Environment and secrets for Studio.
//!
//! Two concerns live here:
//!
//! - [`load_and_apply`]: read `$XDG_CONFIG_HOME/<app>/config.toml` `[env]` and the project `.env`,
//!   then set process env vars with priority **existing env > .env > XDG**.
//! - [`Secrets`]: the `secrets.toml` store with env fallback, exposed through [`SecretSource`]
//!   so callers can swap in a map in tests.

mod dotenv;
mod secrets;
mod xdg_toml;

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

pub use secrets::{EnvSecrets, SecretSource, Secrets, SECRETS_FILE};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
    #[error("read secrets file {path}: {source}")]
    SecretsRead {
        path: String,
        source: std::io::Error,
    },
    #[error("parse secrets file {path}: {source}")]
    SecretsParse {
        path: String,
        source: toml::de::Error,
    },
}

/// Applies XDG `config.toml` `[env]` and project `.env` to the process environment.
///
/// Keys already present in the environment are left alone. For the rest, `.env`
/// (in `override_dir`, or the current directory) beats the XDG file.
///
/// Returns the number of variables that were set.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<usize, LoadError> {
    let xdg_map = xdg_toml::load_env_map(app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let keys: HashSet<&String> = xdg_map.keys().chain(dotenv_map.keys()).collect();
    let mut applied = 0;
    for key in keys {
        if std::env::var_os(key).is_some() {
            continue;
        }
        if let Some(v) = dotenv_map.get(key).or_else(|| xdg_map.get(key)) {
            std::env::set_var(key, v);
            applied += 1;
        }
    }
    tracing::debug!(app = app_name, applied, "environment applied");
    Ok(applied)
}
