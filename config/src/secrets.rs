//! Secrets store: top-level string keys of a `secrets.toml`, with process-env fallback.
//!
//! Lookup order for [`Secrets::secret`]: the loaded file, then `std::env::var(key)`.
//! Nested tables and non-string values in the file are ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

/// File name of the secrets store.
pub const SECRETS_FILE: &str = "secrets.toml";

/// Candidate locations under a project directory, in lookup order.
const SECRETS_CANDIDATES: &[&str] = &["secrets.toml", ".streamlit/secrets.toml"];

/// Anything that can answer "what is the value of secret `key`".
///
/// Implemented by [`Secrets`] (file + env), [`EnvSecrets`] (env only) and plain
/// `HashMap<String, String>` (tests, embedding).
pub trait SecretSource {
    fn secret(&self, key: &str) -> Option<String>;
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<S: SecretSource + ?Sized> SecretSource for &S {
    fn secret(&self, key: &str) -> Option<String> {
        (**self).secret(key)
    }
}

/// Reads secrets from the process environment only.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn secret(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Loaded secrets store.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl Secrets {
    /// Store with no file behind it; every lookup goes to the environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses the secrets file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::SecretsRead {
            path: path.display().to_string(),
            source,
        })?;
        let table: toml::Table =
            toml::from_str(&content).map_err(|source| LoadError::SecretsParse {
                path: path.display().to_string(),
                source,
            })?;
        let values: HashMap<String, String> = table
            .into_iter()
            .filter_map(|(k, v)| match v {
                toml::Value::String(s) => Some((k, s)),
                _ => None,
            })
            .collect();
        tracing::debug!(path = %path.display(), keys = values.len(), "secrets loaded");
        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// Loads the first existing candidate under `project_dir`; none found gives [`Secrets::empty`].
    pub fn discover(project_dir: &Path) -> Result<Self, LoadError> {
        match SECRETS_CANDIDATES
            .iter()
            .map(|rel| project_dir.join(rel))
            .find(|p| p.is_file())
        {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!(dir = %project_dir.display(), "no secrets file, env only");
                Ok(Self::empty())
            }
        }
    }

    /// Path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Value from the file only, without env fallback.
    pub fn from_store(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl SecretSource for Secrets {
    fn secret(&self, key: &str) -> Option<String> {
        self.from_store(key)
            .map(str::to_string)
            .or_else(|| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ENV_LOCK;

    #[test]
    fn load_keeps_top_level_strings_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        std::fs::write(
            &path,
            "REPLICATE_API_TOKEN = \"r8_x\"\nRETRIES = 3\n[connections]\nurl = \"x\"\n",
        )
        .unwrap();
        let s = Secrets::load(&path).unwrap();
        assert_eq!(s.from_store("REPLICATE_API_TOKEN"), Some("r8_x"));
        assert_eq!(s.from_store("RETRIES"), None);
        assert_eq!(s.from_store("url"), None);
        assert_eq!(s.path(), Some(path.as_path()));
    }

    #[test]
    fn invalid_toml_is_secrets_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        std::fs::write(&path, "KEY = \n").unwrap();
        assert!(matches!(
            Secrets::load(&path),
            Err(LoadError::SecretsParse { .. })
        ));
    }

    #[test]
    fn missing_file_is_secrets_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Secrets::load(dir.path().join("absent.toml")),
            Err(LoadError::SecretsRead { .. })
        ));
    }

    #[test]
    fn discover_prefers_project_root_then_streamlit_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".streamlit")).unwrap();
        std::fs::write(dir.path().join(".streamlit/secrets.toml"), "K = \"nested\"\n").unwrap();
        assert_eq!(Secrets::discover(dir.path()).unwrap().from_store("K"), Some("nested"));

        std::fs::write(dir.path().join(SECRETS_FILE), "K = \"root\"\n").unwrap();
        assert_eq!(Secrets::discover(dir.path()).unwrap().from_store("K"), Some("root"));
    }

    #[test]
    fn discover_without_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let s = Secrets::discover(dir.path()).unwrap();
        assert!(s.path().is_none());
    }

    #[test]
    fn store_wins_over_env_and_env_fills_gaps() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SECRETS_FILE);
        std::fs::write(&path, "SECRETS_TEST_BOTH = \"from_file\"\n").unwrap();
        std::env::set_var("SECRETS_TEST_BOTH", "from_env");
        std::env::set_var("SECRETS_TEST_ENV_ONLY", "env_value");

        let s = Secrets::load(&path).unwrap();
        let both = s.secret("SECRETS_TEST_BOTH");
        let env_only = s.secret("SECRETS_TEST_ENV_ONLY");
        std::env::remove_var("SECRETS_TEST_BOTH");
        std::env::remove_var("SECRETS_TEST_ENV_ONLY");

        assert_eq!(both.as_deref(), Some("from_file"));
        assert_eq!(env_only.as_deref(), Some("env_value"));
        assert_eq!(s.secret("SECRETS_TEST_NOWHERE_123"), None);
    }

    #[test]
    fn hashmap_source_answers_lookups() {
        let mut m = HashMap::new();
        m.insert("A".to_string(), "1".to_string());
        assert_eq!(m.secret("A").as_deref(), Some("1"));
        assert_eq!((&m).secret("B"), None);
    }
}
