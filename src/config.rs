//! camlpad configuration.
//!
//! A YAML file, every field optional:
//! ```yaml
//! catalog: ~/ocaml/exercises      # file or directory replacing the builtin exercises
//! store: ~/.camlpad/progress.json # progress store location
//! backend:                        # readiness polling, used by Toplevel::from_config
//!   initial_delay_ms: 200
//!   poll_interval_ms: 100
//!   max_attempts: 50
//! ```
//! Lookup order: explicit path, then `$CAMLPAD_CONFIG`, then defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CamlpadError, Result};
use crate::toplevel::InitPolicy;

pub const CONFIG_ENV: &str = "CAMLPAD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub backend: InitPolicy,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| CamlpadError::io(path, e))?;
        Self::from_yaml_str(&source, path)
    }

    pub fn from_yaml_str(source: &str, origin: &Path) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| CamlpadError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolves the configuration from `explicit`, the environment, or defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading configuration");
            return Self::load(path);
        }
        match env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => {
                debug!(path = ?path, "loading configuration from environment");
                Self::load(PathBuf::from(path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Progress store location, defaulting to `~/.camlpad/progress.json`.
    pub fn store_path(&self) -> PathBuf {
        match &self.store {
            Some(path) => expand_home(path),
            None => dirs::home_dir()
                .unwrap_or_default()
                .join(".camlpad")
                .join("progress.json"),
        }
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.as_deref().map(expand_home)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config =
            Config::from_yaml_str("backend:\n  max_attempts: 3\n", Path::new("camlpad.yaml"))
                .unwrap();
        assert_eq!(config.backend.max_attempts, 3);
        assert_eq!(config.backend.poll_interval_ms, 100);
        assert_eq!(config.catalog, None);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_yaml_str("  \n", Path::new("camlpad.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_config_names_file() {
        let err = Config::from_yaml_str("backend: [1, 2]", Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_explicit_store_path_wins() {
        let config = Config {
            store: Some(PathBuf::from("/tmp/progress.json")),
            ..Config::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/tmp/progress.json"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("camlpad.yaml");
        fs::write(&path, "store: /var/tmp/p.json\n").unwrap();
        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.store, Some(PathBuf::from("/var/tmp/p.json")));
    }
}
