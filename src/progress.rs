//! Learner progress persisted in an opaque key-value store.
//!
//! Keys follow two conventions: `exercise-<id>` holds the last saved code and
//! `completed-<id>` holds `"true"` once the exercise passed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{CamlpadError, Result};

const CODE_PREFIX: &str = "exercise-";
const COMPLETED_PREFIX: &str = "completed-";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Vec<String>;
}

/// Store kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Store backed by a JSON object on disk, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| CamlpadError::io(&path, e))?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| CamlpadError::Store {
                    path: path.clone(),
                    message: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "opened progress store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CamlpadError::io(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|e| CamlpadError::Store {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json).map_err(|e| CamlpadError::io(&self.path, e))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Exercise-level view over a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct Progress<S> {
    store: S,
}

impl<S: KeyValueStore> Progress<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn saved_code(&self, id: &str) -> Option<String> {
        self.store.get(&code_key(id))
    }

    pub fn save_code(&mut self, id: &str, code: &str) -> Result<()> {
        self.store.set(&code_key(id), code)
    }

    pub fn clear_code(&mut self, id: &str) -> Result<()> {
        self.store.remove(&code_key(id))
    }

    pub fn mark_completed(&mut self, id: &str) -> Result<()> {
        self.store.set(&completed_key(id), "true")
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.store.get(&completed_key(id)).as_deref() == Some("true")
    }

    /// Ids of every exercise whose completion flag is set.
    pub fn completed(&self) -> BTreeSet<String> {
        self.store
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(COMPLETED_PREFIX).map(str::to_string))
            .filter(|id| self.is_completed(id))
            .collect()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

fn code_key(id: &str) -> String {
    format!("{CODE_PREFIX}{id}")
}

fn completed_key(id: &str) -> String {
    format!("{COMPLETED_PREFIX}{id}")
}
