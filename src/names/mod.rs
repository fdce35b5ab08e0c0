//! Friendly-Name Store
//!
//! User-chosen names for outputs, keyed by [`OutputIdentity::key`]. The
//! display layer never reads this store; it is an application convenience
//! surfaced through the CLI.
//!
//! [`OutputIdentity::key`]: crate::display::OutputIdentity::key

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Name store result type
pub type Result<T> = std::result::Result<T, NameStoreError>;

/// Name store error types
#[derive(Error, Debug)]
pub enum NameStoreError {
    /// Store file could not be read or written
    #[error("Name store I/O error at {path}: {source}")]
    Io {
        /// Store file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Store file is not a JSON object of strings
    #[error("Name store at {path} is malformed: {source}")]
    Malformed {
        /// Store file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Key → friendly name persistence
pub trait NameStore: Send + Sync {
    /// Name stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Store `name` under `key`; an empty name removes the entry
    fn set(&self, key: &str, name: &str) -> Result<()>;

    /// Every stored pair, sorted by key
    fn entries(&self) -> Vec<(String, String)>;
}

/// Non-persistent store
#[derive(Default)]
pub struct MemoryNameStore {
    names: RwLock<BTreeMap<String, String>>,
}

impl MemoryNameStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(names: &mut BTreeMap<String, String>, key: &str, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        names.remove(key);
    } else {
        names.insert(key.to_string(), name.to_string());
    }
}

impl NameStore for MemoryNameStore {
    fn get(&self, key: &str) -> Option<String> {
        self.names.read().get(key).cloned()
    }

    fn set(&self, key: &str, name: &str) -> Result<()> {
        apply(&mut self.names.write(), key, name);
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.names
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Flat JSON object file, loaded on open and rewritten on every `set`
pub struct JsonNameStore {
    path: PathBuf,
    names: RwLock<BTreeMap<String, String>>,
}

impl JsonNameStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let names = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| NameStoreError::Malformed {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Name store {:?} does not exist yet", path);
                BTreeMap::new()
            }
            Err(source) => return Err(NameStoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            names: RwLock::new(names),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, names: &BTreeMap<String, String>) -> Result<()> {
        let io = |source: std::io::Error| NameStoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io)?;
        }

        let json = serde_json::to_string_pretty(names).map_err(|source| NameStoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, json).map_err(io)
    }
}

impl NameStore for JsonNameStore {
    fn get(&self, key: &str) -> Option<String> {
        self.names.read().get(key).cloned()
    }

    fn set(&self, key: &str, name: &str) -> Result<()> {
        let mut names = self.names.write();
        apply(&mut names, key, name);
        self.save(&names)?;
        info!("Saved name for {} to {:?}", key, self.path);
        Ok(())
    }

    fn entries(&self) -> Vec<(String, String)> {
        self.names
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemoryNameStore::new();
        store.set("0000000000012A4F-4", " Studio ").unwrap();
        assert_eq!(store.get("0000000000012A4F-4").as_deref(), Some("Studio"));

        store.set("0000000000012A4F-4", "").unwrap();
        assert_eq!(store.get("0000000000012A4F-4"), None);
    }

    #[test]
    fn test_json_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("names.json");

        let store = JsonNameStore::open(&path).unwrap();
        assert!(store.entries().is_empty());
        store.set("0000000000012A4F-4", "Studio").unwrap();
        store.set("0000000000012A4F-5", "Laptop").unwrap();

        let reopened = JsonNameStore::open(&path).unwrap();
        assert_eq!(reopened.get("0000000000012A4F-4").as_deref(), Some("Studio"));
        assert_eq!(reopened.entries().len(), 2);
    }

    #[test]
    fn test_json_store_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("names.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            JsonNameStore::open(&path),
            Err(NameStoreError::Malformed { .. })
        ));
    }
}
