//! Key-value preference stores.
//!
//! - [`MemoryStore`]: shared in-memory map, for tests and embedding
//! - [`FileStore`]: JSON object on disk (`{"theme": "dark"}`)

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::StoreError;

/// String preferences keyed by name.
pub trait PreferenceStore {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<BTreeMap<String, String>>>,
    unavailable: Rc<Cell<bool>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail, as a disabled backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.get() {
            return Err(StoreError::Unavailable("memory store disabled".to_owned()));
        }
        Ok(())
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.borrow_mut().remove(key);
        Ok(())
    }
}

/// Store persisted as a JSON object of strings.
///
/// The file is read on every access and rewritten on every change. A missing
/// file is an empty store; parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(values).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json + "\n").map_err(io_error)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.read()?;
        values.insert(key.to_owned(), value.to_owned());
        self.write(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.read()?;
        if values.remove(key).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("theme", "dark").unwrap();
        assert_eq!(other.get("theme").unwrap(), Some("dark".to_owned()));

        other.remove("theme").unwrap();
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_memory_store_unavailable() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.get("theme"), Err(StoreError::Unavailable(_))));
        assert!(store.set("theme", "dark").is_err());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("prefs.json"));

        assert_eq!(store.get("theme").unwrap(), None);
        store.remove("theme").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_set_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".dfx/nested/prefs.json");
        let store = FileStore::new(&path);

        store.set("theme", "dark").unwrap();
        store.set("other", "value").unwrap();

        assert_eq!(store.get("theme").unwrap(), Some("dark".to_owned()));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#""theme": "dark""#));
        assert!(content.contains(r#""other": "value""#));
    }

    #[test]
    fn test_file_store_remove_keeps_other_keys() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("prefs.json"));
        store.set("theme", "dark").unwrap();
        store.set("other", "value").unwrap();

        store.remove("theme").unwrap();

        assert_eq!(store.get("theme").unwrap(), None);
        assert_eq!(store.get("other").unwrap(), Some("value".to_owned()));
    }

    #[test]
    fn test_file_store_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get("theme"), Err(StoreError::Json { .. })));
    }
}
