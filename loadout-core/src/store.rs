//! Key-value persistence.
//!
//! Values are raw JSON strings, exactly as the original kept them in
//! localStorage. [`get_json`] / [`set_json`] centralize the per-access
//! encode/decode so the malformed-value policy (decode failure reads as
//! absent, caller default substituted) is enforced in one place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::keys::StoreKey;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// The persistent mapping from namespaced key to raw JSON value.
///
/// Single-writer by construction (synchronous calls from one UI thread);
/// list-type values use whole-document read-modify-write, so concurrent
/// processes sharing a backing file race with last-write-wins.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// Read a JSON-encoded value, substituting `default` when the key is absent
/// or the stored text fails to decode.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &StoreKey,
    default: T,
) -> T {
    match store.get(key.as_str()) {
        Some(raw) => serde_json::from_str(&raw).unwrap_or(default),
        None => default,
    }
}

/// Write a value JSON-encoded.
pub fn set_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &StoreKey,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key.as_str(), raw)
}

pub fn remove(store: &mut dyn KeyValueStore, key: &StoreKey) -> Result<(), StoreError> {
    store.remove(key.as_str())
}

/// In-memory store, used by tests and as the import staging area.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Store backed by a single JSON file (one object, key → raw value), the
/// localStorage stand-in. The whole document is rewritten on every mutation.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open or create the backing file. A file that exists but does not parse
    /// as a string-to-string object is an error; the store never silently
    /// discards persisted data.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        self.persist()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeySpace;

    #[test]
    fn test_get_json_default_on_absent() {
        let store = MemoryStore::new();
        let keys = KeySpace::default();
        assert!(!get_json(&store, &keys.checked("soma"), false));
    }

    #[test]
    fn test_get_json_default_on_malformed() {
        let mut store = MemoryStore::new();
        let keys = KeySpace::default();
        store
            .set(keys.checked("soma").as_str(), "{not json".to_string())
            .unwrap();
        assert!(!get_json(&store, &keys.checked("soma"), false));
        assert!(get_json(&store, &keys.checked("soma"), true));
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut store = MemoryStore::new();
        let keys = KeySpace::default();
        set_json(&mut store, &keys.checked("soma"), &true).unwrap();
        assert!(get_json(&store, &keys.checked("soma"), false));
        assert_eq!(store.get("wf:checked:soma").as_deref(), Some("true"));
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = MemoryStore::new();
        store.set("wf:checked:a", "true".into()).unwrap();
        store.set("wf:val:a:rank", "50".into()).unwrap();
        store.set("other:checked:a", "true".into()).unwrap();
        let keys = store.keys_with_prefix("wf:");
        assert_eq!(keys, vec!["wf:checked:a", "wf:val:a:rank"]);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = std::env::temp_dir().join(format!("loadout-store-{}.json", uuid::Uuid::new_v4()));
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("wf:checked:soma", "true".into()).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("wf:checked:soma").as_deref(), Some("true"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = std::env::temp_dir().join(format!("loadout-store-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
        std::fs::remove_file(&path).ok();
    }
}
