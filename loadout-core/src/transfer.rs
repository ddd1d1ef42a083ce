//! Bulk export / import / clear over one namespace.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::keys::KeySpace;
use crate::store::{KeyValueStore, StoreError};

#[derive(Debug)]
pub enum TransferError {
    /// The import text is not valid JSON; nothing was applied.
    Parse(serde_json::Error),
    /// The import text parsed but is not a JSON object.
    NotAnObject,
    Store(StoreError),
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "import is not valid JSON: {}", e),
            Self::NotAnObject => write!(f, "import must be a JSON object of key/value pairs"),
            Self::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<serde_json::Error> for TransferError {
    fn from(e: serde_json::Error) -> Self {
        TransferError::Parse(e)
    }
}

impl From<StoreError> for TransferError {
    fn from(e: StoreError) -> Self {
        TransferError::Store(e)
    }
}

/// Every persisted key under the namespace, mapped to its raw stored value.
pub fn export(store: &dyn KeyValueStore, keys: &KeySpace) -> BTreeMap<String, String> {
    store
        .keys_with_prefix(&keys.prefix())
        .into_iter()
        .filter_map(|k| store.get(&k).map(|v| (k, v)))
        .collect()
}

/// Import a previously exported document. All-or-nothing at the JSON-parse
/// stage; once parsed, each namespaced key is written verbatim with no value
/// validation, and non-namespaced keys are ignored. Returns the number of
/// keys written.
pub fn import(
    store: &mut dyn KeyValueStore,
    keys: &KeySpace,
    text: &str,
) -> Result<usize, TransferError> {
    let doc: Value = serde_json::from_str(text)?;
    let Some(object) = doc.as_object() else {
        return Err(TransferError::NotAnObject);
    };

    let mut written = 0;
    for (key, value) in object {
        if !keys.owns(key) {
            continue;
        }
        // Exported values are raw stored strings; anything else is written in
        // its compact JSON form, matching the permissive original.
        let raw = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        store.set(key, raw)?;
        written += 1;
    }
    Ok(written)
}

/// Delete every persisted key under the namespace. Idempotent. Returns the
/// number of keys removed.
pub fn clear(store: &mut dyn KeyValueStore, keys: &KeySpace) -> Result<usize, StoreError> {
    let to_remove = store.keys_with_prefix(&keys.prefix());
    let count = to_remove.len();
    for key in to_remove {
        store.remove(&key)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seeded() -> (MemoryStore, KeySpace) {
        let mut store = MemoryStore::new();
        let keys = KeySpace::default();
        store.set("wf:checked:soma", "true".into()).unwrap();
        store.set("wf:val:soma:rank", "50".into()).unwrap();
        store
            .set("wf:todo:todo:list", r#"[{"id":"a","text":"x","checked":false}]"#.into())
            .unwrap();
        store.set("unrelated:key", "\"kept\"".into()).unwrap();
        (store, keys)
    }

    #[test]
    fn test_export_only_namespaced_keys() {
        let (store, keys) = seeded();
        let doc = export(&store, &keys);
        assert_eq!(doc.len(), 3);
        assert!(doc.keys().all(|k| k.starts_with("wf:")));
        assert_eq!(doc.get("wf:checked:soma").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_export_import_roundtrip() {
        let (store, keys) = seeded();
        let doc = export(&store, &keys);
        let text = serde_json::to_string(&doc).unwrap();

        let mut fresh = MemoryStore::new();
        let written = import(&mut fresh, &keys, &text).unwrap();
        assert_eq!(written, 3);
        assert_eq!(export(&fresh, &keys), doc);
    }

    #[test]
    fn test_import_ignores_foreign_keys() {
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();
        let written = import(
            &mut store,
            &keys,
            r#"{"wf:checked:a": "true", "other:thing": "1"}"#,
        )
        .unwrap();
        assert_eq!(written, 1);
        assert!(store.get("other:thing").is_none());
    }

    #[test]
    fn test_import_malformed_applies_nothing() {
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();
        assert!(matches!(
            import(&mut store, &keys, "{broken"),
            Err(TransferError::Parse(_))
        ));
        assert!(store.is_empty());

        assert!(matches!(
            import(&mut store, &keys, "[1,2]"),
            Err(TransferError::NotAnObject)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_import_writes_unvalidated_values() {
        // Structurally valid object with a nonsense inner value: still
        // imported as-is. Readers later treat it as absent.
        let keys = KeySpace::default();
        let mut store = MemoryStore::new();
        import(&mut store, &keys, r#"{"wf:checked:a": "{oops"}"#).unwrap();
        assert_eq!(store.get("wf:checked:a").as_deref(), Some("{oops"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut store, keys) = seeded();
        assert_eq!(clear(&mut store, &keys).unwrap(), 3);
        assert_eq!(clear(&mut store, &keys).unwrap(), 0);
        assert!(store.keys_with_prefix("wf:").is_empty());
        // Foreign keys survive.
        assert_eq!(store.get("unrelated:key").as_deref(), Some("\"kept\""));
    }
}
