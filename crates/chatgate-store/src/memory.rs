//! In-memory store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chatgate_core::{AccessState, PersistentStore, Result, StoredState};

/// Store that keeps serialized envelopes in a shared map.
///
/// Clones share the same map, so a clone can stand in for "the same
/// storage after a reload" in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw JSON document under `key`.
    pub fn insert_raw(&self, key: impl Into<String>, json: impl Into<String>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), json.into());
    }

    /// The raw JSON document stored under `key`, if any.
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistentStore for MemoryStore {
    fn load(&self, key: &str, version: u32) -> Result<Option<AccessState>> {
        match self.snapshot(key) {
            Some(json) => Ok(StoredState::from_json(&json)?.into_state(version)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, version: u32, state: &AccessState) -> Result<()> {
        let json = StoredState::new(state.clone(), version).to_json()?;
        self.insert_raw(key, json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatgate_core::{ACCESS_STORE_KEY, ACCESS_STORE_VERSION, Error};

    #[test]
    fn test_memory_store_empty_load() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.load(ACCESS_STORE_KEY, 1).unwrap(), None);
    }

    #[test]
    fn test_memory_store_save_load() {
        let store = MemoryStore::new();
        let state = AccessState {
            token: "t1".into(),
            ..AccessState::default()
        };

        store
            .save(ACCESS_STORE_KEY, ACCESS_STORE_VERSION, &state)
            .unwrap();
        let loaded = store.load(ACCESS_STORE_KEY, ACCESS_STORE_VERSION).unwrap();
        assert_eq!(loaded, Some(state));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_keys_are_isolated() {
        let store = MemoryStore::new();
        let state = AccessState {
            access_code: "code".into(),
            ..AccessState::default()
        };
        store.save("a", 1, &state).unwrap();

        assert!(store.load("b", 1).unwrap().is_none());
        assert!(store.load("a", 1).unwrap().is_some());
    }

    #[test]
    fn test_memory_store_clone_shares_documents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.save("k", 1, &AccessState::default()).unwrap();
        assert!(other.load("k", 1).unwrap().is_some());
    }

    #[test]
    fn test_memory_store_version_mismatch() {
        let store = MemoryStore::new();
        store.save("k", 2, &AccessState::default()).unwrap();
        assert_eq!(store.load("k", 1).unwrap(), None);
    }

    #[test]
    fn test_memory_store_corrupt_document() {
        let store = MemoryStore::new();
        store.insert_raw("k", "{broken");
        let err = store.load("k", 1).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_memory_store_snapshot_is_envelope() {
        let store = MemoryStore::new();
        store.save("k", 1, &AccessState::default()).unwrap();
        let raw = store.snapshot("k").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["state"].is_object());
    }
}
