//! Injectable string-keyed persistence.
//!
//! The core never touches the filesystem directly; everything durable goes
//! through [`KvStore`]. [`FileStore`] backs the real CLI (one file per key
//! under the data directory), [`MemoryStore`] backs tests and the
//! session-scoped state that must not survive a logout.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// Durable string-keyed storage: get/set/remove by key.
///
/// Values are JSON-serialized by callers; the store treats them as opaque
/// strings. Implementations must make each `set` atomic on its own, but
/// multi-key transactions are not part of the contract.
pub trait KvStore: Send + Sync {
    /// Read a value, `None` if the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Shared handles delegate, so one store can back the cache manager, the
/// group selection, and the session state at once.
impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store for tests and session-scoped state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.remove(key);
        Ok(())
    }
}

/// One file per key under a root directory.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so readers never observe a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed identifiers chosen by this crate, not user input,
        // but sanitize separators anyway so a bad key cannot escape root.
        let safe: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
        .map_err(Into::into)
    }
}

/// Read a JSON value from `store` under `key`.
///
/// Returns `Ok(None)` when the key is absent. A present-but-unparseable
/// value yields [`crate::Error::CacheCorrupt`]; callers decide whether
/// that is a miss (cache manager) or an error (everything else).
pub fn get_json<T: serde::de::DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!(key, %err, "stored value failed to parse");
            Err(crate::Error::CacheCorrupt {
                key: key.to_string(),
            })
        }
    }
}

/// Serialize `value` as JSON and write it under `key`.
pub fn set_json<T: serde::Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|err| {
        crate::Error::Io(io::Error::new(io::ErrorKind::InvalidData, err))
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(store: &dyn KvStore) {
        assert_eq!(store.get("missing").expect("get"), None);
        store.set("k", "\"v1\"").expect("set");
        assert_eq!(store.get("k").expect("get"), Some("\"v1\"".to_string()));
        store.set("k", "\"v2\"").expect("overwrite");
        assert_eq!(store.get("k").expect("get"), Some("\"v2\"".to_string()));
        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
        store.remove("k").expect("remove absent is ok");
    }

    #[test]
    fn memory_store_roundtrip() {
        roundtrip(&MemoryStore::new());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        roundtrip(&FileStore::new(dir.path().join("store")));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("store");
        FileStore::new(&root).set("k", "42").expect("set");
        let reopened = FileStore::new(&root);
        assert_eq!(reopened.get("k").expect("get"), Some("42".to_string()));
    }

    #[test]
    fn file_store_sanitizes_separators_in_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("store"));
        store.set("../escape", "1").expect("set");
        assert_eq!(
            store.get("../escape").expect("get"),
            Some("1".to_string())
        );
        assert!(!dir.path().join("escape.json").exists());
    }

    #[test]
    fn json_helpers_roundtrip_and_flag_corruption() {
        let store = MemoryStore::new();
        set_json(&store, "nums", &vec![3_i64, 1, 2]).expect("set");
        let nums: Vec<i64> = get_json(&store, "nums").expect("get").expect("present");
        assert_eq!(nums, vec![3, 1, 2]);

        store.set("nums", "not json").expect("set raw");
        let err = get_json::<Vec<i64>>(&store, "nums").expect_err("corrupt");
        assert!(matches!(err, crate::Error::CacheCorrupt { .. }));
    }
}
