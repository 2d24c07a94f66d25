//! # Memory Store
//!
//! In-process key-value storage. Clones share the same map, so a test can keep
//! one clone while the persistence writer owns another.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

#[derive(Debug, Default)]
struct Inner {
    values: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    writes: AtomicU64,
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());

        MemoryStore {
            inner: Arc::new(Inner {
                values: RwLock::new(values),
                ..Inner::default()
            }),
        }
    }

    /// Makes every following `set`/`remove` fail with `StoreError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is read-only".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.inner.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        self.check_writable()?;
        self.inner.values.write().await.insert(key.to_string(), value);
        let writes = self.inner.writes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(key, writes, "Wrote value to memory store");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_writable()?;
        self.inner.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_values() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.set("k", "v".to_string()).await.unwrap();

        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(other.write_count(), 1);
    }

    #[tokio::test]
    async fn test_with_value() {
        let store = MemoryStore::with_value("k", "[]");
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = MemoryStore::with_value("k", "old");
        store.set_fail_writes(true);

        let err = store.set("k", "new".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.remove("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("old"));

        store.set_fail_writes(false);
        store.set("k", "new".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
