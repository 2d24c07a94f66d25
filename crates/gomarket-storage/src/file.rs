//! # File Store
//!
//! Key-value storage backed by one file per key under a data directory.
//!
//! ## Layout
//! ```text
//! <data_dir>/
//! ├── %40GoMarketplace%3Acart        ◄─── value for "@GoMarketplace:cart"
//! └── %40GoMarketplace%3Acart.tmp    ◄─── only while a write is in flight
//! ```
//!
//! Keys are escaped so that every key maps to exactly one file name: ASCII
//! letters, digits, `-` and `_` pass through; every other byte becomes `%XX`.
//!
//! ## Atomic Writes
//! A value is written to `<file>.tmp` and renamed over `<file>`, so a crash
//! mid-write leaves the previous cart intact.

use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root` without touching the filesystem.
    ///
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    /// Creates a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = FileStore::new(root);
        tokio::fs::create_dir_all(&store.root)
            .await
            .map_err(|e| StoreError::io(store.root.display().to_string(), &e))?;
        debug!(root = %store.root.display(), "File store opened");
        Ok(store)
    }

    /// Returns the data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file that holds `key`.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(escape_key(key)))
    }
}

fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            // Writing to a String cannot fail
            let _ = write!(out, "%{:02X}", byte);
        }
    }
    out
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(key, bytes = value.len(), "Read value from file store");
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, &e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp = temp_path(&path);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io(key, &e))?;
        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|e| StoreError::io(key, &e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io(key, &e))?;

        debug!(key, bytes = value.len(), "Wrote value to file store");
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Removed value from file store");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(key, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_key() {
        assert_eq!(escape_key("@GoMarketplace:cart"), "%40GoMarketplace%3Acart");
        assert_eq!(escape_key("plain-key_1"), "plain-key_1");
        assert_eq!(escape_key(".."), "%2E%2E");
        assert_eq!(escape_key("a/b"), "a%2Fb");
    }

    #[test]
    fn test_empty_key_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.path_for(""), Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        let store = FileStore::open(dir).await.unwrap();

        assert_eq!(store.get("@GoMarketplace:cart").await.unwrap(), None);

        store.set("@GoMarketplace:cart", "[]".to_string()).await.unwrap();
        assert_eq!(
            store.get("@GoMarketplace:cart").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.join("%40GoMarketplace%3Acart").exists());
        assert!(!dir.join("%40GoMarketplace%3Acart.tmp").exists());

        store.set("@GoMarketplace:cart", "[1]".to_string()).await.unwrap();
        assert_eq!(
            store.get("@GoMarketplace:cart").await.unwrap().as_deref(),
            Some("[1]")
        );

        store.remove("@GoMarketplace:cart").await.unwrap();
        assert_eq!(store.get("@GoMarketplace:cart").await.unwrap(), None);

        // Removing twice is fine
        store.remove("@GoMarketplace:cart").await.unwrap();
    }

    #[tokio::test]
    async fn test_set_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested");
        let store = FileStore::new(&dir);

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(dir.is_dir());
    }
}
