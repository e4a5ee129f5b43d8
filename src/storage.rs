//! Key-value blob storage for tasklist state
//!
//! State is written as UTF-8 JSON and read back as raw bytes, so content
//! that no longer decodes is left for the caller to judge. The file-backed
//! store maps each key to one JSON file inside the data directory:
//!
//! ```text
//! <data_dir>/
//!   todos.json              # Serialized task collection
//!   todos.json.lock         # Advisory lock for reads/writes
//!   prefs.json              # Theme and per-view sort preferences
//!   todos.json.corrupt      # Unreadable blob moved aside on reset
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Extension appended to blob files
const BLOB_EXTENSION: &str = "json";

/// Suffix for blobs moved aside after failing to parse
const CORRUPT_SUFFIX: &str = "corrupt";

/// Opaque get/set store for serialized state.
pub trait BlobStore {
    /// Read the raw blob stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Drop the blob under `key` so the next `get` sees nothing.
    fn discard(&self, key: &str) -> Result<()>;
}

impl<B: BlobStore + ?Sized> BlobStore for &B {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn discard(&self, key: &str) -> Result<()> {
        (**self).discard(key)
    }
}

/// Blob store backed by one file per key in a directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl FileBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path to the data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the file holding `key`
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{BLOB_EXTENSION}"))
    }

    /// Path a corrupt blob is moved to by `discard`
    pub fn corrupt_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{key}.{BLOB_EXTENSION}.{CORRUPT_SUFFIX}"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.blob_path(key);
        tracing::debug!(path = %path.display(), "reading blob");
        lock::read_locked(&path, self.lock_timeout_ms)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.blob_path(key);
        tracing::debug!(path = %path.display(), bytes = value.len(), "writing blob");
        lock::write_atomic_locked(&path, value.as_bytes(), self.lock_timeout_ms)
    }

    fn discard(&self, key: &str) -> Result<()> {
        let path = self.blob_path(key);
        let _lock = lock::FileLock::acquire(lock::lock_path_for(&path), self.lock_timeout_ms)?;
        if !path.exists() {
            return Ok(());
        }
        let target = self.corrupt_path(key);
        fs::rename(&path, &target).map_err(Error::Io)?;
        tracing::warn!(from = %path.display(), to = %target.display(), "moved blob aside");
        Ok(())
    }
}

/// In-memory blob store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the blob under `key`, for inspection in tests
    pub fn peek(&self, key: &str) -> Option<String> {
        self.lock_map().ok().and_then(|map| map.get(key).cloned())
    }

    fn lock_map(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.blobs
            .lock()
            .map_err(|_| Error::OperationFailed("memory blob store poisoned".to_string()))
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock_map()?.get(key).map(|blob| blob.clone().into_bytes()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock_map()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn discard(&self, key: &str) -> Result<()> {
        self.lock_map()?.remove(key);
        Ok(())
    }
}
