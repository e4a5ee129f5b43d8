//! Persistence adapter between typed state and the blob store.
//!
//! The task collection is a JSON array under one key. Each record carries
//! `createdAt` as an RFC 3339 string which is parsed back into a
//! `DateTime<Utc>` on load. There is no version field.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::CorruptPolicy;
use crate::error::{Error, Result};
use crate::storage::BlobStore;
use crate::task::Task;

/// Reads and writes one typed value under one blob key.
#[derive(Debug, Clone)]
pub struct BlobSlot<B: BlobStore> {
    blobs: B,
    key: String,
    on_corrupt: CorruptPolicy,
}

impl<B: BlobStore> BlobSlot<B> {
    pub fn new(blobs: B, key: impl Into<String>, on_corrupt: CorruptPolicy) -> Self {
        Self {
            blobs,
            key: key.into(),
            on_corrupt,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Decode the stored value; `Ok(None)` when nothing is stored.
    ///
    /// A blob that does not parse, including one that is not UTF-8, fails
    /// with `CorruptState` under `CorruptPolicy::Fail`, or is discarded and
    /// reported as absent under `CorruptPolicy::Reset`.
    pub fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let Some(raw) = self.blobs.get(&self.key)? else {
            return Ok(None);
        };

        match serde_json::from_slice::<T>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.on_corrupt {
                CorruptPolicy::Fail => Err(Error::CorruptState {
                    key: self.key.clone(),
                    source,
                }),
                CorruptPolicy::Reset => {
                    tracing::warn!(key = %self.key, error = %source, "discarding unreadable state");
                    self.blobs.discard(&self.key)?;
                    Ok(None)
                }
            },
        }
    }

    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.blobs.set(&self.key, &json)
    }
}

/// Full-collection load/save for the task store
#[derive(Debug, Clone)]
pub struct TaskPersistence<B: BlobStore> {
    slot: BlobSlot<B>,
}

impl<B: BlobStore> TaskPersistence<B> {
    pub fn new(blobs: B, key: impl Into<String>, on_corrupt: CorruptPolicy) -> Self {
        Self {
            slot: BlobSlot::new(blobs, key, on_corrupt),
        }
    }

    /// Load the persisted collection, or an empty one if nothing is stored
    pub fn load(&self) -> Result<Vec<Task>> {
        let tasks: Vec<Task> = self.slot.read()?.unwrap_or_default();
        tracing::debug!(key = %self.slot.key(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Serialize and store the whole collection
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        self.slot.write(tasks)?;
        tracing::debug!(key = %self.slot.key(), count = tasks.len(), "saved tasks");
        Ok(())
    }
}
