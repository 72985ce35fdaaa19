//! Append-only submission list with rebuild-on-write indexes.
//!
//! Storage failures never escape this module. A stored value that is not a
//! JSON list is treated as empty and overwritten by the next append. Entries
//! that don't decode as a [`SubmissionRecord`] are skipped when reading but
//! kept when the list is written back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StorageKeys;
use crate::index::{ContactKey, SubmissionIndex};
use crate::record::SubmissionRecord;
use crate::storage::{KeyValueStorage, StorageError};

pub struct SubmissionStore<S> {
    storage: S,
    keys: StorageKeys,
}

impl<S: KeyValueStorage> SubmissionStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_keys(storage, StorageKeys::default())
    }

    pub fn with_keys(storage: S, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// All stored submissions in append order.
    pub fn all(&self) -> Vec<SubmissionRecord> {
        self.entries()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| match SubmissionRecord::deserialize(entry) {
                Ok(record) => Some(record),
                Err(error) => {
                    log::warn!("Skipping unreadable submission #{position}: {error}");
                    None
                }
            })
            .collect()
    }

    /// Appends `record` and rebuilds the indexes.
    pub fn append(&self, record: SubmissionRecord) {
        let mut entries = self.entries();
        match serde_json::to_value(&record) {
            Ok(entry) => entries.push(entry),
            Err(error) => {
                log::warn!("Failed to encode submission: {error}");
                return;
            }
        }
        if let Err(error) = self.save(&self.keys.submissions, &entries) {
            log::warn!("Failed to store submission: {error}");
        }
        self.rebuild_index();
    }

    /// Recomputes every index from the full record list and persists it.
    pub fn rebuild_index(&self) -> SubmissionIndex {
        let index = SubmissionIndex::from_records(&self.all());
        if let Err(error) = self.save_index(&index) {
            log::warn!("Failed to store submission index: {error}");
        }
        index
    }

    /// The persisted index, or one rebuilt from the record list when the
    /// persisted copy is missing or unreadable.
    pub fn index(&self) -> SubmissionIndex {
        match self.load_index() {
            Ok(Some(index)) => index,
            Ok(None) => self.rebuild_index(),
            Err(error) => {
                log::warn!("Rebuilding submission index: {error}");
                self.rebuild_index()
            }
        }
    }

    pub fn lookup(&self, key: &ContactKey) -> Option<SubmissionRecord> {
        self.index().get(key).cloned()
    }

    /// Raw stored entries, whether or not they decode as records.
    fn entries(&self) -> Vec<Value> {
        match self.load_entries() {
            Ok(entries) => entries,
            Err(error) => {
                log::warn!("Treating stored submissions as empty: {error}");
                Vec::new()
            }
        }
    }

    fn load_entries(&self) -> Result<Vec<Value>, StorageError> {
        let key = &self.keys.submissions;
        let Some(json) = self.storage.get_item(key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|error| StorageError::Corrupt {
            key: key.to_string(),
            reason: error.to_string(),
        })
    }

    fn load_index(&self) -> Result<Option<SubmissionIndex>, StorageError> {
        let key = &self.keys.index;
        let Some(json) = self.storage.get_item(key)? else {
            return Ok(None);
        };
        SubmissionIndex::from_json(&json)
            .map(Some)
            .map_err(|error| StorageError::Corrupt {
                key: key.to_string(),
                reason: error.to_string(),
            })
    }

    fn save_index(&self, index: &SubmissionIndex) -> Result<(), StorageError> {
        let json = index
            .to_json()
            .map_err(|error| StorageError::Encode(error.to_string()))?;
        self.storage.set_item(&self.keys.index, &json)?;
        self.save(&self.keys.email_index, &index.email_index())?;
        self.save(&self.keys.phone_index, &index.phone_index())
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(value).map_err(|error| StorageError::Encode(error.to_string()))?;
        self.storage.set_item(key, &json)
    }
}
