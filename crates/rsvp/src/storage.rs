//! String key-value persistence used by the submission store.

use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage is available (disabled by the browser, private mode, ...).
    Unavailable,
    /// The storage rejected a read or write (quota, security error).
    Rejected(String),
    /// A stored value could not be decoded.
    Corrupt { key: String, reason: String },
    /// A value could not be encoded for storage.
    Encode(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Rejected(reason) => write!(f, "storage rejected operation: {reason}"),
            StorageError::Corrupt { key, reason } => {
                write!(f, "corrupt value under '{key}': {reason}")
            }
            StorageError::Encode(reason) => write!(f, "failed to encode value: {reason}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Minimal string storage, shaped after the Web Storage API.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage. Lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

/// Storage that is never available.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct UnavailableStorage;

#[cfg(test)]
impl KeyValueStorage for UnavailableStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("missing"), Ok(None));
        storage.set_item("key", "value").unwrap();
        assert_eq!(storage.get_item("key"), Ok(Some("value".to_string())));
    }

    #[test]
    fn unavailable_storage_errors() {
        assert_eq!(
            UnavailableStorage.set_item("key", "value"),
            Err(StorageError::Unavailable)
        );
        let error = UnavailableStorage.get_item("key").unwrap_err();
        assert_eq!(error.to_string(), "storage unavailable");
    }
}
