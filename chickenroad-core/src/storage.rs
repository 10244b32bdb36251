//! Key-value persistence capability used by the history store.
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

/// Trait for abstracting persisted string records.
///
/// Each platform supplies its own backend.
pub trait KeyValueStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (e.g. quota).
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Shared in-process storage; clones see the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the trait.
    #[must_use]
    pub fn with_record(self, key: &str, value: &str) -> Self {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStorage for MemoryStorage {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_records() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        storage.set("k", "v").unwrap();
        assert_eq!(clone.get("k").unwrap().as_deref(), Some("v"));
        clone.remove("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn with_record_seeds_value() {
        let storage = MemoryStorage::new().with_record("predictionHistory", "[]");
        assert_eq!(storage.get("predictionHistory").unwrap().as_deref(), Some("[]"));
    }
}
