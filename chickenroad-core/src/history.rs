//! Bounded, newest-first prediction history with best-effort persistence.
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::VecDeque;

use crate::constants::{DEFAULT_HISTORY_KEY, HISTORY_CAPACITY, LOG_TARGET_HISTORY};
use crate::prediction::{HistoryEntry, Prediction};
use crate::storage::KeyValueStorage;

/// Newest-first log holding at most [`HISTORY_CAPACITY`] entries.
///
/// Deserializing goes through [`HistoryLog::from_newest_first`], so an
/// oversized array is truncated rather than accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from newest-first entries, dropping anything past capacity.
    #[must_use]
    pub fn from_newest_first(entries: impl IntoIterator<Item = HistoryEntry>) -> Self {
        Self {
            entries: entries.into_iter().take(HISTORY_CAPACITY).collect(),
        }
    }

    /// Prepend `entry`, dropping the oldest entries beyond capacity.
    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }
}

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<HistoryEntry>::deserialize(deserializer).map(Self::from_newest_first)
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of an append: the updated log plus any persistence warning.
#[derive(Debug)]
pub struct Appended<'a> {
    pub log: &'a HistoryLog,
    pub warning: Option<HistoryError>,
}

/// Owns the in-memory log and mirrors it into a [`KeyValueStorage`] record.
#[derive(Debug)]
pub struct HistoryStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    log: HistoryLog,
}

impl<S: KeyValueStorage> HistoryStore<S> {
    /// Open the store under the default record name and load it.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, DEFAULT_HISTORY_KEY)
    }

    /// Open the store under `key` and load whatever is persisted there.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            log: HistoryLog::new(),
        };
        store.log = store.load();
        store
    }

    /// Read the persisted log. Missing or malformed data yields an empty log.
    pub fn load(&self) -> HistoryLog {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryLog::new(),
            Err(err) => {
                warn!(target: LOG_TARGET_HISTORY, "history read failed for {}: {err}", self.key);
                return HistoryLog::new();
            }
        };
        match serde_json::from_str::<HistoryLog>(&raw) {
            Ok(log) => log,
            Err(err) => {
                warn!(target: LOG_TARGET_HISTORY, "discarding malformed history in {}: {err}", self.key);
                HistoryLog::new()
            }
        }
    }

    /// Prepend `prediction`, truncate, and persist. A failed write leaves the
    /// in-memory log updated and is reported through [`Appended::warning`].
    pub fn append(&mut self, prediction: &Prediction) -> Appended<'_> {
        self.log.push_front(prediction.to_history_entry());
        let warning = self.persist().err();
        if let Some(err) = &warning {
            warn!(target: LOG_TARGET_HISTORY, "history not persisted: {err}");
        } else {
            debug!(target: LOG_TARGET_HISTORY, "history persisted ({} entries)", self.log.len());
        }
        Appended {
            log: &self.log,
            warning,
        }
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&self.log)?;
        self.storage
            .set(&self.key, &json)
            .map_err(|err| HistoryError::Storage(err.to_string()))
    }

    #[must_use]
    pub const fn log(&self) -> &HistoryLog {
        &self.log
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }
}
