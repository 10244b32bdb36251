use chickenroad_core::{
    DEFAULT_HISTORY_KEY, DifficultyTier, HISTORY_CAPACITY, HistoryError, HistoryLog,
    HistoryStore, KeyValueStorage, MemoryStorage, Prediction,
};
use std::cell::Cell;
use std::num::NonZeroU8;

fn prediction(n: i64) -> Prediction {
    Prediction {
        tier: DifficultyTier::ALL[usize::try_from(n).unwrap() % 4],
        step_count: NonZeroU8::new(u8::try_from(n % 3 + 1).unwrap()).unwrap(),
        multiplier: 1.0 + f64::from(u32::try_from(n).unwrap()) / 100.0,
        timestamp: 1_700_000_000_000 + n,
    }
}

#[derive(Debug, thiserror::Error)]
#[error("quota exceeded")]
struct QuotaExceeded;

/// Reads from an inner store but refuses every write.
#[derive(Debug, Default)]
struct FullStorage {
    inner: MemoryStorage,
    rejected: Cell<usize>,
}

impl KeyValueStorage for FullStorage {
    type Error = QuotaExceeded;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.inner.get(key).unwrap_or(None))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), Self::Error> {
        self.rejected.set(self.rejected.get() + 1);
        Err(QuotaExceeded)
    }

    fn remove(&self, _key: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[test]
fn twelve_appends_keep_newest_ten() {
    let mut store = HistoryStore::open(MemoryStorage::new());
    for n in 1..=12 {
        let appended = store.append(&prediction(n));
        assert!(appended.log.len() <= HISTORY_CAPACITY);
    }
    let expected: Vec<_> = (3..=12)
        .rev()
        .map(|n| prediction(n).to_history_entry())
        .collect();
    assert_eq!(store.log().to_vec(), expected);
}

#[test]
fn persisted_log_reloads_in_same_order() {
    let storage = MemoryStorage::new();
    let mut store = HistoryStore::open(storage.clone());
    for n in 1..=12 {
        let _ = store.append(&prediction(n));
    }
    let reopened = HistoryStore::open(storage);
    assert_eq!(reopened.log(), store.log());
    assert_eq!(reopened.log().len(), HISTORY_CAPACITY);
}

#[test]
fn corrupted_records_load_as_empty() {
    for raw in [
        "not json",
        "{\"difficulty\":\"easy\"}",
        "[{\"difficulty\":\"easy\",\"multiplier\":\"big\",\"timestamp\":1}]",
        "[{\"difficulty\":\"nightmare\",\"multiplier\":1.0,\"timestamp\":1}]",
        "",
    ] {
        let store = HistoryStore::open(MemoryStorage::new().with_record(DEFAULT_HISTORY_KEY, raw));
        assert!(store.log().is_empty(), "expected empty log for {raw:?}");
    }
}

#[test]
fn oversized_persisted_log_is_truncated_on_load() {
    let entries: Vec<_> = (0..15).map(|n| prediction(n).to_history_entry()).collect();
    let raw = serde_json::to_string(&entries).unwrap();
    let store = HistoryStore::open(MemoryStorage::new().with_record(DEFAULT_HISTORY_KEY, &raw));
    assert_eq!(store.log().len(), HISTORY_CAPACITY);
    assert_eq!(store.log().newest(), Some(&entries[0]));
}

#[test]
fn deserialized_log_is_capped() {
    let entries: Vec<_> = (0..15).map(|n| prediction(n).to_history_entry()).collect();
    let raw = serde_json::to_string(&entries).unwrap();
    let log: HistoryLog = serde_json::from_str(&raw).unwrap();
    assert_eq!(log.len(), HISTORY_CAPACITY);
    assert_eq!(log.to_vec(), entries[..HISTORY_CAPACITY]);
}

#[test]
fn failed_write_still_updates_memory() {
    let mut store = HistoryStore::open(FullStorage::default());
    let appended = store.append(&prediction(1));
    assert_eq!(appended.log.len(), 1);
    assert!(matches!(appended.warning, Some(HistoryError::Storage(_))));
    let appended = store.append(&prediction(2));
    assert_eq!(appended.log.len(), 2);
    assert_eq!(store.storage().rejected.get(), 2);
    assert_eq!(store.log().newest().unwrap().timestamp, prediction(2).timestamp);
}

#[test]
fn reloaded_entries_do_not_carry_step_count() {
    let storage = MemoryStorage::new();
    let mut store = HistoryStore::open(storage.clone());
    let _ = store.append(&prediction(4));
    let raw = storage.get(DEFAULT_HISTORY_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = value[0].as_object().unwrap();
    let mut keys: Vec<_> = first.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["difficulty", "multiplier", "timestamp"]);
}
