//! The persistence boundary: storage contract and wire codec.
//!
//! Store state lives under three independent keys in a key-value backend.
//! Encoding is plain JSON for the counter list and bare strings for the two
//! settings. Decoding is total: a malformed list becomes an empty list, and
//! each field of each record is defaulted independently, so corrupted
//! persisted data can never keep the store from opening.

use serde_json::Value;
use tracing::warn;

use crate::counter::{new_counter_id, now_millis};
use crate::error::{Error, Result};
use crate::{Counter, SortMode};

/// Fixed storage keys. Each key is an independent record.
pub mod keys {
    pub const COUNTERS: &str = "counters";
    pub const ALLOW_NEGATIVES: &str = "allowNegatives";
    pub const SORT_MODE: &str = "sortMode";
}

/// A key-value storage backend.
///
/// Implementations hold no independent copy of the state - they are a
/// pass-through serialization boundary invoked by the store on every
/// mutation. `read` is infallible by contract: backends treat unreadable
/// data the same as absent data.
pub trait KeyValueStorage {
    /// Read the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Everything the store restores at startup, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub counters: Vec<Counter>,
    pub allow_negatives: bool,
    pub sort_mode: SortMode,
}

impl PersistedState {
    /// Load and decode all three records. Never fails.
    pub fn load<S: KeyValueStorage>(storage: &S) -> Self {
        let counters = storage
            .read(keys::COUNTERS)
            .map(|raw| decode_counters(&raw))
            .unwrap_or_default();

        // Anything other than the literal "true" means false.
        let allow_negatives = storage
            .read(keys::ALLOW_NEGATIVES)
            .is_some_and(|raw| raw == "true");

        let sort_mode = storage
            .read(keys::SORT_MODE)
            .and_then(|raw| SortMode::parse(&raw))
            .unwrap_or_default();

        Self {
            counters,
            allow_negatives,
            sort_mode,
        }
    }
}

/// Encode the counter list as a JSON array in collection order.
pub fn encode_counters<'a, I>(counters: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Counter>,
{
    let list: Vec<&Counter> = counters.into_iter().collect();
    serde_json::to_string(&list).map_err(|e| Error::Encode {
        key: keys::COUNTERS.to_string(),
        reason: e.to_string(),
    })
}

/// Decode a persisted counter list.
///
/// A value that is not a JSON array decodes to an empty list. Within each
/// record, fields are defaulted independently: id → freshly generated,
/// name → "Counter", count → 0, createdAt → now.
pub fn decode_counters(raw: &str) -> Vec<Counter> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(%err, "persisted counter list is not valid JSON, starting empty");
            return Vec::new();
        }
    };
    let Value::Array(items) = parsed else {
        warn!("persisted counter list is not an array, starting empty");
        return Vec::new();
    };
    items.iter().map(counter_from_value).collect()
}

fn counter_from_value(value: &Value) -> Counter {
    let id = match value.get("id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => new_counter_id(),
    };
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Counter")
        .to_string();
    let count = value.get("count").and_then(Value::as_i64).unwrap_or(0);
    // Signed: the original accepts any finite number, including pre-epoch
    let created_at = value
        .get("createdAt")
        .and_then(Value::as_i64)
        .unwrap_or_else(now_millis);

    Counter {
        id,
        name,
        count,
        created_at,
    }
}

/// In-memory storage backend.
///
/// The reference implementation of [`KeyValueStorage`], used throughout the
/// test suites. Writes always succeed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing the codec. Useful for testing recovery
    /// from malformed persisted data.
    pub fn seed(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Peek at the raw value under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_empty_storage_yields_defaults() {
        let storage = MemoryStorage::new();
        let state = PersistedState::load(&storage);
        assert!(state.counters.is_empty());
        assert!(!state.allow_negatives);
        assert_eq!(state.sort_mode, SortMode::CreatedDesc);
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(decode_counters("not json at all").is_empty());
    }

    #[test]
    fn decode_rejects_non_array_top_level() {
        assert!(decode_counters("{\"id\": \"c_1\"}").is_empty());
        assert!(decode_counters("42").is_empty());
    }

    #[test]
    fn decode_defaults_each_field_independently() {
        let raw = r#"[
            {"id": "c_ok", "name": "fine", "count": 3, "createdAt": 1000},
            {"id": "c_bad", "name": "bad count", "count": "abc", "createdAt": 2000}
        ]"#;
        let counters = decode_counters(raw);
        assert_eq!(counters.len(), 2);

        // Intact record untouched
        assert_eq!(counters[0].id, "c_ok");
        assert_eq!(counters[0].count, 3);

        // Only the malformed field is defaulted
        assert_eq!(counters[1].id, "c_bad");
        assert_eq!(counters[1].name, "bad count");
        assert_eq!(counters[1].count, 0);
        assert_eq!(counters[1].created_at, 2000);
    }

    #[test]
    fn decode_generates_id_when_missing() {
        let raw = r#"[{"name": "orphan", "count": 1, "createdAt": 1000}]"#;
        let counters = decode_counters(raw);
        assert!(counters[0].id.starts_with("c_"));
        assert_eq!(counters[0].name, "orphan");
    }

    #[test]
    fn decode_defaults_name_and_timestamp() {
        let raw = r#"[{"id": "c_1", "name": 17, "count": 2, "createdAt": "old"}]"#;
        let counters = decode_counters(raw);
        assert_eq!(counters[0].name, "Counter");
        assert_eq!(counters[0].count, 2);
        assert!(counters[0].created_at > 0);
    }

    #[test]
    fn allow_negatives_only_true_on_literal_true() {
        let mut storage = MemoryStorage::new();
        storage.seed(keys::ALLOW_NEGATIVES, "true");
        assert!(PersistedState::load(&storage).allow_negatives);

        storage.seed(keys::ALLOW_NEGATIVES, "false");
        assert!(!PersistedState::load(&storage).allow_negatives);

        storage.seed(keys::ALLOW_NEGATIVES, "yes");
        assert!(!PersistedState::load(&storage).allow_negatives);
    }

    #[test]
    fn unknown_sort_mode_falls_back_to_default() {
        let mut storage = MemoryStorage::new();
        storage.seed(keys::SORT_MODE, "by-vibes");
        assert_eq!(
            PersistedState::load(&storage).sort_mode,
            SortMode::CreatedDesc
        );

        storage.seed(keys::SORT_MODE, "count-asc");
        assert_eq!(PersistedState::load(&storage).sort_mode, SortMode::CountAsc);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let counters = vec![
            Counter::new("coffee", 1000),
            Counter::new("tea", 2000),
        ];
        let encoded = encode_counters(&counters).unwrap();
        let decoded = decode_counters(&encoded);
        assert_eq!(counters, decoded);
    }

    #[test]
    fn encode_preserves_collection_order() {
        let newest = Counter::new("newest", 2000);
        let oldest = Counter::new("oldest", 1000);
        let counters = vec![newest.clone(), oldest.clone()];
        let decoded = decode_counters(&encode_counters(&counters).unwrap());
        assert_eq!(decoded[0].id, newest.id);
        assert_eq!(decoded[1].id, oldest.id);
    }
}
