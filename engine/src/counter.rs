//! Counter type and identity generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CounterId, Timestamp};

/// A named integer accumulator.
///
/// The id is opaque, unique within the store, and immutable for the
/// counter's lifetime. Ids are never reused, even after deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    /// Unique identifier for this counter
    pub id: CounterId,
    /// User-visible display name
    pub name: String,
    /// Current count; may be negative only while negatives are allowed
    pub count: i64,
    /// When the counter was created (milliseconds since epoch)
    pub created_at: Timestamp,
}

impl Counter {
    /// Create a new counter at zero with a freshly generated id.
    pub fn new(name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: new_counter_id(),
            name: name.into(),
            count: 0,
            created_at,
        }
    }
}

/// Generate a fresh counter id.
pub fn new_counter_id() -> CounterId {
    format!("c_{}", Uuid::new_v4().simple())
}

/// Current wall-clock time in milliseconds since epoch.
pub(crate) fn now_millis() -> Timestamp {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_counter() {
        let counter = Counter::new("coffee", 1000);
        assert_eq!(counter.name, "coffee");
        assert_eq!(counter.count, 0);
        assert_eq!(counter.created_at, 1000);
        assert!(counter.id.starts_with("c_"));
    }

    #[test]
    fn ids_are_unique() {
        let a = new_counter_id();
        let b = new_counter_id();
        assert_ne!(a, b);
    }

    #[test]
    fn serialization_uses_camel_case() {
        let counter = Counter {
            id: "c_1".into(),
            name: "coffee".into(),
            count: 3,
            created_at: 1000,
        };
        let json = serde_json::to_string(&counter).unwrap();
        assert!(json.contains("createdAt"));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn serialization_roundtrip() {
        let counter = Counter::new("tea", 2000);
        let json = serde_json::to_string(&counter).unwrap();
        let parsed: Counter = serde_json::from_str(&json).unwrap();
        assert_eq!(counter, parsed);
    }
}
