//! CounterStore - the owning state container.
//!
//! The store holds the counter collection (insertion order, newest first)
//! and the two global settings, applies the update and normalization rules,
//! and writes the full updated state through the storage backend before
//! every mutation returns. There is no batching and no async: one mutation
//! runs to completion before the next is accepted.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::counter::now_millis;
use crate::projector::{self, SortMode};
use crate::storage::{self, keys, KeyValueStorage, PersistedState};
use crate::Counter;

/// Outcome of a decrement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecrementOutcome {
    /// The count was decremented; carries the new value.
    Applied(i64),
    /// Negatives are disallowed and the counter sits at zero. The count is
    /// unchanged. This is a policy rejection, not an error: callers surface
    /// it as a transient cue.
    RejectedAtFloor,
    /// No counter with the given id.
    Missing,
}

/// The one owning instance of the counter collection and settings.
///
/// Opened from a storage backend at startup; every mutation persists
/// synchronously. Storage write failures never fail a mutation - they latch
/// the [`persistence_degraded`](CounterStore::persistence_degraded) flag
/// instead.
#[derive(Debug)]
pub struct CounterStore<S> {
    /// Insertion order, newest first
    counters: VecDeque<Counter>,
    allow_negatives: bool,
    sort_mode: SortMode,
    storage: S,
    degraded: bool,
}

impl<S: KeyValueStorage> CounterStore<S> {
    /// Open a store backed by `storage`, restoring whatever state it holds.
    ///
    /// Never fails: missing or malformed persisted data is normalized to
    /// defaults field by field.
    pub fn open(storage: S) -> Self {
        let state = PersistedState::load(&storage);
        debug!(
            counters = state.counters.len(),
            allow_negatives = state.allow_negatives,
            sort_mode = %state.sort_mode,
            "opened counter store"
        );
        Self {
            counters: state.counters.into(),
            allow_negatives: state.allow_negatives,
            sort_mode: state.sort_mode,
            storage,
            degraded: false,
        }
    }

    /// Create a counter at the front of the collection and return it.
    ///
    /// A blank (or whitespace-only) name auto-names the counter `Counter N`
    /// with the smallest unused N. User-chosen names are taken as-is after
    /// trimming; collisions between them are allowed.
    pub fn add(&mut self, name: &str) -> &Counter {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            self.next_default_name()
        } else {
            trimmed.to_string()
        };
        let counter = Counter::new(name, now_millis());
        debug!(id = %counter.id, name = %counter.name, "add counter");
        self.counters.push_front(counter);
        self.persist_counters();
        &self.counters[0]
    }

    /// Increment a counter by one, normalized by the negatives policy.
    /// Saturates at `i64::MAX`. Returns the new count, or `None` if the id
    /// is unknown.
    pub fn increment(&mut self, id: &str) -> Option<i64> {
        let allow = self.allow_negatives;
        let counter = self.find_mut(id)?;
        counter.count = normalize(counter.count.saturating_add(1), allow);
        let count = counter.count;
        self.persist_counters();
        Some(count)
    }

    /// Decrement a counter by one.
    ///
    /// When negatives are disallowed and the counter sits at zero, the
    /// request is rejected at the floor and nothing changes. Saturates at
    /// `i64::MIN`.
    pub fn decrement(&mut self, id: &str) -> DecrementOutcome {
        let allow = self.allow_negatives;
        let Some(counter) = self.find_mut(id) else {
            return DecrementOutcome::Missing;
        };
        if !allow && counter.count == 0 {
            return DecrementOutcome::RejectedAtFloor;
        }
        counter.count = counter.count.saturating_sub(1);
        let count = counter.count;
        self.persist_counters();
        DecrementOutcome::Applied(count)
    }

    /// Reset a counter to zero. Returns whether the id was found.
    pub fn reset(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(counter) => {
                counter.count = 0;
                self.persist_counters();
                true
            }
            None => false,
        }
    }

    /// Rename a counter. The new name is trimmed; if that leaves it empty
    /// the old name is kept. Returns whether the id was found.
    pub fn rename(&mut self, id: &str, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        let Some(counter) = self.find_mut(id) else {
            return false;
        };
        if !trimmed.is_empty() {
            counter.name = trimmed.to_string();
        }
        self.persist_counters();
        true
    }

    /// Delete a counter. Returns whether the id was found.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.counters.len();
        self.counters.retain(|c| c.id != id);
        if self.counters.len() == before {
            return false;
        }
        self.persist_counters();
        true
    }

    /// Delete every counter.
    ///
    /// Destructive and irreversible. The store performs no confirmation of
    /// its own: callers must obtain explicit affirmative confirmation from
    /// the user before invoking this. A no-op on an empty store.
    pub fn clear(&mut self) {
        if self.counters.is_empty() {
            return;
        }
        debug!(removed = self.counters.len(), "clear all counters");
        self.counters.clear();
        self.persist_counters();
    }

    /// Update the allow-negatives policy.
    ///
    /// Turning negatives off clamps every counter to `max(0, count)` and
    /// persists the whole collection as one batch. The clamp is lossy:
    /// re-enabling negatives does not restore pre-clamp values.
    pub fn set_allow_negatives(&mut self, allow: bool) {
        self.allow_negatives = allow;
        self.persist_raw(keys::ALLOW_NEGATIVES, if allow { "true" } else { "false" });
        if !allow {
            for counter in &mut self.counters {
                counter.count = counter.count.max(0);
            }
            self.persist_counters();
        }
    }

    /// Update the persisted sort mode. Mutates no counter.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
        self.persist_raw(keys::SORT_MODE, mode.as_key());
    }

    /// All counters in collection order (newest first).
    pub fn counters(&self) -> impl Iterator<Item = &Counter> {
        self.counters.iter()
    }

    /// Look up a counter by id.
    pub fn get(&self, id: &str) -> Option<&Counter> {
        self.counters.iter().find(|c| c.id == id)
    }

    /// Number of counters in the collection.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Sum of all counts, saturating at the i64 bounds.
    pub fn total(&self) -> i64 {
        self.counters
            .iter()
            .fold(0i64, |sum, c| sum.saturating_add(c.count))
    }

    pub fn allow_negatives(&self) -> bool {
        self.allow_negatives
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// The visible, ordered subset for the given search term, under the
    /// store's current sort mode.
    pub fn visible(&self, search_term: &str) -> Vec<&Counter> {
        projector::project(&self.counters, search_term, self.sort_mode)
    }

    /// Whether any storage write has failed since the store was opened.
    /// In-memory state stays authoritative either way.
    pub fn persistence_degraded(&self) -> bool {
        self.degraded
    }

    /// Consume the store and hand the backend back.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Counter> {
        self.counters.iter_mut().find(|c| c.id == id)
    }

    /// Smallest unused `Counter N` name, matching exactly against existing
    /// trimmed names of that shape.
    fn next_default_name(&self) -> String {
        let used: HashSet<&str> = self
            .counters
            .iter()
            .map(|c| c.name.trim())
            .filter(|name| is_default_name(name))
            .collect();
        let mut n: u64 = 1;
        loop {
            let candidate = format!("Counter {n}");
            if !used.contains(candidate.as_str()) {
                return candidate;
            }
            n += 1;
        }
    }

    fn persist_counters(&mut self) {
        match storage::encode_counters(&self.counters) {
            Ok(encoded) => self.persist_raw(keys::COUNTERS, &encoded),
            Err(err) => {
                warn!(%err, "failed to encode counter list");
                self.degraded = true;
            }
        }
    }

    fn persist_raw(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.write(key, value) {
            warn!(%err, key, "storage write failed; keeping in-memory state");
            self.degraded = true;
        }
    }
}

fn normalize(count: i64, allow_negatives: bool) -> i64 {
    if allow_negatives {
        count
    } else {
        count.max(0)
    }
}

/// Whether `name` has the exact auto-generated shape `Counter <digits>`.
fn is_default_name(name: &str) -> bool {
    name.strip_prefix("Counter ")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
