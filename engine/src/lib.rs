//! # Tally Engine
//!
//! A persistent named-counter store for local-first counting apps.
//!
//! This crate provides the core logic behind Tally: a list of named integer
//! counters the user can create, adjust, rename, filter and sort, with every
//! mutation written straight through to a key-value storage backend. The
//! engine itself performs no IO - it talks to storage only through the
//! [`KeyValueStorage`] trait, so the same store runs against a file-backed
//! adapter, an in-memory map, or anything else a host layer supplies.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files or terminals
//! - **Never fails**: corrupted persisted state is normalized, not rejected
//! - **Deterministic views**: equal inputs always project in the same order
//!
//! ## Core Concepts
//!
//! ### Counters
//!
//! A [`Counter`] is a named integer accumulator with a stable opaque id and
//! a creation timestamp. Counters live in insertion order, newest first.
//!
//! ### The store
//!
//! [`CounterStore`] owns the counter collection and two global settings:
//! whether counts may go negative, and the persisted sort mode. Mutations
//! (`add`, `increment`, `decrement`, `reset`, `rename`, `remove`, `clear`)
//! apply the normalization rules and persist the full state synchronously
//! before returning. Operations on an unknown id are silent no-ops, and a
//! decrement that would push a non-negative counter below zero is reported
//! as [`DecrementOutcome::RejectedAtFloor`] rather than an error.
//!
//! ### Projection
//!
//! [`project`] derives the visible, ordered subset from a free-text filter
//! and a [`SortMode`]. It is a pure function over borrowed counters.
//!
//! ## Quick Start
//!
//! ```rust
//! use tally_engine::{CounterStore, MemoryStorage};
//!
//! let mut store = CounterStore::open(MemoryStorage::new());
//!
//! let id = store.add("coffee").id.clone();
//! store.increment(&id);
//! store.increment(&id);
//! assert_eq!(store.total(), 2);
//!
//! let visible = store.visible("COF");
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].name, "coffee");
//! ```
//!
//! ## Persistence
//!
//! State lives under three independent storage keys (see [`storage::keys`]):
//! the counter list as a JSON array plus the two settings as plain strings.
//! Loading is total: every field of every persisted record is defaulted
//! independently when missing or malformed. Write failures never fail the
//! mutation; the store logs them and latches [`CounterStore::persistence_degraded`].

pub mod counter;
pub mod error;
pub mod projector;
pub mod storage;
pub mod store;

// Re-export main types at crate root
pub use counter::Counter;
pub use error::Error;
pub use projector::{project, SortMode};
pub use storage::{KeyValueStorage, MemoryStorage, PersistedState};
pub use store::{CounterStore, DecrementOutcome};

/// Type aliases for clarity
pub type CounterId = String;
pub type Timestamp = i64;
