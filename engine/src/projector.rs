//! View projection: filtering and ordering the counter collection.
//!
//! Projection is a pure function of (counters, search term, sort mode). It
//! never copies counters and never mutates the collection, so the same
//! inputs always yield the same order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Counter;

/// One of the six total orderings over the counter collection.
///
/// Descending modes are the exact inverse relation of their ascending
/// counterpart. Name comparison is case-insensitive, with the id as the
/// final tie-break so every mode is a total order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    NameAsc,
    NameDesc,
    CountAsc,
    CountDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
}

impl SortMode {
    /// All modes, in display order.
    pub const ALL: [SortMode; 6] = [
        SortMode::NameAsc,
        SortMode::NameDesc,
        SortMode::CountAsc,
        SortMode::CountDesc,
        SortMode::CreatedAsc,
        SortMode::CreatedDesc,
    ];

    /// The persisted key for this mode.
    pub fn as_key(&self) -> &'static str {
        match self {
            SortMode::NameAsc => "name-asc",
            SortMode::NameDesc => "name-desc",
            SortMode::CountAsc => "count-asc",
            SortMode::CountDesc => "count-desc",
            SortMode::CreatedAsc => "created-asc",
            SortMode::CreatedDesc => "created-desc",
        }
    }

    /// Parse a persisted key. Returns `None` for unknown keys; callers
    /// that load persisted state fall back to the default.
    pub fn parse(raw: &str) -> Option<SortMode> {
        SortMode::ALL.iter().copied().find(|m| m.as_key() == raw)
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::parse(s).ok_or_else(|| {
            format!(
                "unknown sort mode '{s}', expected one of: {}",
                SortMode::ALL.map(|m| m.as_key()).join(", ")
            )
        })
    }
}

/// Derive the visible, ordered subset of `counters`.
///
/// The filter is a case-insensitive substring match of the trimmed search
/// term against counter names; an empty term matches everything.
pub fn project<'a, I>(counters: I, search_term: &str, sort_mode: SortMode) -> Vec<&'a Counter>
where
    I: IntoIterator<Item = &'a Counter>,
{
    let term = search_term.trim().to_lowercase();
    let mut view: Vec<&Counter> = counters
        .into_iter()
        .filter(|c| term.is_empty() || c.name.to_lowercase().contains(&term))
        .collect();
    view.sort_by(|a, b| compare(a, b, sort_mode));
    view
}

/// Compare two counters under the given sort mode.
pub fn compare(a: &Counter, b: &Counter, mode: SortMode) -> Ordering {
    match mode {
        SortMode::NameAsc => by_name_asc(a, b),
        SortMode::NameDesc => by_name_asc(a, b).reverse(),
        SortMode::CountAsc => by_count_asc(a, b),
        SortMode::CountDesc => by_count_asc(a, b).reverse(),
        SortMode::CreatedAsc => by_created_asc(a, b),
        SortMode::CreatedDesc => by_created_asc(a, b).reverse(),
    }
}

fn by_name_asc(a: &Counter, b: &Counter) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

fn by_count_asc(a: &Counter, b: &Counter) -> Ordering {
    a.count.cmp(&b.count).then_with(|| by_name_asc(a, b))
}

fn by_created_asc(a: &Counter, b: &Counter) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| by_name_asc(a, b))
}
