//! Ordering and normalization of directory listings.
//!
//! A normalized listing is the raw server listing sorted by name with the
//! synthetic [`Entry::parent`] entry prepended. Sorting never moves the
//! parent entry; it is always at index `0`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::entry::{Entry, PARENT_NAME};

/// Sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// A–Z first.
    #[default]
    Ascending,
    /// Z–A first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Compares two entries by name.
///
/// Names are compared case-insensitively on their NFC form; names that
/// differ only in case fall back to a code-point comparison so the order is
/// total. `Descending` reverses the result.
pub fn compare(a: &Entry, b: &Entry, direction: SortDirection) -> Ordering {
    let ord = folded(a.name())
        .cmp(folded(b.name()))
        .then_with(|| a.name().nfc().cmp(b.name().nfc()));

    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

fn folded(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfc().flat_map(char::to_lowercase)
}

/// Sorts entries by name in the given direction.
///
/// Returns a **new** sorted `Vec<Entry>`; the input slice is never mutated.
/// The sort is stable.
pub fn sort_entries(entries: &[Entry], direction: SortDirection) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| compare(a, b, direction));
    sorted
}

/// Builds the listing a view displays from a raw server listing.
///
/// `.` and `..` rows are dropped (servers commonly report them, and a
/// previously normalized listing already carries the parent entry), the
/// remainder is sorted, and a single [`Entry::parent`] is prepended.
/// Applying `normalize` to its own output yields the same listing.
pub fn normalize(raw: Vec<Entry>, direction: SortDirection) -> Vec<Entry> {
    let entries: Vec<Entry> = raw.into_iter().filter(|e| !is_dot_entry(e)).collect();

    let mut normalized = Vec::with_capacity(entries.len() + 1);
    normalized.push(Entry::parent());
    normalized.extend(sort_entries(&entries, direction));
    normalized
}

fn is_dot_entry(entry: &Entry) -> bool {
    entry.name() == "." || entry.name() == PARENT_NAME
}
