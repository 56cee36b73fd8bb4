//! Composite key comparison and the bounded insertion search.

use crate::key::SortKey;
use crate::state::Direction;
use core::cmp::Ordering;
use vista_core::RecordId;

/// Below this window size the insertion search scans linearly.
pub const LINEAR_SCAN_THRESHOLD: usize = 10;

/// A record id with its projected composite key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortEntry {
    pub id: RecordId,
    pub keys: Vec<SortKey>,
}

impl SortEntry {
    pub fn new(id: RecordId, keys: Vec<SortKey>) -> Self {
        Self { id, keys }
    }
}

/// Compares two entries key by key in priority order. The first differing
/// key decides, scaled by its direction; full ties fall back to ascending
/// record id, so distinct records never compare equal.
pub fn compare_sortable(a: &SortEntry, b: &SortEntry, directions: &[Direction]) -> Ordering {
    for ((ka, kb), direction) in a.keys.iter().zip(&b.keys).zip(directions) {
        let ord = direction.apply(ka.cmp(kb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}

/// Returns the first index in `entries[lo..]` whose entry sorts after
/// `probe`. `entries` must be ordered by [`compare_sortable`].
///
/// Bisects until the window holds at most [`LINEAR_SCAN_THRESHOLD`] entries,
/// then scans.
pub fn insertion_point(
    entries: &[SortEntry],
    lo: usize,
    probe: &SortEntry,
    directions: &[Direction],
) -> usize {
    let mut lo = lo.min(entries.len());
    let mut hi = entries.len();
    while hi - lo > LINEAR_SCAN_THRESHOLD {
        let mid = lo + (hi - lo) / 2;
        if compare_sortable(&entries[mid], probe, directions) == Ordering::Less {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    while lo < hi && compare_sortable(&entries[lo], probe, directions) == Ordering::Less {
        lo += 1;
    }
    lo
}

/// Merges `batch` into `previous`; both must already be ordered.
pub fn merge(
    previous: &[SortEntry],
    batch: Vec<SortEntry>,
    directions: &[Direction],
) -> Vec<SortEntry> {
    let mut merged = Vec::with_capacity(previous.len() + batch.len());
    let mut cursor = 0;
    for entry in batch {
        let at = insertion_point(previous, cursor, &entry, directions);
        merged.extend_from_slice(&previous[cursor..at]);
        merged.push(entry);
        cursor = at;
    }
    merged.extend_from_slice(&previous[cursor..]);
    merged
}

/// Returns whether every adjacent pair is strictly ordered.
pub fn is_ordered(entries: &[SortEntry], directions: &[Direction]) -> bool {
    entries
        .windows(2)
        .all(|w| compare_sortable(&w[0], &w[1], directions) == Ordering::Less)
}
