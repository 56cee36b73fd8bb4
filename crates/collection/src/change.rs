//! Change notifications from the data store.
//!
//! A `RecordChange` names the records the store added, modified or removed
//! since the last notification. Records are referenced by id only; the
//! coordinator reads their current content from the catalog.

use hashbrown::HashSet;
use vista_core::RecordId;

/// Ids of records touched by one batch of store mutations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordChange {
    /// Records that joined the store
    pub added: Vec<RecordId>,
    /// Records whose values changed
    pub modified: Vec<RecordId>,
    /// Records that left the store
    pub removed: Vec<RecordId>,
}

impl RecordChange {
    /// Creates an empty change.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change that only adds records.
    pub fn added(ids: impl IntoIterator<Item = RecordId>) -> Self {
        Self {
            added: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a change that only modifies records.
    pub fn modified(ids: impl IntoIterator<Item = RecordId>) -> Self {
        Self {
            modified: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Creates a change that only removes records.
    pub fn removed(ids: impl IntoIterator<Item = RecordId>) -> Self {
        Self {
            removed: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns true if nothing changed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Returns the total number of ids, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Appends another change to this one.
    pub fn merge(&mut self, other: RecordChange) {
        self.added.extend(other.added);
        self.modified.extend(other.modified);
        self.removed.extend(other.removed);
    }

    /// Returns every touched id once, in first-seen order.
    pub fn ids(&self) -> Vec<RecordId> {
        let mut seen = HashSet::with_capacity(self.len());
        self.added
            .iter()
            .chain(&self.modified)
            .chain(&self.removed)
            .copied()
            .filter(|id| seen.insert(*id))
            .collect()
    }
}
