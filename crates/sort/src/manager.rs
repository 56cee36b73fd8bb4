//! The sort engine of one view.

use crate::compare::{compare_sortable, is_ordered, merge, SortEntry};
use crate::key::SortKey;
use crate::state::{Direction, SortOption, SortState};
use hashbrown::{HashMap, HashSet};
use vista_core::{Catalog, ListenerId, Property, PropertyId, RecordId, Result, Signal};

/// Ordered record ids plus each id's rank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortResult {
    pub images: Vec<RecordId>,
    /// `order[images[i]] == i`
    pub order: HashMap<RecordId, usize>,
}

impl SortResult {
    /// Builds a result from ordered ids.
    pub fn from_images(images: Vec<RecordId>) -> Self {
        let order = images.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self { images, order }
    }

    /// Returns the rank of a record.
    #[inline]
    pub fn rank(&self, id: RecordId) -> Option<usize> {
        self.order.get(&id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Emitted by every mutator that changed the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortEvent {
    /// A key was added or removed
    KeysChanged,
    /// The options of a key changed
    OptionChanged { property_id: PropertyId },
    /// `verify_state` dropped these keys
    Pruned { ids: Vec<PropertyId> },
    Loaded,
}

/// Sort engine state and result.
#[derive(Debug, Default)]
pub struct SortManager {
    state: SortState,
    /// Entries of the last result, in result order
    entries: Vec<SortEntry>,
    result: Option<SortResult>,
    stale: bool,
    dirty: bool,
    signal: Signal<SortEvent>,
}

impl SortManager {
    /// Creates an engine without sort keys; records then sort by id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from a saved state.
    pub fn from_state(state: &SortState) -> Result<Self> {
        let mut manager = Self::new();
        manager.load_state(state)?;
        manager.dirty = false;
        Ok(manager)
    }

    /// Returns the configuration.
    #[inline]
    pub fn state(&self) -> &SortState {
        &self.state
    }

    /// Returns the result of the last pass.
    #[inline]
    pub fn result(&self) -> Option<&SortResult> {
        self.result.as_ref()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Registers a listener for configuration changes.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&SortEvent) + 'static,
    {
        self.signal.subscribe(callback)
    }

    /// Removes a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.signal.unsubscribe(id)
    }

    /// Sorts `records` from scratch. Ids missing from the catalog are left
    /// out.
    pub fn sort<C: Catalog>(&mut self, catalog: &C, records: &[RecordId]) -> &SortResult {
        let properties = self.properties(catalog);
        let directions = self.state.directions();
        let mut entries = project_all(catalog, &properties, records);
        entries.sort_unstable_by(|a, b| compare_sortable(a, b, &directions));
        tracing::trace!(records = entries.len(), keys = directions.len(), "sort pass");
        self.install(entries)
    }

    /// Re-inserts `updated` records and drops `removed` ones from the last
    /// result.
    ///
    /// Returns None when there is no result to update or the configuration
    /// changed since it was built; run [`sort`](Self::sort) instead.
    pub fn update_selection<C: Catalog>(
        &mut self,
        catalog: &C,
        updated: &[RecordId],
        removed: &[RecordId],
    ) -> Option<&SortResult> {
        if self.stale {
            tracing::warn!("sort configuration changed since the last pass");
            return None;
        }
        if self.result.is_none() {
            tracing::warn!("no previous sort result to update");
            return None;
        }

        let properties = self.properties(catalog);
        let directions = self.state.directions();
        let touched: HashSet<RecordId> = updated.iter().chain(removed).copied().collect();

        let mut seen = HashSet::with_capacity(updated.len());
        let unique: Vec<RecordId> = updated.iter().copied().filter(|id| seen.insert(*id)).collect();
        let mut batch = project_all(catalog, &properties, &unique);
        batch.sort_unstable_by(|a, b| compare_sortable(a, b, &directions));

        let mut previous = core::mem::take(&mut self.entries);
        previous.retain(|e| !touched.contains(&e.id));
        let merged = merge(&previous, batch, &directions);

        let ordered = is_ordered(&merged, &directions);
        debug_assert!(ordered, "merged sort order is not monotone");
        if !ordered {
            tracing::error!(
                records = merged.len(),
                "merged sort order is not monotone, sorting from scratch"
            );
            let ids: Vec<RecordId> = merged.iter().map(|e| e.id).collect();
            return Some(self.sort(catalog, &ids));
        }

        tracing::trace!(
            updated = unique.len(),
            removed = removed.len(),
            records = merged.len(),
            "incremental sort pass"
        );
        Some(self.install(merged))
    }

    /// Appends a key with the lowest priority. Does nothing when the
    /// property is already a key. Returns whether the state changed.
    pub fn set_sort(&mut self, property_id: PropertyId, option: Option<SortOption>) -> bool {
        if self.state.contains(property_id) {
            return false;
        }
        self.state.sort_by.push(property_id);
        if let Some(option) = option {
            self.state.options.insert(property_id, option);
        }
        self.changed(SortEvent::KeysChanged);
        true
    }

    /// Removes a key and its options. Returns whether the state changed.
    pub fn del_sort(&mut self, property_id: PropertyId) -> bool {
        if !self.state.contains(property_id) {
            return false;
        }
        self.state.sort_by.retain(|p| *p != property_id);
        self.state.options.remove(&property_id);
        self.changed(SortEvent::KeysChanged);
        true
    }

    /// Replaces the options of an existing key. Returns whether the state
    /// changed.
    pub fn set_option(&mut self, property_id: PropertyId, option: SortOption) -> bool {
        if !self.state.contains(property_id) {
            return false;
        }
        let previous = self.state.options.insert(property_id, option);
        if previous.unwrap_or_default() == option {
            return false;
        }
        self.changed(SortEvent::OptionChanged { property_id });
        true
    }

    /// Returns the direction of a key.
    pub fn direction(&self, property_id: PropertyId) -> Direction {
        self.state.direction(property_id)
    }

    /// Drops keys whose property no longer exists. Returns the dropped ids.
    pub fn verify_state<C: Catalog>(&mut self, catalog: &C) -> Vec<PropertyId> {
        let dropped: Vec<PropertyId> = self
            .state
            .sort_by
            .iter()
            .copied()
            .filter(|p| catalog.property(*p).is_none())
            .collect();
        if dropped.is_empty() {
            return dropped;
        }
        self.state.sort_by.retain(|p| !dropped.contains(p));
        for p in &dropped {
            self.state.options.remove(p);
        }
        tracing::info!(properties = ?dropped, "pruned stale sort keys");
        self.changed(SortEvent::Pruned {
            ids: dropped.clone(),
        });
        dropped
    }

    /// Replaces the configuration with a saved state. Repeated keys keep
    /// their first position.
    pub fn load_state(&mut self, state: &SortState) -> Result<()> {
        let mut state = state.clone();
        state.dedup();
        self.state = state;
        self.changed(SortEvent::Loaded);
        Ok(())
    }

    fn properties<'c, C: Catalog>(&self, catalog: &'c C) -> Vec<Option<&'c Property>> {
        self.state
            .sort_by
            .iter()
            .map(|p| catalog.property(*p))
            .collect()
    }

    fn install(&mut self, entries: Vec<SortEntry>) -> &SortResult {
        let images = entries.iter().map(|e| e.id).collect();
        self.entries = entries;
        self.stale = false;
        self.result.insert(SortResult::from_images(images))
    }

    fn changed(&mut self, event: SortEvent) {
        self.stale = true;
        self.dirty = true;
        self.signal.emit(&event);
    }
}

fn project_all<C: Catalog>(
    catalog: &C,
    properties: &[Option<&Property>],
    records: &[RecordId],
) -> Vec<SortEntry> {
    records
        .iter()
        .filter_map(|id| {
            let record = catalog.record(*id)?;
            let keys = properties
                .iter()
                .map(|p| SortKey::project(*p, record, catalog))
                .collect();
            Some(SortEntry::new(*id, keys))
        })
        .collect()
}
