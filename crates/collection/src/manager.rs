//! The collection coordinator.
//!
//! `CollectionManager` owns one filter engine and one sort engine, tracks the
//! pool of records the view is built from, and turns store notifications
//! into either a full or an incremental recompute.

use crate::change::RecordChange;
use crate::group::{GroupStage, NoGrouping};
use crate::options::CollectionOptions;
use hashbrown::HashSet;
use vista_core::{Catalog, ListenerId, RecordId, Result, Signal};
use vista_filter::{FilterManager, FilterState};
use vista_sort::{SortManager, SortResult, SortState};

/// How a recompute produced its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Filter and sort ran over the whole pool
    Full,
    /// Only changed records were re-evaluated
    Incremental,
    /// The last filter result was sorted again after a sort edit
    Resort,
}

/// Published after every recompute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionEvent {
    pub result: SortResult,
    pub mode: UpdateMode,
}

/// Coordinates filter, sort and grouping for one view.
pub struct CollectionManager<G = NoGrouping> {
    filter: FilterManager,
    sort: SortManager,
    grouping: G,
    options: CollectionOptions,
    pool: Vec<RecordId>,
    members: HashSet<RecordId>,
    dirty: bool,
    result: Option<SortResult>,
    signal: Signal<CollectionEvent>,
}

impl CollectionManager<NoGrouping> {
    /// Creates a coordinator without grouping.
    pub fn new(options: CollectionOptions) -> Self {
        Self::with_grouping(options, NoGrouping)
    }
}

impl<G: GroupStage> CollectionManager<G> {
    /// Creates a coordinator that feeds `grouping`.
    pub fn with_grouping(options: CollectionOptions, grouping: G) -> Self {
        Self {
            filter: FilterManager::new(),
            sort: SortManager::new(),
            grouping,
            options,
            pool: Vec::new(),
            members: HashSet::new(),
            dirty: false,
            result: None,
            signal: Signal::new(),
        }
    }

    /// Returns the filter engine.
    #[inline]
    pub fn filter(&self) -> &FilterManager {
        &self.filter
    }

    /// Returns the sort engine.
    #[inline]
    pub fn sort(&self) -> &SortManager {
        &self.sort
    }

    #[inline]
    pub fn grouping(&self) -> &G {
        &self.grouping
    }

    #[inline]
    pub fn grouping_mut(&mut self) -> &mut G {
        &mut self.grouping
    }

    #[inline]
    pub fn options(&self) -> CollectionOptions {
        self.options
    }

    /// Turns automatic recomputation on or off. Pending changes stay
    /// pending until the next update.
    pub fn set_auto_reload(&mut self, auto_reload: bool) {
        self.options.auto_reload = auto_reload;
    }

    /// Returns the records the view is built from.
    #[inline]
    pub fn pool(&self) -> &[RecordId] {
        &self.pool
    }

    /// Returns the published result.
    #[inline]
    pub fn result(&self) -> Option<&SortResult> {
        self.result.as_ref()
    }

    /// Returns whether changes arrived that the result does not reflect.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Registers a listener for published results.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&CollectionEvent) + 'static,
    {
        self.signal.subscribe(callback)
    }

    /// Removes a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.signal.unsubscribe(id)
    }

    /// Handles a store notification naming the changed records.
    pub fn on_change<C: Catalog>(&mut self, catalog: &C, change: &RecordChange) {
        if change.is_empty() {
            return;
        }
        let was_dirty = self.dirty;
        self.apply_membership(change);
        self.dirty = true;

        if !self.options.auto_reload {
            tracing::debug!(changed = change.len(), "auto reload off, view marked dirty");
            return;
        }
        if was_dirty {
            tracing::debug!("earlier changes are pending, running full update");
            self.run_full(catalog);
            return;
        }
        // A removed record the catalog still resolves would pass the filter again.
        if change.removed.iter().any(|id| catalog.record(*id).is_some()) {
            tracing::warn!("removed records still resolve in the catalog, running full update");
            self.run_full(catalog);
            return;
        }
        self.run_incremental(catalog, &change.ids());
    }

    /// Handles a store notification that replaced the whole pool.
    pub fn on_pool_replaced<C: Catalog>(&mut self, catalog: &C, records: Vec<RecordId>) {
        self.replace_pool(records);
        self.dirty = true;
        if self.options.auto_reload {
            self.run_full(catalog);
        }
    }

    /// Runs the full pipeline, optionally over a new pool.
    pub fn update<C: Catalog>(&mut self, catalog: &C, records: Option<Vec<RecordId>>) {
        if let Some(records) = records {
            self.replace_pool(records);
        }
        self.run_full(catalog);
    }

    /// Edits the filter configuration and recomputes when it changed.
    pub fn edit_filter<C, F, R>(&mut self, catalog: &C, edit: F) -> R
    where
        C: Catalog,
        F: FnOnce(&mut FilterManager) -> R,
    {
        let out = edit(&mut self.filter);
        if self.filter.take_dirty() {
            self.run_full(catalog);
        }
        out
    }

    /// Edits the sort configuration and re-sorts when it changed.
    pub fn edit_sort<C, F, R>(&mut self, catalog: &C, edit: F) -> R
    where
        C: Catalog,
        F: FnOnce(&mut SortManager) -> R,
    {
        let out = edit(&mut self.sort);
        if self.sort.take_dirty() {
            self.run_resort(catalog);
        }
        out
    }

    /// Prunes references to deleted properties and tags from both engines
    /// and recomputes if anything was pruned. Returns whether it did.
    pub fn verify_state<C: Catalog>(&mut self, catalog: &C) -> bool {
        let filter_pruned = !self.filter.verify_state(catalog).is_empty();
        let sort_pruned = !self.sort.verify_state(catalog).is_empty();
        self.filter.take_dirty();
        self.sort.take_dirty();
        if filter_pruned {
            self.run_full(catalog);
        } else if sort_pruned {
            self.run_resort(catalog);
        }
        filter_pruned || sort_pruned
    }

    /// Restores saved engine states and recomputes. Nothing changes when
    /// the filter state fails to load.
    pub fn load_state<C: Catalog>(
        &mut self,
        catalog: &C,
        filter: &FilterState,
        sort: &SortState,
    ) -> Result<()> {
        self.filter.load_state(filter)?;
        self.sort.load_state(sort)?;
        self.filter.take_dirty();
        self.sort.take_dirty();
        self.run_full(catalog);
        Ok(())
    }

    /// Snapshots the filter configuration.
    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }

    /// Snapshots the sort configuration.
    pub fn sort_state(&self) -> SortState {
        self.sort.state().clone()
    }

    /// Removals go first, so an id that a merged batch both removes and
    /// re-adds stays in the pool.
    fn apply_membership(&mut self, change: &RecordChange) {
        if !change.removed.is_empty() {
            let removed: HashSet<RecordId> = change.removed.iter().copied().collect();
            self.members.retain(|id| !removed.contains(id));
            self.pool.retain(|id| !removed.contains(id));
        }
        for id in change.added.iter().chain(&change.modified) {
            if self.members.insert(*id) {
                self.pool.push(*id);
            }
        }
    }

    fn replace_pool(&mut self, records: Vec<RecordId>) {
        self.members.clear();
        self.pool = records
            .into_iter()
            .filter(|id| self.members.insert(*id))
            .collect();
    }

    fn run_full<C: Catalog>(&mut self, catalog: &C) {
        let filtered = self.filter.filter(catalog, &self.pool).records.clone();
        let result = self.sort.sort(catalog, &filtered).clone();
        self.grouping.group(&result.images, &result.order);
        tracing::debug!(
            pool = self.pool.len(),
            visible = result.len(),
            "full view update"
        );
        self.publish(result, UpdateMode::Full);
    }

    fn run_incremental<C: Catalog>(&mut self, catalog: &C, changed: &[RecordId]) {
        let Some(selection) = self.filter.update_selection(catalog, changed) else {
            self.run_full(catalog);
            return;
        };
        let result = self
            .sort
            .update_selection(catalog, &selection.updated, &selection.removed)
            .cloned();
        let Some(result) = result else {
            self.run_full(catalog);
            return;
        };
        self.grouping.group(&result.images, &result.order);
        tracing::debug!(
            changed = changed.len(),
            updated = selection.updated.len(),
            removed = selection.removed.len(),
            visible = result.len(),
            "incremental view update"
        );
        self.publish(result, UpdateMode::Incremental);
    }

    fn run_resort<C: Catalog>(&mut self, catalog: &C) {
        let filtered = match self.filter.result() {
            Some(filtered) if !self.dirty => filtered.records.clone(),
            _ => {
                self.run_full(catalog);
                return;
            }
        };
        let result = self.sort.sort(catalog, &filtered).clone();
        self.grouping.sort(&result.order);
        tracing::debug!(visible = result.len(), "view re-sorted");
        self.publish(result, UpdateMode::Resort);
    }

    fn publish(&mut self, result: SortResult, mode: UpdateMode) {
        self.dirty = false;
        let event = CollectionEvent { result, mode };
        self.signal.emit(&event);
        self.result = Some(event.result);
    }
}

impl<G: core::fmt::Debug> core::fmt::Debug for CollectionManager<G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollectionManager")
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("grouping", &self.grouping)
            .field("options", &self.options)
            .field("pool", &self.pool.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
