//! The filter engine of one view.
//!
//! `FilterManager` owns the configuration (tree, folder restriction, query)
//! and the last result. Mutators never recompute: they raise the dirty flag
//! and emit a [`FilterEvent`], and the owner decides when to run the next
//! pass.

use crate::compile::CompiledFilter;
use crate::operator::{default_operator, GroupOperator, Operator};
use crate::state::FilterState;
use crate::tree::{Filter, FilterNode, FilterTree};
use hashbrown::HashSet;
use vista_core::{
    Catalog, Error, FilterId, FolderId, ListenerId, PropertyId, RecordId, Result, Signal, Value,
};

/// Ordered ids of the records passing the filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterResult {
    pub records: Vec<RecordId>,
}

impl FilterResult {
    /// Returns the number of passing records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when nothing passes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of an incremental pass over a set of changed records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionUpdate {
    /// Changed records that pass the filter now
    pub updated: Vec<RecordId>,
    /// Changed records that do not pass (or no longer exist)
    pub removed: Vec<RecordId>,
}

/// Emitted by every mutator that changed the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterEvent {
    /// A node was added, removed or edited
    TreeChanged { id: FilterId },
    FoldersChanged,
    QueryChanged,
    /// `verify_state` rewrote or removed these leaves
    Pruned { ids: Vec<FilterId> },
    /// A saved state replaced the configuration
    Loaded,
}

/// Partial edit of a leaf filter. `None` fields are left as they are.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterUpdate {
    pub property_id: Option<PropertyId>,
    pub operator: Option<Operator>,
    pub value: Option<Value>,
}

/// Filter engine state and result.
#[derive(Debug, Default)]
pub struct FilterManager {
    tree: FilterTree,
    folders: Vec<FolderId>,
    query: String,
    result: Option<FilterResult>,
    /// Configuration changed since `result` was computed
    stale: bool,
    dirty: bool,
    signal: Signal<FilterEvent>,
}

impl FilterManager {
    /// Creates an engine with an empty AND root, no folder restriction and
    /// no query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine from a saved state.
    pub fn from_state(state: &FilterState) -> Result<Self> {
        let mut manager = Self::new();
        manager.load_state(state)?;
        manager.dirty = false;
        Ok(manager)
    }

    /// Returns the filter tree.
    #[inline]
    pub fn tree(&self) -> &FilterTree {
        &self.tree
    }

    /// Returns the folder restriction.
    #[inline]
    pub fn folders(&self) -> &[FolderId] {
        &self.folders
    }

    /// Returns the free-text query.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the result of the last pass.
    #[inline]
    pub fn result(&self) -> Option<&FilterResult> {
        self.result.as_ref()
    }

    /// Returns whether the configuration changed since the last pass.
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
        F: Fn(&FilterEvent) + 'static,
    {
        self.signal.subscribe(callback)
    }

    /// Removes a listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.signal.unsubscribe(id)
    }

    /// Runs a full pass over `records` and stores the result.
    pub fn filter<C: Catalog>(&mut self, catalog: &C, records: &[RecordId]) -> &FilterResult {
        let compiled = self.compile(catalog);
        let partition = compiled.partition(records, catalog);
        tracing::trace!(
            input = records.len(),
            valid = partition.valid.len(),
            rejected = partition.reject.len(),
            "filter pass"
        );
        self.stale = false;
        self.result.insert(FilterResult {
            records: partition.valid,
        })
    }

    /// Re-evaluates only the `changed` records against the last result.
    ///
    /// Returns None when there is no result to update or the configuration
    /// changed since it was computed; run [`filter`](Self::filter) instead.
    pub fn update_selection<C: Catalog>(
        &mut self,
        catalog: &C,
        changed: &[RecordId],
    ) -> Option<SelectionUpdate> {
        if self.stale {
            tracing::warn!("filter configuration changed since the last pass");
            return None;
        }
        let compiled = self.compile(catalog);
        let Some(result) = self.result.as_mut() else {
            tracing::warn!("no previous filter result to update");
            return None;
        };

        let changed_set: HashSet<RecordId> = changed.iter().copied().collect();
        let mut unique = Vec::with_capacity(changed_set.len());
        let mut seen = HashSet::with_capacity(changed_set.len());
        for id in changed {
            if seen.insert(*id) {
                unique.push(*id);
            }
        }

        let partition = compiled.partition(&unique, catalog);
        result.records.retain(|id| !changed_set.contains(id));
        result.records.extend_from_slice(&partition.valid);

        tracing::trace!(
            changed = unique.len(),
            updated = partition.valid.len(),
            removed = partition.reject.len(),
            "incremental filter pass"
        );
        Some(SelectionUpdate {
            updated: partition.valid,
            removed: partition.reject,
        })
    }

    /// Adds an empty group under `parent`.
    pub fn add_new_filter_group(
        &mut self,
        parent: FilterId,
        group_operator: GroupOperator,
    ) -> Result<FilterId> {
        let id = self.tree.insert_group(parent, group_operator)?;
        self.changed(FilterEvent::TreeChanged { id });
        Ok(id)
    }

    /// Adds a leaf on `property_id` with the type's default operator and no
    /// value, which leaves it inactive until a value is set.
    pub fn add_new_filter<C: Catalog>(
        &mut self,
        catalog: &C,
        parent: FilterId,
        property_id: PropertyId,
    ) -> Result<FilterId> {
        let property = catalog
            .property(property_id)
            .ok_or_else(|| Error::property_not_found(property_id))?;
        let operator = default_operator(property.property_type);
        let id = self
            .tree
            .insert_filter(parent, property_id, operator, Value::Null)?;
        self.changed(FilterEvent::TreeChanged { id });
        Ok(id)
    }

    /// Adds a fully configured leaf.
    pub fn add_filter<C: Catalog>(
        &mut self,
        catalog: &C,
        parent: FilterId,
        property_id: PropertyId,
        operator: Operator,
        value: Value,
    ) -> Result<FilterId> {
        let property = catalog
            .property(property_id)
            .ok_or_else(|| Error::property_not_found(property_id))?;
        if !operator.is_allowed_on(property.property_type) {
            return Err(Error::illegal_operator(operator.name(), property.property_type));
        }
        let id = self.tree.insert_filter(parent, property_id, operator, value)?;
        self.changed(FilterEvent::TreeChanged { id });
        Ok(id)
    }

    /// Removes a node; groups take their subtree with them.
    pub fn delete_filter(&mut self, id: FilterId) -> Result<Vec<FilterId>> {
        let removed = self.tree.remove(id)?;
        self.changed(FilterEvent::TreeChanged { id });
        Ok(removed)
    }

    /// Edits a leaf. Every change is validated before any is applied.
    ///
    /// Moving to a property whose type rejects the current operator resets
    /// the operator to that type's default and clears the value.
    pub fn update_filter<C: Catalog>(
        &mut self,
        catalog: &C,
        id: FilterId,
        update: FilterUpdate,
    ) -> Result<()> {
        let current = match self.tree.get(id) {
            Some(FilterNode::Leaf(filter)) => filter,
            Some(_) => return Err(Error::NotALeaf { id }),
            None => return Err(Error::filter_not_found(id)),
        };

        let property_id = update.property_id.unwrap_or(current.property_id);
        let property_type = match catalog.property(property_id) {
            Some(property) => Some(property.property_type),
            None if update.property_id.is_some() => {
                return Err(Error::property_not_found(property_id))
            }
            None => None,
        };

        let mut next = Filter {
            id,
            property_id,
            operator: current.operator,
            value: current.value.clone(),
        };
        if property_id != current.property_id {
            if let Some(ty) = property_type {
                if !next.operator.is_allowed_on(ty) {
                    next.operator = default_operator(ty);
                    next.value = Value::Null;
                }
            }
        }
        if let Some(operator) = update.operator {
            if let Some(ty) = property_type {
                if !operator.is_allowed_on(ty) {
                    return Err(Error::illegal_operator(operator.name(), ty));
                }
            }
            next.operator = operator;
        }
        if let Some(value) = update.value {
            next.value = value;
        }

        let slot = self.tree.filter_mut(id)?;
        if *slot != next {
            *slot = next;
            self.changed(FilterEvent::TreeChanged { id });
        }
        Ok(())
    }

    /// Changes the combinator of a group.
    pub fn update_filter_group(
        &mut self,
        id: FilterId,
        group_operator: GroupOperator,
    ) -> Result<()> {
        let group = self.tree.group_mut(id)?;
        if group.group_operator != group_operator {
            group.group_operator = group_operator;
            self.changed(FilterEvent::TreeChanged { id });
        }
        Ok(())
    }

    /// Restricts the view to these folders and their sub-folders. An empty
    /// list lifts the restriction.
    pub fn set_folders(&mut self, folders: Vec<FolderId>) {
        if self.folders != folders {
            self.folders = folders;
            self.changed(FilterEvent::FoldersChanged);
        }
    }

    /// Sets the free-text query. An empty query is inactive.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.query != query {
            self.query = query;
            self.changed(FilterEvent::QueryChanged);
        }
    }

    /// Removes leaves whose property no longer exists and drops tag ids
    /// that no longer resolve. Returns the ids of affected leaves.
    pub fn verify_state<C: Catalog>(&mut self, catalog: &C) -> Vec<FilterId> {
        let mut orphaned = Vec::new();
        let mut rewritten = Vec::new();
        for filter in self.tree.filters() {
            match catalog.property(filter.property_id) {
                None => orphaned.push(filter.id),
                Some(property) if property.property_type.is_tag() => {
                    let tags = filter.value.tags();
                    let kept: Vec<_> = tags
                        .iter()
                        .copied()
                        .filter(|t| catalog.tag(*t).is_some())
                        .collect();
                    if kept.len() != tags.len() {
                        let value = if kept.is_empty() {
                            Value::Null
                        } else if kept.len() == 1 && matches!(filter.value, Value::Tag(_)) {
                            Value::Tag(kept[0])
                        } else {
                            Value::Tags(kept)
                        };
                        rewritten.push((filter.id, value));
                    }
                }
                Some(_) => {}
            }
        }

        let mut affected = Vec::with_capacity(orphaned.len() + rewritten.len());
        for id in orphaned {
            // A leaf can already be gone when an earlier removal took it.
            if self.tree.remove(id).is_ok() {
                affected.push(id);
            }
        }
        for (id, value) in rewritten {
            if let Ok(filter) = self.tree.filter_mut(id) {
                filter.value = value;
                affected.push(id);
            }
        }

        if !affected.is_empty() {
            affected.sort_unstable();
            tracing::info!(filters = ?affected, "pruned stale filters");
            self.changed(FilterEvent::Pruned {
                ids: affected.clone(),
            });
        }
        affected
    }

    /// Replaces the configuration with a saved state. On error nothing
    /// changes.
    pub fn load_state(&mut self, state: &FilterState) -> Result<()> {
        let tree = FilterTree::from_state(&state.filter)?;
        self.tree = tree;
        self.folders = state.folders.clone();
        self.query = state.query.clone();
        self.changed(FilterEvent::Loaded);
        Ok(())
    }

    /// Snapshots the configuration.
    pub fn state(&self) -> FilterState {
        FilterState {
            folders: self.folders.clone(),
            filter: self.tree.to_state(),
            query: self.query.clone(),
        }
    }

    fn compile<C: Catalog>(&self, catalog: &C) -> CompiledFilter {
        CompiledFilter::compile(&self.tree, &self.folders, &self.query, catalog)
    }

    fn changed(&mut self, event: FilterEvent) {
        self.stale = true;
        self.dirty = true;
        self.signal.emit(&event);
    }
}
