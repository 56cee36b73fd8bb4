//! The record/property catalog the engines read from.
//!
//! The catalog is owned by the data store. Engines only ever read it, and
//! hold record ids instead of copies of records.

use crate::forest::Forest;
use crate::property::Property;
use crate::record::Record;
use crate::tag::Tag;
use crate::types::{FolderId, PropertyId, RecordId, TagId};
use hashbrown::{HashMap, HashSet};

/// Read access to records, properties, tags and folders.
pub trait Catalog {
    /// Looks up a record.
    fn record(&self, id: RecordId) -> Option<&Record>;

    /// Looks up a property definition.
    fn property(&self, id: PropertyId) -> Option<&Property>;

    /// Looks up a tag.
    fn tag(&self, id: TagId) -> Option<&Tag>;

    /// Returns the precomputed descendants of a tag (excluding the tag).
    fn tag_descendants(&self, id: TagId) -> Option<&HashSet<TagId>>;

    /// Returns the precomputed descendants of a folder (excluding the folder).
    fn folder_descendants(&self, id: FolderId) -> Option<&HashSet<FolderId>>;

    /// Returns `{id} ∪ descendants(id)` for a tag.
    fn expand_tag(&self, id: TagId) -> HashSet<TagId> {
        let mut set = self.tag_descendants(id).cloned().unwrap_or_default();
        set.insert(id);
        set
    }

    /// Returns `{id} ∪ descendants(id)` for a folder.
    fn expand_folder(&self, id: FolderId) -> HashSet<FolderId> {
        let mut set = self.folder_descendants(id).cloned().unwrap_or_default();
        set.insert(id);
        set
    }
}

/// An in-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    records: HashMap<RecordId, Record>,
    properties: HashMap<PropertyId, Property>,
    tags: HashMap<TagId, Tag>,
    tag_forest: Forest,
    folders: Forest,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the catalog holds no records.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns every record id in ascending order.
    pub fn record_ids(&self) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn insert_record(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.id(), record)
    }

    /// Returns a mutable reference to a record.
    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    /// Removes a record.
    pub fn remove_record(&mut self, id: RecordId) -> Option<Record> {
        self.records.remove(&id)
    }

    /// Inserts or replaces a property definition.
    pub fn insert_property(&mut self, property: Property) -> Option<Property> {
        self.properties.insert(property.id, property)
    }

    /// Removes a property together with its tags. Record values for the
    /// property are left in place; engines stop reading them once their
    /// state is verified.
    pub fn remove_property(&mut self, id: PropertyId) -> Option<Property> {
        let removed = self.properties.remove(&id)?;
        let tag_ids: Vec<TagId> = self
            .tags
            .values()
            .filter(|t| t.property_id == id)
            .map(|t| t.id)
            .collect();
        for tag in tag_ids {
            self.remove_tag(tag);
        }
        Some(removed)
    }

    /// Returns every property, in no particular order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    /// Inserts or replaces a tag and links it under its parents.
    pub fn insert_tag(&mut self, tag: Tag) -> Option<Tag> {
        self.tag_forest.insert(tag.id, &tag.parents);
        self.tags.insert(tag.id, tag)
    }

    /// Removes a tag. Its children become roots if it was their only parent.
    pub fn remove_tag(&mut self, id: TagId) -> Option<Tag> {
        let removed = self.tags.remove(&id)?;
        for child in self.tag_forest.children(id).to_vec() {
            if let Some(tag) = self.tags.get_mut(&child) {
                tag.parents.retain(|p| *p != id);
            }
        }
        self.tag_forest.remove(id);
        Some(removed)
    }

    /// Inserts a folder under an optional parent.
    pub fn insert_folder(&mut self, id: FolderId, parent: Option<FolderId>) {
        match parent {
            Some(parent) => self.folders.insert(id, &[parent]),
            None => self.folders.insert(id, &[]),
        }
    }

    /// Removes a folder.
    pub fn remove_folder(&mut self, id: FolderId) -> bool {
        self.folders.remove(id)
    }
}

impl Catalog for MemoryCatalog {
    fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(&id)
    }

    fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    fn tag_descendants(&self, id: TagId) -> Option<&HashSet<TagId>> {
        self.tag_forest.descendants(id)
    }

    fn folder_descendants(&self, id: FolderId) -> Option<&HashSet<FolderId>> {
        self.folders.descendants(id)
    }
}
