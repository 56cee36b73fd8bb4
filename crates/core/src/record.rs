//! Record structure.
//!
//! This module defines the `Record` struct, a single catalog entity that the
//! engines filter and sort.

use crate::property::{Property, PropertyType};
use crate::types::{FolderId, PropertyId, RecordId};
use crate::value::Value;
use hashbrown::HashMap;
use std::borrow::Cow;

/// A record in the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Unique identifier for this record.
    id: RecordId,
    /// Folder the record lives in, if any.
    folder_id: Option<FolderId>,
    /// Values keyed by property id. Unset properties are absent.
    values: HashMap<PropertyId, Value>,
}

impl Record {
    /// Creates a new record with the given id and no values.
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            folder_id: None,
            values: HashMap::new(),
        }
    }

    /// Places the record in a folder.
    pub fn in_folder(mut self, folder_id: FolderId) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    /// Builder-style setter for one value.
    pub fn with(mut self, property_id: PropertyId, value: impl Into<Value>) -> Self {
        self.set(property_id, value);
        self
    }

    /// Returns the record id.
    #[inline]
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the folder id.
    #[inline]
    pub fn folder_id(&self) -> Option<FolderId> {
        self.folder_id
    }

    /// Moves the record to another folder.
    pub fn set_folder(&mut self, folder_id: Option<FolderId>) {
        self.folder_id = folder_id;
    }

    /// Gets the stored value for a property id.
    pub fn get(&self, property_id: PropertyId) -> Option<&Value> {
        self.values.get(&property_id)
    }

    /// Sets a value. Setting `Value::Null` removes the entry.
    pub fn set(&mut self, property_id: PropertyId, value: impl Into<Value>) {
        let value = value.into();
        if value.is_null() {
            self.values.remove(&property_id);
        } else {
            self.values.insert(property_id, value);
        }
    }

    /// Removes a value and returns it.
    pub fn remove(&mut self, property_id: PropertyId) -> Option<Value> {
        self.values.remove(&property_id)
    }

    /// Iterates over every stored `(property, value)` pair.
    pub fn values(&self) -> impl Iterator<Item = (PropertyId, &Value)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Resolves the value of a property for this record, including the
    /// system properties derived from the record itself.
    pub fn value(&self, property: &Property) -> Option<Cow<'_, Value>> {
        match property.property_type {
            PropertyType::Id => Some(Cow::Owned(Value::Number(self.id as f64))),
            PropertyType::Folder => self
                .folder_id
                .map(|folder| Cow::Owned(Value::Number(folder as f64))),
            _ => self.values.get(&property.id).map(Cow::Borrowed),
        }
    }
}
