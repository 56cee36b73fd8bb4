//! Tag nodes of tag-typed properties.

use crate::types::{PropertyId, TagId};
use serde::{Deserialize, Serialize};

/// A tag: one enumerated value of a `Tag` or `MultiTags` property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier, global across properties
    pub id: TagId,
    /// Property this tag belongs to
    pub property_id: PropertyId,
    /// Display name
    pub value: String,
    /// Parent tags; empty for roots
    #[serde(default)]
    pub parents: Vec<TagId>,
}

impl Tag {
    /// Creates a root tag.
    pub fn new(id: TagId, property_id: PropertyId, value: impl Into<String>) -> Self {
        Self {
            id,
            property_id,
            value: value.into(),
            parents: Vec::new(),
        }
    }

    /// Sets the parent tags.
    pub fn with_parents(mut self, parents: Vec<TagId>) -> Self {
        self.parents = parents;
        self
    }
}
