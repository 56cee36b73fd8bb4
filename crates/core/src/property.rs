//! Property definitions.
//!
//! A property describes the semantic type of the values records hold for it.
//! Filters and sort keys reference properties by id.

use serde::{Deserialize, Serialize};

pub use crate::types::PropertyId;

/// Semantic type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Free text
    String,
    /// Link, compared as text
    Url,
    /// File path, compared as text
    Path,
    /// Floating point number
    Number,
    /// Instant in time
    Date,
    /// Boolean flag
    Checkbox,
    /// Index into a color palette
    Color,
    /// Exactly one tag from the property's tag forest
    Tag,
    /// Any number of tags from the property's tag forest
    MultiTags,
    /// System field: folder the record lives in
    Folder,
    /// System field: image width
    Width,
    /// System field: image height
    Height,
    /// System field: content hash
    Sha1,
    /// System field: record id
    Id,
}

impl PropertyType {
    /// Returns whether values of this type compare as case-folded text.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            PropertyType::String | PropertyType::Url | PropertyType::Path | PropertyType::Sha1
        )
    }

    /// Returns whether values of this type compare as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            PropertyType::Number
                | PropertyType::Color
                | PropertyType::Width
                | PropertyType::Height
                | PropertyType::Id
        )
    }

    /// Returns whether values of this type reference tags.
    pub fn is_tag(&self) -> bool {
        matches!(self, PropertyType::Tag | PropertyType::MultiTags)
    }

    /// Returns whether the value is derived from the record itself instead
    /// of being stored in its value map.
    pub fn is_derived(&self) -> bool {
        matches!(self, PropertyType::Id | PropertyType::Folder)
    }
}

/// A typed attribute definition shared across records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Unique identifier
    pub id: PropertyId,
    /// Display name
    pub name: String,
    /// Value type
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

impl Property {
    /// Creates a new property definition.
    pub fn new(id: PropertyId, name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            id,
            name: name.into(),
            property_type,
        }
    }
}
