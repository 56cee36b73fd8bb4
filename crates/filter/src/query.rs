//! Free-text query matching.
//!
//! A query matches a record when any text value (String, Url, Path) or the
//! display name of any tag assigned to the record contains the query as a
//! case-insensitive substring.

use vista_core::{Catalog, PropertyType, Record, Value};

/// A prepared free-text query.
#[derive(Clone, Debug)]
pub struct TextQuery {
    needle: String,
}

impl TextQuery {
    /// Prepares a query. Returns None for an empty or blank query.
    pub fn new(query: &str) -> Option<Self> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            None
        } else {
            Some(Self { needle })
        }
    }

    /// Returns whether the record matches.
    pub fn matches<C: Catalog>(&self, record: &Record, catalog: &C) -> bool {
        record.values().any(|(property_id, value)| {
            let Some(property) = catalog.property(property_id) else {
                return false;
            };
            match property.property_type {
                PropertyType::String | PropertyType::Url | PropertyType::Path => {
                    matches!(value, Value::String(s) if self.contains(s))
                }
                PropertyType::Tag | PropertyType::MultiTags => value
                    .tags()
                    .iter()
                    .filter_map(|id| catalog.tag(*id))
                    .any(|tag| self.contains(&tag.value)),
                _ => false,
            }
        })
    }

    fn contains(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }
}
