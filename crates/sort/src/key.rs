//! Sortable projections of record values.
//!
//! Each sort property maps a record to one [`SortKey`]. Keys produced for the
//! same property always share a variant, so the derived order is the order
//! of the projected values.

use ordered_float::OrderedFloat;
use vista_core::{Catalog, Property, PropertyType, Record};

/// One component of a record's composite sort key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    /// The sort property no longer resolves; every record compares equal
    Unresolved,
    /// Checkbox state, epoch milliseconds or a tag count
    Integer(Option<i64>),
    /// Numeric value; absent and NaN are `None`, which sorts first
    Number(Option<OrderedFloat<f64>>),
    /// Case-folded text
    Text(String),
}

impl SortKey {
    /// Projects a record onto the sortable form of one property.
    pub fn project<C: Catalog>(
        property: Option<&Property>,
        record: &Record,
        catalog: &C,
    ) -> Self {
        let Some(property) = property else {
            return SortKey::Unresolved;
        };
        let value = record.value(property);
        let value = value.as_deref();

        match property.property_type {
            PropertyType::Checkbox => {
                let checked = value.and_then(|v| v.as_bool()).unwrap_or(false);
                SortKey::Integer(Some(i64::from(checked)))
            }
            PropertyType::Date => SortKey::Integer(value.and_then(|v| v.as_millis())),
            PropertyType::MultiTags => {
                SortKey::Integer(Some(value.map_or(0, |v| v.tags().len()) as i64))
            }
            PropertyType::Tag => {
                let name = value
                    .and_then(|v| v.tags().first())
                    .and_then(|id| catalog.tag(*id))
                    .map(|tag| tag.value.to_lowercase())
                    .unwrap_or_default();
                SortKey::Text(name)
            }
            ty if ty.is_text() => SortKey::Text(
                value
                    .and_then(|v| v.as_str())
                    .map(str::to_lowercase)
                    .unwrap_or_default(),
            ),
            _ => SortKey::Number(
                value
                    .and_then(|v| v.as_f64())
                    .filter(|n| !n.is_nan())
                    .map(OrderedFloat),
            ),
        }
    }
}
