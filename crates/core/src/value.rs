//! Value type definitions.
//!
//! This module defines the `Value` enum which represents anything a record can
//! hold for a property, and anything a filter can be configured with.

use crate::types::TagId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value held by a record for one property, or configured on a filter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// No value
    #[default]
    Null,
    /// Boolean value (checkbox)
    Boolean(bool),
    /// Numeric value; integers are stored as f64
    Number(f64),
    /// UTF-8 string
    String(String),
    /// Instant in time
    Date(DateTime<Utc>),
    /// A single tag reference
    Tag(TagId),
    /// A list of tag references
    Tags(Vec<TagId>),
}

impl Value {
    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for values that count as "not set": Null, the empty
    /// string and the empty tag list.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Tags(tags) => tags.is_empty(),
            _ => false,
        }
    }

    /// Returns the boolean value if this is a Boolean, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the number if this is a Number, None otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns the instant if this is a Date, None otherwise.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the date as epoch milliseconds, the comparable form of a date.
    pub fn as_millis(&self) -> Option<i64> {
        self.as_date().map(|d| d.timestamp_millis())
    }

    /// Returns the referenced tags as a slice. A single tag is a one-element
    /// slice; every other variant yields an empty slice.
    pub fn tags(&self) -> &[TagId] {
        match self {
            Value::Tag(tag) => core::slice::from_ref(tag),
            Value::Tags(tags) => tags.as_slice(),
            _ => &[],
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Tag(a), Value::Tag(b)) => a == b,
            (Value::Tags(a), Value::Tags(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Date(v)
    }
}

impl From<Vec<TagId>> for Value {
    fn from(v: Vec<TagId>) -> Self {
        Value::Tags(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
