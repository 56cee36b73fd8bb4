//! Vista Core - shared types for the Vista view engine.
//!
//! This crate provides the foundational types the filter engine, the sort
//! engine and the collection coordinator agree on:
//!
//! - `Value`: what a record holds for a property, or a filter is configured with
//! - `Record`: a catalog entity with a stable id and per-property values
//! - `Property` / `PropertyType`: typed attribute definitions
//! - `Tag` and `Forest`: tag and folder hierarchies with precomputed descendants
//! - `Catalog`: read access to the data store, with `MemoryCatalog` as an
//!   in-memory implementation
//! - `Signal`: explicit listener registration
//! - `Error`: configuration errors returned by the engine mutators
//!
//! # Example
//!
//! ```rust
//! use vista_core::{Catalog, MemoryCatalog, Property, PropertyType, Record, Tag, Value};
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert_property(Property::new(1, "animal", PropertyType::MultiTags));
//! catalog.insert_tag(Tag::new(10, 1, "Animal"));
//! catalog.insert_tag(Tag::new(11, 1, "Cat").with_parents(vec![10]));
//! catalog.insert_record(Record::new(1).with(1, Value::Tags(vec![11])));
//!
//! assert!(catalog.expand_tag(10).contains(&11));
//! assert_eq!(catalog.record(1).unwrap().get(1), Some(&Value::Tags(vec![11])));
//! ```

mod catalog;
mod error;
mod forest;
mod property;
mod record;
mod signal;
mod tag;
mod types;
mod value;

pub use catalog::{Catalog, MemoryCatalog};
pub use error::{Error, Result};
pub use forest::Forest;
pub use property::{Property, PropertyType};
pub use record::Record;
pub use signal::{ListenerId, Signal};
pub use tag::Tag;
pub use types::{FilterId, FolderId, PropertyId, RecordId, TagId, ROOT_FILTER_ID};
pub use value::Value;

/// Re-exported so downstream crates share one set of map types.
pub use hashbrown::{HashMap, HashSet};
