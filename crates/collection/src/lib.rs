//! Vista Collection - live views over a record catalog.
//!
//! A [`CollectionManager`] composes the filter engine and the sort engine
//! into one pipeline and republishes its ordered output to a
//! [`GroupStage`] and to registered listeners.
//!
//! # Operating Modes
//!
//! - Full: the filter runs over the whole pool, the sort over the filter's
//!   output. Used for explicit updates, pool replacement, filter edits and
//!   whenever an incremental result is not available.
//! - Incremental: only records named by a [`RecordChange`] are re-filtered
//!   and re-inserted into the previous order.
//!
//! With `auto_reload` off, notifications only mark the view dirty; the next
//! [`CollectionManager::update`] brings it up to date.
//!
//! # Example
//!
//! ```rust
//! use vista_collection::{CollectionManager, CollectionOptions, RecordChange};
//! use vista_core::{MemoryCatalog, Property, PropertyType, Record};
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert_property(Property::new(1, "p", PropertyType::Number));
//! catalog.insert_record(Record::new(1).with(1, 5.0));
//! catalog.insert_record(Record::new(2).with(1, 3.0));
//!
//! let mut view = CollectionManager::new(CollectionOptions::default());
//! view.edit_sort(&catalog, |sort| sort.set_sort(1, None));
//! view.update(&catalog, Some(catalog.record_ids()));
//! assert_eq!(view.result().unwrap().images, vec![2, 1]);
//!
//! catalog.insert_record(Record::new(3).with(1, 4.0));
//! view.on_change(&catalog, &RecordChange::added([3]));
//! assert_eq!(view.result().unwrap().images, vec![2, 3, 1]);
//! ```

pub mod change;
pub mod group;
pub mod manager;
pub mod options;

pub use change::RecordChange;
pub use group::{GroupStage, NoGrouping};
pub use manager::{CollectionEvent, CollectionManager, UpdateMode};
pub use options::CollectionOptions;

// Re-export the engine types a view is configured with
pub use vista_filter::{FilterManager, FilterState};
pub use vista_sort::{SortManager, SortResult, SortState};
