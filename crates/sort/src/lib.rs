//! Vista Sort - composite-key ordering of catalog records.
//!
//! Records are ordered by a list of sort properties, each with a direction.
//! Every property projects a record onto a [`SortKey`]; keys are compared in
//! priority order and full ties break by ascending record id, so the order
//! is total.
//!
//! # Incremental Updates
//!
//! After a full [`SortManager::sort`], changed records can be re-inserted
//! with [`SortManager::update_selection`]. Only the changed records are
//! projected and sorted; they are then merged into the cached order with a
//! bounded binary search (see [`insertion_point`]). The result always equals
//! a full sort of the same records.
//!
//! # Example
//!
//! ```rust
//! use vista_core::{MemoryCatalog, Property, PropertyType, Record};
//! use vista_sort::SortManager;
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert_property(Property::new(1, "p", PropertyType::Number));
//! catalog.insert_record(Record::new(1).with(1, 5.0));
//! catalog.insert_record(Record::new(2).with(1, 3.0));
//! catalog.insert_record(Record::new(3).with(1, 5.0));
//!
//! let mut sort = SortManager::new();
//! sort.set_sort(1, None);
//! assert_eq!(sort.sort(&catalog, &[1, 2, 3]).images, vec![2, 1, 3]);
//!
//! catalog.record_mut(2).unwrap().set(1, 10.0);
//! let result = sort.update_selection(&catalog, &[2], &[]).unwrap();
//! assert_eq!(result.images, vec![1, 3, 2]);
//! ```

pub mod compare;
pub mod key;
pub mod manager;
pub mod state;

pub use compare::{compare_sortable, insertion_point, SortEntry, LINEAR_SCAN_THRESHOLD};
pub use key::SortKey;
pub use manager::{SortEvent, SortManager, SortResult};
pub use state::{Direction, SortOption, SortState};
