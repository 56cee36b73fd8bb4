//! Vista Filter - boolean predicate trees over catalog records.
//!
//! A view's filter is a tree of AND/OR groups whose leaves compare one
//! property of a record against a configured value. The tree lives in a flat
//! arena keyed by node id; see [`FilterTree`].
//!
//! # Evaluation
//!
//! - A full pass runs every record through the optional folder restriction,
//!   the optional free-text query and then the tree.
//! - An incremental pass re-evaluates only changed records and patches the
//!   previous result. It is equivalent to a full pass over the new pool.
//! - AND groups feed each child's accepted records into the next child, OR
//!   groups feed each child's rejected records into the next child.
//!
//! # Example
//!
//! ```rust
//! use vista_core::{MemoryCatalog, Property, PropertyType, Record, ROOT_FILTER_ID};
//! use vista_filter::{FilterManager, Operator};
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.insert_property(Property::new(1, "size", PropertyType::Number));
//! catalog.insert_record(Record::new(1).with(1, 4.0));
//! catalog.insert_record(Record::new(2).with(1, 40.0));
//!
//! let mut filter = FilterManager::new();
//! filter
//!     .add_filter(&catalog, ROOT_FILTER_ID, 1, Operator::Greater, 10.0.into())
//!     .unwrap();
//!
//! let result = filter.filter(&catalog, &catalog.record_ids());
//! assert_eq!(result.records, vec![2]);
//! ```

pub mod compile;
pub mod manager;
pub mod operator;
pub mod query;
pub mod state;
pub mod tree;

pub use compile::{CompiledFilter, Partition};
pub use manager::{FilterEvent, FilterManager, FilterResult, FilterUpdate, SelectionUpdate};
pub use operator::{default_operator, operators_for, GroupOperator, Operator};
pub use query::TextQuery;
pub use state::{FilterState, GroupState, NodeState};
pub use tree::{Filter, FilterGroup, FilterNode, FilterTree};
