//! Identifier types shared by every Vista crate.
//!
//! Records, properties, tags and folders are owned by the data store and
//! referenced by id only. Filter node ids are owned by the filter tree.

/// Stable identity of a record ("instance").
pub type RecordId = u64;

/// Identity of a property definition.
pub type PropertyId = u64;

/// Identity of a tag node in a property's tag forest.
pub type TagId = u64;

/// Identity of a folder in the folder forest.
pub type FolderId = u64;

/// Identity of a node in a filter tree. The root group is always `0`.
pub type FilterId = u64;

/// Id of the root group of every filter tree.
pub const ROOT_FILTER_ID: FilterId = 0;
