//! Error types for the Vista view engine.

use crate::property::PropertyType;
use crate::types::{FilterId, PropertyId};

/// Result type alias for Vista operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Configuration errors raised by the filter and sort mutators.
///
/// Every mutator that returns one of these leaves its state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No filter node with this id exists in the tree.
    #[error("filter {id} not found")]
    FilterNotFound { id: FilterId },

    /// The node exists but is a leaf, so it cannot take children.
    #[error("filter {id} is not a group")]
    NotAGroup { id: FilterId },

    /// The node exists but is a group, so it has no property or value.
    #[error("filter {id} is a group, expected a leaf filter")]
    NotALeaf { id: FilterId },

    /// The root group is part of every tree and cannot be removed.
    #[error("the root filter group cannot be deleted")]
    RootNotDeletable,

    /// The operator is not in the legal set of the property's type.
    #[error("operator {operator} is not allowed on {property_type:?} properties")]
    IllegalOperator {
        operator: String,
        property_type: PropertyType,
    },

    /// A property id that the catalog does not know.
    #[error("property {id} not found")]
    PropertyNotFound { id: PropertyId },

    /// A saved state reuses a node id.
    #[error("duplicate filter id {id} in saved state")]
    DuplicateFilterId { id: FilterId },

    /// A saved state that cannot be loaded for another reason.
    #[error("invalid state: {message}")]
    InvalidState { message: String },
}

impl Error {
    /// Creates a filter not found error.
    pub fn filter_not_found(id: FilterId) -> Self {
        Error::FilterNotFound { id }
    }

    /// Creates an illegal operator error.
    pub fn illegal_operator(operator: impl Into<String>, property_type: PropertyType) -> Self {
        Error::IllegalOperator {
            operator: operator.into(),
            property_type,
        }
    }

    /// Creates a property not found error.
    pub fn property_not_found(id: PropertyId) -> Self {
        Error::PropertyNotFound { id }
    }

    /// Creates an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState {
            message: message.into(),
        }
    }
}
