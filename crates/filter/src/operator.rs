//! The fixed operator set and its legality per property type.

use serde::{Deserialize, Serialize};
use vista_core::PropertyType;

/// Leaf filter operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    EqualNot,
    /// Case-insensitive regular expression match
    Like,
    Lower,
    Leq,
    Greater,
    Geq,
    IsTrue,
    IsFalse,
    /// Case-insensitive substring
    Contains,
    /// Case-insensitive prefix
    StartsWith,
    ContainsAny,
    ContainsAll,
    ContainsNot,
    IsSet,
    NotSet,
}

/// Combinator of a filter group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    #[default]
    And,
    Or,
}

const TEXT_OPERATORS: &[Operator] = &[
    Operator::Equal,
    Operator::EqualNot,
    Operator::Like,
    Operator::Contains,
    Operator::StartsWith,
    Operator::IsSet,
    Operator::NotSet,
];

const ORDERED_OPERATORS: &[Operator] = &[
    Operator::Equal,
    Operator::EqualNot,
    Operator::Lower,
    Operator::Leq,
    Operator::Greater,
    Operator::Geq,
    Operator::IsSet,
    Operator::NotSet,
];

const CHECKBOX_OPERATORS: &[Operator] = &[Operator::IsTrue, Operator::IsFalse];

const TAG_OPERATORS: &[Operator] = &[
    Operator::ContainsAny,
    Operator::ContainsAll,
    Operator::ContainsNot,
    Operator::IsSet,
    Operator::NotSet,
];

const FOLDER_OPERATORS: &[Operator] = &[
    Operator::ContainsAny,
    Operator::ContainsNot,
    Operator::Equal,
    Operator::EqualNot,
];

/// Returns the operators a property type accepts. The first entry is the
/// default operator for new filters.
pub fn operators_for(property_type: PropertyType) -> &'static [Operator] {
    match property_type {
        PropertyType::String | PropertyType::Url | PropertyType::Path | PropertyType::Sha1 => {
            TEXT_OPERATORS
        }
        PropertyType::Number
        | PropertyType::Width
        | PropertyType::Height
        | PropertyType::Id
        | PropertyType::Color
        | PropertyType::Date => ORDERED_OPERATORS,
        PropertyType::Checkbox => CHECKBOX_OPERATORS,
        PropertyType::Tag | PropertyType::MultiTags => TAG_OPERATORS,
        PropertyType::Folder => FOLDER_OPERATORS,
    }
}

/// Returns the operator new filters on this property type start with.
pub fn default_operator(property_type: PropertyType) -> Operator {
    operators_for(property_type)[0]
}

impl Operator {
    /// Returns the serialized name of the operator.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Equal => "equal",
            Operator::EqualNot => "equalNot",
            Operator::Like => "like",
            Operator::Lower => "lower",
            Operator::Leq => "leq",
            Operator::Greater => "greater",
            Operator::Geq => "geq",
            Operator::IsTrue => "isTrue",
            Operator::IsFalse => "isFalse",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::ContainsAny => "containsAny",
            Operator::ContainsAll => "containsAll",
            Operator::ContainsNot => "containsNot",
            Operator::IsSet => "isSet",
            Operator::NotSet => "notSet",
        }
    }

    /// Returns whether the operator is legal on the given property type.
    pub fn is_allowed_on(&self, property_type: PropertyType) -> bool {
        operators_for(property_type).contains(self)
    }

    /// Returns whether the operator reads the filter's configured value.
    /// Unary operators only look at the record value.
    pub fn takes_operand(&self) -> bool {
        !matches!(
            self,
            Operator::IsTrue | Operator::IsFalse | Operator::IsSet | Operator::NotSet
        )
    }

    /// Returns whether a record without a value satisfies the operator when
    /// the filter itself is active.
    pub fn accepts_empty_record(&self) -> bool {
        matches!(
            self,
            Operator::EqualNot | Operator::ContainsNot | Operator::NotSet | Operator::IsFalse
        )
    }
}
