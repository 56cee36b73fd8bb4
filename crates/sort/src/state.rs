//! Sort configuration of one view.

use core::cmp::Ordering;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vista_core::PropertyId;

/// Sort direction of one key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Smallest first
    #[default]
    Asc,
    /// Largest first
    Desc,
}

impl Direction {
    /// Applies this direction to a comparison result.
    #[inline]
    pub fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

/// Per-key options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    #[serde(default)]
    pub direction: Direction,
}

impl SortOption {
    pub fn asc() -> Self {
        Self {
            direction: Direction::Asc,
        }
    }

    pub fn desc() -> Self {
        Self {
            direction: Direction::Desc,
        }
    }
}

/// Saved sort configuration: keys by priority plus their options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    /// `sort_by[0]` is the primary key; no property appears twice
    #[serde(default)]
    pub sort_by: Vec<PropertyId>,
    #[serde(default)]
    pub options: BTreeMap<PropertyId, SortOption>,
}

impl SortState {
    /// Returns the direction of a key, ascending when no option is stored.
    pub fn direction(&self, property_id: PropertyId) -> Direction {
        self.options
            .get(&property_id)
            .map(|o| o.direction)
            .unwrap_or_default()
    }

    /// Returns the directions of every key in priority order.
    pub fn directions(&self) -> Vec<Direction> {
        self.sort_by.iter().map(|p| self.direction(*p)).collect()
    }

    /// Returns whether the property is a sort key.
    pub fn contains(&self, property_id: PropertyId) -> bool {
        self.sort_by.contains(&property_id)
    }

    /// Drops repeated keys, keeping the first occurrence.
    pub(crate) fn dedup(&mut self) {
        let mut seen = Vec::with_capacity(self.sort_by.len());
        self.sort_by.retain(|p| {
            if seen.contains(p) {
                false
            } else {
                seen.push(*p);
                true
            }
        });
    }
}
