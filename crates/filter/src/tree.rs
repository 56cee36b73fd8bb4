//! Filter tree stored as an arena.
//!
//! Every node lives in one flat `id -> node` map, so any node is one lookup
//! away regardless of nesting. Groups list their children by id. The root is
//! a group with id `0` at depth `0`. Ids are handed out by a monotonic
//! counter and never reused, even after deletion.

use crate::operator::{GroupOperator, Operator};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use vista_core::{Error, FilterId, PropertyId, Result, Value, ROOT_FILTER_ID};

/// A leaf predicate: `(property, operator, value)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub id: FilterId,
    pub property_id: PropertyId,
    pub operator: Operator,
    #[serde(default)]
    pub value: Value,
}

/// A boolean combinator over child nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterGroup {
    pub id: FilterId,
    /// Child node ids, evaluated left to right
    pub filters: Vec<FilterId>,
    pub group_operator: GroupOperator,
    pub depth: u32,
}

/// A node of the arena.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterNode {
    Leaf(Filter),
    Group(FilterGroup),
}

impl FilterNode {
    /// Returns the node id.
    pub fn id(&self) -> FilterId {
        match self {
            FilterNode::Leaf(f) => f.id,
            FilterNode::Group(g) => g.id,
        }
    }

    /// Returns true for groups.
    pub fn is_group(&self) -> bool {
        matches!(self, FilterNode::Group(_))
    }
}

/// The arena holding every node of one filter tree.
#[derive(Clone, Debug)]
pub struct FilterTree {
    nodes: HashMap<FilterId, FilterNode>,
    next_id: FilterId,
}

impl Default for FilterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterTree {
    /// Creates a tree holding only an empty AND root.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ROOT_FILTER_ID,
            FilterNode::Group(FilterGroup {
                id: ROOT_FILTER_ID,
                filters: Vec::new(),
                group_operator: GroupOperator::And,
                depth: 0,
            }),
        );
        Self {
            nodes,
            next_id: ROOT_FILTER_ID + 1,
        }
    }

    /// Builds a tree from nodes whose ids were assigned earlier.
    ///
    /// The id counter resumes after the largest id present.
    pub(crate) fn from_nodes(nodes: HashMap<FilterId, FilterNode>) -> Result<Self> {
        match nodes.get(&ROOT_FILTER_ID) {
            Some(FilterNode::Group(_)) => {}
            _ => return Err(Error::invalid_state("filter tree has no root group")),
        }
        let next_id = nodes.keys().copied().max().unwrap_or(ROOT_FILTER_ID) + 1;
        Ok(Self { nodes, next_id })
    }

    /// Returns the number of nodes, root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the root has no children.
    pub fn is_empty(&self) -> bool {
        self.root().filters.is_empty()
    }

    /// Returns the id the next inserted node will get.
    #[inline]
    pub fn next_id(&self) -> FilterId {
        self.next_id
    }

    /// Returns the root group.
    pub fn root(&self) -> &FilterGroup {
        match self.nodes.get(&ROOT_FILTER_ID) {
            Some(FilterNode::Group(group)) => group,
            // Every constructor guarantees a root group.
            _ => unreachable!("filter tree without root group"),
        }
    }

    /// Looks up a node.
    pub fn get(&self, id: FilterId) -> Option<&FilterNode> {
        self.nodes.get(&id)
    }

    /// Looks up a leaf.
    pub fn filter(&self, id: FilterId) -> Option<&Filter> {
        match self.nodes.get(&id) {
            Some(FilterNode::Leaf(f)) => Some(f),
            _ => None,
        }
    }

    /// Looks up a group.
    pub fn group(&self, id: FilterId) -> Option<&FilterGroup> {
        match self.nodes.get(&id) {
            Some(FilterNode::Group(g)) => Some(g),
            _ => None,
        }
    }

    /// Iterates over every leaf, in no particular order.
    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.nodes.values().filter_map(|node| match node {
            FilterNode::Leaf(f) => Some(f),
            FilterNode::Group(_) => None,
        })
    }

    pub(crate) fn filter_mut(&mut self, id: FilterId) -> Result<&mut Filter> {
        match self.nodes.get_mut(&id) {
            Some(FilterNode::Leaf(f)) => Ok(f),
            Some(FilterNode::Group(_)) => Err(Error::NotALeaf { id }),
            None => Err(Error::filter_not_found(id)),
        }
    }

    pub(crate) fn group_mut(&mut self, id: FilterId) -> Result<&mut FilterGroup> {
        match self.nodes.get_mut(&id) {
            Some(FilterNode::Group(g)) => Ok(g),
            Some(FilterNode::Leaf(_)) => Err(Error::NotAGroup { id }),
            None => Err(Error::filter_not_found(id)),
        }
    }

    /// Adds an empty group under `parent`.
    pub fn insert_group(
        &mut self,
        parent: FilterId,
        group_operator: GroupOperator,
    ) -> Result<FilterId> {
        let depth = self.group_mut(parent)?.depth + 1;
        let id = self.allocate(parent);
        self.nodes.insert(
            id,
            FilterNode::Group(FilterGroup {
                id,
                filters: Vec::new(),
                group_operator,
                depth,
            }),
        );
        Ok(id)
    }

    /// Adds a leaf under `parent`.
    pub fn insert_filter(
        &mut self,
        parent: FilterId,
        property_id: PropertyId,
        operator: Operator,
        value: Value,
    ) -> Result<FilterId> {
        self.group_mut(parent)?;
        let id = self.allocate(parent);
        self.nodes.insert(
            id,
            FilterNode::Leaf(Filter {
                id,
                property_id,
                operator,
                value,
            }),
        );
        Ok(id)
    }

    /// Removes a node and, for groups, its whole subtree. Returns the ids
    /// that left the arena.
    pub fn remove(&mut self, id: FilterId) -> Result<Vec<FilterId>> {
        if id == ROOT_FILTER_ID {
            return Err(Error::RootNotDeletable);
        }
        if !self.nodes.contains_key(&id) {
            return Err(Error::filter_not_found(id));
        }

        for node in self.nodes.values_mut() {
            if let FilterNode::Group(group) = node {
                group.filters.retain(|child| *child != id);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                if let FilterNode::Group(group) = node {
                    stack.extend(group.filters);
                }
                removed.push(current);
            }
        }
        Ok(removed)
    }

    fn allocate(&mut self, parent: FilterId) -> FilterId {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(FilterNode::Group(group)) = self.nodes.get_mut(&parent) {
            group.filters.push(id);
        }
        debug_assert!(!self.nodes.contains_key(&id), "filter id {id} reused");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_new() {
        let tree = FilterTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.root().depth, 0);
        assert_eq!(tree.next_id(), 1);
    }

    #[test]
    fn test_tree_insert() {
        let mut tree = FilterTree::new();
        let group = tree.insert_group(ROOT_FILTER_ID, GroupOperator::Or).unwrap();
        let leaf = tree
            .insert_filter(group, 5, Operator::Equal, Value::from("x"))
            .unwrap();

        assert_eq!(tree.root().filters, vec![group]);
        assert_eq!(tree.group(group).unwrap().filters, vec![leaf]);
        assert_eq!(tree.group(group).unwrap().depth, 1);
        assert_eq!(tree.filter(leaf).unwrap().property_id, 5);
        assert_eq!(tree.filters().count(), 1);
    }

    #[test]
    fn test_tree_insert_invalid_parent() {
        let mut tree = FilterTree::new();
        let leaf = tree
            .insert_filter(ROOT_FILTER_ID, 1, Operator::IsSet, Value::Null)
            .unwrap();

        assert_eq!(
            tree.insert_filter(leaf, 1, Operator::IsSet, Value::Null),
            Err(Error::NotAGroup { id: leaf })
        );
        assert_eq!(
            tree.insert_group(99, GroupOperator::And),
            Err(Error::filter_not_found(99))
        );
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.next_id(), 2);
    }

    #[test]
    fn test_tree_remove_subtree() {
        let mut tree = FilterTree::new();
        let group = tree.insert_group(ROOT_FILTER_ID, GroupOperator::And).unwrap();
        let a = tree.insert_filter(group, 1, Operator::IsSet, Value::Null).unwrap();
        let b = tree.insert_filter(ROOT_FILTER_ID, 1, Operator::IsSet, Value::Null).unwrap();

        let mut removed = tree.remove(group).unwrap();
        removed.sort_unstable();
        assert_eq!(removed, vec![group, a]);
        assert_eq!(tree.root().filters, vec![b]);
        assert!(tree.get(a).is_none());
    }

    #[test]
    fn test_tree_ids_never_reused() {
        let mut tree = FilterTree::new();
        let a = tree.insert_filter(ROOT_FILTER_ID, 1, Operator::IsSet, Value::Null).unwrap();
        tree.remove(a).unwrap();
        let b = tree.insert_filter(ROOT_FILTER_ID, 1, Operator::IsSet, Value::Null).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_tree_remove_errors() {
        let mut tree = FilterTree::new();
        assert_eq!(tree.remove(ROOT_FILTER_ID), Err(Error::RootNotDeletable));
        assert_eq!(tree.remove(3), Err(Error::filter_not_found(3)));
    }
}
