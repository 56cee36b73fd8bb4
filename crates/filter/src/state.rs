//! Persisted form of a filter configuration.
//!
//! `FilterState` is plain nested data meant for an external store. Loading it
//! walks the nesting into a [`FilterTree`] arena and keeps every saved id.

use crate::operator::GroupOperator;
use crate::tree::{Filter, FilterGroup, FilterNode, FilterTree};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use vista_core::{Error, FilterId, FolderId, Result, ROOT_FILTER_ID};

/// Saved filter configuration of one view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Folder restriction; empty means every folder
    #[serde(default)]
    pub folders: Vec<FolderId>,
    /// Root group of the predicate tree
    pub filter: GroupState,
    /// Free-text query; empty means inactive
    #[serde(default)]
    pub query: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            filter: GroupState {
                id: ROOT_FILTER_ID,
                filters: Vec::new(),
                group_operator: GroupOperator::And,
                depth: 0,
            },
            query: String::new(),
        }
    }
}

/// A saved node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeState {
    Leaf(Filter),
    Group(GroupState),
}

/// A saved group with its children inlined.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupState {
    pub id: FilterId,
    #[serde(default)]
    pub filters: Vec<NodeState>,
    #[serde(default)]
    pub group_operator: GroupOperator,
    #[serde(default)]
    pub depth: u32,
}

impl FilterTree {
    /// Rebuilds the arena from a saved root group.
    ///
    /// Ids are kept as saved; depths are recomputed from the nesting.
    pub fn from_state(root: &GroupState) -> Result<Self> {
        if root.id != ROOT_FILTER_ID {
            return Err(Error::invalid_state(format!(
                "root group has id {}, expected {ROOT_FILTER_ID}",
                root.id
            )));
        }
        let mut nodes = HashMap::new();
        insert_group(&mut nodes, root, 0)?;
        FilterTree::from_nodes(nodes)
    }

    /// Snapshots the arena as nested plain data.
    pub fn to_state(&self) -> GroupState {
        group_state(self, self.root())
    }
}

fn insert_group(
    nodes: &mut HashMap<FilterId, FilterNode>,
    group: &GroupState,
    depth: u32,
) -> Result<()> {
    let mut children = Vec::with_capacity(group.filters.len());
    for child in &group.filters {
        match child {
            NodeState::Leaf(filter) => {
                claim(nodes, filter.id)?;
                nodes.insert(filter.id, FilterNode::Leaf(filter.clone()));
                children.push(filter.id);
            }
            NodeState::Group(sub) => {
                claim(nodes, sub.id)?;
                insert_group(nodes, sub, depth + 1)?;
                children.push(sub.id);
            }
        }
    }
    claim(nodes, group.id)?;
    nodes.insert(
        group.id,
        FilterNode::Group(FilterGroup {
            id: group.id,
            filters: children,
            group_operator: group.group_operator,
            depth,
        }),
    );
    Ok(())
}

fn claim(nodes: &HashMap<FilterId, FilterNode>, id: FilterId) -> Result<()> {
    if nodes.contains_key(&id) {
        Err(Error::DuplicateFilterId { id })
    } else {
        Ok(())
    }
}

fn group_state(tree: &FilterTree, group: &FilterGroup) -> GroupState {
    let filters = group
        .filters
        .iter()
        .filter_map(|id| match tree.get(*id)? {
            FilterNode::Leaf(filter) => Some(NodeState::Leaf(filter.clone())),
            FilterNode::Group(sub) => Some(NodeState::Group(group_state(tree, sub))),
        })
        .collect();
    GroupState {
        id: group.id,
        filters,
        group_operator: group.group_operator,
        depth: group.depth,
    }
}
