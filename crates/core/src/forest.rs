//! Parent/child hierarchies with precomputed descendant sets.
//!
//! Tags and folders both form forests (a node may have several parents for
//! tags). Filtering by a node must also match everything below it, so the
//! descendant set of every node is kept ready for lookup.

use hashbrown::{HashMap, HashSet};

/// A forest of `u64` node ids.
#[derive(Clone, Debug, Default)]
pub struct Forest {
    parents: HashMap<u64, Vec<u64>>,
    children: HashMap<u64, Vec<u64>>,
    /// Node -> every node reachable through child edges (excluding itself)
    descendants: HashMap<u64, HashSet<u64>>,
    /// Absent parent -> children that named it; linked when it is inserted
    pending: HashMap<u64, Vec<u64>>,
}

impl Forest {
    /// Creates an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns true if the forest has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns true if the node exists.
    #[inline]
    pub fn contains(&self, id: u64) -> bool {
        self.parents.contains_key(&id)
    }

    /// Inserts a node under the given parents, or re-parents an existing one.
    ///
    /// Edges to parents that are not in the forest yet are kept pending and
    /// linked once the parent is inserted, so insertion order does not matter.
    pub fn insert(&mut self, id: u64, parents: &[u64]) {
        self.forget_pending(id);
        let mut known = Vec::with_capacity(parents.len());
        for &parent in parents.iter().filter(|p| **p != id) {
            if self.contains(parent) {
                known.push(parent);
            } else {
                self.pending.entry(parent).or_default().push(id);
            }
        }

        if self.contains(id) {
            self.detach(id);
            self.link(id, known);
            self.rebuild();
            return;
        }

        self.link(id, known.clone());
        if let Some(waiting) = self.pending.remove(&id) {
            for child in waiting {
                if let Some(parents) = self.parents.get_mut(&child) {
                    parents.push(id);
                    self.children.entry(id).or_default().push(child);
                }
            }
            self.rebuild();
            return;
        }
        self.descendants.insert(id, HashSet::new());
        for ancestor in self.ancestors_of(&known) {
            if let Some(set) = self.descendants.get_mut(&ancestor) {
                set.insert(id);
            }
        }
    }

    /// Removes a node. Its children lose that parent edge and stay in the
    /// forest.
    pub fn remove(&mut self, id: u64) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.detach(id);
        if let Some(children) = self.children.remove(&id) {
            for child in children {
                if let Some(parents) = self.parents.get_mut(&child) {
                    parents.retain(|p| *p != id);
                }
            }
        }
        self.parents.remove(&id);
        self.forget_pending(id);
        self.rebuild();
        true
    }

    /// Returns the direct parents of a node.
    pub fn parents(&self, id: u64) -> &[u64] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the direct children of a node.
    pub fn children(&self, id: u64) -> &[u64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every descendant of a node, or None if the node is unknown.
    pub fn descendants(&self, id: u64) -> Option<&HashSet<u64>> {
        self.descendants.get(&id)
    }

    /// Returns `{id} ∪ descendants(id)`. Unknown ids expand to themselves.
    pub fn expand(&self, id: u64) -> HashSet<u64> {
        let mut set = self.descendants(id).cloned().unwrap_or_default();
        set.insert(id);
        set
    }

    fn link(&mut self, id: u64, parents: Vec<u64>) {
        for parent in &parents {
            self.children.entry(*parent).or_default().push(id);
        }
        self.parents.insert(id, parents);
    }

    fn detach(&mut self, id: u64) {
        for parent in self.parents(id).to_vec() {
            if let Some(children) = self.children.get_mut(&parent) {
                children.retain(|c| *c != id);
            }
        }
    }

    fn forget_pending(&mut self, child: u64) {
        self.pending.retain(|_, waiting| {
            waiting.retain(|c| *c != child);
            !waiting.is_empty()
        });
    }

    fn ancestors_of(&self, start: &[u64]) -> HashSet<u64> {
        let mut seen = HashSet::new();
        let mut stack: Vec<u64> = start.to_vec();
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend_from_slice(self.parents(node));
            }
        }
        seen
    }

    fn rebuild(&mut self) {
        let mut descendants = HashMap::with_capacity(self.parents.len());
        for &id in self.parents.keys() {
            let mut seen = HashSet::new();
            let mut stack: Vec<u64> = self.children(id).to_vec();
            while let Some(node) = stack.pop() {
                if node != id && seen.insert(node) {
                    stack.extend_from_slice(self.children(node));
                }
            }
            descendants.insert(id, seen);
        }
        self.descendants = descendants;
    }
}
