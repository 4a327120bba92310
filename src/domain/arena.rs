use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::OrgNode;

/// Forest node in the arena while the hierarchy is being linked.
#[derive(Debug)]
pub struct ArenaNode {
    /// Node payload; its own `children` stay empty until materialization
    pub data: OrgNode,
    /// Index of parent node in the arena, None for root nodes
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena
    pub children: Vec<Index>,
}

/// Arena-based forest used by the two-pass builder.
///
/// Nodes are inserted unlinked first, then linked by index, so no pass
/// needs a mutable reference into another node.
#[derive(Debug)]
pub struct ForestArena {
    /// Arena storage for all forest nodes
    arena: Arena<ArenaNode>,
    /// Root indices in link order
    roots: Vec<Index>,
}

impl Default for ForestArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            roots: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            roots: Vec::new(),
        }
    }

    #[instrument(level = "trace", skip(self, data), fields(id = %data.id))]
    pub fn insert_node(&mut self, data: OrgNode) -> Index {
        self.arena.insert(ArenaNode {
            data,
            parent: None,
            children: Vec::new(),
        })
    }

    /// Overwrite the payload of an already inserted node.
    pub fn replace_data(&mut self, idx: Index, data: OrgNode) {
        if let Some(node) = self.arena.get_mut(idx) {
            node.data = data;
        }
    }

    /// Attach `child` below `parent`, or to the roots when `parent` is None.
    #[instrument(level = "trace", skip(self))]
    pub fn link(&mut self, child: Index, parent: Option<Index>) {
        match parent {
            Some(parent_idx) => {
                if let Some(parent_node) = self.arena.get_mut(parent_idx) {
                    parent_node.children.push(child);
                } else {
                    return;
                }
            }
            None => self.roots.push(child),
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = parent;
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Stable-sort every child list and the root list by `sort_order`.
    #[instrument(level = "debug", skip(self))]
    pub fn sort_by_sort_order(&mut self) {
        let keys: HashMap<Index, i64> = self
            .arena
            .iter()
            .map(|(idx, node)| (idx, node.data.sort_order))
            .collect();
        let key_of = |idx: &Index| keys.get(idx).copied().unwrap_or_default();

        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_key(key_of);
        self.roots = roots;

        let parents: Vec<Index> = keys.keys().copied().collect();
        for idx in parents {
            if let Some(node) = self.arena.get_mut(idx) {
                if node.children.len() > 1 {
                    node.children.sort_by_key(key_of);
                }
            }
        }
    }

    /// Move every reachable node out of the arena into owned trees.
    ///
    /// Nodes never linked below a root (dropped orphans and their
    /// descendants) are discarded.
    #[instrument(level = "debug", skip(self))]
    pub fn into_forest(mut self) -> Vec<OrgNode> {
        let roots = std::mem::take(&mut self.roots);
        roots
            .into_iter()
            .filter_map(|idx| self.take_subtree(idx))
            .collect()
    }

    fn take_subtree(&mut self, idx: Index) -> Option<OrgNode> {
        let ArenaNode { mut data, children, .. } = self.arena.remove(idx)?;
        data.children = children
            .into_iter()
            .filter_map(|child| self.take_subtree(child))
            .collect();
        Some(data)
    }
}
