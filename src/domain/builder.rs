//! Forest builder: flat parent-pointer records to owned, sorted trees.

use std::collections::HashMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::arena::ForestArena;
use crate::domain::entities::{MemberRef, NodeContent, OrgNode, OrgNodeRecord};
use crate::domain::error::{DomainError, DomainResult};

/// What to do with a record whose `parent_id` names no known node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Omit the record (and anything below it) from the forest.
    #[default]
    Drop,
    /// Show the record as an additional root.
    PromoteToRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Constructs the org forest from repository snapshots.
#[derive(Debug, Clone, Default)]
pub struct ForestBuilder {
    on_orphan: OrphanPolicy,
}

impl ForestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orphan_policy(on_orphan: OrphanPolicy) -> Self {
        Self { on_orphan }
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.on_orphan
    }

    /// Build the forest from one snapshot of records and members.
    ///
    /// Duplicate ids resolve to the last record, kept at the position of the
    /// first one. Unresolvable member references leave the node without a
    /// member. Fails only when parent links form a cycle.
    #[instrument(level = "debug", skip_all, fields(records = records.len(), members = members.len()))]
    pub fn build(
        &self,
        records: &[OrgNodeRecord],
        members: &[MemberRef],
    ) -> DomainResult<Vec<OrgNode>> {
        let directory: HashMap<&str, &MemberRef> =
            members.iter().map(|m| (m.id.as_str(), m)).collect();

        // Pass 1: materialize every node, unlinked
        let mut arena = ForestArena::with_capacity(records.len());
        let mut index: HashMap<&str, Index> = HashMap::with_capacity(records.len());
        let mut parents: HashMap<Index, Option<&str>> = HashMap::with_capacity(records.len());
        let mut order: Vec<Index> = Vec::with_capacity(records.len());

        for record in records {
            let content = NodeContent::resolve(record, |id| directory.get(id).copied());
            let node = OrgNode::from_record(record, content);
            match index.get(record.id.as_str()) {
                Some(&idx) => {
                    trace!(id = %record.id, "duplicate id, last record wins");
                    arena.replace_data(idx, node);
                    parents.insert(idx, record.parent_id.as_deref());
                }
                None => {
                    let idx = arena.insert_node(node);
                    index.insert(record.id.as_str(), idx);
                    parents.insert(idx, record.parent_id.as_deref());
                    order.push(idx);
                }
            }
        }

        self.check_cycles(&order, &index, &parents, &arena)?;

        // Pass 2: link by parent id
        let mut dropped = 0usize;
        for &idx in &order {
            match parents.get(&idx).copied().flatten() {
                None => arena.link(idx, None),
                Some(parent_id) => match index.get(parent_id) {
                    Some(&parent_idx) => arena.link(idx, Some(parent_idx)),
                    None => match self.on_orphan {
                        OrphanPolicy::Drop => dropped += 1,
                        OrphanPolicy::PromoteToRoot => arena.link(idx, None),
                    },
                },
            }
        }

        arena.sort_by_sort_order();
        let forest = arena.into_forest();
        debug!(
            roots = forest.len(),
            orphans = dropped,
            policy = ?self.on_orphan,
            "forest built"
        );
        Ok(forest)
    }

    /// Walk every parent chain once; revisiting a chain in progress is a cycle.
    fn check_cycles(
        &self,
        order: &[Index],
        index: &HashMap<&str, Index>,
        parents: &HashMap<Index, Option<&str>>,
        arena: &ForestArena,
    ) -> DomainResult<()> {
        let mut marks: HashMap<Index, Mark> = HashMap::with_capacity(order.len());

        for &start in order {
            let mut path = Vec::new();
            let mut current = Some(start);

            while let Some(idx) = current {
                match marks.get(&idx) {
                    Some(Mark::Done) => break,
                    Some(Mark::InProgress) => {
                        let id = arena
                            .get_node(idx)
                            .map(|n| n.data.id.clone())
                            .unwrap_or_default();
                        return Err(DomainError::CycleDetected(id));
                    }
                    None => {
                        marks.insert(idx, Mark::InProgress);
                        path.push(idx);
                        current = parents
                            .get(&idx)
                            .copied()
                            .flatten()
                            .and_then(|parent_id| index.get(parent_id).copied());
                    }
                }
            }

            for idx in path {
                marks.insert(idx, Mark::Done);
            }
        }
        Ok(())
    }
}

/// Build with the default orphan policy (drop).
pub fn build_forest(records: &[OrgNodeRecord], members: &[MemberRef]) -> DomainResult<Vec<OrgNode>> {
    ForestBuilder::new().build(records, members)
}
