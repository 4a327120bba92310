//! Structure manager service
//!
//! Owns the current org forest. Every refresh fetches a fresh snapshot and
//! rebuilds from scratch; mutations go to the repository and are followed by
//! a refresh, so the forest only ever reflects confirmed repository state.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    lay_out, walk_forest, DomainError, ForestBuilder, Geometry, LayoutNode, MemberRef,
    NodeDraft, NodeId, NodeSource, OrgNode, OrgNodeRecord,
};
use crate::infrastructure::traits::NodeRepository;

/// Outcome of a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// Forest rebuilt from a new snapshot.
    Rebuilt { roots: usize, nodes: usize },
    /// Fetch failed; the previous forest is still in place.
    Stale { reason: String },
}

#[derive(Debug, Default)]
struct Snapshot {
    records: Vec<OrgNodeRecord>,
    members: Vec<MemberRef>,
    forest: Vec<OrgNode>,
}

/// Service for reading and editing the organization structure.
pub struct StructureService {
    repo: Arc<dyn NodeRepository>,
    builder: ForestBuilder,
    geometry: Geometry,
    snapshot: Snapshot,
}

impl StructureService {
    /// Create a new structure service with an empty forest.
    pub fn new(repo: Arc<dyn NodeRepository>, builder: ForestBuilder, geometry: Geometry) -> Self {
        Self {
            repo,
            builder,
            geometry,
            snapshot: Snapshot::default(),
        }
    }

    pub fn forest(&self) -> &[OrgNode] {
        &self.snapshot.forest
    }

    /// Active member directory from the last successful refresh.
    pub fn members(&self) -> &[MemberRef] {
        &self.snapshot.members
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn find(&self, id: &str) -> Option<&OrgNode> {
        walk_forest(&self.snapshot.forest).find(|n| n.id == id)
    }

    /// Classified, geometry-annotated view of the current forest.
    pub fn layout(&self) -> Vec<LayoutNode> {
        lay_out(&self.snapshot.forest, &self.geometry)
    }

    /// Fetch nodes and members, then rebuild the forest.
    ///
    /// Fetch failures are logged and reported as `Stale`; the previous
    /// snapshot is kept. A cyclic snapshot is rejected: its records and
    /// members are adopted so mutations can repair the store, but the
    /// previous forest stays in place.
    #[instrument(level = "debug", skip(self))]
    pub fn refresh(&mut self) -> ApplicationResult<RefreshStatus> {
        let fetched = self
            .repo
            .fetch_nodes()
            .and_then(|records| Ok((records, self.repo.fetch_active_members()?)));
        let (records, members) = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "fetch failed, keeping previous structure");
                return Ok(RefreshStatus::Stale {
                    reason: e.to_string(),
                });
            }
        };

        let built = self.builder.build(&records, &members);
        self.snapshot.records = records;
        self.snapshot.members = members;
        let forest = built.inspect_err(|e| {
            warn!(error = %e, "rejected snapshot, keeping previous structure");
        })?;

        let nodes = walk_forest(&forest).count();
        debug!(records = self.snapshot.records.len(), nodes, "structure rebuilt");

        let status = RefreshStatus::Rebuilt {
            roots: forest.len(),
            nodes,
        };
        self.snapshot.forest = forest;
        Ok(status)
    }

    /// Validate and insert a node, then refresh.
    #[instrument(level = "debug", skip(self))]
    pub fn add_node(&mut self, draft: NodeDraft) -> ApplicationResult<OrgNodeRecord> {
        self.validate_draft(&draft)?;
        let sort_order = match draft.sort_order {
            Some(order) => order,
            None => self.next_sort_order(draft.parent_id.as_deref()),
        };

        let record = self
            .repo
            .insert(draft, sort_order)
            .map_err(|source| ApplicationError::MutationFailed {
                context: "add node".to_string(),
                source,
            })?;
        info!(id = %record.id, parent = ?record.parent_id, sort_order, "node added");

        self.refresh()?;
        Ok(record)
    }

    /// Delete a node, then refresh.
    ///
    /// Only the record itself is removed; its former descendants become
    /// orphans and follow the builder's orphan policy.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, id: &NodeId) -> ApplicationResult<()> {
        if !self.snapshot.records.iter().any(|r| &r.id == id) {
            return Err(DomainError::NodeNotFound(id.clone()).into());
        }
        self.repo
            .delete(id)
            .map_err(|source| ApplicationError::MutationFailed {
                context: format!("delete node {id}"),
                source,
            })?;
        info!(%id, "node deleted");

        self.refresh()?;
        Ok(())
    }

    fn validate_draft(&self, draft: &NodeDraft) -> ApplicationResult<()> {
        if let Some(parent_id) = &draft.parent_id {
            if !self.snapshot.records.iter().any(|r| &r.id == parent_id) {
                return Err(DomainError::UnknownParent(parent_id.clone()).into());
            }
        }
        match &draft.source {
            NodeSource::Member(member_id) => {
                if !self.snapshot.members.iter().any(|m| &m.id == member_id) {
                    return Err(DomainError::UnknownMember(member_id.clone()).into());
                }
            }
            NodeSource::Custom { title, .. } => {
                if title.trim().is_empty() {
                    return Err(DomainError::MissingContent.into());
                }
            }
        }
        Ok(())
    }

    /// One past the highest sibling order, or 0 for a first child.
    /// Saturates at `i64::MAX`; ties then keep insertion order.
    fn next_sort_order(&self, parent_id: Option<&str>) -> i64 {
        self.snapshot
            .records
            .iter()
            .filter(|r| r.parent_id.as_deref() == parent_id)
            .map(|r| r.sort_order)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }
}
