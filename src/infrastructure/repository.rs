//! Node repository implementations: JSON file store and in-memory store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{MemberRef, NodeDraft, NodeId, OrgNodeRecord};
use crate::infrastructure::error::{RepositoryError, RepositoryResult};
use crate::infrastructure::traits::{FileSystem, NodeRepository};

/// Member directory entry as persisted, with its activity flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMember {
    #[serde(flatten)]
    pub member: MemberRef,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Whole store contents: `{ "nodes": [...], "members": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub nodes: Vec<OrgNodeRecord>,
    #[serde(default)]
    pub members: Vec<StoredMember>,
}

impl StoreDocument {
    /// Records ordered by `sort_order`, stable on ties.
    fn sorted_nodes(&self) -> Vec<OrgNodeRecord> {
        let mut nodes = self.nodes.clone();
        nodes.sort_by_key(|n| n.sort_order);
        nodes
    }

    fn active_members(&self) -> Vec<MemberRef> {
        self.members
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.member.clone())
            .collect()
    }

    fn insert(&mut self, draft: NodeDraft, sort_order: i64) -> OrgNodeRecord {
        let record = draft.into_record(Uuid::new_v4().to_string(), sort_order);
        self.nodes.push(record.clone());
        record
    }

    /// Removes every record carrying `id`, duplicates included.
    fn delete(&mut self, id: &NodeId) -> RepositoryResult<()> {
        let before = self.nodes.len();
        self.nodes.retain(|n| &n.id != id);
        if self.nodes.len() == before {
            return Err(RepositoryError::NotFound(id.clone()));
        }
        Ok(())
    }
}

/// Repository persisted as one JSON document on disk.
///
/// A missing file reads as an empty store. Writes go to a sibling
/// `.tmp` file which is then renamed over the store.
pub struct JsonFileRepository {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(level = "trace", skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> RepositoryResult<StoreDocument> {
        if !self.fs.exists(&self.path) {
            debug!("store missing, reading as empty");
            return Ok(StoreDocument::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| RepositoryError::io(format!("read {}", self.path.display()), e))?;
        serde_json::from_str(&content).map_err(|source| RepositoryError::Format {
            path: self.path.clone(),
            source,
        })
    }

    #[instrument(level = "trace", skip(self, doc), fields(path = %self.path.display()))]
    pub fn save(&self, doc: &StoreDocument) -> RepositoryResult<()> {
        let content = serde_json::to_string_pretty(doc).map_err(|source| {
            RepositoryError::Format {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| RepositoryError::io(format!("create parent of {}", self.path.display()), e))?;
        self.fs
            .write(&tmp, &content)
            .map_err(|e| RepositoryError::io(format!("write {}", tmp.display()), e))?;
        self.fs
            .rename(&tmp, &self.path)
            .map_err(|e| RepositoryError::io(format!("replace {}", self.path.display()), e))
    }
}

impl NodeRepository for JsonFileRepository {
    fn fetch_nodes(&self) -> RepositoryResult<Vec<OrgNodeRecord>> {
        Ok(self.load()?.sorted_nodes())
    }

    fn fetch_active_members(&self) -> RepositoryResult<Vec<MemberRef>> {
        Ok(self.load()?.active_members())
    }

    fn insert(&self, draft: NodeDraft, sort_order: i64) -> RepositoryResult<OrgNodeRecord> {
        let mut doc = self.load()?;
        let record = doc.insert(draft, sort_order);
        self.save(&doc)?;
        debug!(id = %record.id, "inserted node");
        Ok(record)
    }

    fn delete(&self, id: &NodeId) -> RepositoryResult<()> {
        let mut doc = self.load()?;
        doc.delete(id)?;
        self.save(&doc)?;
        debug!(%id, "deleted node");
        Ok(())
    }
}

/// Process-local repository, mainly for embedding and tests.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    doc: Mutex<StoreDocument>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: StoreDocument) -> Self {
        Self {
            doc: Mutex::new(doc),
        }
    }

    /// Store with the given records and all members active.
    pub fn with_snapshot(nodes: Vec<OrgNodeRecord>, members: Vec<MemberRef>) -> Self {
        Self::from_document(StoreDocument {
            nodes,
            members: members
                .into_iter()
                .map(|member| StoredMember {
                    member,
                    is_active: true,
                })
                .collect(),
        })
    }

    /// Copy of the current contents.
    pub fn document(&self) -> RepositoryResult<StoreDocument> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, StoreDocument>> {
        self.doc
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl NodeRepository for InMemoryRepository {
    fn fetch_nodes(&self) -> RepositoryResult<Vec<OrgNodeRecord>> {
        Ok(self.lock()?.sorted_nodes())
    }

    fn fetch_active_members(&self) -> RepositoryResult<Vec<MemberRef>> {
        Ok(self.lock()?.active_members())
    }

    fn insert(&self, draft: NodeDraft, sort_order: i64) -> RepositoryResult<OrgNodeRecord> {
        Ok(self.lock()?.insert(draft, sort_order))
    }

    fn delete(&self, id: &NodeId) -> RepositoryResult<()> {
        self.lock()?.delete(id)
    }
}
