//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use crate::domain::{MemberRef, NodeDraft, NodeId, OrgNodeRecord};
use crate::infrastructure::error::RepositoryResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Storage collaborator holding the flat node records and the member directory.
///
/// Reads return one point-in-time snapshot each; the two reads are not
/// guaranteed to be mutually consistent.
pub trait NodeRepository: Send + Sync {
    /// All node records, ordered by `sort_order` ascending.
    fn fetch_nodes(&self) -> RepositoryResult<Vec<OrgNodeRecord>>;

    /// Members flagged active.
    fn fetch_active_members(&self) -> RepositoryResult<Vec<MemberRef>>;

    /// Persist a new record; the repository assigns the id.
    fn insert(&self, draft: NodeDraft, sort_order: i64) -> RepositoryResult<OrgNodeRecord>;

    /// Remove one record. Descendants are left in place.
    fn delete(&self, id: &NodeId) -> RepositoryResult<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}
