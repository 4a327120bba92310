//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected in hierarchy at node: {0}")]
    CycleDetected(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("parent node not found: {0}")]
    UnknownParent(NodeId),

    #[error("member not found in active directory: {0}")]
    UnknownMember(NodeId),

    #[error("node needs a member or a non-empty custom title")]
    MissingContent,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
