//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors are local validation failures of a tree operation.
/// A failed operation leaves the tree untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("'{name}' already exists inside '{parent}' folder")]
    NameCollision { name: String, parent: String },

    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("invalid node id: {0}")]
    InvalidId(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
