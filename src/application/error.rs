//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add session-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no node selected")]
    NoActiveNode,

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("export failed: {message}")]
    Export { message: String },
}

impl ApplicationError {
    /// The underlying validation failure, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ApplicationError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
