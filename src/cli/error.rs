//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                crate::exitcode::NOINPUT
            }
            CliError::Io { .. } => crate::exitcode::IOERR,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Script { .. } => crate::exitcode::DATAERR,
                ApplicationError::Domain(_)
                | ApplicationError::NoActiveNode
                | ApplicationError::UnknownNode(_) => crate::exitcode::DATAERR,
                ApplicationError::Export { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_error_kinds_then_map_to_sysexits() {
        let missing = CliError::io(
            "read script",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(
            CliError::from(ApplicationError::Domain(DomainError::EmptyName)).exit_code(),
            crate::exitcode::DATAERR
        );
        assert_eq!(
            CliError::from(ApplicationError::Config { message: "x".into() }).exit_code(),
            crate::exitcode::CONFIG
        );
        assert_eq!(CliError::InvalidArgs("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
