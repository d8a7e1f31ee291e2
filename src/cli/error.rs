//! CLI-level errors (wraps application errors)

use std::io::ErrorKind;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(_) | ApplicationError::Parse { .. } => {
                    crate::exitcode::DATAERR
                }
                ApplicationError::Io { source, .. } if source.kind() == ErrorKind::NotFound => {
                    crate::exitcode::NOINPUT
                }
                ApplicationError::Io { .. } => crate::exitcode::IOERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::UnsupportedFormat(_) | ApplicationError::InvalidHandler { .. } => {
                    crate::exitcode::USAGE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodePath;

    #[test]
    fn given_domain_error_when_mapping_exit_code_then_dataerr() {
        let err: CliError = DomainError::MissingTag {
            path: NodePath::root(),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_file_when_mapping_exit_code_then_noinput() {
        let err: CliError = ApplicationError::Io {
            context: "read document: x.json".into(),
            source: std::io::Error::from(ErrorKind::NotFound),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }
}
