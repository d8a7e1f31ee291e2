//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add file and config context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported file format: {} (expected .json or .toml)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid handler '{input}': {reason}")]
    InvalidHandler { input: String, reason: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
