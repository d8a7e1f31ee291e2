//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::definition::NodePath;

/// Domain errors represent violations of the tree model.
/// These are independent of file formats and terminal concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node definition at {path} has no type tag")]
    MissingTag { path: NodePath },

    /// Tag contains whitespace, selector punctuation, or starts with a non-letter
    #[error("node definition at {path} has invalid type tag: '{tag}'")]
    InvalidTag { path: NodePath, tag: String },

    #[error("unsupported selector: '{selector}' ({reason})")]
    InvalidSelector { selector: String, reason: String },

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid node path: '{0}'")]
    InvalidPath(String),

    #[error("no node at path {0}")]
    PathNotFound(NodePath),

    #[error("document has no root node")]
    EmptyDocument,

    #[error("document already has a root node")]
    RootExists,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
