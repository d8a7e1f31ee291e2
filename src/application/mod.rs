//! Application layer: file loading and scripted event handlers
//!
//! This layer turns files and command-line descriptions into domain objects.

pub mod error;
pub mod error_ext;
pub mod loader;
pub mod scripted;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loader::{build_document, load_document, read_definition, read_stylesheet, Format};
pub use scripted::{DispatchLog, Firing, HandlerTarget, ScriptedHandler};
