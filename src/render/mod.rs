//! Output layer: diagnostic text, tree views and coloured terminal display
//!
//! Everything here formats already-resolved document state; nothing mutates it.

pub mod diagnostic;
pub mod terminal;

pub use diagnostic::{format_hierarchy, to_diagnostic_string, to_tree};
pub use terminal::{RenderedLine, TerminalRenderer};
