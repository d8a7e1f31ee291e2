//! Domain layer: document tree, style cascade and event dispatch
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod cascade;
pub mod definition;
pub mod error;
pub mod events;
pub mod selector;
pub mod style;
pub mod stylesheet;

pub use arena::{Document, DomNode, NodeData, NodeId};
pub use builder::{BuildOptions, TreeBuilder};
pub use cascade::StyledNode;
pub use definition::{NodeDefinition, NodePath};
pub use error::{DomainError, DomainResult};
pub use events::{handler, DispatchReport, Handler, HandlerContext, HandlerTable, Propagation};
pub use selector::Selector;
pub use style::{StyleMap, StyleValue};
pub use stylesheet::Stylesheet;
