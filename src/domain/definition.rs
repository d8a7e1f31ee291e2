//! Declarative tree definitions and node addresses.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::style::StyleMap;

/// Declarative description of a node and its subtree.
///
/// ```json
/// { "type": "body", "children": [{ "type": "h1", "contents": "Hello" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Element type tag; optional here so a missing tag is reported with its path
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    /// Inline styles, assigned after construction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleMap>,
}

impl NodeDefinition {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn with_children(mut self, children: Vec<NodeDefinition>) -> Self {
        self.children = children;
        self
    }

    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = Some(contents.into());
        self
    }

    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = Some(styles);
        self
    }

    /// Number of nodes in this definition, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeDefinition::count).sum::<usize>()
    }
}

/// Address of a node as child indices from the root.
///
/// `1.0.2` is the third child of the first child of the root's second child.
/// The root itself is the empty path, written `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.iter().join("."))
        }
    }
}

impl FromStr for NodePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "." {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| DomainError::InvalidPath(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
