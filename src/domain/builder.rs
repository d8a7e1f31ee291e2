//! Tree builder: declarative definitions to arena documents.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::domain::arena::{Document, NodeData};
use crate::domain::definition::{NodeDefinition, NodePath};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::selector::is_valid_tag;

/// Construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Types whose `contents` are kept; contents on any other type are dropped
    pub content_types: HashSet<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            content_types: ["h1", "p"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Constructs a [`Document`] mirroring a [`NodeDefinition`]: same node
/// count, same order, same nesting. Styles and handlers start empty.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    options: BuildOptions,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the document. The first malformed definition aborts construction.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, definition: &NodeDefinition) -> DomainResult<Document> {
        let mut document = Document::new();
        let mut stack = vec![(definition, None, NodePath::root())];

        while let Some((current, parent_idx, path)) = stack.pop() {
            let tag = validate_tag(current, &path)?;
            let contents = self.contents_for(current, tag, &path);

            let current_idx = document.insert_node(
                NodeData {
                    tag: tag.to_string(),
                    contents,
                },
                parent_idx,
            )?;

            // Reverse push so siblings are inserted left to right
            for (i, child) in current.children.iter().enumerate().rev() {
                stack.push((child, Some(current_idx), path.child(i)));
            }
        }

        debug!(nodes = document.len(), depth = document.depth(), "document built");
        Ok(document)
    }

    fn contents_for(&self, definition: &NodeDefinition, tag: &str, path: &NodePath) -> Option<String> {
        let contents = definition.contents.as_ref()?;
        if self.options.content_types.contains(tag) {
            Some(contents.clone())
        } else {
            warn!(%path, tag, "contents ignored on non-content type");
            None
        }
    }
}

fn validate_tag<'d>(definition: &'d NodeDefinition, path: &NodePath) -> DomainResult<&'d str> {
    let tag = definition
        .tag
        .as_deref()
        .ok_or_else(|| DomainError::MissingTag { path: path.clone() })?;
    if tag.trim().is_empty() {
        return Err(DomainError::MissingTag { path: path.clone() });
    }
    if !is_valid_tag(tag) {
        return Err(DomainError::InvalidTag {
            path: path.clone(),
            tag: tag.to_string(),
        });
    }
    Ok(tag)
}
