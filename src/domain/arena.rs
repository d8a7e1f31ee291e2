use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::definition::NodePath;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::events::HandlerTable;
use crate::domain::style::{StyleMap, StyleValue};

/// Handle of a node in a [`Document`]. Non-owning: holding one keeps nothing alive.
pub type NodeId = Index;

/// Element payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Element type tag, e.g. `div`, `h1`
    pub tag: String,
    /// Text payload, only kept for content-bearing types
    pub contents: Option<String>,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// Tree node in the arena-based document.
#[derive(Debug)]
pub struct DomNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Indices of child nodes in insertion order
    pub children: Vec<NodeId>,
    /// Effective style after cascading (own + inherited + matched)
    pub styles: StyleMap,
    pub handlers: HandlerTable,
}

impl DomNode {
    pub fn tag(&self) -> &str {
        &self.data.tag
    }
}

/// Arena-based document tree.
///
/// The arena owns every node; parent and child links are plain indices, so
/// the upward link never owns anything and cannot form an ownership cycle.
/// Nodes are never removed or re-parented once inserted.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert a node as the last child of `parent`, or as the root when `parent` is None.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> DomainResult<NodeId> {
        match parent {
            Some(parent_idx) if !self.arena.contains(parent_idx) => {
                return Err(unknown(parent_idx));
            }
            None if self.root.is_some() => return Err(DomainError::RootExists),
            _ => {}
        }

        let node_idx = self.arena.insert(DomNode {
            data,
            parent,
            children: Vec::new(),
            styles: StyleMap::new(),
            handlers: HandlerTable::default(),
        });

        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent) => parent.children.push(node_idx),
            None => self.root = Some(node_idx),
        }
        Ok(node_idx)
    }

    pub fn node(&self, idx: NodeId) -> Option<&DomNode> {
        self.arena.get(idx)
    }

    pub fn node_mut(&mut self, idx: NodeId) -> Option<&mut DomNode> {
        self.arena.get_mut(idx)
    }

    /// Like [`Document::node`], but an unknown id is an error.
    pub fn get(&self, idx: NodeId) -> DomainResult<&DomNode> {
        self.arena.get(idx).ok_or_else(|| unknown(idx))
    }

    pub fn get_mut(&mut self, idx: NodeId) -> DomainResult<&mut DomNode> {
        self.arena.get_mut(idx).ok_or_else(|| unknown(idx))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn require_root(&self) -> DomainResult<NodeId> {
        self.root.ok_or(DomainError::EmptyDocument)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn tag(&self, idx: NodeId) -> Option<&str> {
        self.node(idx).map(DomNode::tag)
    }

    pub fn parent(&self, idx: NodeId) -> Option<NodeId> {
        self.node(idx).and_then(|n| n.parent)
    }

    pub fn children(&self, idx: NodeId) -> &[NodeId] {
        self.node(idx).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors of `idx`, nearest first, ending at the root.
    pub fn ancestors(&self, idx: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(idx);
        while let Some(p) = current {
            chain.push(p);
            current = self.parent(p);
        }
        chain
    }

    /// Pre-order walk of the whole document in insertion order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order walk of the subtree rooted at `idx`, `idx` included at depth 0.
    pub fn iter_from(&self, idx: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(idx))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(_, depth, _)| depth + 1).max().unwrap_or(0)
    }

    /// Follow child indices from the root.
    pub fn resolve(&self, path: &NodePath) -> DomainResult<NodeId> {
        let mut current = self.require_root()?;
        for &i in path.indices() {
            current = *self
                .children(current)
                .get(i)
                .ok_or_else(|| DomainError::PathNotFound(path.clone()))?;
        }
        Ok(current)
    }

    /// Inverse of [`Document::resolve`].
    pub fn path_of(&self, idx: NodeId) -> DomainResult<NodePath> {
        self.get(idx)?;
        let mut indices = Vec::new();
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            let pos = self
                .children(parent)
                .iter()
                .position(|&c| c == current)
                .ok_or_else(|| unknown(current))?;
            indices.push(pos);
            current = parent;
        }
        indices.reverse();
        Ok(NodePath::from(indices))
    }

    pub fn styles(&self, idx: NodeId) -> DomainResult<&StyleMap> {
        Ok(&self.get(idx)?.styles)
    }

    /// Replace a node's styles wholesale (inline styles).
    pub fn set_styles(&mut self, idx: NodeId, styles: StyleMap) -> DomainResult<()> {
        self.get_mut(idx)?.styles = styles;
        Ok(())
    }

    pub fn set_style(
        &mut self,
        idx: NodeId,
        key: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> DomainResult<Option<StyleValue>> {
        Ok(self.get_mut(idx)?.styles.insert(key, value))
    }
}

fn unknown(idx: NodeId) -> DomainError {
    let (index, generation) = idx.into_raw_parts();
    DomainError::UnknownNode(format!("#{}@{}", index, generation))
}

pub struct TreeIterator<'a> {
    document: &'a Document,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> TreeIterator<'a> {
    fn new(document: &'a Document, start: Option<NodeId>) -> Self {
        let mut stack = Vec::new();
        if let Some(start) = start {
            stack.push((start, 0));
        }
        Self { document, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    /// (id, depth relative to the start node, node)
    type Item = (NodeId, usize, &'a DomNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.document.node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((current_idx, depth, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(tag: &str) -> NodeData {
        NodeData {
            tag: tag.to_string(),
            contents: None,
        }
    }

    fn small_document() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let html = doc.insert_node(data("html"), None).unwrap();
        let head = doc.insert_node(data("head"), Some(html)).unwrap();
        let body = doc.insert_node(data("body"), Some(html)).unwrap();
        let h1 = doc.insert_node(data("h1"), Some(body)).unwrap();
        (doc, html, head, body, h1)
    }

    #[test]
    fn given_nodes_when_iterating_then_pre_order_with_depth() {
        let (doc, ..) = small_document();

        let visited: Vec<_> = doc
            .iter()
            .map(|(_, depth, node)| (node.tag().to_string(), depth))
            .collect();

        assert_eq!(
            visited,
            vec![
                ("html".to_string(), 0),
                ("head".to_string(), 1),
                ("body".to_string(), 1),
                ("h1".to_string(), 2)
            ]
        );
        assert_eq!(doc.depth(), 3);
    }

    #[test]
    fn given_leaf_when_listing_ancestors_then_nearest_first() {
        let (doc, html, _, body, h1) = small_document();

        assert_eq!(doc.ancestors(h1), vec![body, html]);
        assert!(doc.ancestors(html).is_empty());
    }

    #[test]
    fn given_node_when_computing_path_then_resolve_returns_same_node() {
        let (doc, _, _, _, h1) = small_document();

        let path = doc.path_of(h1).unwrap();

        assert_eq!(path.to_string(), "1.0");
        assert_eq!(doc.resolve(&path).unwrap(), h1);
    }

    #[test]
    fn given_out_of_range_path_when_resolving_then_path_not_found() {
        let (doc, ..) = small_document();

        let result = doc.resolve(&NodePath::from(vec![5]));

        assert!(matches!(result, Err(DomainError::PathNotFound(_))));
    }

    #[test]
    fn given_existing_root_when_inserting_second_root_then_errors() {
        let (mut doc, ..) = small_document();

        let result = doc.insert_node(data("html"), None);

        assert_eq!(result, Err(DomainError::RootExists));
    }
}
