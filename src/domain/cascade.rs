//! Style cascade: inherited style overlaid by matching stylesheet rules.
//!
//! Precedence per node, later wins:
//! inherited from parent < type selector < parent/child pair selector.
//! Resolution is eager: after `apply_stylesheet` a node's `styles` already
//! hold its full effective style.

use tracing::{instrument, trace};

use crate::domain::arena::{Document, NodeId};
use crate::domain::error::DomainResult;
use crate::domain::style::StyleMap;
use crate::domain::stylesheet::Stylesheet;

/// One line of a style hierarchy listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledNode {
    pub id: NodeId,
    /// Depth below the node the listing started from (children are 1)
    pub depth: usize,
    pub tag: String,
    pub styles: StyleMap,
}

impl Document {
    /// Cascade `stylesheet` into every descendant of `start`, top-down.
    ///
    /// `start` itself is only read, as the first inheritance seed. Each call
    /// layers onto the current styles, so repeating it with the same sheet
    /// rewrites the same values and adds nothing new. Returns the number of
    /// nodes styled.
    #[instrument(level = "debug", skip(self, stylesheet), fields(rules = stylesheet.len()))]
    pub fn apply_stylesheet(&mut self, start: NodeId, stylesheet: &Stylesheet) -> DomainResult<usize> {
        let mut stack: Vec<(NodeId, NodeId)> = self
            .get(start)?
            .children
            .iter()
            .rev()
            .map(|&child| (child, start))
            .collect();
        let mut styled = 0;

        while let Some((child_idx, parent_idx)) = stack.pop() {
            let parent = self.get(parent_idx)?;
            let inherited = parent.styles.clone();
            let parent_tag = parent.data.tag.clone();

            let child = self.get_mut(child_idx)?;
            child.styles.extend_from(&inherited);
            if let Some(declarations) = stylesheet.type_rule(&child.data.tag) {
                child.styles.extend_from(declarations);
            }
            if let Some(declarations) = stylesheet.pair_rule(&parent_tag, &child.data.tag) {
                child.styles.extend_from(declarations);
            }
            trace!(tag = %child.data.tag, styles = %child.styles, "resolved");
            styled += 1;

            for &grandchild in child.children.iter().rev() {
                stack.push((grandchild, child_idx));
            }
        }

        Ok(styled)
    }

    /// Descendants of `start` with type `tag` and at least one resolved
    /// property, depth-first in insertion order.
    pub fn find_styled(&self, start: NodeId, tag: &str) -> DomainResult<Vec<(NodeId, StyleMap)>> {
        self.get(start)?;
        Ok(self
            .iter_from(start)
            .skip(1)
            .filter(|(_, _, node)| node.data.tag == tag && !node.styles.is_empty())
            .map(|(id, _, node)| (id, node.styles.clone()))
            .collect())
    }

    /// Every descendant of `start` with its resolved style, pre-order.
    pub fn style_hierarchy(&self, start: NodeId) -> DomainResult<Vec<StyledNode>> {
        self.get(start)?;
        Ok(self
            .iter_from(start)
            .skip(1)
            .map(|(id, depth, node)| StyledNode {
                id,
                depth,
                tag: node.data.tag.clone(),
                styles: node.styles.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;
    use crate::domain::definition::NodeDefinition;

    fn sheet(rules: Vec<(&str, StyleMap)>) -> Stylesheet {
        Stylesheet::from_rules(rules).unwrap()
    }

    #[test]
    fn given_start_node_when_applying_then_start_styles_untouched() {
        let def = NodeDefinition::new("body").with_children(vec![NodeDefinition::new("p")]);
        let mut doc = TreeBuilder::new().build(&def).unwrap();
        let body = doc.root().unwrap();
        let stylesheet = sheet(vec![("body", StyleMap::new().with("background", "black"))]);

        let styled = doc.apply_stylesheet(body, &stylesheet).unwrap();

        assert_eq!(styled, 1);
        assert!(doc.styles(body).unwrap().is_empty());
    }

    #[test]
    fn given_same_sheet_twice_when_applying_then_result_unchanged() {
        let def = NodeDefinition::new("html")
            .with_children(vec![NodeDefinition::new("body")
                .with_children(vec![NodeDefinition::new("h1")])]);
        let mut doc = TreeBuilder::new().build(&def).unwrap();
        let root = doc.root().unwrap();
        let stylesheet = sheet(vec![
            ("body", StyleMap::new().with("color", "blue")),
            ("h1", StyleMap::new().with("size", 50)),
        ]);

        doc.apply_stylesheet(root, &stylesheet).unwrap();
        let first: Vec<_> = doc.iter().map(|(_, _, n)| n.styles.to_string()).collect();
        doc.apply_stylesheet(root, &stylesheet).unwrap();
        let second: Vec<_> = doc.iter().map(|(_, _, n)| n.styles.to_string()).collect();

        assert_eq!(first, second);
        assert_eq!(second, vec!["", "color:blue", "color:blue, size:50"]);
    }

    #[test]
    fn given_unmatched_selector_when_applying_then_ignored() {
        let def = NodeDefinition::new("html").with_children(vec![NodeDefinition::new("p")]);
        let mut doc = TreeBuilder::new().build(&def).unwrap();
        let root = doc.root().unwrap();

        doc.apply_stylesheet(root, &sheet(vec![("table", StyleMap::new().with("x", 1))]))
            .unwrap();

        assert!(doc.iter().all(|(_, _, n)| n.styles.is_empty()));
    }
}
