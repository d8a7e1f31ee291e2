use itertools::Itertools;
use termtree::Tree;

use crate::domain::{Document, DomNode, DomainResult, NodeId, StyledNode};

/// One line per node, `Node <type> {k:v, k:v}`, children two spaces deeper.
pub fn to_diagnostic_string(document: &Document, start: NodeId) -> DomainResult<String> {
    document.get(start)?;
    Ok(document
        .iter_from(start)
        .map(|(_, depth, node)| {
            format!("{}Node {} {{{}}}", " ".repeat(depth * 2), node.tag(), node.styles)
        })
        .join("\n"))
}

/// `<type> {k:v}` per line, indented by depth below the listing's start.
pub fn format_hierarchy(entries: &[StyledNode]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "{}{} {{{}}}",
                "  ".repeat(e.depth.saturating_sub(1)),
                e.tag,
                e.styles
            )
        })
        .join("\n")
}

fn label(node: &DomNode) -> String {
    let mut label = node.tag().to_string();
    if let Some(contents) = &node.data.contents {
        label.push_str(&format!(" \"{}\"", contents));
    }
    if !node.styles.is_empty() {
        label.push_str(&format!(" {{{}}}", node.styles));
    }
    label
}

/// Box-drawing tree of the subtree at `start`.
pub fn to_tree(document: &Document, start: NodeId) -> DomainResult<Tree<String>> {
    fn build_tree(document: &Document, node_idx: NodeId, parent_tree: &mut Tree<String>) {
        for &child_idx in document.children(node_idx) {
            if let Some(child) = document.node(child_idx) {
                let mut child_tree = Tree::new(label(child));
                build_tree(document, child_idx, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }
    }

    let mut tree = Tree::new(label(document.get(start)?));
    build_tree(document, start, &mut tree);
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeDefinition, StyleMap, TreeBuilder};

    fn document() -> Document {
        let def = NodeDefinition::new("html").with_children(vec![
            NodeDefinition::new("head"),
            NodeDefinition::new("body").with_children(vec![NodeDefinition::new("h1").with_contents("Hi")]),
        ]);
        TreeBuilder::new().build(&def).unwrap()
    }

    #[test]
    fn given_styled_body_when_formatting_then_matches_indented_layout() {
        let mut doc = document();
        let body = doc.resolve(&"1".parse().unwrap()).unwrap();
        doc.set_styles(body, StyleMap::new().with("background", "red").with("color", "blue"))
            .unwrap();

        let text = to_diagnostic_string(&doc, doc.root().unwrap()).unwrap();

        assert_eq!(
            text,
            "Node html {}\n  Node head {}\n  Node body {background:red, color:blue}\n    Node h1 {}"
        );
    }

    #[test]
    fn given_document_when_building_tree_then_labels_include_contents() {
        let doc = document();

        let tree = to_tree(&doc, doc.root().unwrap()).unwrap().to_string();

        assert!(tree.starts_with("html\n"));
        assert!(tree.contains("h1 \"Hi\""));
    }
}
