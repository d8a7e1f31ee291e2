//! Terminal display of visual nodes.
//!
//! Container types (`html`, `body`, `div`, ...) are walked but never shown.
//! Visual types print their contents, coloured by the `color` and
//! `background` properties of their resolved style.

use std::collections::HashSet;

use colored::{Color, ColoredString, Colorize};
use itertools::Itertools;
use tracing::trace;

use crate::config::RenderSettings;
use crate::domain::{Document, DomainResult, NodeId, StyleMap};

/// A visual node ready for printing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub tag: String,
    pub text: String,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl RenderedLine {
    pub fn colored(&self) -> ColoredString {
        let mut s = self.text.normal();
        if let Some(fg) = self.foreground {
            s = s.color(fg);
        }
        if let Some(bg) = self.background {
            s = s.on_color(bg);
        }
        s
    }
}

/// Unknown names (and numbers) yield no colour.
fn style_color(styles: &StyleMap, property: &str) -> Option<Color> {
    styles
        .get(property)
        .and_then(|v| v.as_text())
        .and_then(|name| name.parse::<Color>().ok())
}

#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    visual_types: HashSet<String>,
    uppercase_types: HashSet<String>,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::from_settings(&RenderSettings::default())
    }
}

impl TerminalRenderer {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            visual_types: settings.visual_types.iter().cloned().collect(),
            uppercase_types: settings.uppercase_types.iter().cloned().collect(),
        }
    }

    pub fn is_visual(&self, tag: &str) -> bool {
        self.visual_types.contains(tag)
    }

    /// Visual nodes with contents under `start` (inclusive), pre-order.
    pub fn render(&self, document: &Document, start: NodeId) -> DomainResult<Vec<RenderedLine>> {
        document.get(start)?;
        Ok(document
            .iter_from(start)
            .filter(|(_, _, node)| self.is_visual(node.tag()))
            .filter_map(|(_, _, node)| {
                let contents = node.data.contents.as_deref()?;
                let text = if self.uppercase_types.contains(node.tag()) {
                    contents.to_uppercase()
                } else {
                    contents.to_string()
                };
                trace!(tag = node.tag(), %text, "render");
                Some(RenderedLine {
                    tag: node.tag().to_string(),
                    text,
                    foreground: style_color(&node.styles, "color"),
                    background: style_color(&node.styles, "background"),
                })
            })
            .collect())
    }

    /// Rendered lines joined with newlines, with ANSI colours applied.
    pub fn display(&self, document: &Document, start: NodeId) -> DomainResult<String> {
        Ok(self
            .render(document, start)?
            .iter()
            .map(|line| line.colored().to_string())
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeDefinition, TreeBuilder};

    fn page() -> Document {
        let def = NodeDefinition::new("html").with_children(vec![
            NodeDefinition::new("head"),
            NodeDefinition::new("body").with_children(vec![
                NodeDefinition::new("h1").with_contents("Welcome"),
                NodeDefinition::new("div").with_children(vec![
                    NodeDefinition::new("p").with_contents("first"),
                    NodeDefinition::new("p"),
                ]),
            ]),
        ]);
        TreeBuilder::new().build(&def).unwrap()
    }

    #[test]
    fn given_page_when_rendering_then_only_visual_nodes_with_contents() {
        let doc = page();

        let lines = TerminalRenderer::default()
            .render(&doc, doc.root().unwrap())
            .unwrap();

        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["WELCOME", "first"]);
    }

    #[test]
    fn given_color_styles_when_rendering_then_colors_mapped() {
        let mut doc = page();
        let h1 = doc.resolve(&"1.0".parse().unwrap()).unwrap();
        doc.set_style(h1, "color", "red").unwrap();
        doc.set_style(h1, "background", "not-a-color").unwrap();

        let lines = TerminalRenderer::default().render(&doc, h1).unwrap();

        assert_eq!(lines[0].foreground, Some(Color::Red));
        assert_eq!(lines[0].background, None);
    }
}
