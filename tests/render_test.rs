//! Diagnostic and terminal rendering of the sample page

use std::path::Path;

use colored::Color;

use domcascade::application::{load_document, read_stylesheet};
use domcascade::config::RenderSettings;
use domcascade::domain::{Document, TreeBuilder};
use domcascade::render::{format_hierarchy, to_diagnostic_string, to_tree, TerminalRenderer};
use domcascade::util::testing;

fn styled_page() -> Document {
    testing::init_test_setup();
    let mut doc =
        load_document(Path::new("tests/resources/documents/page.json"), &TreeBuilder::new()).unwrap();
    let sheet = read_stylesheet(Path::new("tests/resources/stylesheets/stylesheet.json")).unwrap();
    let root = doc.require_root().unwrap();
    doc.apply_stylesheet(root, &sheet).unwrap();
    doc
}

#[test]
fn given_styled_page_when_rendering_then_only_visual_nodes_in_order() {
    // Arrange
    let doc = styled_page();
    let renderer = TerminalRenderer::default();

    // Act
    let lines = renderer.render(&doc, doc.require_root().unwrap()).unwrap();

    // Assert
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "HEADING",
            "Lorem ipsum",
            "SECTION HEADING",
            "Dolor sit amet",
            "ASIDE HEADING",
            "Consectetur"
        ]
    );
    assert_eq!(lines[0].foreground, Some(Color::Red));
    assert_eq!(lines[0].background, Some(Color::Black));
    assert_eq!(lines[1].foreground, Some(Color::Blue));
    assert_eq!(lines[3].foreground, Some(Color::Green));
}

#[test]
fn given_custom_settings_when_rendering_then_visual_types_respected() {
    let doc = styled_page();
    let settings = RenderSettings {
        visual_types: vec!["p".into()],
        uppercase_types: vec![],
        color: false,
    };

    let lines = TerminalRenderer::from_settings(&settings)
        .render(&doc, doc.require_root().unwrap())
        .unwrap();

    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.tag == "p"));
}

#[test]
fn given_styled_page_when_formatting_diagnostics_then_one_line_per_node() {
    let doc = styled_page();
    let aside = doc.resolve(&"1.2".parse().unwrap()).unwrap();

    let text = to_diagnostic_string(&doc, aside).unwrap();

    assert_eq!(
        text,
        "Node aside {background:black, color:blue}\n\
         \x20\x20Node h1 {background:black, color:red, size:30}\n\
         \x20\x20Node p {background:black, color:blue}"
    );
}

#[test]
fn given_hierarchy_when_formatting_then_children_of_start_unindented() {
    let doc = styled_page();
    let aside = doc.resolve(&"1.2".parse().unwrap()).unwrap();

    let text = format_hierarchy(&doc.style_hierarchy(aside).unwrap());

    assert_eq!(
        text,
        "h1 {background:black, color:red, size:30}\np {background:black, color:blue}"
    );
}

#[test]
fn given_page_when_building_tree_then_labels_carry_contents() {
    let doc = styled_page();
    let section = doc.resolve(&"1.1".parse().unwrap()).unwrap();

    let rendered = to_tree(&doc, section).unwrap().to_string();

    assert!(rendered.starts_with("section {background:black, color:blue}"));
    assert!(rendered.contains("h1 \"Section heading\""));
    assert!(rendered.contains("p \"Dolor sit amet\" {background:black, color:green}"));
}
