//! Reading document definitions and stylesheets from JSON or TOML files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Document, NodeDefinition, NodePath, Stylesheet, TreeBuilder};

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Format::Toml),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Deserialize `content`; `path` is only used in error messages.
    pub fn parse<T: DeserializeOwned>(self, content: &str, path: &Path) -> ApplicationResult<T> {
        let parsed = match self {
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| ApplicationError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}

fn read<T: DeserializeOwned>(path: &Path, what: &str) -> ApplicationResult<T> {
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path).with_path_context(&format!("read {}", what), path)?;
    format.parse(&content, path)
}

#[instrument(level = "debug")]
pub fn read_definition(path: &Path) -> ApplicationResult<NodeDefinition> {
    read(path, "document")
}

#[instrument(level = "debug")]
pub fn read_stylesheet(path: &Path) -> ApplicationResult<Stylesheet> {
    let sheet: Stylesheet = read(path, "stylesheet")?;
    debug!(rules = sheet.len(), "stylesheet loaded");
    Ok(sheet)
}

/// Build a document, then assign the inline `styles` of each definition.
pub fn build_document(
    definition: &NodeDefinition,
    builder: &TreeBuilder,
) -> ApplicationResult<Document> {
    let mut document = builder.build(definition)?;

    let mut stack = vec![(definition, NodePath::root())];
    while let Some((current, path)) = stack.pop() {
        if let Some(styles) = &current.styles {
            let idx = document.resolve(&path)?;
            document.set_styles(idx, styles.clone())?;
        }
        for (i, child) in current.children.iter().enumerate() {
            stack.push((child, path.child(i)));
        }
    }
    Ok(document)
}

pub fn load_document(path: &Path, builder: &TreeBuilder) -> ApplicationResult<Document> {
    let definition = read_definition(path)?;
    build_document(&definition, builder)
}
