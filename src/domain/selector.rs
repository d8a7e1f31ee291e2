//! Selector parsing: type selectors and parent/child pair selectors.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::DomainError;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\p{N}_-]*$").expect("valid tag regex"));

/// Whether `tag` is usable as an element type and selector key: a letter
/// (any script) followed by letters, digits, `_` or `-`.
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

/// A parsed stylesheet key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    /// `h1`: every node of that type
    Type(String),
    /// `aside h1`: an `h1` whose immediate parent is an `aside`.
    /// Deeper ancestors do not match.
    DescendantPair { parent: String, child: String },
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Type(tag) => write!(f, "{}", tag),
            Selector::DescendantPair { parent, child } => write!(f, "{} {}", parent, child),
        }
    }
}

impl FromStr for Selector {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| DomainError::InvalidSelector {
            selector: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split_whitespace().collect();
        if let Some(bad) = parts.iter().find(|p| !is_valid_tag(p)) {
            return Err(invalid(format!("'{}' is not a type tag", bad)));
        }
        match parts.as_slice() {
            [] => Err(invalid("empty selector".to_string())),
            [tag] => Ok(Selector::Type(tag.to_string())),
            [parent, child] => Ok(Selector::DescendantPair {
                parent: parent.to_string(),
                child: child.to_string(),
            }),
            _ => Err(invalid(format!("{} tags, at most two supported", parts.len()))),
        }
    }
}
