//! Parsed stylesheets: selector keys resolved once, looked up per node.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::selector::Selector;
use crate::domain::style::StyleMap;

/// Selector to declarations, indexed for the two supported selector shapes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "BTreeMap<String, StyleMap>")]
pub struct Stylesheet {
    type_rules: HashMap<String, StyleMap>,
    /// parent tag -> child tag -> declarations
    pair_rules: HashMap<String, HashMap<String, StyleMap>>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every selector key. Keys normalising to the same selector are
    /// merged in iteration order, later declarations winning.
    pub fn from_rules<I, S>(rules: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (S, StyleMap)>,
        S: AsRef<str>,
    {
        let mut sheet = Self::new();
        for (key, declarations) in rules {
            let selector: Selector = key.as_ref().parse()?;
            sheet.add_rule(selector, declarations);
        }
        debug!(rules = sheet.len(), "stylesheet parsed");
        Ok(sheet)
    }

    pub fn add_rule(&mut self, selector: Selector, declarations: StyleMap) {
        let slot = match selector {
            Selector::Type(tag) => self.type_rules.entry(tag).or_default(),
            Selector::DescendantPair { parent, child } => self
                .pair_rules
                .entry(parent)
                .or_default()
                .entry(child)
                .or_default(),
        };
        slot.extend_from(&declarations);
    }

    pub fn type_rule(&self, tag: &str) -> Option<&StyleMap> {
        self.type_rules.get(tag)
    }

    pub fn pair_rule(&self, parent: &str, child: &str) -> Option<&StyleMap> {
        self.pair_rules.get(parent).and_then(|c| c.get(child))
    }

    /// All rules, sorted by selector.
    pub fn rules(&self) -> Vec<(Selector, &StyleMap)> {
        let types = self
            .type_rules
            .iter()
            .map(|(tag, decl)| (Selector::Type(tag.clone()), decl));
        let pairs = self.pair_rules.iter().flat_map(|(parent, children)| {
            children.iter().map(move |(child, decl)| {
                (
                    Selector::DescendantPair {
                        parent: parent.clone(),
                        child: child.clone(),
                    },
                    decl,
                )
            })
        });
        let mut all: Vec<_> = types.chain(pairs).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.type_rules.len() + self.pair_rules.values().map(HashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<BTreeMap<String, StyleMap>> for Stylesheet {
    type Error = DomainError;

    fn try_from(rules: BTreeMap<String, StyleMap>) -> Result<Self, Self::Error> {
        Stylesheet::from_rules(rules)
    }
}
