//! Style values and insertion-ordered style maps.

use std::fmt;

use itertools::Itertools;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single style property value: free text (`red`) or a number (`50`, `1.5`).
///
/// Whole numbers stay integers so large values survive unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            StyleValue::Integer(_) | StyleValue::Number(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StyleValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Any numeric value as `f64`; integers beyond 2^53 are rounded.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Integer(n) => Some(*n as f64),
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Integer(n) => write!(f, "{}", n),
            // f64 Display already prints whole numbers without a fraction
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Number(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Integer(i64::from(value))
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        StyleValue::Integer(value)
    }
}

/// Property name to value mapping that remembers declaration order.
///
/// `insert` overwrites an existing key in place, so a property keeps the
/// position where it was first declared; new keys are appended. Each node
/// owns its own map, nothing is shared between nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    entries: Vec<(String, StyleValue)>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for literals.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a property. Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<StyleValue>,
    ) -> Option<StyleValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&StyleValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<StyleValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Overlay every declaration of `other` onto `self`; `other` wins on conflicts.
    pub fn extend_from(&mut self, other: &StyleMap) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `key:value, key:value` in declaration order.
impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.iter().map(|(k, v)| format!("{}:{}", k, v)).join(", ")
        )
    }
}

impl<K, V> FromIterator<(K, V)> for StyleMap
where
    K: Into<String>,
    V: Into<StyleValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = StyleMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for StyleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct StyleMapVisitor;

impl<'de> Visitor<'de> for StyleMapVisitor {
    type Value = StyleMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a mapping of style property names to text or numbers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = StyleMap::new();
        while let Some((key, value)) = access.next_entry::<String, StyleValue>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for StyleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StyleMapVisitor)
    }
}
