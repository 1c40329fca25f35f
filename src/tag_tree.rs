use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::modifier_error::TagError;
use crate::modifier_key::ModifierKey;

/// A single typed value stored in a [`TagContainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    String(String),
    Double(f64),
    Container(TagContainer),
}

impl TagValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TagValue::String(_) => "string",
            TagValue::Double(_) => "double",
            TagValue::Container(_) => "container",
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::String(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::String(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Double(value)
    }
}

impl From<TagContainer> for TagValue {
    fn from(value: TagContainer) -> Self {
        TagValue::Container(value)
    }
}

/// A nested, typed key-value store. Items carry one of these as their
/// persistent data.
///
/// Keys are namespaced, iteration order is key order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TagContainer {
    entries: BTreeMap<ModifierKey, TagValue>,
}

impl TagContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ModifierKey) -> Option<&TagValue> {
        self.entries.get(key)
    }

    pub fn set<V: Into<TagValue>>(&mut self, key: ModifierKey, value: V) -> Option<TagValue> {
        self.entries.insert(key, value.into())
    }

    pub fn remove(&mut self, key: &ModifierKey) -> Option<TagValue> {
        self.entries.remove(key)
    }

    pub fn has(&self, key: &ModifierKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ModifierKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModifierKey, &TagValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_string(&self, key: &ModifierKey) -> Option<&str> {
        match self.entries.get(key) {
            Some(TagValue::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn get_double(&self, key: &ModifierKey) -> Option<f64> {
        match self.entries.get(key) {
            Some(TagValue::Double(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn get_container(&self, key: &ModifierKey) -> Option<&TagContainer> {
        match self.entries.get(key) {
            Some(TagValue::Container(value)) => Some(value),
            _ => None,
        }
    }

    /// Durable byte form of the whole tree.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TagError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TagError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
