use std::collections::BTreeMap;

use bevy::{platform::collections::HashMap, prelude::*};
use serde::{Deserialize, Serialize};

/// A loosely typed value attached to an actor through [`Metadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataValue {
    Text(String),
    Number(f64),
    Table(MetadataTable),
}

pub type MetadataTable = BTreeMap<String, MetadataValue>;

impl MetadataValue {
    pub fn as_table(&self) -> Option<&MetadataTable> {
        match self {
            MetadataValue::Table(table) => Some(table),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Number(value)
    }
}

impl From<MetadataTable> for MetadataValue {
    fn from(value: MetadataTable) -> Self {
        MetadataValue::Table(value)
    }
}

/// Side-channel values attached to a live actor, at most one per name.
///
/// Nothing here is persisted. Clearing the component (or despawning the
/// actor) drops everything attached to it.
#[derive(Component, Debug, Clone, Default)]
pub struct Metadata {
    values: HashMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        self.values.get(name)
    }

    /// Attaches `value` under `name`, replacing whatever was there.
    pub fn set<V: Into<MetadataValue>>(&mut self, name: &str, value: V) -> Option<MetadataValue> {
        self.values.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<MetadataValue> {
        self.values.remove(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
