use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::modifier_error::ConfigError;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierConfig {
    /// How long a cached actor modifier map stays fresh after it was written
    pub cache_ttl_ms: u64,
    /// Name of the metadata attribute actor modifiers are attached under
    pub attachment_name: String,
}

impl Default for ModifierConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: 200,
            attachment_name: "stat_modifiers".to_string(),
        }
    }
}

impl ModifierConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
