use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::modifier_error::DecodeError;

/// How a modifier's amount combines into a stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierOperation {
    /// Summed into the base value
    #[default]
    Add,
    /// Scales the summed value
    Multiply,
    /// Replaces the result entirely
    Override,
}

impl ModifierOperation {
    pub const ALL: [ModifierOperation; 3] = [Self::Add, Self::Multiply, Self::Override];

    /// The symbolic name used in stored data.
    pub fn name(self) -> &'static str {
        match self {
            ModifierOperation::Add => "ADD",
            ModifierOperation::Multiply => "MULTIPLY",
            ModifierOperation::Override => "OVERRIDE",
        }
    }
}

impl fmt::Display for ModifierOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModifierOperation {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| DecodeError::UnknownOperation(s.to_string()))
    }
}
