use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::modifier_error::KeyParseError;

/// A namespaced identifier for one modifier within one target's modifier set.
///
/// Displayed and stored as `namespace:name`. Two modifiers on the same target
/// with the same key are the same modifier; adding again replaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModifierKey {
    namespace: String,
    name: String,
}

impl ModifierKey {
    pub const SEPARATOR: char = ':';
    pub const DEFAULT_NAMESPACE: &'static str = "gauge";

    pub fn new(namespace: &str, name: &str) -> Result<Self, KeyParseError> {
        let full = format!("{}{}{}", namespace, Self::SEPARATOR, name);
        if namespace.is_empty() || name.is_empty() {
            return Err(KeyParseError::Empty(full));
        }
        if let Some(character) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(KeyParseError::InvalidCharacter { key: full, character });
        }
        if let Some(character) = name.chars().find(|c| !is_namespace_char(*c) && *c != '/') {
            return Err(KeyParseError::InvalidCharacter { key: full, character });
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// Keys the crate itself uses for its stored data.
    pub(crate) fn internal(name: &'static str) -> Self {
        Self {
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            name: name.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-')
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, Self::SEPARATOR, self.name)
    }
}

impl FromStr for ModifierKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(Self::SEPARATOR) {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new(Self::DEFAULT_NAMESPACE, s),
        }
    }
}

impl Serialize for ModifierKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModifierKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_and_bare_keys() {
        let key: ModifierKey = "skills:strength_bonus".parse().unwrap();
        assert_eq!(key.namespace(), "skills");
        assert_eq!(key.name(), "strength_bonus");

        let bare: ModifierKey = "ring/of_power".parse().unwrap();
        assert_eq!(bare.namespace(), ModifierKey::DEFAULT_NAMESPACE);
        assert_eq!(bare.to_string(), "gauge:ring/of_power");
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(
            ModifierKey::new("", "x"),
            Err(KeyParseError::Empty(":x".to_string()))
        );
        assert!(matches!(
            "Skills:x".parse::<ModifierKey>(),
            Err(KeyParseError::InvalidCharacter { character: 'S', .. })
        ));
        // '/' is only legal in the name
        assert!("a/b:c".parse::<ModifierKey>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let key = ModifierKey::new("effects", "haste.1").unwrap();
        assert_eq!(key.to_string().parse::<ModifierKey>().unwrap(), key);
    }
}
