use thiserror::Error;

/// Why a single stored modifier could not be turned back into a typed value.
///
/// These are always local to one entry. Aggregate reads skip the entry and
/// keep going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The entry under a modifier key is not a record at all
    #[error("modifier entry '{key}' is not a record")]
    MalformedEntry { key: String },

    /// A required field is absent
    #[error("modifier field '{field}' is missing")]
    MissingField { field: &'static str },

    /// A field holds a value of the wrong type
    #[error("modifier field '{field}' has the wrong type, expected {expected}")]
    WrongType { field: &'static str, expected: &'static str },

    /// The stored operation name is not one we know
    #[error("unknown modifier operation '{0}'")]
    UnknownOperation(String),

    /// The stored stat id does not resolve in the registry
    #[error("stat '{0}' is not registered")]
    UnknownStat(String),
}

/// Errors from the durable byte form of a tag tree.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("tag data is corrupt: {0}")]
    Corrupt(#[from] bincode::Error),
}

/// A `namespace:name` string that is not a valid modifier key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("modifier key '{0}' has an empty namespace or name")]
    Empty(String),

    #[error("invalid character '{character}' in modifier key '{key}'")]
    InvalidCharacter { key: String, character: char },
}

/// Configuration problems for the add-stat effect.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("You must specify the stat!")]
    MissingStat,

    #[error("You must specify the amount to add/remove!")]
    MissingAmount,

    #[error("failed to parse amount expression '{expression}': {details}")]
    InvalidExpression { expression: String, details: String },

    #[error("failed to evaluate amount expression '{expression}': {details}")]
    Evaluation { expression: String, details: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid modifier config: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type DecodeResult<T> = Result<T, DecodeError>;
