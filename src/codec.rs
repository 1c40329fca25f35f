//! Encoding between typed modifiers and the flat field records they are
//! stored as.
//!
//! Both storage media go through here. Item modifiers become a
//! [`TagContainer`] of `stat`, `amount`, `slots` and `operation`; actor
//! modifiers become a [`MetadataTable`] of `stat`, `amount` and `operation`.
//! All string lookups (operation name, stat id, slot tokens) happen in this
//! module and nowhere else.

use std::fmt;

use crate::equipment_slot::SlotSet;
use crate::metadata::{MetadataTable, MetadataValue};
use crate::modifier::{ItemStatModifier, PlayerStatModifier};
use crate::modifier_error::{DecodeError, DecodeResult};
use crate::modifier_key::ModifierKey;
use crate::operation::ModifierOperation;
use crate::stat::{Stat, StatRegistry};
use crate::tag_tree::{TagContainer, TagValue};

pub(crate) const STAT_FIELD: &str = "stat";
pub(crate) const AMOUNT_FIELD: &str = "amount";
pub(crate) const SLOTS_FIELD: &str = "slots";
pub(crate) const OPERATION_FIELD: &str = "operation";

/// Something that was not fatal to a decode but was thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A slot token that names no known slot
    IgnoredSlot(String),
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::IgnoredSlot(token) => write!(f, "ignored unknown slot '{}'", token),
        }
    }
}

/// A successfully decoded modifier along with everything that was dropped
/// on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<M> {
    pub modifier: M,
    pub warnings: Vec<DecodeWarning>,
}

impl<M> Decoded<M> {
    fn clean(modifier: M) -> Self {
        Self { modifier, warnings: Vec::new() }
    }
}

/// A flat record of named text and number fields.
pub trait FieldRecord {
    fn read_text(&self, field: &'static str) -> DecodeResult<&str>;
    fn read_number(&self, field: &'static str) -> DecodeResult<f64>;
    fn write_text(&mut self, field: &'static str, value: String);
    fn write_number(&mut self, field: &'static str, value: f64);
}

impl FieldRecord for TagContainer {
    fn read_text(&self, field: &'static str) -> DecodeResult<&str> {
        match self.get(&ModifierKey::internal(field)) {
            Some(TagValue::String(value)) => Ok(value),
            Some(_) => Err(DecodeError::WrongType { field, expected: "string" }),
            None => Err(DecodeError::MissingField { field }),
        }
    }

    fn read_number(&self, field: &'static str) -> DecodeResult<f64> {
        match self.get(&ModifierKey::internal(field)) {
            Some(TagValue::Double(value)) => Ok(*value),
            Some(_) => Err(DecodeError::WrongType { field, expected: "double" }),
            None => Err(DecodeError::MissingField { field }),
        }
    }

    fn write_text(&mut self, field: &'static str, value: String) {
        self.set(ModifierKey::internal(field), value);
    }

    fn write_number(&mut self, field: &'static str, value: f64) {
        self.set(ModifierKey::internal(field), value);
    }
}

impl FieldRecord for MetadataTable {
    fn read_text(&self, field: &'static str) -> DecodeResult<&str> {
        match self.get(field) {
            Some(MetadataValue::Text(value)) => Ok(value),
            Some(_) => Err(DecodeError::WrongType { field, expected: "text" }),
            None => Err(DecodeError::MissingField { field }),
        }
    }

    fn read_number(&self, field: &'static str) -> DecodeResult<f64> {
        match self.get(field) {
            Some(MetadataValue::Number(value)) => Ok(*value),
            Some(_) => Err(DecodeError::WrongType { field, expected: "number" }),
            None => Err(DecodeError::MissingField { field }),
        }
    }

    fn write_text(&mut self, field: &'static str, value: String) {
        self.insert(field.to_string(), MetadataValue::Text(value));
    }

    fn write_number(&mut self, field: &'static str, value: f64) {
        self.insert(field.to_string(), MetadataValue::Number(value));
    }
}

fn encode_common<R: FieldRecord>(record: &mut R, stat: &Stat, amount: f64, operation: ModifierOperation) {
    record.write_text(STAT_FIELD, stat.id().to_string());
    record.write_number(AMOUNT_FIELD, amount);
    record.write_text(OPERATION_FIELD, operation.name().to_string());
}

fn decode_common<R: FieldRecord>(
    record: &R,
    registry: &StatRegistry,
) -> DecodeResult<(Stat, f64, ModifierOperation)> {
    let stat_id = record.read_text(STAT_FIELD)?;
    let amount = record.read_number(AMOUNT_FIELD)?;
    let operation = record.read_text(OPERATION_FIELD)?.parse::<ModifierOperation>()?;
    let stat = registry
        .get_by_id(stat_id)
        .ok_or_else(|| DecodeError::UnknownStat(stat_id.to_string()))?;

    Ok((stat, amount, operation))
}

/// Reads only the stat id of a stored record, without resolving it.
pub(crate) fn stored_stat_id<R: FieldRecord>(record: &R) -> Option<&str> {
    record.read_text(STAT_FIELD).ok()
}

pub fn encode_item_modifier(modifier: &ItemStatModifier) -> TagContainer {
    let mut record = TagContainer::new();
    encode_common(&mut record, &modifier.stat, modifier.amount, modifier.operation);
    record.write_text(SLOTS_FIELD, modifier.slots.to_tokens());
    record
}

/// Decodes the item modifier stored under `key`.
///
/// Unknown slot tokens are dropped and reported as warnings. A missing
/// `slots` field is treated as unrestricted.
pub fn decode_item_modifier(
    key: &ModifierKey,
    value: &TagValue,
    registry: &StatRegistry,
) -> DecodeResult<Decoded<ItemStatModifier>> {
    let TagValue::Container(record) = value else {
        return Err(DecodeError::MalformedEntry { key: key.to_string() });
    };

    let (stat, amount, operation) = decode_common(record, registry)?;
    let (slots, ignored) = match record.read_text(SLOTS_FIELD) {
        Ok(tokens) => SlotSet::parse_lenient(tokens),
        Err(DecodeError::MissingField { .. }) => (SlotSet::new(), Vec::new()),
        Err(err) => return Err(err),
    };

    Ok(Decoded {
        modifier: ItemStatModifier {
            key: key.clone(),
            stat,
            amount,
            operation,
            slots,
        },
        warnings: ignored.into_iter().map(DecodeWarning::IgnoredSlot).collect(),
    })
}

pub fn encode_player_modifier(modifier: &PlayerStatModifier) -> MetadataValue {
    let mut record = MetadataTable::new();
    encode_common(&mut record, &modifier.stat, modifier.amount, modifier.operation);
    MetadataValue::Table(record)
}

pub fn decode_player_modifier(
    key: &ModifierKey,
    value: &MetadataValue,
    registry: &StatRegistry,
) -> DecodeResult<Decoded<PlayerStatModifier>> {
    let MetadataValue::Table(record) = value else {
        return Err(DecodeError::MalformedEntry { key: key.to_string() });
    };

    let (stat, amount, operation) = decode_common(record, registry)?;
    Ok(Decoded::clean(PlayerStatModifier {
        key: key.clone(),
        stat,
        amount,
        operation,
    }))
}
