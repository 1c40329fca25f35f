use std::fmt;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Where an item can be worn or held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Legs,
    Feet,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 6] = [
        Self::MainHand,
        Self::OffHand,
        Self::Head,
        Self::Chest,
        Self::Legs,
        Self::Feet,
    ];

    /// Canonical token written to stored data.
    pub fn token(self) -> &'static str {
        match self {
            EquipmentSlot::MainHand => "MAINHAND",
            EquipmentSlot::OffHand => "OFFHAND",
            EquipmentSlot::Head => "HEAD",
            EquipmentSlot::Chest => "CHEST",
            EquipmentSlot::Legs => "LEGS",
            EquipmentSlot::Feet => "FEET",
        }
    }

    /// Parses a stored token. Older data spells the hands `HAND` / `OFF_HAND`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "MAINHAND" | "HAND" => Some(Self::MainHand),
            "OFFHAND" | "OFF_HAND" => Some(Self::OffHand),
            "HEAD" => Some(Self::Head),
            "CHEST" => Some(Self::Chest),
            "LEGS" => Some(Self::Legs),
            "FEET" => Some(Self::Feet),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

type SlotBits = BitArr!(for 6, in u8, Lsb0);

/// The slots an item modifier is restricted to. Empty means any slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotSet {
    bits: SlotBits,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: EquipmentSlot) -> &mut Self {
        self.bits.set(slot.index(), true);
        self
    }

    pub fn remove(&mut self, slot: EquipmentSlot) -> &mut Self {
        self.bits.set(slot.index(), false);
        self
    }

    pub fn contains(&self, slot: EquipmentSlot) -> bool {
        self.bits[slot.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    /// An unrestricted set allows every slot.
    pub fn allows(&self, slot: EquipmentSlot) -> bool {
        self.is_empty() || self.contains(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = EquipmentSlot> + '_ {
        self.bits.iter_ones().map(|index| EquipmentSlot::ALL[index])
    }

    /// Comma-joined canonical tokens, the empty string when unrestricted.
    pub fn to_tokens(&self) -> String {
        self.iter().map(EquipmentSlot::token).collect::<Vec<_>>().join(",")
    }

    /// Parses comma-separated tokens. Blank tokens are dropped silently;
    /// unknown ones are returned so the caller can report them.
    pub fn parse_lenient(tokens: &str) -> (Self, Vec<String>) {
        let mut slots = Self::new();
        let mut ignored = Vec::new();
        for token in tokens.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match EquipmentSlot::from_token(token) {
                Some(slot) => {
                    slots.insert(slot);
                }
                None => ignored.push(token.to_string()),
            }
        }
        (slots, ignored)
    }
}

impl fmt::Debug for SlotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<EquipmentSlot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = EquipmentSlot>>(iter: I) -> Self {
        let mut slots = Self::new();
        for slot in iter {
            slots.insert(slot);
        }
        slots
    }
}

impl<const N: usize> From<[EquipmentSlot; N]> for SlotSet {
    fn from(slots: [EquipmentSlot; N]) -> Self {
        slots.into_iter().collect()
    }
}
