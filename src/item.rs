use std::collections::BTreeSet;

use bevy::prelude::*;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::codec::{decode_item_modifier, encode_item_modifier, Decoded};
use crate::modifier::ItemStatModifier;
use crate::modifier_error::DecodeResult;
use crate::modifier_key::ModifierKey;
use crate::stat::StatRegistry;
use crate::tag_tree::TagContainer;

/// Durable metadata carried by an item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemMeta {
    pub persistent_data: TagContainer,
}

/// A stack of items. Items without metadata (`meta: None`) cannot hold
/// modifiers.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: String,
    pub amount: u32,
    pub meta: Option<ItemMeta>,
}

impl ItemStack {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            amount: 1,
            meta: Some(ItemMeta::default()),
        }
    }

    /// An item type that exposes no metadata at all.
    pub fn bare(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            amount: 1,
            meta: None,
        }
    }
}

/// Anything that owns a persistent tag tree the modifier codec can live in.
pub trait ItemDataHolder {
    fn persistent_data(&self) -> Option<&TagContainer>;
    fn persistent_data_mut(&mut self) -> Option<&mut TagContainer>;
}

impl ItemDataHolder for ItemStack {
    fn persistent_data(&self) -> Option<&TagContainer> {
        self.meta.as_ref().map(|meta| &meta.persistent_data)
    }

    fn persistent_data_mut(&mut self) -> Option<&mut TagContainer> {
        self.meta.as_mut().map(|meta| &mut meta.persistent_data)
    }
}

fn modifiers_key() -> ModifierKey {
    ModifierKey::internal("modifiers")
}

/// Stat modifier storage on items.
///
/// Nothing is cached. Every call reads or writes the tag tree directly.
pub trait ItemStatModifiers {
    /// Stores `modifier`, replacing any modifier with the same key.
    /// Does nothing if the item has no metadata.
    fn add_stat_modifier(&mut self, modifier: &ItemStatModifier);

    /// Removes the modifier under `key`, if there is one.
    fn remove_stat_modifier(&mut self, key: &ModifierKey);

    fn get_stat_modifier_keys(&self) -> BTreeSet<ModifierKey>;

    /// Decodes the modifier under `key` with its decode warnings, or the
    /// reason it could not be decoded. `None` when there is nothing stored.
    fn decode_stat_modifier(
        &self,
        key: &ModifierKey,
        registry: &StatRegistry,
    ) -> Option<DecodeResult<Decoded<ItemStatModifier>>>;

    /// The modifier under `key`, or `None` if it is missing or undecodable.
    fn get_stat_modifier(&self, key: &ModifierKey, registry: &StatRegistry) -> Option<ItemStatModifier> {
        match self.decode_stat_modifier(key, registry)? {
            Ok(decoded) => {
                for warning in &decoded.warnings {
                    debug!("item modifier '{}': {}", key, warning);
                }
                Some(decoded.modifier)
            }
            Err(err) => {
                warn!("skipping item modifier '{}': {}", key, err);
                None
            }
        }
    }

    /// Every decodable modifier, in key order. Entries that fail to decode
    /// are skipped without affecting the rest.
    fn get_stat_modifiers(&self, registry: &StatRegistry) -> Vec<ItemStatModifier> {
        self.get_stat_modifier_keys()
            .iter()
            .filter_map(|key| self.get_stat_modifier(key, registry))
            .collect()
    }
}

impl<T: ItemDataHolder> ItemStatModifiers for T {
    fn add_stat_modifier(&mut self, modifier: &ItemStatModifier) {
        let Some(data) = self.persistent_data_mut() else {
            return;
        };

        let mut modifiers = data.get_container(&modifiers_key()).cloned().unwrap_or_default();
        modifiers.remove(&modifier.key);
        modifiers.set(modifier.key.clone(), encode_item_modifier(modifier));
        data.set(modifiers_key(), modifiers);
    }

    fn remove_stat_modifier(&mut self, key: &ModifierKey) {
        let Some(data) = self.persistent_data_mut() else {
            return;
        };

        let mut modifiers = data.get_container(&modifiers_key()).cloned().unwrap_or_default();
        if modifiers.remove(key).is_some() {
            data.set(modifiers_key(), modifiers);
        }
    }

    fn get_stat_modifier_keys(&self) -> BTreeSet<ModifierKey> {
        self.persistent_data()
            .and_then(|data| data.get_container(&modifiers_key()))
            .map(|modifiers| modifiers.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn decode_stat_modifier(
        &self,
        key: &ModifierKey,
        registry: &StatRegistry,
    ) -> Option<DecodeResult<Decoded<ItemStatModifier>>> {
        let value = self.persistent_data()?.get_container(&modifiers_key())?.get(key)?;
        Some(decode_item_modifier(key, value, registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment_slot::EquipmentSlot;
    use crate::stat::Stat;

    fn key(name: &str) -> ModifierKey {
        ModifierKey::new("test", name).unwrap()
    }

    #[test]
    fn bare_items_ignore_everything() {
        let mut item = ItemStack::bare("stick");
        item.add_stat_modifier(&ItemStatModifier::new(key("k1"), Stat::new("strength"), 1.0));
        item.remove_stat_modifier(&key("k1"));

        assert!(item.meta.is_none());
        assert!(item.get_stat_modifier_keys().is_empty());
        assert!(item.get_stat_modifier(&key("k1"), &StatRegistry::new()).is_none());
    }

    #[test]
    fn modifiers_live_in_one_outer_container() {
        let mut item = ItemStack::new("sword");
        item.add_stat_modifier(
            &ItemStatModifier::new(key("k1"), Stat::new("strength"), 5.0).with_slots([EquipmentSlot::MainHand]),
        );

        let data = item.persistent_data().unwrap();
        assert_eq!(data.len(), 1);
        let outer = data.get_container(&ModifierKey::internal("modifiers")).unwrap();
        assert!(outer.get_container(&key("k1")).is_some());
    }

    #[test]
    fn removing_a_missing_key_leaves_data_untouched() {
        let mut item = ItemStack::new("sword");
        item.remove_stat_modifier(&key("nothing"));
        assert!(item.persistent_data().unwrap().is_empty());
    }
}
