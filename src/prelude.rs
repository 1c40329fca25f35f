pub use crate::actor::{ActorModifiers, DeferredStatUpdates};
pub use crate::codec::{Decoded, DecodeWarning};
pub use crate::config::ModifierConfig;
pub use crate::effect::{AddStatArgs, AddStatEffect, AmountArg, EffectVariables};
pub use crate::equipment_slot::{EquipmentSlot, SlotSet};
pub use crate::item::{ItemDataHolder, ItemMeta, ItemStack, ItemStatModifiers};
pub use crate::metadata::{Metadata, MetadataTable, MetadataValue};
pub use crate::modifier::{ItemStatModifier, ModifierTotals, PlayerStatModifier, StatModifier};
pub use crate::modifier_cache::ModifierCache;
pub use crate::modifier_error::{ConfigError, DecodeError, EffectError, KeyParseError, TagError};
pub use crate::modifier_key::ModifierKey;
pub use crate::operation::ModifierOperation;
pub use crate::stat::{Stat, StatLevelUpdate, StatRegistry};
pub use crate::tag_tree::{TagContainer, TagValue};
