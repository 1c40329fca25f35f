use crate::equipment_slot::{EquipmentSlot, SlotSet};
use crate::modifier_key::ModifierKey;
use crate::operation::ModifierOperation;
use crate::stat::Stat;

/// Common shape of every modifier, whatever it is attached to.
pub trait StatModifier {
    fn key(&self) -> &ModifierKey;
    fn stat(&self) -> &Stat;
    fn amount(&self) -> f64;
    fn operation(&self) -> ModifierOperation;
}

/// A modifier stored in an item's persistent data.
///
/// `slots` restricts which equipment slots activate it; an empty set means any.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStatModifier {
    pub key: ModifierKey,
    pub stat: Stat,
    pub amount: f64,
    pub operation: ModifierOperation,
    pub slots: SlotSet,
}

impl ItemStatModifier {
    pub fn new(key: ModifierKey, stat: Stat, amount: f64) -> Self {
        Self {
            key,
            stat,
            amount,
            operation: ModifierOperation::Add,
            slots: SlotSet::new(),
        }
    }

    pub fn with_operation(mut self, operation: ModifierOperation) -> Self {
        self.operation = operation;
        self
    }

    pub fn with_slots<S: Into<SlotSet>>(mut self, slots: S) -> Self {
        self.slots = slots.into();
        self
    }

    pub fn is_active_in(&self, slot: EquipmentSlot) -> bool {
        self.slots.allows(slot)
    }
}

impl StatModifier for ItemStatModifier {
    fn key(&self) -> &ModifierKey { &self.key }
    fn stat(&self) -> &Stat { &self.stat }
    fn amount(&self) -> f64 { self.amount }
    fn operation(&self) -> ModifierOperation { self.operation }
}

/// A modifier attached to a live actor. Always active while attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatModifier {
    pub key: ModifierKey,
    pub stat: Stat,
    pub amount: f64,
    pub operation: ModifierOperation,
}

impl PlayerStatModifier {
    pub fn new(key: ModifierKey, stat: Stat, amount: f64) -> Self {
        Self {
            key,
            stat,
            amount,
            operation: ModifierOperation::Add,
        }
    }

    pub fn with_operation(mut self, operation: ModifierOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl StatModifier for PlayerStatModifier {
    fn key(&self) -> &ModifierKey { &self.key }
    fn stat(&self) -> &Stat { &self.stat }
    fn amount(&self) -> f64 { self.amount }
    fn operation(&self) -> ModifierOperation { self.operation }
}

/// The folded contribution of a set of modifiers to one stat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierTotals {
    pub added: f64,
    pub multiplier: f64,
    pub overridden: Option<f64>,
}

impl Default for ModifierTotals {
    fn default() -> Self {
        Self {
            added: 0.0,
            multiplier: 1.0,
            overridden: None,
        }
    }
}

impl ModifierTotals {
    /// Folds every modifier that targets `stat`. Order does not matter:
    /// adds sum, multipliers multiply and the greatest override wins.
    pub fn collect<'a, M, I>(modifiers: I, stat: &Stat) -> Self
    where
        M: StatModifier + 'a,
        I: IntoIterator<Item = &'a M>,
    {
        let mut totals = Self::default();
        for modifier in modifiers.into_iter().filter(|m| m.stat() == stat) {
            totals.push(modifier.operation(), modifier.amount());
        }
        totals
    }

    /// Like [`ModifierTotals::collect`] but only counts item modifiers that
    /// are active in `slot`.
    pub fn collect_equipped<'a, I>(modifiers: I, stat: &Stat, slot: EquipmentSlot) -> Self
    where
        I: IntoIterator<Item = &'a ItemStatModifier>,
    {
        Self::collect(modifiers.into_iter().filter(|m| m.is_active_in(slot)), stat)
    }

    pub fn push(&mut self, operation: ModifierOperation, amount: f64) {
        match operation {
            ModifierOperation::Add => self.added += amount,
            ModifierOperation::Multiply => self.multiplier *= amount,
            ModifierOperation::Override => {
                self.overridden = Some(self.overridden.map_or(amount, |current| current.max(amount)));
            }
        }
    }

    pub fn apply(&self, base: f64) -> f64 {
        self.overridden.unwrap_or((base + self.added) * self.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> ModifierKey {
        ModifierKey::new("test", name).unwrap()
    }

    #[test]
    fn totals_fold_by_operation() {
        let strength = Stat::new("strength");
        let defense = Stat::new("defense");
        let modifiers = vec![
            PlayerStatModifier::new(key("a"), strength.clone(), 5.0),
            PlayerStatModifier::new(key("b"), strength.clone(), 3.0),
            PlayerStatModifier::new(key("c"), strength.clone(), 2.0).with_operation(ModifierOperation::Multiply),
            PlayerStatModifier::new(key("d"), defense.clone(), 100.0),
        ];

        let totals = ModifierTotals::collect(&modifiers, &strength);
        assert_eq!(totals.added, 8.0);
        assert_eq!(totals.multiplier, 2.0);
        assert_eq!(totals.apply(10.0), 36.0);

        assert_eq!(ModifierTotals::collect(&modifiers, &defense).apply(0.0), 100.0);
        assert_eq!(ModifierTotals::collect(&modifiers, &Stat::new("luck")).apply(7.0), 7.0);
    }

    #[test]
    fn greatest_override_wins() {
        let speed = Stat::new("speed");
        let modifiers = vec![
            PlayerStatModifier::new(key("slow"), speed.clone(), 1.0).with_operation(ModifierOperation::Override),
            PlayerStatModifier::new(key("fast"), speed.clone(), 4.0).with_operation(ModifierOperation::Override),
            PlayerStatModifier::new(key("bonus"), speed.clone(), 50.0),
        ];

        assert_eq!(ModifierTotals::collect(&modifiers, &speed).apply(2.0), 4.0);
    }

    #[test]
    fn equipped_totals_respect_slots() {
        let strength = Stat::new("strength");
        let modifiers = vec![
            ItemStatModifier::new(key("blade"), strength.clone(), 5.0).with_slots([EquipmentSlot::MainHand]),
            ItemStatModifier::new(key("charm"), strength.clone(), 1.0),
        ];

        let in_hand = ModifierTotals::collect_equipped(&modifiers, &strength, EquipmentSlot::MainHand);
        let on_head = ModifierTotals::collect_equipped(&modifiers, &strength, EquipmentSlot::Head);
        assert_eq!(in_hand.added, 6.0);
        assert_eq!(on_head.added, 1.0);
    }
}
