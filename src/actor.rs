use std::collections::BTreeSet;

use bevy::{
    ecs::system::{SystemParam, SystemState},
    prelude::*,
};
use log::{debug, warn};

use crate::codec::{decode_player_modifier, encode_player_modifier, stored_stat_id, Decoded};
use crate::config::ModifierConfig;
use crate::metadata::{Metadata, MetadataTable, MetadataValue};
use crate::modifier::PlayerStatModifier;
use crate::modifier_cache::ModifierCache;
use crate::modifier_error::DecodeResult;
use crate::modifier_key::ModifierKey;
use crate::stat::{Stat, StatRegistry};

/// Stat recomputations postponed to the next frame.
#[derive(Resource, Debug, Default)]
pub struct DeferredStatUpdates(Vec<(Entity, Stat)>);

impl DeferredStatUpdates {
    pub fn schedule(&mut self, actor: Entity, stat: Stat) {
        self.0.push((actor, stat));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub(crate) fn flush_deferred_stat_updates(
    mut deferred: ResMut<DeferredStatUpdates>,
    mut commands: Commands,
) {
    for (actor, stat) in deferred.0.drain(..) {
        stat.update_stat_level(actor, &mut commands);
    }
}

fn load_attachment(metadata: &Query<&mut Metadata>, actor: Entity, name: &str) -> MetadataTable {
    let Ok(metadata) = metadata.get(actor) else {
        return MetadataTable::new();
    };

    match metadata.get(name) {
        Some(MetadataValue::Table(table)) => table.clone(),
        Some(other) => {
            warn!("ignoring non-table modifier attachment on {:?}: {:?}", actor, other);
            MetadataTable::new()
        }
        None => MetadataTable::new(),
    }
}

/// A Bevy `SystemParam` for the stat modifiers attached to live actors.
///
/// Each actor's modifiers are a table attached to its [`Metadata`] under
/// [`ModifierConfig::attachment_name`], keyed by the modifier key's string
/// form. Reads go through the [`ModifierCache`]. Every add or remove writes
/// the new table to the actor and to the cache in the same call, so the
/// caller's next read sees it. Only edits made to `Metadata` directly can be
/// stale, for at most one cache TTL.
///
/// The read-modify-write in add/remove is not atomic. Callers touching the
/// same actor from several systems must order those systems.
#[derive(SystemParam)]
pub struct ActorModifiers<'w, 's> {
    metadata: Query<'w, 's, &'static mut Metadata>,
    cache: ResMut<'w, ModifierCache>,
    registry: Res<'w, StatRegistry>,
    config: Res<'w, ModifierConfig>,
    deferred: ResMut<'w, DeferredStatUpdates>,
    time: Res<'w, Time<Real>>,
    commands: Commands<'w, 's>,
}

impl ActorModifiers<'_, '_> {
    /// Runs `f` with an `ActorModifiers` borrowed from `world`, then applies
    /// any queued commands (stat recomputation triggers, new `Metadata`).
    pub fn with_world<R>(world: &mut World, f: impl FnOnce(ActorModifiers) -> R) -> R {
        let mut state = SystemState::<ActorModifiers<'static, 'static>>::new(world);
        let result = f(state.get_mut(world));
        state.apply(world);
        result
    }

    pub fn registry(&self) -> &StatRegistry {
        &self.registry
    }

    /// The actor's current modifier table, through the cache.
    fn view(&mut self, actor: Entity) -> (&MetadataTable, &StatRegistry) {
        if self.metadata.contains(actor) {
            self.cache.settle(actor);
        }

        let now = self.time.elapsed();
        let metadata = &self.metadata;
        let name = self.config.attachment_name.as_str();
        let table = self.cache.get_or_load(actor, now, || load_attachment(metadata, actor, name));
        (table, &*self.registry)
    }

    /// Writes `modifiers` back to the actor and refreshes the cache entry.
    ///
    /// An actor without `Metadata` gets one through `Commands`. Until that
    /// lands, the cache entry is pending and holds the only copy.
    fn attach(&mut self, actor: Entity, modifiers: MetadataTable) {
        let name = self.config.attachment_name.as_str();
        let now = self.time.elapsed();
        if let Ok(mut metadata) = self.metadata.get_mut(actor) {
            metadata.set(name, modifiers.clone());
            self.cache.insert(actor, modifiers, now);
        } else if let Ok(mut entity) = self.commands.get_entity(actor) {
            let mut metadata = Metadata::new();
            metadata.set(name, modifiers.clone());
            entity.try_insert(metadata);
            self.cache.insert_pending(actor, modifiers, now);
        } else {
            debug!("not attaching modifiers to missing actor {:?}", actor);
            self.cache.insert(actor, modifiers, now);
        }
    }

    /// Attaches `modifier`, replacing any modifier with the same key, and
    /// recomputes its stat.
    ///
    /// The recompute is a [`StatLevelUpdate`](crate::stat::StatLevelUpdate)
    /// triggered through `Commands` in this call. Its observers run when the
    /// command queue is applied: at the end of the running system, or when
    /// [`ActorModifiers::with_world`] returns.
    pub fn add_stat_modifier(&mut self, actor: Entity, modifier: &PlayerStatModifier) {
        self.add_stat_modifier_with_update(actor, modifier, true);
    }

    pub fn add_stat_modifier_with_update(
        &mut self,
        actor: Entity,
        modifier: &PlayerStatModifier,
        should_update: bool,
    ) {
        let mut modifiers = self.view(actor).0.clone();
        modifiers.insert(modifier.key.to_string(), encode_player_modifier(modifier));
        self.attach(actor, modifiers);
        debug!("added modifier '{}' to {:?}", modifier.key, actor);

        if should_update {
            modifier.stat.update_stat_level(actor, &mut self.commands);
        }
    }

    /// Removes the modifier under `key` and recomputes its stat, queued the
    /// same way as in [`ActorModifiers::add_stat_modifier`].
    ///
    /// Returns the removed modifier's stat if it still resolves. The entry is
    /// deleted either way.
    pub fn remove_stat_modifier(&mut self, actor: Entity, key: &ModifierKey) -> Option<Stat> {
        self.remove_stat_modifier_with_update(actor, key, true)
    }

    pub fn remove_stat_modifier_with_update(
        &mut self,
        actor: Entity,
        key: &ModifierKey,
        should_update: bool,
    ) -> Option<Stat> {
        let (current, registry) = self.view(actor);
        let key_string = key.to_string();
        let removed = current.get(&key_string)?;

        let stat = removed
            .as_table()
            .and_then(|record| stored_stat_id(record))
            .and_then(|id| registry.get_by_id(id));

        let mut modifiers = current.clone();
        modifiers.remove(&key_string);
        self.attach(actor, modifiers);
        debug!("removed modifier '{}' from {:?}", key, actor);

        if should_update {
            if let Some(stat) = &stat {
                stat.update_stat_level(actor, &mut self.commands);
            }
        }
        stat
    }

    /// Every key attached to `actor`. Stored keys that no longer parse are
    /// left out.
    pub fn get_stat_modifier_keys(&mut self, actor: Entity) -> BTreeSet<ModifierKey> {
        let (modifiers, _) = self.view(actor);
        modifiers
            .keys()
            .filter_map(|raw| match raw.parse::<ModifierKey>() {
                Ok(key) => Some(key),
                Err(err) => {
                    warn!("skipping actor modifier with bad key on {:?}: {}", actor, err);
                    None
                }
            })
            .collect()
    }

    pub fn decode_stat_modifier(
        &mut self,
        actor: Entity,
        key: &ModifierKey,
    ) -> Option<DecodeResult<Decoded<PlayerStatModifier>>> {
        let (modifiers, registry) = self.view(actor);
        let value = modifiers.get(&key.to_string())?;
        Some(decode_player_modifier(key, value, registry))
    }

    /// The modifier under `key`, or `None` if it is missing or undecodable.
    pub fn get_stat_modifier(&mut self, actor: Entity, key: &ModifierKey) -> Option<PlayerStatModifier> {
        match self.decode_stat_modifier(actor, key)? {
            Ok(decoded) => Some(decoded.modifier),
            Err(err) => {
                warn!("skipping actor modifier '{}' on {:?}: {}", key, actor, err);
                None
            }
        }
    }

    /// Every decodable modifier on `actor`, in key order.
    pub fn get_stat_modifiers(&mut self, actor: Entity) -> Vec<PlayerStatModifier> {
        let (modifiers, registry) = self.view(actor);
        let mut decoded = Vec::with_capacity(modifiers.len());
        for (raw_key, value) in modifiers {
            let Ok(key) = raw_key.parse::<ModifierKey>() else {
                warn!("skipping actor modifier with bad key '{}' on {:?}", raw_key, actor);
                continue;
            };
            match decode_player_modifier(&key, value, registry) {
                Ok(modifier) => decoded.push(modifier.modifier),
                Err(err) => warn!("skipping actor modifier '{}' on {:?}: {}", key, actor, err),
            }
        }
        decoded.sort_by(|a, b| a.key.cmp(&b.key));
        decoded
    }

    /// Queues a recomputation of `stat` for the next frame instead of now.
    pub fn schedule_stat_update(&mut self, actor: Entity, stat: Stat) {
        self.deferred.schedule(actor, stat);
    }

    /// Forgets the cached table for `actor` so the next read goes to its
    /// `Metadata`. A table whose `Metadata` insert is still queued is kept.
    pub fn invalidate(&mut self, actor: Entity) {
        self.cache.invalidate(actor);
    }
}
