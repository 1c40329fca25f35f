use std::time::Duration;

use bevy::{
    ecs::entity::{hash_map::EntityHashMap, Entities},
    prelude::*,
};
use log::debug;

use crate::config::ModifierConfig;
use crate::metadata::{Metadata, MetadataTable};

#[derive(Debug, Clone)]
struct CachedModifiers {
    modifiers: MetadataTable,
    written_at: Duration,
    /// The actor's `Metadata` insert is still queued, so this entry is the
    /// only copy of the map.
    pending: bool,
}

/// Short-lived read-through cache of each actor's modifier map.
///
/// Entries expire by write age, not read age. Writes made through
/// `ActorModifiers` go through [`ModifierCache::insert`] as well as the
/// actor's metadata, so they are visible immediately; changes made to the
/// metadata directly can stay hidden for up to one TTL.
///
/// An entry written for an actor whose `Metadata` has not landed yet is
/// pending. Pending entries never expire and are not invalidated; they
/// settle into ordinary entries once the component exists.
///
/// Timestamps are elapsed times from `Time<Real>`.
#[derive(Resource, Debug, Clone)]
pub struct ModifierCache {
    entries: EntityHashMap<CachedModifiers>,
    ttl: Duration,
}

static NO_MODIFIERS: MetadataTable = MetadataTable::new();

impl FromWorld for ModifierCache {
    fn from_world(world: &mut World) -> Self {
        let ttl = world
            .get_resource::<ModifierConfig>()
            .map(ModifierConfig::cache_ttl)
            .unwrap_or_else(|| ModifierConfig::default().cache_ttl());
        Self::with_ttl(ttl)
    }
}

impl ModifierCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: EntityHashMap::default(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CachedModifiers, now: Duration) -> bool {
        entry.pending || now.saturating_sub(entry.written_at) < self.ttl
    }

    /// The cached map for `actor`, if one was written less than a TTL ago.
    pub fn get(&self, actor: Entity, now: Duration) -> Option<&MetadataTable> {
        self.entries
            .get(&actor)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.modifiers)
    }

    /// Returns the cached map, loading it with `load` on a miss.
    pub fn get_or_load(
        &mut self,
        actor: Entity,
        now: Duration,
        load: impl FnOnce() -> MetadataTable,
    ) -> &MetadataTable {
        let fresh = self.entries.get(&actor).is_some_and(|entry| self.is_fresh(entry, now));
        if !fresh {
            debug!("modifier cache miss for {:?}", actor);
            self.insert(actor, load(), now);
        }
        self.entries
            .get(&actor)
            .map_or(&NO_MODIFIERS, |entry| &entry.modifiers)
    }

    /// Stores `modifiers` as the current map for `actor` and restarts its TTL.
    pub fn insert(&mut self, actor: Entity, modifiers: MetadataTable, now: Duration) {
        self.entries.insert(actor, CachedModifiers { modifiers, written_at: now, pending: false });
    }

    /// Like [`ModifierCache::insert`], for a map whose `Metadata` is only
    /// queued. The entry stays until [`ModifierCache::settle`] is called.
    pub fn insert_pending(&mut self, actor: Entity, modifiers: MetadataTable, now: Duration) {
        self.entries.insert(actor, CachedModifiers { modifiers, written_at: now, pending: true });
    }

    pub fn is_pending(&self, actor: Entity) -> bool {
        self.entries.get(&actor).is_some_and(|entry| entry.pending)
    }

    /// Marks the entry for `actor` as backed by its `Metadata`. From here on
    /// it expires like any other entry.
    pub fn settle(&mut self, actor: Entity) {
        if let Some(entry) = self.entries.get_mut(&actor) {
            entry.pending = false;
        }
    }

    /// Settles every pending entry for which `landed` returns true.
    pub fn settle_pending(&mut self, mut landed: impl FnMut(Entity) -> bool) {
        for (actor, entry) in self.entries.iter_mut() {
            if entry.pending && landed(*actor) {
                entry.pending = false;
            }
        }
    }

    /// Forgets the entry for `actor`. Pending entries are kept.
    pub fn invalidate(&mut self, actor: Entity) {
        if !self.is_pending(actor) {
            self.entries.remove(&actor);
        }
    }

    /// Drops every expired entry. Fresh entries are kept even for actors
    /// that no longer exist; they expire on their own.
    pub fn purge_expired(&mut self, now: Duration) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| entry.pending || now.saturating_sub(entry.written_at) < ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keeps the cache from growing with actors that stopped being read.
///
/// Pending entries settle once their actor has `Metadata`, or once the actor
/// is gone and the queued insert was dropped.
pub fn purge_expired_modifier_cache(
    mut cache: ResMut<ModifierCache>,
    attached: Query<(), With<Metadata>>,
    entities: &Entities,
    time: Res<Time<Real>>,
) {
    cache.settle_pending(|actor| attached.contains(actor) || !entities.contains(actor));
    cache.purge_expired(time.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataValue;

    fn table(stat: &str) -> MetadataTable {
        let mut table = MetadataTable::new();
        table.insert("stat".to_string(), MetadataValue::from(stat));
        table
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn entries_expire_by_write_age() {
        let actor = Entity::from_raw(7);
        let mut cache = ModifierCache::with_ttl(ms(200));
        cache.insert(actor, table("strength"), ms(1_000));

        assert!(cache.get(actor, ms(1_199)).is_some());
        // reading does not extend the lifetime
        assert!(cache.get(actor, ms(1_200)).is_none());
    }

    #[test]
    fn get_or_load_only_loads_on_miss() {
        let actor = Entity::from_raw(1);
        let mut cache = ModifierCache::with_ttl(ms(200));
        let mut loads = 0;

        cache.get_or_load(actor, ms(0), || {
            loads += 1;
            table("a")
        });
        let second = cache.get_or_load(actor, ms(100), || table("b")).clone();
        assert_eq!(loads, 1);
        assert_eq!(second, table("a"));

        let third = cache.get_or_load(actor, ms(250), || table("c"));
        assert_eq!(third, &table("c"));
    }

    #[test]
    fn purge_keeps_fresh_entries() {
        let mut cache = ModifierCache::with_ttl(ms(200));
        cache.insert(Entity::from_raw(1), table("a"), ms(0));
        cache.insert(Entity::from_raw(2), table("b"), ms(150));

        cache.purge_expired(ms(300));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(Entity::from_raw(2), ms(300)).is_some());

        cache.invalidate(Entity::from_raw(2));
        assert!(cache.is_empty());
    }

    #[test]
    fn pending_entries_outlive_ttl_until_settled() {
        let actor = Entity::from_raw(3);
        let mut cache = ModifierCache::with_ttl(Duration::ZERO);
        cache.insert_pending(actor, table("a"), ms(0));

        assert_eq!(cache.get(actor, ms(10_000)), Some(&table("a")));
        let loaded = cache.get_or_load(actor, ms(10_000), || table("lost"));
        assert_eq!(loaded, &table("a"));

        cache.invalidate(actor);
        cache.purge_expired(ms(10_000));
        assert!(cache.is_pending(actor));

        cache.settle_pending(|_| false);
        assert!(cache.is_pending(actor));
        cache.settle_pending(|candidate| candidate == actor);
        assert!(!cache.is_pending(actor));

        cache.purge_expired(ms(10_000));
        assert!(cache.is_empty());
    }
}
