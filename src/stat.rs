use std::hash::{Hash, Hasher};
use std::sync::Arc;

use bevy::{platform::collections::HashMap, prelude::*};

/// A handle to a statistic definition.
///
/// The modifier store never computes stat levels itself. It only needs to
/// name a stat and ask for its level to be recomputed on an actor.
///
/// Two handles are the same stat when their ids match. The display name is
/// not part of a stat's identity.
#[derive(Debug, Clone)]
pub struct Stat {
    id: Arc<str>,
    name: Arc<str>,
}

impl Stat {
    pub fn new(id: &str) -> Self {
        Self {
            id: Arc::from(id),
            name: Arc::from(id),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Arc::from(name);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asks whoever owns stat levels to recompute this stat for `actor`.
    ///
    /// Fire-and-forget: the trigger is queued on `commands` and observers of
    /// [`StatLevelUpdate`] run when the queue is applied.
    pub fn update_stat_level(&self, actor: Entity, commands: &mut Commands) {
        commands.trigger_targets(StatLevelUpdate { stat: self.clone() }, actor);
    }
}

impl PartialEq for Stat {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Stat {}

impl Hash for Stat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Triggered on an actor entity when one of its stats needs recomputing.
#[derive(Event, Debug, Clone)]
pub struct StatLevelUpdate {
    pub stat: Stat,
}

/// Every stat the host knows about, looked up by id.
///
/// Passed to the modifier subsystems explicitly so decoding never reaches
/// for global state.
#[derive(Resource, Debug, Clone, Default)]
pub struct StatRegistry {
    stats: HashMap<String, Stat>,
}

impl StatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `stat`, replacing any stat with the same id.
    pub fn register(&mut self, stat: Stat) -> &mut Self {
        self.stats.insert(stat.id().to_string(), stat);
        self
    }

    pub fn unregister(&mut self, id: &str) -> Option<Stat> {
        self.stats.remove(id)
    }

    /// Absence is the only failure mode: an unknown id returns `None`.
    pub fn get_by_id(&self, id: &str) -> Option<Stat> {
        self.stats.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stat> {
        self.stats.values()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl FromIterator<Stat> for StatRegistry {
    fn from_iter<I: IntoIterator<Item = Stat>>(iter: I) -> Self {
        let mut registry = Self::new();
        for stat in iter {
            registry.register(stat);
        }
        registry
    }
}
