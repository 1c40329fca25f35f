//! Keyed, namespaced stat modifiers for two kinds of targets.
//!
//! Items keep their modifiers in a durable tag tree inside their metadata and
//! are read on demand. Live actors keep theirs in a side-channel
//! [`Metadata`](metadata::Metadata) attachment, read through a short-lived
//! cache because stat totals are recomputed far more often than modifiers
//! change.

use bevy::{prelude::*, time::TimePlugin};

pub mod actor;
pub mod codec;
pub mod config;
pub mod effect;
pub mod equipment_slot;
pub mod item;
pub mod metadata;
pub mod modifier;
pub mod modifier_cache;
pub mod modifier_error;
pub mod modifier_key;
pub mod operation;
pub mod prelude;
pub mod stat;
pub mod tag_tree;

/// Installs the modifier resources and housekeeping systems.
///
/// Insert a [`ModifierConfig`](config::ModifierConfig) before adding the
/// plugin to change the cache TTL; the cache reads it when it is created.
///
/// Cache expiry runs on `Time<Real>`, so the plugin adds Bevy's
/// [`TimePlugin`] unless it is already there. Add `MinimalPlugins` or
/// `DefaultPlugins` before this plugin, not after.
pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<TimePlugin>() {
        app.add_plugins(TimePlugin);
    }

    app.init_resource::<stat::StatRegistry>()
        .init_resource::<config::ModifierConfig>()
        .init_resource::<modifier_cache::ModifierCache>()
        .init_resource::<actor::DeferredStatUpdates>()
        .add_systems(PreUpdate, actor::flush_deferred_stat_updates)
        .add_systems(Last, modifier_cache::purge_expired_modifier_cache);
}
