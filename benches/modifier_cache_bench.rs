use bevy::prelude::*;
use bevy_stat_modifiers::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn setup_actor(modifier_count: usize) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins(bevy_stat_modifiers::plugin);
    app.world_mut().resource_mut::<StatRegistry>().register(Stat::new("strength"));
    let actor = app.world_mut().spawn(Metadata::new()).id();

    ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        let strength = modifiers.registry().get_by_id("strength").unwrap_or_else(|| Stat::new("strength"));
        for i in 0..modifier_count {
            let key = ModifierKey::new("bench", &format!("mod_{}", i)).unwrap();
            modifiers.add_stat_modifier_with_update(actor, &PlayerStatModifier::new(key, strength.clone(), i as f64), false);
        }
    });

    (app, actor)
}

fn bench_actor_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("actor_modifier_reads");

    for count in [1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("cached", count), &count, |b, &count| {
            let (mut app, actor) = setup_actor(count);
            b.iter(|| {
                ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
                    black_box(modifiers.get_stat_modifiers(actor));
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("uncached", count), &count, |b, &count| {
            let (mut app, actor) = setup_actor(count);
            b.iter(|| {
                ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
                    modifiers.invalidate(actor);
                    black_box(modifiers.get_stat_modifiers(actor));
                })
            });
        });
    }

    group.finish();
}

fn bench_item_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("item_modifier_reads");
    let registry: StatRegistry = [Stat::new("strength")].into_iter().collect();

    for count in [1, 10, 100] {
        let mut item = ItemStack::new("sword");
        let strength = Stat::new("strength");
        for i in 0..count {
            let key = ModifierKey::new("bench", &format!("mod_{}", i)).unwrap();
            item.add_stat_modifier(
                &ItemStatModifier::new(key, strength.clone(), i as f64)
                    .with_slots([EquipmentSlot::MainHand, EquipmentSlot::OffHand]),
            );
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &item, |b, item| {
            b.iter(|| black_box(item.get_stat_modifiers(&registry)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_actor_reads, bench_item_reads);
criterion_main!(benches);
