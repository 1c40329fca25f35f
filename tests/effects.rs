use bevy::prelude::*;
use bevy_stat_modifiers::prelude::*;

#[derive(Resource, Default)]
struct Recomputed(Vec<String>);

fn setup_app() -> App {
    let mut app = App::new();
    app.add_plugins(bevy_stat_modifiers::plugin);
    app.init_resource::<Recomputed>();
    app.add_observer(|trigger: Trigger<StatLevelUpdate>, mut recomputed: ResMut<Recomputed>| {
        recomputed.0.push(trigger.event().stat.id().to_string());
    });
    app.world_mut().resource_mut::<StatRegistry>().register(Stat::new("strength"));
    app
}

fn effect(json: &str) -> AddStatEffect {
    let args: AddStatArgs = serde_json::from_str(json).unwrap();
    AddStatEffect::compile(&args).unwrap()
}

fn key() -> ModifierKey {
    ModifierKey::new("effects", "potion_of_might").unwrap()
}

fn recomputed(app: &App) -> usize {
    app.world().resource::<Recomputed>().0.len()
}

#[test]
fn enabling_adds_a_modifier_from_the_actor_variables() {
    let mut app = setup_app();
    let mut variables = EffectVariables::new();
    variables.set("level", 3.0);
    let actor = app.world_mut().spawn((Metadata::new(), variables.clone())).id();
    let effect = effect(r#"{ "stat": "strength", "amount": "level * 1.5" }"#);

    let (enabled, stored) = ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        let enabled = effect.enable(actor, key(), Some(&variables), &mut modifiers);
        (enabled, modifiers.get_stat_modifier(actor, &key()))
    });

    assert!(enabled);
    let stored = stored.unwrap();
    assert_eq!(stored.stat.id(), "strength");
    assert_eq!(stored.amount, 4.0);
    assert_eq!(stored.operation, ModifierOperation::Add);
    assert_eq!(recomputed(&app), 1);
}

#[test]
fn enabling_an_unknown_stat_changes_nothing() {
    let mut app = setup_app();
    let actor = app.world_mut().spawn(Metadata::new()).id();
    let effect = effect(r#"{ "stat": "wisdom", "amount": 2 }"#);

    let (enabled, keys) = ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        let enabled = effect.enable(actor, key(), None, &mut modifiers);
        (enabled, modifiers.get_stat_modifier_keys(actor))
    });

    assert!(!enabled);
    assert!(keys.is_empty());
    assert_eq!(recomputed(&app), 0);
}

#[test]
fn disabling_removes_now_and_recomputes_next_frame() {
    let mut app = setup_app();
    let actor = app.world_mut().spawn(Metadata::new()).id();
    let effect = effect(r#"{ "stat": "strength", "amount": 5 }"#);

    ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        effect.enable(actor, key(), None, &mut modifiers);
    });
    assert_eq!(recomputed(&app), 1);

    let still_there = ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        effect.disable(actor, &key(), &mut modifiers);
        modifiers.get_stat_modifier(actor, &key())
    });
    assert_eq!(still_there, None);
    assert_eq!(recomputed(&app), 1);
    assert_eq!(app.world().resource::<DeferredStatUpdates>().len(), 1);

    app.update();
    assert_eq!(recomputed(&app), 2);
    assert!(app.world().resource::<DeferredStatUpdates>().is_empty());
}

#[test]
fn disabling_an_effect_that_was_never_enabled_is_harmless() {
    let mut app = setup_app();
    let actor = app.world_mut().spawn(Metadata::new()).id();
    let effect = effect(r#"{ "stat": "strength", "amount": 5 }"#);

    ActorModifiers::with_world(app.world_mut(), |mut modifiers| {
        effect.disable(actor, &key(), &mut modifiers);
    });
    app.update();

    assert_eq!(recomputed(&app), 0);
}

#[test]
fn effect_args_must_name_stat_and_amount() {
    let missing_amount: AddStatArgs = serde_json::from_str(r#"{ "stat": "strength" }"#).unwrap();
    assert_eq!(
        AddStatEffect::compile(&missing_amount).unwrap_err().to_string(),
        "You must specify the amount to add/remove!"
    );
}
