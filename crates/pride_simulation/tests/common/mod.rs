//! Общие helpers для интеграционных тестов: headless App, счётчик тиков,
//! запись событий, spawn бойцов.

#![allow(dead_code)]

use bevy::prelude::*;
use pride_simulation::ai::{DetectionRange, EnemyBehavior, EnemyBrain};
use pride_simulation::*;

/// Номер текущего fixed тика (1, 2, 3 …)
#[derive(Resource, Debug, Default)]
pub struct TickCounter(pub u32);

/// Записанные события вместе с номером тика
#[derive(Resource)]
pub struct EventLog<E: Event + Clone> {
    pub entries: Vec<(u32, E)>,
}

impl<E: Event + Clone> Default for EventLog<E> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

fn count_ticks(mut counter: ResMut<TickCounter>) {
    counter.0 += 1;
}

fn record_events<E: Event + Clone>(
    mut events: EventReader<E>,
    counter: Res<TickCounter>,
    mut log: ResMut<EventLog<E>>,
) {
    for event in events.read() {
        log.entries.push((counter.0, event.clone()));
    }
}

/// Headless App со всеми подсистемами (без headless physics)
pub fn create_combat_app() -> App {
    let mut app = create_headless_app();
    app.add_plugins(SimulationPlugin)
        .init_resource::<TickCounter>()
        .add_systems(FixedUpdate, count_ticks.before(SimulationSet::Input));
    app
}

/// То же + интеграция движения и overlap коллизии снарядов
pub fn create_physics_app() -> App {
    let mut app = create_combat_app();
    app.add_plugins(HeadlessMotionPlugin);
    app
}

/// Начать запись событий типа E (после всех фаз тика)
pub fn track<E: Event + Clone>(app: &mut App) {
    app.init_resource::<EventLog<E>>()
        .add_systems(FixedUpdate, record_events::<E>.after(SimulationSet::Cleanup));
}

/// Все записанные события E
pub fn recorded<E: Event + Clone>(app: &App) -> Vec<(u32, E)> {
    app.world().resource::<EventLog<E>>().entries.clone()
}

/// Только события, без номеров тиков
pub fn recorded_events<E: Event + Clone>(app: &App) -> Vec<E> {
    recorded::<E>(app).into_iter().map(|(_, event)| event).collect()
}

pub fn current_tick(app: &App) -> u32 {
    app.world().resource::<TickCounter>().0
}

/// Прогнать ровно `ticks` fixed тиков
pub fn advance_ticks(app: &mut App, ticks: u32) {
    let target = current_tick(app) + ticks;
    let mut guard = 0;

    while current_tick(app) < target {
        app.update();
        guard += 1;
        assert!(guard <= ticks * 2 + 4, "fixed schedule is not advancing");
    }
}

pub fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}

pub fn spawn_player(app: &mut App, position: Vec2, health: i32, kind: AttackKind) -> Entity {
    let entity = app
        .world_mut()
        .spawn((
            Combatant::new(health, kind),
            Side::Player,
            Position(position),
            MoveSpeed(4.0),
            PlayerMotionState::default(),
            Controlled,
        ))
        .id();
    app.world_mut().insert_resource(Party::new(entity, None));
    entity
}

pub fn spawn_enemy(
    app: &mut App,
    position: Vec2,
    health: i32,
    kind: AttackKind,
    behavior: impl EnemyBehavior,
) -> Entity {
    app.world_mut()
        .spawn((
            Combatant::new(health, kind),
            Side::Enemy,
            Position(position),
            MoveSpeed(2.0),
            EnemyBrain::new(behavior),
            DetectionRange(3.0),
        ))
        .id()
}

/// Просто мишень: враг без AI
pub fn spawn_dummy(app: &mut App, side: Side, position: Vec2, health: i32) -> Entity {
    app.world_mut()
        .spawn((Combatant::new(health, AttackKind::Straight), side, Position(position)))
        .id()
}

pub fn health(app: &App, entity: Entity) -> Option<i32> {
    app.world()
        .get::<Combatant>(entity)
        .map(|combatant| combatant.current_health())
}

pub fn position(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<Position>(entity).map(|p| p.0).unwrap_or(Vec2::NAN)
}

pub fn velocity(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<Velocity>(entity).map(|v| v.0).unwrap_or(Vec2::NAN)
}

pub fn exists(app: &App, entity: Entity) -> bool {
    app.world().get_entity(entity).is_ok()
}

pub fn count<C: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&C>().iter(world).count()
}
