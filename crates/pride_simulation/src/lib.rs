//! Touhou Pride Combat Core
//!
//! ECS-симуляция боя на Bevy 0.16 (headless, без рендера)
//!
//! Слои:
//! - ECS = бой (здоровье, атаки, снаряды, AI врагов, управление игроком)
//! - Presentation = спрайты, звук, камера, диалоги (потребляет events ядра)
//!
//! Всё время: симуляционное (`Time` в FixedUpdate), wall-clock не используется.

use std::time::Duration;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod motion;
pub mod player;

// Re-export базовых типов для удобства
pub use ai::{ActivationState, AIPlugin, DetectionRange, EnemyActivation, EnemyBehavior, EnemyBrain};
pub use combat::{
    AttackKind, CombatPlugin, CombatantDamaged, CombatantDied, DamageRequest, FireRequest, HealthSignal,
    Projectile, ProjectileCollision, ProjectileSide,
};
pub use components::*;
pub use config::{load_config, CombatConfig, ConfigError};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use motion::HeadlessMotionPlugin;
pub use player::{Controlled, Party, PlayerInput, PlayerMotionState, PlayerPlugin, StoryState};

/// Шаг симуляции: 64Hz (1/64s точно представим в f32 и Duration)
pub const FIXED_TIMESTEP: Duration = Duration::from_micros(15_625);

/// Фазы одного тика (FixedUpdate), выполняются строго последовательно
///
/// inputs → player control → proximity/activation → enemy decisions → dispatch →
/// projectile update → motion → collisions → damage → gates/cleanup
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// PlayerInput → PlayerMotionState
    Input,
    /// Player state machine, area attack, переключение персонажей
    Control,
    /// Proximity, активация и решения врагов
    Decision,
    /// FireRequest → снаряды / лазер
    Dispatch,
    /// Lifetime, homing, движение снарядов
    Projectiles,
    /// Интеграция скорости бойцов (headless замена physics слоя)
    Motion,
    /// ProjectileCollision → DamageRequest
    Collisions,
    /// DamageRequest → здоровье, смерть, реакции на урон
    Damage,
    /// Damage gates, истёкшие визуалы
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 64Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP))
            .init_resource::<CombatConfig>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Input,
                    SimulationSet::Control,
                    SimulationSet::Decision,
                    SimulationSet::Dispatch,
                    SimulationSet::Projectiles,
                    SimulationSet::Motion,
                    SimulationSet::Collisions,
                    SimulationSet::Damage,
                    SimulationSet::Cleanup,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            )
            // Подсистемы
            .add_plugins((CombatPlugin, AIPlugin, PlayerPlugin));
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: каждый `app.update()` = ровно один fixed tick
/// (кроме самого первого update: у Time<Real> там нулевая дельта).
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(FIXED_TIMESTEP))
        .insert_resource(Time::<Fixed>::from_duration(FIXED_TIMESTEP));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
