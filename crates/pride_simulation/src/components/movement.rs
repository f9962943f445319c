//! Movement компоненты: скорость и базовая скорость передвижения

use bevy::prelude::*;

/// Текущая скорость entity (units/sec)
///
/// Пишется control/AI системами, читается physics слоем.
/// В headless режиме интегрируется `motion::integrate_velocity`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec2);

/// Базовая скорость передвижения бойца (units/sec)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MoveSpeed(pub f32);

impl Default for MoveSpeed {
    fn default() -> Self {
        Self(3.0)
    }
}
