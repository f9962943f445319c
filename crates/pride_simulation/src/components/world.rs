//! World positioning компоненты: Position, HitRadius, Obstacle

use bevy::prelude::*;

/// Позиция entity в мире (2D, units)
///
/// Ядро authoritative для снарядов; для бойцов позицию синхронизирует
/// physics слой (или `motion::integrate_velocity` в headless режиме).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Position(pub Vec2);

/// Радиус hit-круга бойца (для laser raycast)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitRadius(pub f32);

impl Default for HitRadius {
    fn default() -> Self {
        Self(0.5)
    }
}

/// Статичное препятствие (стена): блокирует лазер
///
/// `half_extents`: половины размеров axis-aligned прямоугольника вокруг `Position`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Position)]
pub struct Obstacle {
    pub half_extents: Vec2,
}

impl Obstacle {
    pub fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }
}
