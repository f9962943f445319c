//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - combatant: здоровье, фракция, damage contract (Combatant, Side)
//! - movement: скорость (Velocity, MoveSpeed)
//! - world: позиционирование и геометрия (Position, HitRadius, Obstacle)

pub mod combatant;
pub mod movement;
pub mod world;

pub use combatant::*;
pub use movement::*;
pub use world::*;
