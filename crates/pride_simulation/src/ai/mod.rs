//! Enemy AI module
//!
//! Activation FSM (Dormant → Active) + поведение подтипов врагов.
//! Враг сам ничего не знает о снарядах: решение об атаке = FireRequest.

use bevy::prelude::*;
use crate::SimulationSet;

pub mod activation;
pub mod behavior;

// Re-export основных типов
pub use activation::{
    ActivationState, DetectionRange, EnemyActivation, ProximityEvent, ProximityTag,
};
pub use behavior::{Chaser, EnemyBehavior, EnemyBrain, EnemyContext, Orbiter, Turret};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate (SimulationSet::Decision).
/// Порядок выполнения:
/// 1. detect_player_proximity: встроенный детектор → ProximityEvent
/// 2. tick_enemy_decisions: таймер активных врагов → FireRequest
/// 3. activate_on_proximity: ProximityEvent → Dormant → Active
/// 4. drive_enemy_movement: behavior.movement → Velocity (Dormant → ноль)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ProximityEvent>().add_systems(
            FixedUpdate,
            (
                activation::detect_player_proximity,
                activation::tick_enemy_decisions,
                activation::activate_on_proximity,
                activation::drive_enemy_movement,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimulationSet::Decision),
        );
    }
}
