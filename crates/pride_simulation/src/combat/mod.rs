//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Combatant health, damage gate, unlockables
//! - Combat rules: dispatch атак, траектории снарядов, hit-scan лазер
//! - Events: DamageRequest → HealthSignal / CombatantDamaged / CombatantDied
//!
//! Presentation ответственность (вне ядра):
//! - спрайты снарядов (по ProjectileSpawned), звук (ShotCue), луч (LaserBeam)
//! - physics коллизии снарядов → ProjectileCollision

use bevy::prelude::*;
use crate::SimulationSet;

pub mod attack;
pub mod damage;
pub mod dispatch;
pub mod laser;
pub mod projectile;
pub mod unlock;

#[cfg(test)]
mod dispatch_tests;

// Re-export основных типов
pub use attack::{AttackKind, FireRequest, ProjectileSide};
pub use damage::{
    apply_damage_requests, CombatantDamaged, CombatantDied, DamageRequest, DamageSource, HealthSignal,
};
pub use dispatch::{dispatch_fire_requests, plan_shots, InvalidFireRequest, ShotCue, ShotPlan};
pub use laser::{cast_laser, LaserBeam, LaserFired, LaserHit, LaserTarget};
pub use projectile::{
    HomingGuidance, HomingLock, Projectile, ProjectileCollision, ProjectileSpawned,
};
pub use unlock::{AllowDamage, DamageGateUnlock, Requirements, Unlockable};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения (через SimulationSet):
/// 1. Dispatch: FireRequest → снаряды / лазер (урон лазера = DamageRequest)
/// 2. Projectiles: lifetime, homing захват и доворот, интеграция позиции
/// 3. Collisions: ProjectileCollision → DamageRequest
/// 4. Damage: DamageRequest → Combatant::apply_damage
/// 5. Cleanup: damage gates, истёкшие лучи лазера
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<FireRequest>()
            .add_event::<DamageRequest>()
            .add_event::<HealthSignal>()
            .add_event::<CombatantDamaged>()
            .add_event::<CombatantDied>()
            .add_event::<ProjectileSpawned>()
            .add_event::<ProjectileCollision>()
            .add_event::<ShotCue>()
            .add_event::<LaserFired>();

        app.add_systems(
            FixedUpdate,
            dispatch::dispatch_fire_requests.in_set(SimulationSet::Dispatch),
        )
        .add_systems(
            FixedUpdate,
            (
                projectile::tick_projectile_lifetimes,
                projectile::acquire_homing_targets,
                projectile::steer_homing_projectiles,
                projectile::advance_projectiles,
            )
                .chain()
                .in_set(SimulationSet::Projectiles),
        )
        .add_systems(
            FixedUpdate,
            projectile::handle_projectile_collisions.in_set(SimulationSet::Collisions),
        )
        .add_systems(
            FixedUpdate,
            damage::apply_damage_requests.in_set(SimulationSet::Damage),
        )
        .add_systems(
            FixedUpdate,
            (unlock::open_damage_gates, laser::expire_laser_beams)
                .chain()
                .in_set(SimulationSet::Cleanup),
        );
    }
}
