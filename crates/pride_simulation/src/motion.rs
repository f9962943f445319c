//! Headless замена physics слоя
//!
//! В игре позицию бойцов двигает внешний physics движок (Velocity → rigidbody),
//! он же сообщает о попаданиях снарядов. Для тестов и headless раннера этот
//! plugin делает и то, и другое сам:
//! - интеграция Velocity бойцов
//! - overlap снаряд ↔ боец/стена → ProjectileCollision (с учётом collision layers)

use bevy::prelude::*;
use crate::combat::{Projectile, ProjectileCollision};
use crate::components::{Benched, Combatant, HitRadius, Obstacle, Position, Side, Velocity};
use crate::SimulationSet;

/// Headless physics: движение бойцов + коллизии снарядов
pub struct HeadlessMotionPlugin;

impl Plugin for HeadlessMotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (integrate_velocity, detect_projectile_overlaps)
                .chain()
                .in_set(SimulationSet::Motion),
        );
    }
}

/// System: position += velocity * dt (снаряды двигает projectile система)
pub fn integrate_velocity(
    mut bodies: Query<(&mut Position, &Velocity), (With<Combatant>, Without<Projectile>)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut position, velocity) in bodies.iter_mut() {
        position.0 += velocity.0 * delta;
    }
}

/// Попадает ли точка в axis-aligned прямоугольник препятствия
fn inside_obstacle(point: Vec2, center: Vec2, obstacle: &Obstacle) -> bool {
    let offset = (point - center).abs();
    offset.x <= obstacle.half_extents.x && offset.y <= obstacle.half_extents.y
}

/// System: overlap снарядов → ProjectileCollision
///
/// Collision layers: снаряд видит только бойцов своей цели и стены.
/// Один снаряд даёт не больше одной коллизии за тик (первый в порядке query).
pub fn detect_projectile_overlaps(
    projectiles: Query<(Entity, &Projectile, &Position)>,
    combatants: Query<(Entity, &Combatant, &Side, &Position, &HitRadius), Without<Benched>>,
    obstacles: Query<(&Position, &Obstacle)>,
    mut collisions: EventWriter<ProjectileCollision>,
) {
    for (entity, projectile, position) in projectiles.iter() {
        let wanted = projectile.side.targets();

        let hit_combatant = combatants
            .iter()
            .find(|(_, combatant, side, target_position, radius)| {
                **side == wanted
                    && combatant.is_alive()
                    && position.0.distance(target_position.0) <= radius.0
            })
            .map(|(target, ..)| target);

        if let Some(target) = hit_combatant {
            collisions.write(ProjectileCollision {
                projectile: entity,
                target: Some(target),
            });
            continue;
        }

        let hit_wall = obstacles
            .iter()
            .any(|(center, obstacle)| inside_obstacle(position.0, center.0, obstacle));

        if hit_wall {
            collisions.write(ProjectileCollision {
                projectile: entity,
                target: None,
            });
        }
    }
}
