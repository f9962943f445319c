//! Laser: мгновенный hit-scan
//!
//! Луч из origin вдоль нормализованного aim до `laser_range`. Учитываются только
//! бойцы противоположной стороны и статичные препятствия. Попадание в бойца
//! наносит урон в этом же тике; визуал луча живёт `laser_beam_lifetime` и
//! геймплейного эффекта больше не имеет.

use bevy::prelude::*;
use parry2d::math::{Isometry, Point, Vector};
use parry2d::query::{Ray, RayCast};
use parry2d::shape::{Ball, Cuboid};

/// Кандидат для raycast
#[derive(Debug, Clone, Copy)]
pub enum LaserTarget {
    Combatant {
        entity: Entity,
        center: Vec2,
        radius: f32,
    },
    Obstacle {
        center: Vec2,
        half_extents: Vec2,
    },
}

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserHit {
    /// Конец луча (точка попадания или origin + dir * range)
    pub end: Vec2,
    /// В кого попали (None: стена или пустота)
    pub combatant: Option<Entity>,
}

/// Бросить луч и найти ближайшее попадание
///
/// `direction` должен быть нормализован (тогда time of impact = дистанция).
pub fn cast_laser(
    origin: Vec2,
    direction: Vec2,
    range: f32,
    targets: impl IntoIterator<Item = LaserTarget>,
) -> LaserHit {
    let ray = Ray::new(
        Point::new(origin.x, origin.y),
        Vector::new(direction.x, direction.y),
    );

    let mut nearest: Option<(f32, Option<Entity>)> = None;

    for target in targets {
        let (toi, entity) = match target {
            LaserTarget::Combatant { entity, center, radius } => {
                let shape = Ball::new(radius);
                let pose = Isometry::translation(center.x, center.y);
                (shape.cast_ray(&pose, &ray, range, true), Some(entity))
            }
            LaserTarget::Obstacle { center, half_extents } => {
                let shape = Cuboid::new(Vector::new(half_extents.x, half_extents.y));
                let pose = Isometry::translation(center.x, center.y);
                (shape.cast_ray(&pose, &ray, range, true), None)
            }
        };

        let Some(toi) = toi else {
            continue;
        };

        if nearest.map_or(true, |(best, _)| toi < best) {
            nearest = Some((toi, entity));
        }
    }

    match nearest {
        Some((toi, combatant)) => LaserHit {
            end: origin + direction * toi,
            combatant,
        },
        None => LaserHit {
            end: origin + direction * range,
            combatant: None,
        },
    }
}

/// Визуал луча (transient entity, только для presentation)
#[derive(Component, Debug, Clone)]
pub struct LaserBeam {
    pub start: Vec2,
    pub end: Vec2,
    pub lifetime: Timer,
}

impl LaserBeam {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Event: лазер выстрелил (ECS → presentation)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LaserFired {
    pub start: Vec2,
    pub end: Vec2,
    pub hit: Option<Entity>,
}

/// System: удалить истёкшие лучи
pub fn expire_laser_beams(
    mut commands: Commands,
    mut beams: Query<(Entity, &mut LaserBeam)>,
    time: Res<Time>,
) {
    for (entity, mut beam) in beams.iter_mut() {
        beam.lifetime.tick(time.delta());

        if beam.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}
