//! Attack dispatcher: FireRequest → снаряды / hit-scan
//!
//! Stateless. `plan_shots`: чистая функция (тестируется без World),
//! `dispatch_fire_requests` реализует план: спавнит снаряды, кастует лазер,
//! шлёт события для presentation (ProjectileSpawned, ShotCue, LaserFired).

use bevy::prelude::*;
use thiserror::Error;
use crate::combat::{
    cast_laser, AttackKind, DamageRequest, DamageSource, FireRequest, HomingGuidance, LaserBeam,
    LaserFired, LaserTarget, Projectile, ProjectileSpawned,
};
use crate::components::{Benched, Combatant, HitRadius, Obstacle, Position, Side, Velocity};
use crate::config::CombatConfig;

/// Ось, от которой отсчитывается угол веера shotgun
pub const SHOTGUN_REFERENCE_AXIS: Vec2 = Vec2::X;

/// Контрактные нарушения FireRequest (ошибка вызывающего)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidFireRequest {
    #[error("aim direction {0:?} has zero length or is not finite")]
    DegenerateAim(Vec2),
    #[error("origin {0:?} is not finite")]
    NonFiniteOrigin(Vec2),
}

/// Что должен сделать dispatcher для одного FireRequest
#[derive(Debug, Clone, PartialEq)]
pub enum ShotPlan {
    /// Заспавнить снаряды с указанными (нормализованными) направлениями
    Projectiles { directions: Vec<Vec2>, homing: bool },
    /// Мгновенный луч вдоль нормализованного направления
    HitScan { direction: Vec2 },
    /// Ничего (AttackKind::Wave)
    Inert,
}

/// Знаковый угол от reference axis до `aim` (радианы, -π..π)
pub fn signed_angle_from_reference(aim: Vec2) -> f32 {
    let reference = SHOTGUN_REFERENCE_AXIS;
    reference.perp_dot(aim).atan2(reference.dot(aim))
}

/// Три направления веера: base - spread, base, base + spread
pub fn shotgun_directions(aim: Vec2, spread: f32) -> [Vec2; 3] {
    let base = signed_angle_from_reference(aim);

    [-1.0_f32, 0.0, 1.0].map(|offset| {
        let angle = base + spread * offset;
        Vec2::new(angle.cos(), angle.sin())
    })
}

/// Построить план выстрела
pub fn plan_shots(request: &FireRequest, config: &CombatConfig) -> Result<ShotPlan, InvalidFireRequest> {
    if !request.origin.is_finite() {
        return Err(InvalidFireRequest::NonFiniteOrigin(request.origin));
    }

    // Wave инертен: даже нулевой aim не ошибка
    if request.kind == AttackKind::Wave {
        return Ok(ShotPlan::Inert);
    }

    let direction = request
        .aim
        .try_normalize()
        .ok_or(InvalidFireRequest::DegenerateAim(request.aim))?;

    let plan = match request.kind {
        AttackKind::Straight | AttackKind::BossStraight => ShotPlan::Projectiles {
            directions: vec![direction],
            homing: false,
        },
        AttackKind::Shotgun => ShotPlan::Projectiles {
            directions: shotgun_directions(direction, config.shotgun_spread).to_vec(),
            homing: false,
        },
        AttackKind::Homing => ShotPlan::Projectiles {
            directions: vec![direction],
            homing: true,
        },
        AttackKind::Laser => ShotPlan::HitScan { direction },
        AttackKind::Wave => ShotPlan::Inert,
    };

    Ok(plan)
}

/// Event: one-shot звук выстрела (ECS → audio)
///
/// `audio_param`: непрозрачный параметр вызывающего.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ShotCue {
    pub position: Vec2,
    pub audio_param: i32,
}

/// System: обработка FireRequest
pub fn dispatch_fire_requests(
    mut commands: Commands,
    mut requests: EventReader<FireRequest>,
    config: Res<CombatConfig>,
    combatants: Query<(Entity, &Combatant, &Side, &Position, &HitRadius), Without<Benched>>,
    obstacles: Query<(&Position, &Obstacle)>,
    mut spawned_events: EventWriter<ProjectileSpawned>,
    mut shot_cues: EventWriter<ShotCue>,
    mut laser_events: EventWriter<LaserFired>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for request in requests.read() {
        let plan = match plan_shots(request, &config) {
            Ok(plan) => plan,
            Err(err) => {
                crate::logger::log_warning(&format!(
                    "⚠️ Rejected FireRequest from {:?}: {}",
                    request.shooter, err
                ));
                continue;
            }
        };

        if request.kind.plays_shot_cue() {
            shot_cues.write(ShotCue {
                position: request.origin,
                audio_param: request.audio_param,
            });
        }

        match plan {
            ShotPlan::Projectiles { directions, homing } => {
                let side = request.projectile_side();

                for direction in directions {
                    let mut projectile = commands.spawn((
                        Projectile::new(
                            request.kind,
                            side,
                            config.projectile_speed,
                            config.projectile_lifetime,
                        ),
                        side,
                        Position(request.origin),
                        Velocity(direction * config.projectile_speed),
                    ));

                    if homing {
                        projectile.insert(HomingGuidance::new(config.homing_delay));
                    }

                    spawned_events.write(ProjectileSpawned {
                        entity: projectile.id(),
                        kind: request.kind,
                        side,
                        origin: request.origin,
                        direction,
                    });
                }
            }

            ShotPlan::HitScan { direction } => {
                let wanted = request.target_side();

                let targets = combatants
                    .iter()
                    .filter(|(_, combatant, side, _, _)| **side == wanted && combatant.is_alive())
                    .map(|(entity, _, _, position, radius)| LaserTarget::Combatant {
                        entity,
                        center: position.0,
                        radius: radius.0,
                    })
                    .chain(obstacles.iter().map(|(position, obstacle)| LaserTarget::Obstacle {
                        center: position.0,
                        half_extents: obstacle.half_extents,
                    }));

                let hit = cast_laser(request.origin, direction, config.laser_range, targets);

                // Урон синхронно в этом же тике (Damage фаза идёт после Dispatch)
                if let Some(target) = hit.combatant {
                    damage_requests.write(DamageRequest {
                        target,
                        amount: config.laser_damage,
                        source: DamageSource::Laser,
                    });
                }

                commands.spawn(LaserBeam {
                    start: request.origin,
                    end: hit.end,
                    lifetime: Timer::from_seconds(config.laser_beam_lifetime, TimerMode::Once),
                });

                laser_events.write(LaserFired {
                    start: request.origin,
                    end: hit.end,
                    hit: hit.combatant,
                });
            }

            ShotPlan::Inert => {
                crate::logger::log(&format!(
                    "{:?} dispatched with no effect (shooter {:?})",
                    request.kind, request.shooter
                ));
            }
        }
    }
}
