//! Projectile simulation: lifetime, homing, движение, коллизии
//!
//! Архитектура:
//! - ECS владеет траекторией (Position + Velocity) и lifetime снаряда
//! - Physics слой детектирует коллизии → ProjectileCollision (→ ECS)
//! - ECS решает, наносить ли урон (сторона, жива ли цель)
//!
//! Homing: первые 0.5s летит прямо, затем ОДИН раз ищет цель.
//! Нашёл: каждый тик доворачивает на текущую позицию цели;
//! цель умерла/исчезла: снова летит прямо (unguided) до конца lifetime.

use bevy::prelude::*;
use crate::combat::{AttackKind, DamageRequest, DamageSource, ProjectileSide};
use crate::components::{Benched, Combatant, Position, Side, Velocity};
use crate::config::CombatConfig;

/// Снаряд (пули, дробь, homing)
#[derive(Component, Debug, Clone)]
#[require(Position, Velocity)]
pub struct Projectile {
    pub kind: AttackKind,
    pub side: ProjectileSide,
    /// Модуль скорости (для homing steering)
    pub speed: f32,
    pub lifetime: Timer,
}

impl Projectile {
    pub fn new(kind: AttackKind, side: ProjectileSide, speed: f32, lifetime_secs: f32) -> Self {
        Self {
            kind,
            side,
            speed,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
        }
    }
}

/// Состояние наведения homing снаряда
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingLock {
    /// Ещё не прошла задержка захвата
    Pending,
    /// Навелись на цель (handle проверяется на liveness каждый тик)
    Locked(Entity),
    /// Цели нет (не нашли или потеряли): летим прямо, повторного поиска нет
    Unguided,
}

/// Homing guidance (только у AttackKind::Homing)
#[derive(Component, Debug, Clone)]
pub struct HomingGuidance {
    pub delay: Timer,
    pub lock: HomingLock,
}

impl HomingGuidance {
    pub fn new(delay_secs: f32) -> Self {
        Self {
            delay: Timer::from_seconds(delay_secs, TimerMode::Once),
            lock: HomingLock::Pending,
        }
    }

    pub fn target(&self) -> Option<Entity> {
        match self.lock {
            HomingLock::Locked(target) => Some(target),
            _ => None,
        }
    }
}

/// Event: снаряд заспавнен (ECS → presentation, выбор спрайта)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileSpawned {
    pub entity: Entity,
    pub kind: AttackKind,
    pub side: ProjectileSide,
    pub origin: Vec2,
    pub direction: Vec2,
}

/// Event: physics слой сообщает о столкновении снаряда (physics → ECS)
///
/// `target = None`: стена/препятствие.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProjectileCollision {
    pub projectile: Entity,
    pub target: Option<Entity>,
}

/// System: истёкший lifetime снаряда → despawn
pub fn tick_projectile_lifetimes(
    mut commands: Commands,
    mut projectiles: Query<(Entity, &mut Projectile)>,
    time: Res<Time>,
) {
    for (entity, mut projectile) in projectiles.iter_mut() {
        projectile.lifetime.tick(time.delta());

        if projectile.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// System: однократный захват цели после задержки
///
/// Политика выбора: первый живой боец противоположной стороны в порядке
/// query (без ранжирования по дистанции).
pub fn acquire_homing_targets(
    mut homing: Query<(Entity, &Projectile, &mut HomingGuidance)>,
    candidates: Query<(Entity, &Combatant, &Side), Without<Benched>>,
    time: Res<Time>,
) {
    for (entity, projectile, mut guidance) in homing.iter_mut() {
        if guidance.lock != HomingLock::Pending {
            continue;
        }

        guidance.delay.tick(time.delta());
        if !guidance.delay.finished() {
            continue;
        }

        let wanted = projectile.side.targets();
        let first_match = candidates
            .iter()
            .find(|(_, combatant, side)| **side == wanted && combatant.is_alive())
            .map(|(target, _, _)| target);

        guidance.lock = match first_match {
            Some(target) => {
                crate::logger::log(&format!("🎯 Homing {:?} locked on {:?}", entity, target));
                HomingLock::Locked(target)
            }
            None => {
                crate::logger::log(&format!("Homing {:?} found no target → unguided", entity));
                HomingLock::Unguided
            }
        };
    }
}

/// System: доворот homing снарядов на текущую позицию цели
pub fn steer_homing_projectiles(
    mut homing: Query<(&Projectile, &Position, &mut Velocity, &mut HomingGuidance)>,
    targets: Query<(&Combatant, &Position), Without<Projectile>>,
) {
    for (projectile, position, mut velocity, mut guidance) in homing.iter_mut() {
        let Some(target) = guidance.target() else {
            continue;
        };

        // Liveness check: цель могла быть уничтожена после захвата
        let target_position = match targets.get(target) {
            Ok((combatant, target_position)) if combatant.is_alive() => target_position.0,
            _ => {
                guidance.lock = HomingLock::Unguided;
                continue;
            }
        };

        // Уже в центре цели: оставляем прежнее направление
        if let Some(direction) = (target_position - position.0).try_normalize() {
            velocity.0 = direction * projectile.speed;
        }
    }
}

/// System: интеграция позиции снарядов
pub fn advance_projectiles(
    mut projectiles: Query<(&mut Position, &Velocity), With<Projectile>>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (mut position, velocity) in projectiles.iter_mut() {
        position.0 += velocity.0 * delta;
    }
}

/// System: обработка ProjectileCollision → урон + despawn снаряда
pub fn handle_projectile_collisions(
    mut commands: Commands,
    mut collisions: EventReader<ProjectileCollision>,
    projectiles: Query<&Projectile>,
    targets: Query<(&Combatant, &Side), Without<Benched>>,
    config: Res<CombatConfig>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    let mut consumed: Vec<Entity> = Vec::new();

    for collision in collisions.read() {
        // Снаряд уже удалён (lifetime, двойная коллизия): игнорируем
        if consumed.contains(&collision.projectile) {
            continue;
        }
        let Ok(projectile) = projectiles.get(collision.projectile) else {
            continue;
        };
        consumed.push(collision.projectile);

        if let Ok(mut entity_commands) = commands.get_entity(collision.projectile) {
            entity_commands.try_despawn();
        }

        let Some(target) = collision.target else {
            continue;
        };

        // Не боец, уже удалён или ушёл с поля
        let Ok((combatant, side)) = targets.get(target) else {
            continue;
        };

        if *side != projectile.side.targets() || !combatant.is_alive() {
            continue;
        }

        damage_requests.write(DamageRequest {
            target,
            amount: config.projectile_damage,
            source: DamageSource::Projectile(projectile.kind),
        });
    }
}
