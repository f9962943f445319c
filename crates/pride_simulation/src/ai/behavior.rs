//! Поведение подтипов врагов: куда двигаться и когда стрелять
//!
//! Каждый подтип обязан реализовать ОБА метода: неполный подтип не скомпилируется.

use bevy::prelude::*;
use crate::ai::{DetectionRange, EnemyActivation};

/// Снимок окружения врага на начало тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyContext {
    pub position: Vec2,
    /// Ближайший живой игрок на поле
    pub player_position: Option<Vec2>,
    /// Базовая скорость (MoveSpeed)
    pub speed: f32,
    /// Номер решения (1, 2, 3 …) для decide_attack; для movement: сколько уже принято
    pub decisions: u32,
}

impl EnemyContext {
    /// Направление на игрока (None: игрока нет или стоим в нём)
    pub fn to_player(&self) -> Option<Vec2> {
        self.player_position
            .and_then(|player| (player - self.position).try_normalize())
    }
}

/// Capability set подтипа врага
pub trait EnemyBehavior: Send + Sync + 'static {
    /// Желаемая скорость в этом тике (только когда враг Active)
    fn movement(&self, ctx: &EnemyContext) -> Vec2;

    /// Решение об атаке на срабатывании таймера: Some(aim) → FireRequest
    fn decide_attack(&self, ctx: &EnemyContext) -> Option<Vec2>;
}

/// Компонент: поведение конкретного врага
#[derive(Component)]
#[require(EnemyActivation, DetectionRange)]
pub struct EnemyBrain(pub Box<dyn EnemyBehavior>);

impl EnemyBrain {
    pub fn new(behavior: impl EnemyBehavior) -> Self {
        Self(Box::new(behavior))
    }

    pub fn movement(&self, ctx: &EnemyContext) -> Vec2 {
        self.0.movement(ctx)
    }

    pub fn decide_attack(&self, ctx: &EnemyContext) -> Option<Vec2> {
        self.0.decide_attack(ctx)
    }
}

/// Турель: стоит на месте, стреляет в игрока на каждом решении
#[derive(Debug, Clone, Copy, Default)]
pub struct Turret;

impl EnemyBehavior for Turret {
    fn movement(&self, _ctx: &EnemyContext) -> Vec2 {
        Vec2::ZERO
    }

    fn decide_attack(&self, ctx: &EnemyContext) -> Option<Vec2> {
        ctx.to_player()
    }
}

/// Преследователь: идёт к игроку, стреляет на каждом решении
#[derive(Debug, Clone, Copy)]
pub struct Chaser {
    /// Ближе этой дистанции не подходит
    pub stop_distance: f32,
}

impl Default for Chaser {
    fn default() -> Self {
        Self { stop_distance: 1.0 }
    }
}

impl EnemyBehavior for Chaser {
    fn movement(&self, ctx: &EnemyContext) -> Vec2 {
        let Some(player) = ctx.player_position else {
            return Vec2::ZERO;
        };

        if ctx.position.distance(player) <= self.stop_distance {
            return Vec2::ZERO;
        }

        ctx.to_player().map_or(Vec2::ZERO, |direction| direction * ctx.speed)
    }

    fn decide_attack(&self, ctx: &EnemyContext) -> Option<Vec2> {
        ctx.to_player()
    }
}

/// Кружит вокруг игрока на заданном радиусе, стреляет через раз
#[derive(Debug, Clone, Copy)]
pub struct Orbiter {
    pub radius: f32,
    /// true: против часовой
    pub counter_clockwise: bool,
}

impl Default for Orbiter {
    fn default() -> Self {
        Self {
            radius: 3.0,
            counter_clockwise: true,
        }
    }
}

impl EnemyBehavior for Orbiter {
    fn movement(&self, ctx: &EnemyContext) -> Vec2 {
        let Some(player) = ctx.player_position else {
            return Vec2::ZERO;
        };

        let Some(outward) = (ctx.position - player).try_normalize() else {
            // Стоим прямо в игроке: сначала отходим
            return Vec2::Y * ctx.speed;
        };

        let tangent = if self.counter_clockwise {
            outward.perp()
        } else {
            -outward.perp()
        };

        // Радиальная поправка: тянем на орбиту, пока не дошли
        let radial_error = self.radius - ctx.position.distance(player);
        let correction = outward * radial_error.clamp(-1.0, 1.0);

        (tangent + correction).normalize_or_zero() * ctx.speed
    }

    fn decide_attack(&self, ctx: &EnemyContext) -> Option<Vec2> {
        if ctx.decisions % 2 != 0 {
            return None;
        }
        ctx.to_player()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn ctx(position: Vec2, player: Option<Vec2>, decisions: u32) -> EnemyContext {
        EnemyContext {
            position,
            player_position: player,
            speed: 2.0,
            decisions,
        }
    }

    #[test]
    fn test_turret_never_moves() {
        let turret = Turret;
        assert_eq!(turret.movement(&ctx(Vec2::ZERO, Some(Vec2::X * 5.0), 0)), Vec2::ZERO);
        assert_eq!(
            turret.decide_attack(&ctx(Vec2::ZERO, Some(Vec2::new(0.0, -3.0)), 1)),
            Some(Vec2::NEG_Y)
        );
    }

    #[test]
    fn test_no_player_no_attack() {
        let context = ctx(Vec2::ZERO, None, 2);
        assert_eq!(Turret.decide_attack(&context), None);
        assert_eq!(Chaser::default().decide_attack(&context), None);
        assert_eq!(Orbiter::default().decide_attack(&context), None);
        assert_eq!(Chaser::default().movement(&context), Vec2::ZERO);
    }

    #[test]
    fn test_chaser_moves_toward_player() {
        let chaser = Chaser::default();
        let velocity = chaser.movement(&ctx(Vec2::ZERO, Some(Vec2::new(4.0, 0.0)), 0));
        assert!((velocity - Vec2::new(2.0, 0.0)).length() < EPS);

        // В радиусе остановки стоит
        let close = chaser.movement(&ctx(Vec2::ZERO, Some(Vec2::new(0.5, 0.0)), 0));
        assert_eq!(close, Vec2::ZERO);
    }

    #[test]
    fn test_orbiter_moves_tangentially_on_orbit() {
        let orbiter = Orbiter::default();
        let velocity = orbiter.movement(&ctx(Vec2::new(3.0, 0.0), Some(Vec2::ZERO), 0));

        // На орбите радиальной составляющей нет: только касательная
        assert!((velocity.length() - 2.0).abs() < EPS);
        assert!(velocity.dot(Vec2::X).abs() < EPS);
        assert!(velocity.y > 0.0);
    }

    #[test]
    fn test_orbiter_fires_every_other_decision() {
        let orbiter = Orbiter::default();
        let fired: Vec<bool> = (1..=4)
            .map(|decision| {
                orbiter
                    .decide_attack(&ctx(Vec2::new(3.0, 0.0), Some(Vec2::ZERO), decision))
                    .is_some()
            })
            .collect();

        assert_eq!(fired, vec![false, true, false, true]);
    }
}
