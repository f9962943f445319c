//! Attack kinds и fire request
//!
//! FireRequest: абстрактное намерение атаковать (до появления снарядов).
//! Генерируется player control и enemy AI, обрабатывается dispatcher'ом.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::components::Side;

/// Тип атаки (выбирает алгоритм траектории/наведения)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum AttackKind {
    /// Один снаряд по прямой
    #[default]
    Straight,
    /// То же что Straight, другой визуал (босс)
    BossStraight,
    /// 3 дробинки веером
    Shotgun,
    /// Прямой снаряд, через 0.5s захватывает цель
    Homing,
    /// Мгновенный hit-scan луч
    Laser,
    /// Зарезервировано: dispatch проходит, эффекта нет
    Wave,
}

impl AttackKind {
    /// Играет ли dispatch звуковой cue (лазер и wave: нет)
    pub fn plays_shot_cue(self) -> bool {
        !matches!(self, AttackKind::Laser | AttackKind::Wave)
    }
}

/// Сторона снаряда (collision layer для physics слоя)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum ProjectileSide {
    PlayerProjectile,
    EnemyProjectile,
}

impl ProjectileSide {
    pub fn from_player_flag(attacker_is_player_side: bool) -> Self {
        if attacker_is_player_side {
            ProjectileSide::PlayerProjectile
        } else {
            ProjectileSide::EnemyProjectile
        }
    }

    /// Какую фракцию этот снаряд может ранить
    pub fn targets(self) -> Side {
        match self {
            ProjectileSide::PlayerProjectile => Side::Enemy,
            ProjectileSide::EnemyProjectile => Side::Player,
        }
    }
}

/// Event: кто-то хочет выстрелить
///
/// `aim` не обязан быть нормализован: dispatcher нормализует сам.
/// `audio_param` пробрасывается в ShotCue без интерпретации.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FireRequest {
    pub origin: Vec2,
    pub aim: Vec2,
    pub attacker_is_player_side: bool,
    pub kind: AttackKind,
    pub audio_param: i32,
    /// Кто стреляет (для логов/атрибуции), None для скриптовых выстрелов
    pub shooter: Option<Entity>,
}

impl FireRequest {
    pub fn new(origin: Vec2, aim: Vec2, side: Side, kind: AttackKind) -> Self {
        Self {
            origin,
            aim,
            attacker_is_player_side: side == Side::Player,
            kind,
            audio_param: 0,
            shooter: None,
        }
    }

    pub fn with_shooter(mut self, shooter: Entity) -> Self {
        self.shooter = Some(shooter);
        self
    }

    pub fn with_audio_param(mut self, audio_param: i32) -> Self {
        self.audio_param = audio_param;
        self
    }

    pub fn projectile_side(&self) -> ProjectileSide {
        ProjectileSide::from_player_flag(self.attacker_is_player_side)
    }

    /// Фракция, в которую летит атака
    pub fn target_side(&self) -> Side {
        self.projectile_side().targets()
    }
}
