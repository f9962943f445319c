//! Базовые компоненты бойцов: Combatant, Side

use bevy::prelude::*;
use crate::combat::AttackKind;
use crate::components::{HitRadius, MoveSpeed, Position, Velocity};

/// Фракция бойца (кто в кого может стрелять)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opposing(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }

    pub fn from_player_flag(is_player_side: bool) -> Self {
        if is_player_side {
            Side::Player
        } else {
            Side::Enemy
        }
    }
}

/// Маркер: боец убран с поля (partner после удара по партии)
///
/// Не управляется, не выбирается целью (homing, laser, area attack).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Benched;

/// Результат `Combatant::apply_damage`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Урон проигнорирован (неуязвим или уже мёртв)
    Ignored,
    /// Боец жив, `fraction` = current / max
    Damaged { fraction: f32 },
    /// Health дошёл до нуля (ровно один раз за жизнь бойца)
    Killed,
}

/// Боец (игрок, враг, босс): всё, у кого есть здоровье
///
/// Инвариант: 0 ≤ current_health ≤ max_health пока жив.
/// Единственный путь изменить здоровье: `apply_damage`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Position, Velocity, HitRadius, MoveSpeed)]
pub struct Combatant {
    max_health: i32,
    current_health: i32,
    /// Каким оружием стреляет (используется AI и player control)
    pub attack_kind: AttackKind,
    can_take_damage: bool,
    dead: bool,
}

impl Combatant {
    pub fn new(max_health: i32, attack_kind: AttackKind) -> Self {
        debug_assert!(max_health > 0, "combatant max_health must be positive");
        Self {
            max_health,
            current_health: max_health,
            attack_kind,
            can_take_damage: true,
            dead: false,
        }
    }

    /// Боец, неуязвимый до открытия damage gate (босс до сюжетной сцены)
    pub fn invulnerable(mut self) -> Self {
        self.can_take_damage = false;
        self
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn can_take_damage(&self) -> bool {
        self.can_take_damage
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn health_fraction(&self) -> f32 {
        self.current_health.max(0) as f32 / self.max_health as f32
    }

    /// Открыть damage gate (после этого урон проходит)
    pub fn allow_damage(&mut self) {
        self.can_take_damage = true;
    }

    /// Применить урон
    ///
    /// Precondition: `amount > 0` (нарушение = ошибка вызывающего).
    /// Мёртвый или неуязвимый боец урон игнорирует.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        debug_assert!(amount > 0, "apply_damage requires a positive amount, got {}", amount);

        if !self.can_take_damage || self.dead {
            return DamageOutcome::Ignored;
        }

        self.current_health -= amount;

        if self.current_health <= 0 {
            self.current_health = 0;
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Damaged {
                fraction: self.health_fraction(),
            }
        }
    }
}
