//! Enemy activation FSM
//!
//! Dormant → Active (один раз, необратимо).
//!
//! - Dormant: скорость принудительно ноль, таймер атак стоит
//! - Active: скорость = behavior.movement(ctx), каждые 2s decide_attack(ctx)
//!
//! Триггер: ProximityEvent с тегом Player (внешний physics слой или
//! `detect_player_proximity` по DetectionRange).

use std::time::Duration;
use bevy::prelude::*;
use crate::ai::{EnemyBrain, EnemyContext};
use crate::combat::FireRequest;
use crate::components::{Benched, Combatant, MoveSpeed, Position, Side, Velocity};
use crate::config::CombatConfig;

/// Состояние активации врага
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ActivationState {
    #[default]
    Dormant,
    Active,
}

/// Activation FSM врага + таймер решений
///
/// Таймер repeating: остаток переносится, решения ровно в t = 2, 4, 6 …
/// после активации даже при неровных дельтах.
///
/// Период берётся из `CombatConfig` в момент активации, если враг не
/// создан со своим периодом через `EnemyActivation::new`.
#[derive(Component, Debug, Clone)]
pub struct EnemyActivation {
    state: ActivationState,
    attack_timer: Timer,
    /// Сколько решений об атаке уже принято
    decisions: u32,
    /// Период задан явно (config не переопределяет)
    fixed_period: bool,
}

impl EnemyActivation {
    pub fn new(decision_period: f32) -> Self {
        Self {
            state: ActivationState::Dormant,
            attack_timer: Timer::from_seconds(decision_period, TimerMode::Repeating),
            decisions: 0,
            fixed_period: true,
        }
    }

    pub fn decision_period(&self) -> Duration {
        self.attack_timer.duration()
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ActivationState::Active
    }

    pub fn decisions(&self) -> u32 {
        self.decisions
    }

    /// Dormant → Active. Возвращает false, если уже активен (переход игнорируется)
    ///
    /// `config_period` применяется только к врагам без явного периода.
    pub fn activate(&mut self, config_period: f32) -> bool {
        if self.is_active() {
            return false;
        }

        if !self.fixed_period {
            self.attack_timer.set_duration(Duration::from_secs_f32(config_period));
        }
        self.state = ActivationState::Active;
        self.attack_timer.reset();
        true
    }

    /// Продвинуть таймер решений, вернуть число решений за этот шаг
    ///
    /// Dormant → всегда 0.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        if !self.is_active() {
            return 0;
        }

        self.attack_timer.tick(delta);
        let fired = self.attack_timer.times_finished_this_tick();
        self.decisions += fired;
        fired
    }
}

impl Default for EnemyActivation {
    fn default() -> Self {
        Self {
            fixed_period: false,
            ..Self::new(CombatConfig::default().enemy_decision_period)
        }
    }
}

/// Радиус, в котором враг «замечает» игрока
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DetectionRange(pub f32);

impl Default for DetectionRange {
    fn default() -> Self {
        Self(6.0)
    }
}

/// Тег того, кто вошёл в зону наблюдателя
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityTag {
    Player,
    Enemy,
}

/// Event: кто-то вошёл в trigger-зону врага (physics → ECS)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ProximityEvent {
    pub observer: Entity,
    pub tag: ProximityTag,
}

/// Позиция ближайшего живого игрока на поле (None: игроков нет)
pub fn nearest_player_position<'a>(
    from: Vec2,
    players: impl Iterator<Item = (&'a Combatant, &'a Side, &'a Position)>,
) -> Option<Vec2> {
    players
        .filter(|(combatant, side, _)| **side == Side::Player && combatant.is_alive())
        .map(|(_, _, position)| position.0)
        .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}

/// System: встроенный детектор близости (headless замена trigger-коллайдера)
pub fn detect_player_proximity(
    enemies: Query<(Entity, &EnemyActivation, &Position, &DetectionRange)>,
    players: Query<(&Combatant, &Side, &Position), Without<Benched>>,
    mut proximity_events: EventWriter<ProximityEvent>,
) {
    for (entity, activation, position, range) in enemies.iter() {
        if activation.is_active() {
            continue;
        }

        let in_range = nearest_player_position(position.0, players.iter())
            .is_some_and(|player| player.distance(position.0) <= range.0);

        if in_range {
            proximity_events.write(ProximityEvent {
                observer: entity,
                tag: ProximityTag::Player,
            });
        }
    }
}

/// System: ProximityEvent(Player) → Dormant → Active
pub fn activate_on_proximity(
    mut proximity_events: EventReader<ProximityEvent>,
    mut enemies: Query<&mut EnemyActivation>,
    config: Res<CombatConfig>,
) {
    for event in proximity_events.read() {
        // Другие враги в зоне не будят
        if event.tag != ProximityTag::Player {
            continue;
        }

        let Ok(mut activation) = enemies.get_mut(event.observer) else {
            continue;
        };

        if activation.activate(config.enemy_decision_period) {
            crate::logger::log_info(&format!("👁️ Enemy {:?} activated (player in range)", event.observer));
        }
    }
}

/// System: скорость врагов из behavior (Dormant → ноль)
pub fn drive_enemy_movement(
    mut enemies: Query<(&EnemyActivation, &EnemyBrain, &Position, &MoveSpeed, &mut Velocity)>,
    players: Query<(&Combatant, &Side, &Position), (Without<Benched>, Without<EnemyBrain>)>,
) {
    for (activation, brain, position, speed, mut velocity) in enemies.iter_mut() {
        if !activation.is_active() {
            velocity.0 = Vec2::ZERO;
            continue;
        }

        let ctx = EnemyContext {
            position: position.0,
            player_position: nearest_player_position(position.0, players.iter()),
            speed: speed.0,
            decisions: activation.decisions(),
        };

        velocity.0 = brain.movement(&ctx);
    }
}

/// System: таймер решений активных врагов → FireRequest
///
/// Запускается ДО `activate_on_proximity`: тик активации таймер не двигает,
/// первое решение ровно через период после активации.
pub fn tick_enemy_decisions(
    mut enemies: Query<(Entity, &mut EnemyActivation, &EnemyBrain, &Combatant, &Position, &MoveSpeed)>,
    players: Query<(&Combatant, &Side, &Position), (Without<Benched>, Without<EnemyBrain>)>,
    time: Res<Time>,
    mut fire_requests: EventWriter<FireRequest>,
) {
    for (entity, mut activation, brain, combatant, position, speed) in enemies.iter_mut() {
        let fired = activation.advance(time.delta());
        if fired == 0 {
            continue;
        }

        let player_position = nearest_player_position(position.0, players.iter());
        let first_decision = activation.decisions() - fired;

        for decision in 1..=fired {
            let ctx = EnemyContext {
                position: position.0,
                player_position,
                speed: speed.0,
                decisions: first_decision + decision,
            };

            let Some(aim) = brain.decide_attack(&ctx) else {
                continue;
            };

            fire_requests.write(
                FireRequest::new(position.0, aim, Side::Enemy, combatant.attack_kind).with_shooter(entity),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_micros(15_625);

    #[test]
    fn test_dormant_never_decides() {
        let mut activation = EnemyActivation::new(2.0);

        for _ in 0..1000 {
            assert_eq!(activation.advance(TICK), 0);
        }
        assert_eq!(activation.state(), ActivationState::Dormant);
        assert_eq!(activation.decisions(), 0);
    }

    #[test]
    fn test_decisions_every_two_seconds() {
        let mut activation = EnemyActivation::new(2.0);
        assert!(activation.activate(2.0));

        // 2s = 128 тиков по 1/64s
        let mut decision_ticks = Vec::new();
        for tick in 1..=400 {
            if activation.advance(TICK) > 0 {
                decision_ticks.push(tick);
            }
        }

        assert_eq!(decision_ticks, vec![128, 256, 384]);
    }

    #[test]
    fn test_decisions_with_variable_deltas() {
        let mut activation = EnemyActivation::new(2.0);
        activation.activate(2.0);

        let deltas_ms = [700, 600, 700, 1500, 500, 1999, 1];
        let mut elapsed_ms = 0;
        let mut decision_times = Vec::new();

        for delta in deltas_ms {
            elapsed_ms += delta;
            let fired = activation.advance(Duration::from_millis(delta));
            for _ in 0..fired {
                decision_times.push(elapsed_ms);
            }
        }

        // Остаток переносится: решения ровно на 2s, 4s, 6s
        assert_eq!(decision_times, vec![2000, 4000, 6000]);
        assert_eq!(activation.decisions(), 3);
    }

    #[test]
    fn test_large_delta_fires_multiple_decisions() {
        let mut activation = EnemyActivation::new(2.0);
        activation.activate(2.0);

        assert_eq!(activation.advance(Duration::from_millis(4500)), 2);
        assert_eq!(activation.advance(Duration::from_millis(1500)), 1);
    }

    #[test]
    fn test_activation_is_one_way() {
        let mut activation = EnemyActivation::new(2.0);
        assert!(activation.activate(2.0));
        activation.advance(Duration::from_millis(1500));

        // Повторный триггер не сбрасывает таймер
        assert!(!activation.activate(2.0));
        assert_eq!(activation.advance(Duration::from_millis(500)), 1);
        assert!(activation.is_active());
    }

    #[test]
    fn test_config_period_applies_unless_fixed() {
        let mut from_config = EnemyActivation::default();
        from_config.activate(1.0);
        assert_eq!(from_config.decision_period(), Duration::from_secs(1));

        let mut fixed = EnemyActivation::new(3.0);
        fixed.activate(1.0);
        assert_eq!(fixed.decision_period(), Duration::from_secs(3));
    }

    #[test]
    fn test_nearest_player_ignores_enemies_and_dead() {
        let alive = Combatant::new(5, crate::combat::AttackKind::Straight);
        let mut dead = Combatant::new(5, crate::combat::AttackKind::Straight);
        dead.apply_damage(10);

        let near_dead = (dead, Side::Player, Position(Vec2::new(1.0, 0.0)));
        let enemy = (alive.clone(), Side::Enemy, Position(Vec2::new(0.5, 0.0)));
        let far = (alive.clone(), Side::Player, Position(Vec2::new(9.0, 0.0)));
        let mid = (alive, Side::Player, Position(Vec2::new(-4.0, 0.0)));

        let candidates = [&near_dead, &enemy, &far, &mid];
        let nearest = nearest_player_position(Vec2::ZERO, candidates.iter().map(|(c, s, p)| (c, s, p)));

        assert_eq!(nearest, Some(Vec2::new(-4.0, 0.0)));
    }
}
