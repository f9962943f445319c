//! Player control FSM: движение, facing, dash, rapid fire, strafe
//!
//! Вся логика: чистые методы `PlayerMotionState` (тестируются без World),
//! системы только переносят input/выход в ECS.
//!
//! Dash: Idle → Dashing (0.5s) → Cooldown (1.0s) → Idle.
//! Fire loop: Idle → Armed → (выстрел) → Reloading → Armed/Idle.
//! Остаток таймеров переносится между фазами.

use bevy::prelude::*;
use crate::combat::FireRequest;
use crate::components::{Benched, Combatant, MoveSpeed, Position, Side, Velocity};
use crate::config::CombatConfig;
use crate::player::{PlayerInput, StoryState};

/// Допуск на накопление f32 в таймерах
pub const TIMER_EPSILON: f32 = 1e-6;

/// Нижняя граница reload (иначе цикл стрельбы за один тик не ограничен)
pub const MIN_RELOAD_TIME: f32 = 0.01;

/// Marker component для персонажа под управлением игрока
///
/// Акторы С этим компонентом получают команды от PlayerInput.
/// При переключении персонажей маркер переезжает на партнёра.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Controlled;

/// Пауза между выстрелами rapid fire (секунды)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ReloadTime(pub f32);

impl Default for ReloadTime {
    fn default() -> Self {
        Self(0.25)
    }
}

/// Фаза dash
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DashState {
    #[default]
    Idle,
    Dashing { remaining: f32 },
    Cooldown { remaining: f32 },
}

impl DashState {
    pub fn is_dashing(&self) -> bool {
        matches!(self, DashState::Dashing { .. })
    }

    pub fn can_dash(&self) -> bool {
        matches!(self, DashState::Idle)
    }

    /// Продвинуть фазу на `dt`, остаток переносится в следующую фазу
    fn advance(self, dt: f32, cooldown: f32) -> Self {
        match self {
            DashState::Idle => DashState::Idle,
            DashState::Dashing { remaining } => {
                let remaining = remaining - dt;
                if remaining > TIMER_EPSILON {
                    DashState::Dashing { remaining }
                } else {
                    DashState::Cooldown {
                        remaining: cooldown + remaining,
                    }
                    .settle()
                }
            }
            DashState::Cooldown { remaining } => DashState::Cooldown {
                remaining: remaining - dt,
            }
            .settle(),
        }
    }

    fn settle(self) -> Self {
        match self {
            DashState::Cooldown { remaining } if remaining <= TIMER_EPSILON => DashState::Idle,
            other => other,
        }
    }
}

/// Фаза rapid fire
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FireLoop {
    /// Не стреляем
    #[default]
    Idle,
    /// Ждём возможности выстрелить (dash/сюжет блокируют)
    Armed,
    /// Перезарядка после выстрела
    Reloading { remaining: f32 },
}

/// Параметры одного тика
#[derive(Debug, Clone, Copy)]
pub struct ControlParams {
    pub story_playing: bool,
    pub speed: f32,
    pub reload_time: f32,
    pub dash_cooldown: f32,
    pub dash_speed_multiplier: f32,
}

impl ControlParams {
    pub fn new(config: &CombatConfig, story: &StoryState, speed: f32, reload_time: f32) -> Self {
        Self {
            story_playing: story.playing,
            speed,
            reload_time,
            dash_cooldown: config.dash_cooldown,
            dash_speed_multiplier: config.dash_speed_multiplier,
        }
    }
}

/// Результат тика
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlOutput {
    pub velocity: Vec2,
    /// Сколько выстрелов по facing сделать в этом тике
    pub shots: u32,
}

/// Состояние управления персонажем
#[derive(Component, Debug, Clone, PartialEq)]
#[require(ReloadTime)]
pub struct PlayerMotionState {
    move_vector: Vec2,
    /// Последнее ненулевое направление (по умолчанию вверх)
    facing: Vec2,
    dash: DashState,
    firing: bool,
    strafing: bool,
    fire_loop: FireLoop,
}

impl Default for PlayerMotionState {
    fn default() -> Self {
        Self {
            move_vector: Vec2::ZERO,
            facing: Vec2::Y,
            dash: DashState::Idle,
            firing: false,
            strafing: false,
            fire_loop: FireLoop::Idle,
        }
    }
}

impl PlayerMotionState {
    pub fn move_vector(&self) -> Vec2 {
        self.move_vector
    }

    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    pub fn dash(&self) -> DashState {
        self.dash
    }

    pub fn fire_loop(&self) -> FireLoop {
        self.fire_loop
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    pub fn is_strafing(&self) -> bool {
        self.strafing
    }

    pub fn set_move(&mut self, move_vector: Vec2) {
        self.move_vector = move_vector;
        self.sync_facing();
    }

    /// Facing следует за движением, кроме dash и strafe
    fn sync_facing(&mut self) {
        if self.move_vector != Vec2::ZERO && !self.dash.is_dashing() && !self.strafing {
            self.facing = self.move_vector;
        }
    }

    /// Dash (только из Idle). Возвращает false, если проигнорирован
    pub fn press_dash(&mut self, duration: f32) -> bool {
        if !self.dash.can_dash() {
            return false;
        }
        self.dash = DashState::Dashing { remaining: duration };
        true
    }

    pub fn press_fire(&mut self) {
        self.firing = true;
        if self.fire_loop == FireLoop::Idle {
            self.fire_loop = FireLoop::Armed;
        }
    }

    pub fn release_fire(&mut self) {
        self.firing = false;
    }

    pub fn press_strafe(&mut self) {
        self.strafing = true;
    }

    /// Конец strafe: facing снова = движение (если стик не в нуле)
    pub fn release_strafe(&mut self) {
        self.strafing = false;
        if self.move_vector != Vec2::ZERO {
            self.facing = self.move_vector;
        }
    }

    /// Персонаж ушёл из-под управления: сбросить ввод и фазы
    pub fn release_control(&mut self) {
        self.move_vector = Vec2::ZERO;
        self.firing = false;
        self.strafing = false;
        self.dash = DashState::Idle;
        self.fire_loop = FireLoop::Idle;
    }

    /// Один тик FSM
    pub fn tick(&mut self, dt: f32, params: &ControlParams) -> ControlOutput {
        self.sync_facing();

        let blocked = params.story_playing || self.dash.is_dashing();
        let shots = self.advance_fire_loop(dt, blocked, params.reload_time.max(MIN_RELOAD_TIME));

        let velocity = if params.story_playing {
            Vec2::ZERO
        } else if self.dash.is_dashing() {
            self.facing * params.dash_speed_multiplier * params.speed
        } else {
            self.move_vector * params.speed
        };

        self.dash = self.dash.advance(dt, params.dash_cooldown);

        ControlOutput { velocity, shots }
    }

    fn advance_fire_loop(&mut self, dt: f32, blocked: bool, reload: f32) -> u32 {
        match self.fire_loop {
            FireLoop::Idle => 0,

            FireLoop::Armed => {
                if blocked {
                    return 0;
                }
                if !self.firing {
                    self.fire_loop = FireLoop::Idle;
                    return 0;
                }
                self.fire_loop = FireLoop::Reloading { remaining: reload };
                1
            }

            FireLoop::Reloading { remaining } => {
                // Перезарядка идёт и во время dash/сюжета
                let mut remaining = remaining - dt;
                let mut shots = 0;

                while remaining <= TIMER_EPSILON {
                    if !self.firing {
                        self.fire_loop = FireLoop::Idle;
                        return shots;
                    }
                    if blocked {
                        self.fire_loop = FireLoop::Armed;
                        return shots;
                    }
                    shots += 1;
                    remaining += reload;
                }

                self.fire_loop = FireLoop::Reloading { remaining };
                shots
            }
        }
    }
}

/// System: PlayerInput → состояние управляемого персонажа
///
/// AreaAttack и SwitchCharacter обрабатывают свои системы.
pub fn apply_player_input(
    mut inputs: EventReader<PlayerInput>,
    mut controlled: Query<&mut PlayerMotionState, (With<Controlled>, Without<Benched>)>,
    story: Res<StoryState>,
    config: Res<CombatConfig>,
) {
    for input in inputs.read() {
        for mut state in controlled.iter_mut() {
            match *input {
                PlayerInput::Move(move_vector) => state.set_move(move_vector),
                PlayerInput::DashPressed => {
                    if !state.press_dash(config.dash_duration) {
                        crate::logger::log("Dash ignored (dashing or cooldown)");
                    }
                }
                PlayerInput::FirePressed => state.press_fire(),
                PlayerInput::FireReleased => state.release_fire(),
                PlayerInput::StrafePressed => {
                    if !story.playing {
                        state.press_strafe();
                    }
                }
                PlayerInput::StrafeReleased => state.release_strafe(),
                PlayerInput::AreaAttack | PlayerInput::SwitchCharacter => {}
            }
        }
    }
}

/// System: тик player FSM → Velocity + FireRequest
pub fn tick_player_control(
    mut controlled: Query<
        (
            Entity,
            &mut PlayerMotionState,
            &mut Velocity,
            &Position,
            &MoveSpeed,
            &ReloadTime,
            &Combatant,
        ),
        (With<Controlled>, Without<Benched>),
    >,
    mut idle: Query<&mut Velocity, (With<PlayerMotionState>, Without<Controlled>)>,
    story: Res<StoryState>,
    config: Res<CombatConfig>,
    time: Res<Time>,
    mut fire_requests: EventWriter<FireRequest>,
) {
    let dt = time.delta_secs();

    for (entity, mut state, mut velocity, position, speed, reload, combatant) in controlled.iter_mut() {
        let params = ControlParams::new(&config, &story, speed.0, reload.0);
        let output = state.tick(dt, &params);

        velocity.0 = output.velocity;

        for _ in 0..output.shots {
            fire_requests.write(
                FireRequest::new(position.0, state.facing(), Side::Player, combatant.attack_kind)
                    .with_shooter(entity),
            );
        }
    }

    // Неуправляемые персонажи партии стоят
    for mut velocity in idle.iter_mut() {
        velocity.0 = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1/64s: точно представимо в f32
    const DT: f32 = 1.0 / 64.0;

    fn params() -> ControlParams {
        ControlParams {
            story_playing: false,
            speed: 4.0,
            reload_time: 0.25,
            dash_cooldown: 1.0,
            dash_speed_multiplier: 3.0,
        }
    }

    fn story_params() -> ControlParams {
        ControlParams {
            story_playing: true,
            ..params()
        }
    }

    /// Прогнать `ticks` тиков, вернуть номера тиков с выстрелами
    fn run(state: &mut PlayerMotionState, ticks: u32, params: &ControlParams) -> Vec<u32> {
        let mut shot_ticks = Vec::new();
        for tick in 0..ticks {
            let output = state.tick(DT, params);
            for _ in 0..output.shots {
                shot_ticks.push(tick);
            }
        }
        shot_ticks
    }

    #[test]
    fn test_default_facing_is_up() {
        let state = PlayerMotionState::default();
        assert_eq!(state.facing(), Vec2::Y);
    }

    #[test]
    fn test_facing_follows_nonzero_move() {
        let mut state = PlayerMotionState::default();

        state.set_move(Vec2::X);
        assert_eq!(state.facing(), Vec2::X);

        // Отпустили стик: facing запоминается
        state.set_move(Vec2::ZERO);
        assert_eq!(state.facing(), Vec2::X);

        let output = state.tick(DT, &params());
        assert_eq!(output.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_strafe_locks_facing() {
        let mut state = PlayerMotionState::default();
        state.set_move(Vec2::X);
        state.press_strafe();

        state.set_move(Vec2::NEG_X);
        state.tick(DT, &params());
        assert_eq!(state.facing(), Vec2::X);

        state.release_strafe();
        assert_eq!(state.facing(), Vec2::NEG_X);
    }

    #[test]
    fn test_strafe_release_with_idle_stick_keeps_facing() {
        let mut state = PlayerMotionState::default();
        state.set_move(Vec2::NEG_Y);
        state.press_strafe();
        state.set_move(Vec2::ZERO);

        state.release_strafe();
        assert_eq!(state.facing(), Vec2::NEG_Y);
    }

    #[test]
    fn test_dash_phase_windows() {
        let mut state = PlayerMotionState::default();
        state.set_move(Vec2::X);
        let p = params();

        assert!(state.press_dash(0.5));

        // [0, 0.5): скорость = facing * 3 * speed (32 тика)
        for _ in 0..32 {
            let output = state.tick(DT, &p);
            assert_eq!(output.velocity, Vec2::X * 12.0);
        }
        assert!(matches!(state.dash(), DashState::Cooldown { .. }));

        // [0.5, 1.5): cooldown, dash игнорируется, скорость обычная (64 тика)
        for _ in 0..64 {
            assert!(!state.press_dash(0.5));
            let output = state.tick(DT, &p);
            assert_eq!(output.velocity, Vec2::X * 4.0);
        }

        // t = 1.5: снова можно
        assert_eq!(state.dash(), DashState::Idle);
        assert!(state.press_dash(0.5));
    }

    #[test]
    fn test_dash_remainder_carried_across_phases() {
        let mut state = PlayerMotionState::default();
        let p = params();
        state.press_dash(0.5);

        // Одна большая дельта: 0.5 dash + 0.25 cooldown
        state.tick(0.75, &p);
        assert_eq!(state.dash(), DashState::Cooldown { remaining: 0.75 });

        state.tick(0.75, &p);
        assert_eq!(state.dash(), DashState::Idle);
    }

    #[test]
    fn test_dash_uses_facing_not_move() {
        let mut state = PlayerMotionState::default();
        state.press_dash(0.5);

        // Стик в нуле: dash по facing по умолчанию (вверх)
        let output = state.tick(DT, &params());
        assert_eq!(output.velocity, Vec2::Y * 12.0);

        // Во время dash facing не меняется
        state.set_move(Vec2::X);
        state.tick(DT, &params());
        assert_eq!(state.facing(), Vec2::Y);
    }

    #[test]
    fn test_rapid_fire_hold_timings() {
        let mut state = PlayerMotionState::default();
        state.press_fire();

        // reload 0.25s = 16 тиков: выстрелы на 0, r, 2r, 3r
        let shots = run(&mut state, 49, &params());
        assert_eq!(shots, vec![0, 16, 32, 48]);
    }

    #[test]
    fn test_release_during_reload_stops_fire() {
        let mut state = PlayerMotionState::default();
        state.press_fire();
        let p = params();

        assert_eq!(run(&mut state, 5, &p), vec![0]);
        state.release_fire();

        // Перезарядка заканчивается, но новых выстрелов нет
        assert!(run(&mut state, 64, &p).is_empty());
        assert_eq!(state.fire_loop(), FireLoop::Idle);

        // Новое нажатие стреляет сразу
        state.press_fire();
        assert_eq!(run(&mut state, 1, &p), vec![0]);
    }

    #[test]
    fn test_repress_during_reload_continues_loop() {
        let mut state = PlayerMotionState::default();
        state.press_fire();
        let p = params();

        run(&mut state, 5, &p);
        state.release_fire();
        run(&mut state, 3, &p);
        state.press_fire();

        // Выстрел ровно по окончании перезарядки (тик 16 от старта)
        assert_eq!(run(&mut state, 9, &p), vec![8]);
    }

    #[test]
    fn test_dash_blocks_fire_until_finished() {
        let mut state = PlayerMotionState::default();
        state.press_dash(0.5);
        state.press_fire();
        let p = params();

        // Первый выстрел только после окончания dash (32 тика)
        let shots = run(&mut state, 33, &p);
        assert_eq!(shots, vec![32]);
    }

    #[test]
    fn test_story_pauses_fire_and_movement() {
        let mut state = PlayerMotionState::default();
        state.set_move(Vec2::X);
        state.press_fire();

        let output = state.tick(DT, &story_params());
        assert_eq!(output, ControlOutput { velocity: Vec2::ZERO, shots: 0 });

        // Сюжет кончился: стрельба продолжается
        let output = state.tick(DT, &params());
        assert_eq!(output.shots, 1);
        assert_eq!(output.velocity, Vec2::X * 4.0);
    }

    #[test]
    fn test_reload_elapses_during_story() {
        let mut state = PlayerMotionState::default();
        state.press_fire();
        let p = params();
        assert_eq!(run(&mut state, 1, &p), vec![0]);

        // 16 тиков сюжета: перезарядка прошла, выстрел ждёт
        assert!(run(&mut state, 16, &story_params()).is_empty());
        assert_eq!(state.fire_loop(), FireLoop::Armed);

        assert_eq!(run(&mut state, 1, &p), vec![0]);
    }

    #[test]
    fn test_large_delta_fires_multiple_shots() {
        let mut state = PlayerMotionState::default();
        state.press_fire();
        let p = params();

        assert_eq!(state.tick(DT, &p).shots, 1);
        // 0.75s за один тик = 3 перезарядки
        assert_eq!(state.tick(0.75, &p).shots, 3);
    }

    #[test]
    fn test_release_control_clears_state() {
        let mut state = PlayerMotionState::default();
        state.set_move(Vec2::X);
        state.press_fire();
        state.press_dash(0.5);
        state.release_control();

        assert_eq!(state.move_vector(), Vec2::ZERO);
        assert!(!state.is_firing());
        assert_eq!(state.dash(), DashState::Idle);
        assert_eq!(state.fire_loop(), FireLoop::Idle);
        assert_eq!(state.facing(), Vec2::X);
    }
}
