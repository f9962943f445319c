//! Combat tuning: все числовые константы боёвки в одном Resource
//!
//! Defaults = текущий баланс игры. Дизайнеры могут переопределить
//! часть полей через RON (`#[serde(default)]`: отсутствующие поля берутся из Default).

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

/// Ошибки загрузки CombatConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Файл не прочитался
    #[error("Failed to read combat config: {0}")]
    Io(#[from] std::io::Error),

    /// RON не распарсился
    #[error("Parse error in combat config: {0}")]
    Parse(String),

    /// Значение вне допустимого диапазона
    #[error("Invalid combat config value '{field}': {value} (must be > 0)")]
    NonPositive { field: &'static str, value: f32 },
}

/// Глобальные параметры боёвки
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Скорость обычных снарядов (units/sec)
    pub projectile_speed: f32,
    /// Время жизни снаряда (секунды)
    pub projectile_lifetime: f32,
    /// Урон снаряда при попадании
    pub projectile_damage: i32,
    /// Смещение дробинок shotgun (радианы)
    pub shotgun_spread: f32,
    /// Задержка перед захватом цели homing снарядом (секунды)
    pub homing_delay: f32,
    /// Дальность лазера (units)
    pub laser_range: f32,
    /// Урон лазера
    pub laser_damage: i32,
    /// Сколько живёт визуал луча (секунды)
    pub laser_beam_lifetime: f32,
    /// Период решения об атаке у активного врага (секунды)
    pub enemy_decision_period: f32,
    /// Длительность рывка (секунды)
    pub dash_duration: f32,
    /// Cooldown после рывка (секунды)
    pub dash_cooldown: f32,
    /// Множитель скорости во время рывка
    pub dash_speed_multiplier: f32,
    /// Урон area attack по всем врагам в кадре
    pub area_attack_damage: i32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            projectile_speed: 8.0,
            projectile_lifetime: 5.0,
            projectile_damage: 1,
            shotgun_spread: 0.2,
            homing_delay: 0.5,
            laser_range: 10.0,
            laser_damage: 1,
            laser_beam_lifetime: 1.0,
            enemy_decision_period: 2.0,
            dash_duration: 0.5,
            dash_cooldown: 1.0,
            dash_speed_multiplier: 3.0,
            area_attack_damage: 25,
        }
    }
}

impl CombatConfig {
    /// Загрузить конфиг из RON строки (частичные файлы допустимы)
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig =
            ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Загрузить конфиг из RON файла
    pub fn from_ron_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    /// Все длительности/скорости/урон должны быть строго положительными
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f32); 12] = [
            ("projectile_speed", self.projectile_speed),
            ("projectile_lifetime", self.projectile_lifetime),
            ("projectile_damage", self.projectile_damage as f32),
            ("homing_delay", self.homing_delay),
            ("laser_range", self.laser_range),
            ("laser_damage", self.laser_damage as f32),
            ("laser_beam_lifetime", self.laser_beam_lifetime),
            ("enemy_decision_period", self.enemy_decision_period),
            ("dash_duration", self.dash_duration),
            ("dash_cooldown", self.dash_cooldown),
            ("dash_speed_multiplier", self.dash_speed_multiplier),
            ("area_attack_damage", self.area_attack_damage as f32),
        ];

        for (field, value) in checks {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        Ok(())
    }
}

/// Конфиг для headless runner: файл из аргумента или defaults
///
/// Logger ставится до загрузки, чтобы ошибка файла попала в лог.
pub fn load_config(path: Option<&str>) -> Result<CombatConfig, ConfigError> {
    crate::logger::init_logger();

    let Some(path) = path else {
        return Ok(CombatConfig::default());
    };

    CombatConfig::from_ron_file(path).map_err(|err| {
        crate::logger::log_error(&format!("Failed to load {}: {}", path, err));
        err
    })
}
