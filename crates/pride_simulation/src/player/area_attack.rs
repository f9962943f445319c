//! Area attack («бомба»): урон всем врагам в кадре камеры
//!
//! Доступность и расход: внешний special gauge (шкала партнёра).

use std::collections::HashMap;
use bevy::prelude::*;
use crate::combat::{DamageRequest, DamageSource};
use crate::components::{Benched, Combatant, Position, Side};
use crate::config::CombatConfig;
use crate::player::{Party, PlayerInput, StoryState};

/// Шкала спецприёма (ключ: имя текущего партнёра)
pub trait SpecialGauge: Send + Sync + 'static {
    fn can_use(&self, partner: &str) -> bool;
    fn consume(&mut self, partner: &str);
}

/// Шкала по умолчанию: целое число зарядов на партнёра
#[derive(Debug, Clone, Default)]
pub struct ChargeGauge {
    charges: HashMap<String, u32>,
}

impl ChargeGauge {
    pub fn with_charges(mut self, partner: &str, charges: u32) -> Self {
        self.charges.insert(partner.to_string(), charges);
        self
    }

    pub fn add_charge(&mut self, partner: &str) {
        *self.charges.entry(partner.to_string()).or_default() += 1;
    }

    pub fn charges(&self, partner: &str) -> u32 {
        self.charges.get(partner).copied().unwrap_or(0)
    }
}

impl SpecialGauge for ChargeGauge {
    fn can_use(&self, partner: &str) -> bool {
        self.charges(partner) > 0
    }

    fn consume(&mut self, partner: &str) {
        if let Some(charges) = self.charges.get_mut(partner) {
            *charges = charges.saturating_sub(1);
        }
    }
}

/// Resource: special gauge (реализация подменяется снаружи)
#[derive(Resource)]
pub struct SpecialResource(pub Box<dyn SpecialGauge>);

impl SpecialResource {
    pub fn new(gauge: impl SpecialGauge) -> Self {
        Self(Box::new(gauge))
    }
}

impl Default for SpecialResource {
    fn default() -> Self {
        Self::new(ChargeGauge::default())
    }
}

/// Resource: видимая область камеры (мировые координаты)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraView(pub Rect);

impl Default for CameraView {
    fn default() -> Self {
        Self(Rect::from_center_half_size(Vec2::ZERO, Vec2::new(8.0, 4.5)))
    }
}

/// Имя персонажа (ключ для special gauge и сюжетных сцен)
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct CharacterName(pub String);

/// Цели area attack: живые враги на поле внутри прямоугольника (границы включительно)
pub fn area_attack_targets<'a>(
    view: Rect,
    combatants: impl Iterator<Item = (Entity, &'a Combatant, &'a Side, &'a Position)>,
) -> Vec<Entity> {
    combatants
        .filter(|(_, combatant, side, position)| {
            **side == Side::Enemy && combatant.is_alive() && view.contains(position.0)
        })
        .map(|(entity, _, _, _)| entity)
        .collect()
}

/// System: PlayerInput::AreaAttack → DamageRequest каждому врагу в кадре
pub fn handle_area_attack(
    mut inputs: EventReader<PlayerInput>,
    story: Res<StoryState>,
    party: Res<Party>,
    names: Query<&CharacterName>,
    mut gauge: ResMut<SpecialResource>,
    view: Res<CameraView>,
    config: Res<CombatConfig>,
    combatants: Query<(Entity, &Combatant, &Side, &Position), Without<Benched>>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for input in inputs.read() {
        if *input != PlayerInput::AreaAttack || story.playing {
            continue;
        }

        // Шкала привязана к партнёру; без партнёра приём недоступен
        let Some(partner) = party.partner.and_then(|partner| names.get(partner).ok()) else {
            crate::logger::log("Area attack ignored: no partner");
            continue;
        };

        if !gauge.0.can_use(&partner.0) {
            crate::logger::log(&format!("Area attack ignored: gauge of {} is empty", partner.0));
            continue;
        }
        gauge.0.consume(&partner.0);

        let targets = area_attack_targets(view.0, combatants.iter());

        crate::logger::log_info(&format!(
            "💣 Area attack ({}) hits {} enemies",
            partner.0,
            targets.len()
        ));

        for target in targets {
            damage_requests.write(DamageRequest {
                target,
                amount: config.area_attack_damage,
                source: DamageSource::AreaAttack,
            });
        }
    }
}
