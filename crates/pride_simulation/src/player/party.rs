//! Партия игрока: leader (под управлением) + partner (следует рядом)
//!
//! - SwitchCharacter → роли меняются, Controlled переезжает на партнёра
//! - Урон по партии → партнёр уходит с поля (Benched); если ударили самого
//!   партнёра, сначала роли меняются (на поле остаётся раненый)
//! - Смерть лидера → партнёр на поле берёт управление
//!
//! Benched навсегда: вернуть партнёра на поле нельзя, после этого
//! SwitchCharacter до конца сессии игнорируется.

use bevy::prelude::*;
use crate::combat::{CombatantDamaged, CombatantDied};
use crate::components::{Benched, Side};
use crate::player::{Controlled, PlayerInput, PlayerMotionState, StoryState};

/// Resource: состав партии
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Party {
    pub leader: Option<Entity>,
    pub partner: Option<Entity>,
}

impl Party {
    pub fn new(leader: Entity, partner: Option<Entity>) -> Self {
        Self {
            leader: Some(leader),
            partner,
        }
    }

    /// Поменять роли. None: некого менять
    pub fn swap(&mut self) -> Option<(Entity, Entity)> {
        let (Some(leader), Some(partner)) = (self.leader, self.partner) else {
            return None;
        };

        self.leader = Some(partner);
        self.partner = Some(leader);
        Some((partner, leader))
    }

    pub fn is_member(&self, entity: Entity) -> bool {
        self.leader == Some(entity) || self.partner == Some(entity)
    }
}

/// Event: роли в партии поменялись (для камеры/UI)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PartySwitched {
    pub leader: Entity,
    pub partner: Entity,
}

/// Передать управление: Controlled с `from` на `to`, ввод `from` сбрасывается
fn transfer_control(
    commands: &mut Commands,
    states: &mut Query<&mut PlayerMotionState>,
    from: Entity,
    to: Entity,
) {
    if let Ok(mut state) = states.get_mut(from) {
        state.release_control();
    }
    if let Ok(mut entity_commands) = commands.get_entity(from) {
        entity_commands.try_remove::<Controlled>();
    }
    if let Ok(mut entity_commands) = commands.get_entity(to) {
        entity_commands.try_insert(Controlled);
    }
}

/// System: PlayerInput::SwitchCharacter (не во время сюжета)
pub fn switch_character_on_input(
    mut commands: Commands,
    mut inputs: EventReader<PlayerInput>,
    story: Res<StoryState>,
    mut party: ResMut<Party>,
    benched: Query<(), With<Benched>>,
    mut states: Query<&mut PlayerMotionState>,
    mut switched: EventWriter<PartySwitched>,
) {
    for input in inputs.read() {
        if *input != PlayerInput::SwitchCharacter || story.playing {
            continue;
        }

        // Партнёр ушёл с поля: меняться не с кем
        if party.partner.is_none_or(|partner| benched.contains(partner)) {
            crate::logger::log("Switch ignored: partner unavailable");
            continue;
        }

        let Some((leader, partner)) = party.swap() else {
            continue;
        };

        transfer_control(&mut commands, &mut states, partner, leader);
        switched.write(PartySwitched { leader, partner });

        crate::logger::log_info(&format!("🔄 Switched character: {:?} now leads", leader));
    }
}

/// System: OnDamaged игрока → партнёр уходит с поля
pub fn bench_partner_on_damage(
    mut commands: Commands,
    mut damaged: EventReader<CombatantDamaged>,
    mut party: ResMut<Party>,
    benched: Query<(), With<Benched>>,
    mut states: Query<&mut PlayerMotionState>,
    mut switched: EventWriter<PartySwitched>,
) {
    for event in damaged.read() {
        if event.side != Side::Player || !party.is_member(event.entity) {
            continue;
        }

        // Ударили партнёра: раненый становится лидером
        if party.partner == Some(event.entity) {
            if let Some((leader, partner)) = party.swap() {
                transfer_control(&mut commands, &mut states, partner, leader);
                switched.write(PartySwitched { leader, partner });
            }
        }

        let Some(partner) = party.partner else {
            continue;
        };
        if benched.contains(partner) {
            continue;
        }

        if let Ok(mut state) = states.get_mut(partner) {
            state.release_control();
        }
        if let Ok(mut entity_commands) = commands.get_entity(partner) {
            entity_commands.try_insert(Benched);
        }

        crate::logger::log_info(&format!("Partner {:?} left the field", partner));
    }
}

/// System: смерть лидера → партнёр на поле берёт управление
pub fn promote_partner_on_leader_death(
    mut commands: Commands,
    mut died: EventReader<CombatantDied>,
    mut party: ResMut<Party>,
    benched: Query<(), With<Benched>>,
) {
    for event in died.read() {
        if party.partner == Some(event.entity) {
            party.partner = None;
            continue;
        }
        if party.leader != Some(event.entity) {
            continue;
        }

        party.leader = party.partner.take().filter(|partner| !benched.contains(*partner));

        match party.leader {
            Some(leader) => {
                if let Ok(mut entity_commands) = commands.get_entity(leader) {
                    entity_commands.try_insert(Controlled);
                }
                crate::logger::log_info(&format!("Leader fell, {:?} takes over", leader));
            }
            None => {
                crate::logger::log_warning("☠️ Party defeated: no one left on the field");
            }
        }
    }
}
