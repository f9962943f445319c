//! Player module: управление персонажем, area attack, партия
//!
//! Input слой шлёт PlayerInput, ядро отвечает Velocity + FireRequest.

use bevy::prelude::*;
use crate::combat::apply_damage_requests;
use crate::SimulationSet;

pub mod area_attack;
pub mod control;
pub mod input;
pub mod party;

// Re-export основных типов
pub use area_attack::{CameraView, ChargeGauge, CharacterName, SpecialGauge, SpecialResource};
pub use control::{
    ControlOutput, ControlParams, Controlled, DashState, FireLoop, PlayerMotionState, ReloadTime,
};
pub use input::{PlayerInput, StoryState};
pub use party::{Party, PartySwitched};

/// Player Plugin
///
/// Порядок выполнения:
/// 1. Input: apply_player_input, PlayerInput → PlayerMotionState
/// 2. Control: switch_character_on_input → tick_player_control → handle_area_attack
/// 3. Damage (после apply_damage_requests): реакции партии на урон и смерть
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInput>()
            .add_event::<PartySwitched>()
            .init_resource::<StoryState>()
            .init_resource::<Party>()
            .init_resource::<SpecialResource>()
            .init_resource::<CameraView>();

        app.add_systems(
            FixedUpdate,
            control::apply_player_input.in_set(SimulationSet::Input),
        )
        .add_systems(
            FixedUpdate,
            (
                party::switch_character_on_input,
                control::tick_player_control,
                area_attack::handle_area_attack,
            )
                .chain()
                .in_set(SimulationSet::Control),
        )
        .add_systems(
            FixedUpdate,
            (
                party::bench_partner_on_damage,
                party::promote_partner_on_leader_death,
            )
                .chain()
                .after(apply_damage_requests)
                .in_set(SimulationSet::Damage),
        );
    }
}
