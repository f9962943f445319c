//! Player input events и сюжетный флаг

use bevy::prelude::*;

/// Event: ввод игрока (input слой → ECS)
///
/// Press/Release приходят отдельными событиями, Move: текущий вектор стика.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    Move(Vec2),
    DashPressed,
    FirePressed,
    FireReleased,
    StrafePressed,
    StrafeReleased,
    /// «Бомба»: урон всем врагам в кадре камеры
    AreaAttack,
    SwitchCharacter,
}

/// Играет ли сейчас сюжетная сцена (владелец: диалоговый слой, ядро только читает)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoryState {
    pub playing: bool,
}
