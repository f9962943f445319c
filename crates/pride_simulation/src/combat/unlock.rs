//! Unlockable observers: «что открывается, когда этот боец умрёт»
//!
//! Observers регистрируются извне (двери, сюжетные триггеры) и не принадлежат
//! бойцу: список хранит `Arc`, обратных ссылок на бойца нет.
//! Unlock получает только `Commands`: изменения отложенные, поэтому
//! повторно войти в damage того же бойца из unlock нельзя.

use std::sync::Arc;
use bevy::prelude::*;
use crate::components::Combatant;

/// Внешний observer смерти бойца (вызывается ровно один раз)
pub trait Unlockable: Send + Sync + 'static {
    fn unlock(&self, fallen: Entity, commands: &mut Commands);
}

/// Упорядоченный список unlockables бойца
///
/// Порядок вызова = порядок регистрации. Дедупликации нет:
/// повторная регистрация даст повторный вызов (ответственность вызывающего).
#[derive(Component, Default, Clone)]
pub struct Requirements {
    unlockables: Vec<Arc<dyn Unlockable>>,
}

impl Requirements {
    pub fn register(&mut self, unlockable: Arc<dyn Unlockable>) {
        self.unlockables.push(unlockable);
    }

    pub fn len(&self) -> usize {
        self.unlockables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlockables.is_empty()
    }

    /// Вызвать все unlock'и в порядке регистрации
    pub fn unlock_all(&self, fallen: Entity, commands: &mut Commands) {
        for unlockable in &self.unlockables {
            unlockable.unlock(fallen, commands);
        }
    }
}

/// Маркер: открыть damage gate бойца (`can_take_damage = true`)
///
/// Вставляется сюжетным слоем (конец диалога с боссом) или `DamageGateUnlock`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AllowDamage;

/// Unlockable: смерть бойца открывает damage gate другого бойца
///
/// Например, убийство стража делает босса уязвимым.
#[derive(Debug, Clone, Copy)]
pub struct DamageGateUnlock {
    pub target: Entity,
}

impl Unlockable for DamageGateUnlock {
    fn unlock(&self, fallen: Entity, commands: &mut Commands) {
        // Цель могла умереть раньше: тогда просто ничего не делаем
        if let Ok(mut target) = commands.get_entity(self.target) {
            target.try_insert(AllowDamage);
            crate::logger::log(&format!(
                "🔓 {:?} fell → damage gate opened for {:?}",
                fallen, self.target
            ));
        }
    }
}

/// System: открыть damage gate у бойцов с маркером AllowDamage
pub fn open_damage_gates(
    mut commands: Commands,
    mut gated: Query<(Entity, &mut Combatant), With<AllowDamage>>,
) {
    for (entity, mut combatant) in gated.iter_mut() {
        combatant.allow_damage();
        commands.entity(entity).remove::<AllowDamage>();

        crate::logger::log_info(&format!("Combatant {:?} can now take damage", entity));
    }
}
