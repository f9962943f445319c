//! Damage application и смерть бойцов
//!
//! Все компоненты общаются с Combatant только через `DamageRequest`
//! (и `Requirements::register`): поля здоровья снаружи никто не трогает.
//!
//! Flow:
//! 1. Снаряд/лазер/area attack → DamageRequest
//! 2. apply_damage_requests → Combatant::apply_damage
//! 3. Damaged → HealthSignal::Fraction + CombatantDamaged (OnDamaged hook)
//! 4. Killed → unlock'и по порядку → HealthSignal::Cleared → CombatantDied → despawn

use bevy::prelude::*;
use crate::combat::{AttackKind, Requirements};
use crate::components::{Combatant, DamageOutcome, Side};

/// Источник урона (для логов и presentation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Projectile(AttackKind),
    Laser,
    AreaAttack,
}

/// Event: нанести урон бойцу
///
/// Precondition: `amount > 0`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    pub source: DamageSource,
}

/// Event: визуальный сигнал полоски здоровья (ECS → UI)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HealthSignal {
    /// Полоска = current / max
    Fraction { entity: Entity, fraction: f32 },
    /// Полоска очищена (боец умер)
    Cleared { entity: Entity },
}

/// Event: боец получил урон и выжил
///
/// Extension point `OnDamaged`: player party система реагирует на него
/// переключением персонажей.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CombatantDamaged {
    pub entity: Entity,
    pub side: Side,
    pub current_health: i32,
    pub source: DamageSource,
}

/// Event: боец умер (health <= 0), entity будет удалён в этом же тике
#[derive(Event, Debug, Clone, PartialEq)]
pub struct CombatantDied {
    pub entity: Entity,
    pub side: Side,
}

/// System: применить накопленные DamageRequest
///
/// Несколько запросов к одному бойцу за тик обрабатываются последовательно:
/// после смерти остальные становятся no-op (флаг dead ставится сразу,
/// despawn: отложенный через Commands).
pub fn apply_damage_requests(
    mut commands: Commands,
    mut requests: EventReader<DamageRequest>,
    mut combatants: Query<(&mut Combatant, &Side, Option<&Requirements>)>,
    mut health_signals: EventWriter<HealthSignal>,
    mut damaged_events: EventWriter<CombatantDamaged>,
    mut died_events: EventWriter<CombatantDied>,
) {
    for request in requests.read() {
        if request.amount <= 0 {
            debug_assert!(false, "DamageRequest with non-positive amount: {:?}", request);
            crate::logger::log_warning(&format!(
                "⚠️ Rejected DamageRequest with non-positive amount {} for {:?}",
                request.amount, request.target
            ));
            continue;
        }

        // Цель могла умереть/исчезнуть раньше: это не ошибка
        let Ok((mut combatant, side, requirements)) = combatants.get_mut(request.target) else {
            continue;
        };

        match combatant.apply_damage(request.amount) {
            DamageOutcome::Ignored => {}

            DamageOutcome::Damaged { fraction } => {
                health_signals.write(HealthSignal::Fraction {
                    entity: request.target,
                    fraction,
                });
                damaged_events.write(CombatantDamaged {
                    entity: request.target,
                    side: *side,
                    current_health: combatant.current_health(),
                    source: request.source,
                });

                crate::logger::log(&format!(
                    "💥 {:?} took {} damage from {:?} (HP: {}/{})",
                    request.target,
                    request.amount,
                    request.source,
                    combatant.current_health(),
                    combatant.max_health()
                ));
            }

            DamageOutcome::Killed => {
                if let Some(requirements) = requirements {
                    requirements.unlock_all(request.target, &mut commands);
                }

                health_signals.write(HealthSignal::Cleared {
                    entity: request.target,
                });
                died_events.write(CombatantDied {
                    entity: request.target,
                    side: *side,
                });

                if let Ok(mut entity_commands) = commands.get_entity(request.target) {
                    entity_commands.try_despawn();
                }

                crate::logger::log_info(&format!(
                    "⚰️ {:?} ({:?}) killed by {:?}",
                    request.target, side, request.source
                ));
            }
        }
    }
}
