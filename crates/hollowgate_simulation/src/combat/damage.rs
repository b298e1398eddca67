//! Damage application, смерть и деспавн.
//!
//! Поток: `DamageRequest` (projectile/contact/external) → `apply_damage_requests`
//! (Damage set) → `DamageDealt` + `EntityDied` → `handle_deaths` (Death set)
//! → `DespawnAfter` → `despawn_after_timeout` (Cleanup set).

use bevy::prelude::*;

use crate::ai::{AIState, BossPhase};
use crate::combat::damageable::{DamageOutcome, Damageable, HostileVitals, PlayerVitals};
use crate::combat::hooks::CombatHooks;
use crate::components::{EnemyKind, Health, MovementInput, PlayerGuard, Team};
use crate::config::CombatConfig;
use crate::schedule::SimClock;

/// Откуда пришёл урон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum DamageSource {
    Projectile,
    Contact,
    /// Скрипты, ловушки, тесты
    External,
}

/// Запрос на TakeDamage. Обрабатываются строго по порядку в Damage set.
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    /// Raw amount (отрицательный будет отклонён)
    pub amount: i32,
    pub source: DamageSource,
    pub attacker: Option<Entity>,
}

impl DamageRequest {
    pub fn external(target: Entity, amount: i32) -> Self {
        Self {
            target,
            amount,
            source: DamageSource::External,
            attacker: None,
        }
    }
}

/// Событие: урон нанесён (только засчитанные попадания)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub target: Entity,
    pub attacker: Option<Entity>,
    pub source: DamageSource,
    pub raw: i32,
    pub applied: u32,
    pub remaining: u32,
    pub lethal: bool,
}

/// Событие: entity умер (ровно один раз за жизнь)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub team: Option<Team>,
    pub kind: Option<String>,
    pub killer: Option<Entity>,
}

/// Запрос на лечение (clamp в max, мёртвых не воскрешает)
#[derive(Event, Debug, Clone, Copy)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: u32,
}

/// Триггеры для presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackCue {
    /// Мигание спрайта до `until` (SimClock::now)
    DamageFlash { until: f32 },
    DeathAnimation,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CombatFeedback {
    pub entity: Entity,
    pub cue: FeedbackCue,
}

/// Маркер: entity мёртв. Движение, AI, коллизии его больше не видят.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Деспавн после указанного момента (SimClock::now)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfter {
    pub at: f32,
}

/// System: применяет DamageRequest по одному (Damage set)
///
/// Два запроса к одному entity в одном тике идут последовательно, поэтому
/// второй всегда видит окно неуязвимости, открытое первым.
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut feedback_events: EventWriter<CombatFeedback>,
    mut targets: Query<(
        &mut Health,
        Option<&mut PlayerGuard>,
        Option<&Team>,
        Option<&EnemyKind>,
    )>,
    clock: Res<SimClock>,
    config: Res<CombatConfig>,
) {
    let now = clock.now;

    for request in requests.read() {
        let Ok((mut health, guard, team, kind)) = targets.get_mut(request.target) else {
            crate::logger::log(&format!(
                "⚠️ DamageRequest: target {:?} is gone or not damageable",
                request.target
            ));
            continue;
        };

        let outcome = match guard {
            Some(mut guard) => PlayerVitals {
                health: &mut health,
                guard: &mut guard,
                invincibility_secs: config.player_invincibility_secs,
                flash_secs: config.damage_flash_secs,
            }
            .take_damage(request.amount, now),
            None => HostileVitals { health: &mut health }.take_damage(request.amount, now),
        };

        match outcome {
            DamageOutcome::Rejected => {
                crate::logger::log_warning(&format!(
                    "🚫 Rejected negative damage {} on {:?}",
                    request.amount, request.target
                ));
                continue;
            }
            DamageOutcome::AlreadyDead => continue,
            DamageOutcome::Invincible => {
                crate::logger::log(&format!(
                    "🛡️ {:?} is invincible, {} damage ignored",
                    request.target, request.amount
                ));
                continue;
            }
            DamageOutcome::Applied { .. } | DamageOutcome::Killed { .. } => {}
        }

        let lethal = outcome.is_lethal();
        crate::logger::log(&format!(
            "💥 {:?} took {} damage (raw {}, {:?}), health {}/{}",
            request.target,
            outcome.applied(),
            request.amount,
            request.source,
            health.current,
            health.max
        ));

        dealt_events.write(DamageDealt {
            target: request.target,
            attacker: request.attacker,
            source: request.source,
            raw: request.amount,
            applied: outcome.applied(),
            remaining: health.current,
            lethal,
        });

        feedback_events.write(CombatFeedback {
            entity: request.target,
            cue: FeedbackCue::DamageFlash {
                until: now + config.damage_flash_secs,
            },
        });

        if lethal {
            died_events.write(EntityDied {
                entity: request.target,
                team: team.copied(),
                kind: kind.map(|kind| kind.0.clone()),
                killer: request.attacker,
            });
        }
    }
}

/// System: лечение (после урона в том же тике)
pub fn apply_heal_requests(mut requests: EventReader<HealRequest>, mut targets: Query<&mut Health>) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            continue;
        };
        let healed = health.heal(request.amount);
        if healed > 0 {
            crate::logger::log(&format!(
                "💚 {:?} healed {} → {}/{}",
                request.target, healed, health.current, health.max
            ));
        }
    }
}

/// System: death transition (Death set)
///
/// - AIState → Dead, radial loop босса отменяется
/// - MovementInput обнуляется, вешается `Dead` (коллизии и движение отключены)
/// - Планируется деспавн, presentation получает DeathAnimation
/// - Враг → progress sink, игрок → game over sink
#[allow(clippy::too_many_arguments)]
pub fn handle_deaths(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut feedback_events: EventWriter<CombatFeedback>,
    mut states: Query<(Option<&mut AIState>, Option<&mut BossPhase>, Option<&mut MovementInput>)>,
    hooks: Res<CombatHooks>,
    clock: Res<SimClock>,
    config: Res<CombatConfig>,
) {
    for event in died_events.read() {
        if let Ok((state, phase, input)) = states.get_mut(event.entity) {
            if let Some(mut state) = state {
                *state = AIState::Dead;
            }
            if let Some(mut phase) = phase {
                phase.cancel();
            }
            if let Some(mut input) = input {
                input.stop();
            }
        }

        let delay = match event.team {
            Some(Team::Player) => config.player_despawn_delay_secs,
            _ => config.enemy_despawn_delay_secs,
        };

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert((
                Dead,
                DespawnAfter {
                    at: clock.now + delay,
                },
            ));
        }

        feedback_events.write(CombatFeedback {
            entity: event.entity,
            cue: FeedbackCue::DeathAnimation,
        });

        match event.team {
            Some(Team::Player) => {
                crate::logger::log_info(&format!("💀 Player {:?} died, game over", event.entity));
                hooks.game_over();
            }
            _ => {
                let kind = event.kind.as_deref().unwrap_or("unknown");
                crate::logger::log_info(&format!("💀 Enemy {:?} ({}) died", event.entity, kind));
                hooks.record_kill(kind);
            }
        }
    }
}

/// System: деспавн entities с истёкшим DespawnAfter (Cleanup set)
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    clock: Res<SimClock>,
) {
    for (entity, despawn_after) in query.iter() {
        if clock.now >= despawn_after.at {
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).try_despawn();
        }
    }
}
