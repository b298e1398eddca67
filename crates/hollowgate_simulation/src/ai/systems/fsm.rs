//! FSM AI systems (state transitions, movement intent, attack execution).

use bevy::prelude::*;

use crate::ai::{random_patrol_point, AIConfig, AIState, AttackStage, BrainContext, PatrolLeg, TargetSnapshot};
use crate::combat::{AttackLoadout, AttackScheduler, Dead, ProjectileSpawnRequest};
use crate::components::{HomePosition, MovementInput, Team};
use crate::schedule::SimClock;
use crate::DeterministicRng;

/// Система: AI FSM transitions (Think set)
///
/// Вся логика переходов: в `AIState::next`, здесь только сбор контекста.
pub fn ai_fsm_transitions(
    mut ai_query: Query<
        (
            Entity,
            &mut AIState,
            &AIConfig,
            &mut AttackScheduler,
            &AttackLoadout,
            &Transform,
            &HomePosition,
        ),
        Without<Dead>,
    >,
    snapshot: Res<TargetSnapshot>,
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, mut state, config, mut scheduler, loadout, transform, home) in ai_query.iter_mut() {
        let ctx = BrainContext {
            now: clock.now,
            position: transform.translation.truncate(),
            target: snapshot.position,
        };

        let new_state = state.next(&ctx, config, &mut scheduler, loadout, || {
            random_patrol_point(&mut rng.rng, home.0, config.patrol_radius)
        });

        if std::mem::discriminant(state.as_ref()) != std::mem::discriminant(&new_state) {
            crate::log(&format!(
                "AI: {:?} {} → {}",
                entity,
                state_label(&state),
                state_label(&new_state)
            ));
        }

        if *state != new_state {
            *state = new_state;
        }
    }
}

fn state_label(state: &AIState) -> &'static str {
    match state {
        AIState::Idle { .. } => "Idle",
        AIState::Chasing => "Chasing",
        AIState::Attacking { .. } => "Attacking",
        AIState::Dead => "Dead",
    }
}

/// Система: AIState → MovementInput (Think set, после transitions)
///
/// - Idle/Moving: к patrol точке
/// - Chasing: к цели
/// - Attacking/Pausing/Dead: стоим (направление зафиксировано на aim)
pub fn ai_movement_from_state(
    mut ai_query: Query<(&AIState, &AIConfig, &Transform, &mut MovementInput), Without<Dead>>,
    snapshot: Res<TargetSnapshot>,
) {
    for (state, config, transform, mut input) in ai_query.iter_mut() {
        let position = transform.translation.truncate();

        let direction = match state {
            AIState::Idle {
                leg: PatrolLeg::Moving { destination, .. },
            } if position.distance(*destination) > config.arrive_distance => {
                (*destination - position).normalize_or_zero()
            }
            AIState::Chasing => snapshot
                .position
                .map(|target| (target - position).normalize_or_zero())
                .unwrap_or(Vec2::ZERO),
            _ => Vec2::ZERO,
        };

        input.direction = direction;
    }
}

/// Система: выстрел в конце wind-up (Attack set, перед spawn_projectiles)
///
/// Целимся в текущую позицию цели; если она пропала в этом же тике:
/// в зафиксированную точку `aim`.
pub fn ai_attack_execution(
    mut ai_query: Query<
        (Entity, &mut AIState, &AIConfig, &AttackLoadout, &Transform, Option<&Team>),
        Without<Dead>,
    >,
    mut spawn_requests: EventWriter<ProjectileSpawnRequest>,
    snapshot: Res<TargetSnapshot>,
    clock: Res<SimClock>,
) {
    for (entity, mut state, config, loadout, transform, team) in ai_query.iter_mut() {
        let AIState::Attacking {
            profile,
            aim,
            stage: AttackStage::WindUp { fire_at },
        } = *state
        else {
            continue;
        };
        if clock.now < fire_at {
            continue;
        }

        let origin = transform.translation.truncate();
        let target = snapshot.position.unwrap_or(aim);

        if let Some(attack) = loadout.get(profile) {
            crate::log(&format!(
                "🏹 {:?} fires `{}` at {:?}",
                entity, attack.name, target
            ));
            spawn_requests.write(ProjectileSpawnRequest::from_profile(
                attack,
                Some(entity),
                origin,
                target - origin,
                team.copied(),
            ));
        } else {
            crate::logger::log_warning(&format!("⚠️ {:?}: unknown attack profile {:?}", entity, profile));
        }

        *state = AIState::Attacking {
            profile,
            aim,
            stage: AttackStage::WindDown {
                until: clock.now + config.winddown_secs,
            },
        };
    }
}
