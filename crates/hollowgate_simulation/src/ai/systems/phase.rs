//! Boss phase systems (Phase2 entry, radial loop).

use bevy::prelude::*;

use crate::ai::{BossPhase, Phase};
use crate::combat::{AttackLoadout, AttackScheduler, Dead, ProjectileSpawnRequest};
use crate::components::{Health, Team};
use crate::schedule::SimClock;

/// Событие: босс сменил фазу
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChanged {
    pub entity: Entity,
    pub phase: Phase,
}

/// Система: Phase1 → Phase2 (Death set, после handle_deaths)
///
/// Запускается в том же тике, что и урон: loop стартует сразу.
pub fn boss_phase_transitions(
    mut bosses: Query<(Entity, &Health, &mut BossPhase), Without<Dead>>,
    mut phase_events: EventWriter<PhaseChanged>,
) {
    for (entity, health, mut phase) in bosses.iter_mut() {
        if phase.observe(health) {
            crate::logger::log_info(&format!(
                "🔥 Boss {:?} enters Phase2 at {}/{} HP, radial loop started",
                entity, health.current, health.max
            ));
            phase_events.write(PhaseChanged {
                entity,
                phase: Phase::Phase2,
            });
        }
    }
}

/// Система: radial loop (Attack set, перед spawn_projectiles)
///
/// Работает параллельно с AIState: не смотрит на Chasing/Attacking.
pub fn boss_radial_bursts(
    mut bosses: Query<
        (Entity, &Transform, &mut BossPhase, &mut AttackScheduler, &AttackLoadout, Option<&Team>),
        Without<Dead>,
    >,
    mut spawn_requests: EventWriter<ProjectileSpawnRequest>,
    clock: Res<SimClock>,
) {
    for (entity, transform, mut phase, mut scheduler, loadout, team) in bosses.iter_mut() {
        let Some(radial) = phase.radial.as_mut() else {
            continue;
        };
        let Some(profile) = loadout.get(radial.profile) else {
            continue;
        };

        let directions = radial.tick(clock.now, &mut scheduler, profile.cooldown_secs);
        if directions.is_empty() {
            continue;
        }

        let origin = transform.translation.truncate();
        for direction in directions {
            spawn_requests.write(ProjectileSpawnRequest::from_profile(
                profile,
                Some(entity),
                origin,
                direction,
                team.copied(),
            ));
        }
    }
}
