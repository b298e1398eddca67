//! AI decision-making module
//!
//! - Ranged/boss FSM: Idle(patrol) → Chasing → Attacking → Dead
//! - Boss Phase: ортогональный Phase1/Phase2 + radial loop
//! - Hopper: Patrolling/Chasing, импульсное движение, урон касанием

use bevy::prelude::*;

pub mod components;
pub mod systems;
pub mod target;

// Re-export основных типов
pub use components::{
    random_patrol_point, AIConfig, AIState, AfterAttack, AttackStage, BossPhase, BrainContext, Hopper, HopperMode,
    PatrolLeg, Phase, RadialBurst, Volley,
};
pub use systems::{
    ai_attack_execution, ai_fsm_transitions, ai_movement_from_state, boss_phase_transitions, boss_radial_bursts,
    hopper_ai, PhaseChanged,
};
pub use target::{refresh_target_snapshot, DesignatedTarget, TargetSnapshot};

use crate::combat::{handle_deaths, spawn_projectiles};
use crate::schedule::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate по фазам тика:
/// 1. refresh_target_snapshot (Sense): позиция цели на этот тик
/// 2. ai_fsm_transitions → ai_movement_from_state, hopper_ai (Think)
/// 3. ai_attack_execution, boss_radial_bursts (Attack): до spawn_projectiles
/// 4. boss_phase_transitions (Death): после handle_deaths
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DesignatedTarget>()
            .init_resource::<TargetSnapshot>()
            .add_event::<PhaseChanged>();

        app.add_systems(
            FixedUpdate,
            (
                refresh_target_snapshot.in_set(SimulationSet::Sense),
                (ai_fsm_transitions, ai_movement_from_state, hopper_ai)
                    .chain()
                    .in_set(SimulationSet::Think),
                (ai_attack_execution, boss_radial_bursts)
                    .chain()
                    .in_set(SimulationSet::Attack)
                    .before(spawn_projectiles),
                boss_phase_transitions
                    .in_set(SimulationSet::Death)
                    .after(handle_deaths),
            ),
        );
    }
}
