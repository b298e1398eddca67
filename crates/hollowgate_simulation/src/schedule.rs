//! Simulation clock и порядок фаз внутри fixed tick
//!
//! # Архитектура
//!
//! **FixedUpdate (60 Hz)**, фазы строго по цепочке:
//!   Clock → Sense → Think → Move → Attack → Collide → Damage → Death → Cleanup
//!
//! - Move идёт ДО Attack: снаряд, заспавненный в этом тике, не сдвигается
//! - Collide пропускает снаряды с `spawned_tick == clock.tick` (минимум один тик жизни)
//! - Damage обрабатывает `DamageRequest` строго по порядку, один за другим
//!
//! Все timestamps в ядре: `SimClock::now` (секунды fixed-времени), а не wall clock.

use bevy::prelude::*;

/// Глобальные часы симуляции (детерминистичные, wraparound safe)
///
/// Обновляются первой системой каждого FixedUpdate tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct SimClock {
    /// Номер текущего fixed tick (первый тик = 1)
    pub tick: u64,
    /// Fixed-время текущего тика в секундах
    pub now: f32,
}

/// Фазы fixed tick (см. module docs)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Clock,
    Sense,
    Think,
    Move,
    Attack,
    Collide,
    Damage,
    Death,
    Cleanup,
}

/// System: advance clock (FixedUpdate, запускается ПЕРВЫМ)
pub fn advance_sim_clock(mut clock: ResMut<SimClock>, time: Res<Time<Fixed>>) {
    clock.tick = clock.tick.wrapping_add(1);
    clock.now = time.elapsed_secs();
}

/// Регистрирует clock resource и цепочку фаз в FixedUpdate
pub(crate) fn configure_simulation_sets(app: &mut App) {
    app.init_resource::<SimClock>()
        .configure_sets(
            FixedUpdate,
            (
                SimulationSet::Clock,
                SimulationSet::Sense,
                SimulationSet::Think,
                SimulationSet::Move,
                SimulationSet::Attack,
                SimulationSet::Collide,
                SimulationSet::Damage,
                SimulationSet::Death,
                SimulationSet::Cleanup,
            )
                .chain(),
        )
        .add_systems(FixedUpdate, advance_sim_clock.in_set(SimulationSet::Clock));
}
