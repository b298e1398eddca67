//! Hollowgate Simulation Core
//!
//! Боевое ядро 2D action игры на Bevy 0.16 (headless, FixedUpdate 60Hz):
//! - AI врагов (патруль/преследование/атака, фазы босса, hopper)
//! - Снаряды и contact resolution
//! - Damage resolver (player + hostile пути), смерть, деспавн
//!
//! Presentation (рендер, анимации, UI) живёт снаружи и общается с ядром
//! только через события и `CombatHooks`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod movement;
pub mod schedule;
pub mod spawn;

// Re-export базовых компонентов для удобства
pub use ai::{AIConfig, AIPlugin, AIState, BossPhase, DesignatedTarget, Hopper, Phase, PhaseChanged, TargetSnapshot};
pub use combat::{
    mitigate_damage, AttackLoadout, AttackProfile, AttackProfileId, AttackScheduler, CombatFeedback, CombatHooks,
    CombatPlugin, ContactBody, ContactTarget, DamageDealt, DamageRequest, DamageSource, Dead, EntityDied,
    FeedbackCue, GameOverSink, HealRequest, ProgressSink, Projectile, ProjectileSpawned,
};
pub use components::*;
pub use config::{ArenaConfig, CombatConfig};
pub use error::{ConfigError, SpawnError};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use movement::MovementPlugin;
pub use schedule::{SimClock, SimulationSet};
pub use spawn::{spawn_arena, spawn_enemy, spawn_player, EnemyBlueprint, PlayerBlueprint, SpawnedArena};

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub combat: CombatConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(self.combat.tick_hz))
            .insert_resource(self.combat.clone())
            .init_resource::<DeterministicRng>();

        schedule::configure_simulation_sets(app);

        // Подсистемы
        app.add_plugins((CombatPlugin, AIPlugin, MovementPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную: каждый `app.update()` = ровно один fixed timestep,
/// поэтому прогон не зависит от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    create_app_with_config(seed, CombatConfig::default())
}

fn create_app_with_config(seed: u64, combat: CombatConfig) -> App {
    init_logger();

    let timestep = Duration::from_secs_f64(1.0 / combat.tick_hz);
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(SimulationPlugin { combat })
        .insert_resource(TimeUpdateStrategy::ManualDuration(timestep))
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// App + загруженная арена (tuning, seed, игрок и враги)
pub fn create_arena_app(arena: &ArenaConfig) -> Result<(App, SpawnedArena), ConfigError> {
    arena.validate()?;

    let mut app = create_app_with_config(arena.seed, arena.combat.clone());
    let spawned = spawn_arena(app.world_mut(), arena)?;
    Ok((app, spawned))
}

/// Прогоняет ровно `ticks` fixed тиков (по SimClock, а не по числу update)
pub fn run_fixed_ticks(app: &mut App, ticks: u64) {
    let start = app.world().resource::<SimClock>().tick;
    let target = start.wrapping_add(ticks);

    // Первый update может не накопить полный timestep
    let max_updates = ticks.saturating_mul(2).saturating_add(4);
    for _ in 0..max_updates {
        if app.world().resource::<SimClock>().tick == target {
            return;
        }
        app.update();
    }

    log_warning(&format!(
        "⚠️ run_fixed_ticks: stopped at tick {} (wanted {})",
        app.world().resource::<SimClock>().tick,
        target
    ));
}

/// Snapshot мира для сравнения детерминизма
/// (Debug-представление компонента, отсортированное по Entity index)
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
