//! Headless симуляция Hollowgate
//!
//! Загружает арену (TOML путь первым аргументом или встроенная демо-арена),
//! прогоняет N fixed тиков без рендера и печатает итог боя.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::prelude::{With, Without};
use hollowgate_simulation::{
    create_arena_app, init_logger, log_error, log_info, run_fixed_ticks, ArenaConfig, CombatHooks, Dead, EnemyKind,
    GameOverSink, Health, Player, ProgressSink, Projectile, SimClock,
};

const DEFAULT_TICKS: u64 = 1800;

/// Счётчик убийств для итоговой сводки
struct KillTally(Arc<AtomicUsize>);

impl ProgressSink for KillTally {
    fn record_kill(&self, kind: &str) {
        let total = self.0.fetch_add(1, Ordering::Relaxed) + 1;
        log_info(&format!("🏆 Kill recorded: {} (total {})", kind, total));
    }
}

struct GameOverBanner;

impl GameOverSink for GameOverBanner {
    fn game_over(&self) {
        log_info("☠️ GAME OVER");
    }
}

fn main() {
    init_logger();

    let arena = match std::env::args().nth(1) {
        Some(path) => match ArenaConfig::load(&path) {
            Ok(arena) => arena,
            Err(error) => {
                log_error(&format!("Failed to load arena {}: {}", path, error));
                std::process::exit(1);
            }
        },
        None => ArenaConfig::demo(),
    };
    let ticks = arena.ticks.unwrap_or(DEFAULT_TICKS);

    log_info(&format!(
        "Starting Hollowgate headless simulation (seed: {}, ticks: {})",
        arena.seed, ticks
    ));

    let (mut app, spawned) = match create_arena_app(&arena) {
        Ok(result) => result,
        Err(error) => {
            log_error(&format!("Arena rejected: {}", error));
            std::process::exit(1);
        }
    };

    let kills = Arc::new(AtomicUsize::new(0));
    app.insert_resource(
        CombatHooks::default()
            .with_progress(KillTally(kills.clone()))
            .with_game_over(GameOverBanner),
    );

    // Прогон пачками по 300 тиков (5 секунд при 60Hz) с промежуточным отчётом
    let mut remaining = ticks;
    while remaining > 0 {
        let batch = remaining.min(300);
        run_fixed_ticks(&mut app, batch);
        remaining -= batch;

        let world = app.world_mut();
        let clock = *world.resource::<SimClock>();
        let projectiles = world.query::<&Projectile>().iter(world).count();
        let alive_enemies = world
            .query_filtered::<&Health, (With<EnemyKind>, Without<Dead>)>()
            .iter(world)
            .count();
        log_info(&format!(
            "Tick {} (t={:.2}s): {} enemies alive, {} projectiles in flight",
            clock.tick, clock.now, alive_enemies, projectiles
        ));
    }

    let world = app.world_mut();
    let player_health = world
        .query_filtered::<&Health, With<Player>>()
        .get(world, spawned.player)
        .map(|health| format!("{}/{} ({:.0}%)", health.current, health.max, health.fraction() * 100.0))
        .unwrap_or_else(|_| "despawned".to_string());

    log_info(&format!(
        "Simulation complete: {} kills of {} enemies, player health {}",
        kills.load(Ordering::Relaxed),
        spawned.enemies.len(),
        player_health
    ));
}
