//! Тесты детерминизма
//!
//! Проверяем что симуляция арены с одинаковым seed даёт идентичные результаты

use bevy::prelude::*;
use hollowgate_simulation::{
    create_arena_app, run_fixed_ticks, world_snapshot, AIState, ArenaConfig, Health, Hopper,
};

const TICK_COUNT: u64 = 600;

/// Прогоняет демо-арену и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: u64) -> Vec<u8> {
    let mut arena = ArenaConfig::demo();
    arena.seed = seed;
    run_arena(&arena, tick_count)
}

fn run_arena(arena: &ArenaConfig, tick_count: u64) -> Vec<u8> {
    let (mut app, _) = create_arena_app(arena).expect("arena is valid");
    run_fixed_ticks(&mut app, tick_count);

    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Transform>(world);
    snapshot.extend(world_snapshot::<Health>(world));
    snapshot.extend(world_snapshot::<AIState>(world));
    snapshot.extend(world_snapshot::<Hopper>(world));
    snapshot
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    // Первый прогон
    let snapshot1 = run_simulation(SEED, TICK_COUNT);

    // Второй прогон с тем же seed
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    // Запускаем 3 раза: все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    // Игрок далеко: все враги патрулируют, а patrol точки берутся из seeded RNG
    let mut arena = ArenaConfig::demo();
    arena.player.spawn = Some([100.0, 100.0]);

    arena.seed = 1;
    let snapshot1 = run_arena(&arena, 300);
    arena.seed = 2;
    let snapshot2 = run_arena(&arena, 300);
    assert_ne!(snapshot1, snapshot2);
}
