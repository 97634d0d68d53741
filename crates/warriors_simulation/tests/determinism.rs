//! Тесты детерминизма
//!
//! Reference arena + autopilot: одинаковый seed → идентичный мир

use bevy::prelude::*;
use warriors_simulation::{combat_snapshot, create_headless_app, spawn_reference_arena, RunStats, SimConfig, SimClock};

fn run_arena(seed: u64, ticks: usize) -> (Vec<u8>, RunStats, u64) {
    let mut app = create_headless_app(seed);
    {
        let mut commands = app.world_mut().commands();
        spawn_reference_arena(&mut commands, &SimConfig::default(), true);
    }
    app.world_mut().flush();

    for _ in 0..ticks {
        app.update();
    }

    let stats = *app.world().resource::<RunStats>();
    let clock_ticks = app.world().resource::<SimClock>().ticks();
    (combat_snapshot(app.world_mut()), stats, clock_ticks)
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 900;

    let first = run_arena(SEED, TICK_COUNT);
    let second = run_arena(SEED, TICK_COUNT);

    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
    assert!(first.0 == second.0, "Симуляция с одинаковым seed ({}) дала разные результаты!", SEED);
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 600;

    // Запускаем 3 раза — все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_arena(SEED, TICK_COUNT).0).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert!(snapshots[0] == *snapshot, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[test]
fn test_clock_counts_fixed_ticks() {
    // Первый update только инициализирует Time
    let (_, _, ticks) = run_arena(7, 61);
    assert_eq!(ticks, 60);
}
