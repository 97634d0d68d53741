//! Headless runner: reference arena + autopilot
//!
//! Запускает Bevy App без рендера, печатает сводку каждые N тиков и итог забега.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use bevy::prelude::*;
use bevy_rapier2d::prelude::{NoUserData, RapierPhysicsPlugin};
use clap::{Parser, ValueEnum};

use warriors_simulation::ai::CombatState;
use warriors_simulation::session::MemorySink;
use warriors_simulation::{
    create_headless_app_with, log_error, run_until_frozen, set_log_level, spawn_reference_arena, ArenaHandles, Health,
    LogLevel, PhysicsBackend, RunState, RunStats, SessionSinkHandle, SimClock, SimConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Headless,
    Rapier,
}

#[derive(Debug, Parser)]
#[command(name = "warriors_simulation", about = "Headless combat simulation runner")]
struct Args {
    /// Seed для autopilot RNG
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Сколько fixed тиков прогнать (60 тиков = 1 секунда)
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// RON файл с SimConfig (иначе баланс по умолчанию)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 600)]
    report_every: u64,

    /// debug | info | warning | error
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = Backend::Headless)]
    physics: Backend,

    /// Игрок стоит на месте (без autopilot)
    #[arg(long)]
    idle_player: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let Some(level) = LogLevel::parse(&args.log_level) else {
        eprintln!("Unknown log level: {}", args.log_level);
        return ExitCode::FAILURE;
    };
    set_log_level(level);

    let config = match &args.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config: {}", err));
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };

    println!(
        "Starting warriors simulation (seed: {}, ticks: {}, physics: {:?})",
        args.seed, args.ticks, args.physics
    );

    let mut app = create_headless_app_with(args.seed, config.clone());
    let sink = Arc::new(MemorySink::default());
    app.insert_resource(SessionSinkHandle::new(sink.clone()));

    if args.physics == Backend::Rapier {
        app.add_plugins((
            bevy::transform::TransformPlugin,
            RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
        ))
        .insert_resource(PhysicsBackend::Rapier);
    }

    let handles = {
        let mut commands = app.world_mut().commands();
        spawn_reference_arena(&mut commands, &config, !args.idle_player)
    };
    app.world_mut().flush();

    // Первый update только инициализирует Time (delta = 0)
    app.update();

    let last_tick = run_until_frozen(&mut app, args.ticks, |app, tick| {
        if args.report_every > 0 && tick % args.report_every == 0 {
            print_summary(app.world(), &handles, tick);
        }
    });
    if last_tick < args.ticks {
        println!("Run frozen at tick {}", last_tick);
    }

    print_summary(app.world(), &handles, last_tick);
    match app.world().resource::<RunState>().outcome {
        Some(outcome) => println!(
            "Outcome: {} (score {}, decided at {:.2}s)",
            if outcome.victory { "VICTORY" } else { "DEFEAT" },
            outcome.score,
            outcome.decided_at
        ),
        None => println!("Outcome: undecided"),
    }
    for event in sink.events() {
        println!("  sink: {:?}", event);
    }

    ExitCode::SUCCESS
}

fn print_summary(world: &World, handles: &ArenaHandles, tick: u64) {
    let clock = world.resource::<SimClock>();
    let stats = world.resource::<RunStats>();

    let describe = |entity: Entity| -> String {
        match (world.get::<Health>(entity), world.get::<CombatState>(entity), world.get::<Transform>(entity)) {
            (Some(health), Some(state), Some(transform)) => format!(
                "{}/{} {} x={:.1}",
                health.current,
                health.max,
                state.name(),
                transform.translation.x
            ),
            _ => "gone".to_string(),
        }
    };

    println!(
        "Tick {} ({:.2}s): player [{}] stalker [{}] boss [{}] kills {} coins {}",
        tick,
        clock.now(),
        describe(handles.player),
        describe(handles.stalker),
        describe(handles.boss),
        stats.kills,
        stats.currency
    );
}
