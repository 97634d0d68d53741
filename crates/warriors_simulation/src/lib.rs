//! Warriors Simulation Core
//!
//! ECS-симуляция боя side-scroller'а на Bevy 0.16 (без рендера).
//! Игрок против Zombie / Stalker / Boss: одна параметризованная combat FSM,
//! hit volumes и снаряды, knockback, coins, зонные триггеры, конец забега.
//!
//! Презентация (анимации, звук, HUD) и persistence — внешние sinks:
//! симуляция только пишет события (`PresentationCue`, `HudEvent`, `SessionEvent`).
//!
//! Порядок тика (FixedUpdate, 60Hz): см. `SimSet`.

use std::time::Duration;

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod movement;
pub mod physics;
pub mod player;
pub mod score;
pub mod session;
pub mod spawn;
pub mod timer;
pub mod zone;

// Re-export для удобства
pub use ai::{AIPlugin, ArchetypeProfile, CombatState, EntityActivated};
pub use combat::{CombatPlugin, DamageDealt, Dead, EntityDied, KnockbackTuning};
pub use components::*;
pub use config::{ConfigError, SimConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use movement::MovementPlugin;
pub use physics::{PhysicsAdapterPlugin, PhysicsBackend};
pub use player::{Player, PlayerInput, PlayerPlugin};
pub use score::{RunStats, ScorePlugin, ScorePolicy};
pub use session::{HudEvent, PresentationCue, RunState, SessionEvent, SessionPlugin, SessionSinkHandle};
pub use spawn::{spawn_reference_arena, ArenaHandles};
pub use timer::SimClock;
pub use zone::ZonePlugin;

/// Фазы одного fixed тика (строго по порядку)
///
/// Всё после `Clock` заморожено, пока `SimClock` на паузе.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Продвижение `SimClock`
    Clock,
    /// Perception + FSM + player input → intents, strike requests
    Decide,
    /// Strike instants → hit volumes / снаряды
    Resolve,
    /// Контакты снарядов (headless синтез или rapier events)
    Contacts,
    Projectiles,
    /// Intent → velocity
    Move,
    /// Headless интеграция (rapier интегрирует сам)
    Integrate,
    Death,
    /// Despawn, эффекты, пикапы, зонные триггеры
    World,
    /// HUD, конец забега, persistence
    Session,
}

impl SimSet {
    const GATED: [SimSet; 9] = [
        SimSet::Decide,
        SimSet::Resolve,
        SimSet::Contacts,
        SimSet::Projectiles,
        SimSet::Move,
        SimSet::Integrate,
        SimSet::Death,
        SimSet::World,
        SimSet::Session,
    ];
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimConfig,
}

impl SimulationPlugin {
    pub fn with_config(config: SimConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimSet::Clock,
                SimSet::Decide,
                SimSet::Resolve,
                SimSet::Contacts,
                SimSet::Projectiles,
                SimSet::Move,
                SimSet::Integrate,
                SimSet::Death,
                SimSet::World,
                SimSet::Session,
            )
                .chain(),
        );
        for set in SimSet::GATED {
            app.configure_sets(FixedUpdate, set.run_if(timer::simulation_running));
        }
        // Один поток: порядок неупорядоченных систем фиксирован сборкой schedule
        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        app.init_resource::<SimClock>()
            .add_systems(FixedUpdate, timer::advance_clock.in_set(SimSet::Clock))
            .add_plugins((
                PhysicsAdapterPlugin,
                AIPlugin,
                PlayerPlugin,
                CombatPlugin,
                MovementPlugin,
                ScorePlugin,
                ZonePlugin,
                SessionPlugin,
            ));

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Config после plugins: перекрывает их init_resource defaults
        self.config.apply(app);
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

/// Создаёт minimal Bevy App для headless симуляции (config по умолчанию)
pub fn create_headless_app(seed: u64) -> App {
    create_headless_app_with(seed, SimConfig::default())
}

/// Headless App: каждый `app.update()` после первого = ровно один fixed тик
pub fn create_headless_app_with(seed: u64, config: SimConfig) -> App {
    let mut app = App::new();
    init_logger();

    let step = Duration::from_secs_f64(1.0 / config.tick_hz);
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .add_plugins(SimulationPlugin::with_config(config));

    app
}

/// Гоняет fixed тики до `max_ticks` или до глобальной заморозки
///
/// `on_tick` вызывается после каждого тика. Возвращает номер последнего
/// прогнанного тика.
pub fn run_until_frozen(app: &mut App, max_ticks: u64, mut on_tick: impl FnMut(&App, u64)) -> u64 {
    let mut last_tick = 0;
    for tick in 1..=max_ticks {
        app.update();
        last_tick = tick;
        on_tick(app, tick);

        if app.world().resource::<SimClock>().is_paused() {
            break;
        }
    }
    last_tick
}

/// Snapshot компонента для сравнения детерминизма
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

/// Snapshot всего, что определяет исход боя: позиции, здоровье, FSM, счёт
pub fn combat_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = world_snapshot::<Transform>(world);
    snapshot.extend(world_snapshot::<Health>(world));
    snapshot.extend(world_snapshot::<CombatState>(world));
    if let Some(stats) = world.get_resource::<RunStats>() {
        snapshot.extend_from_slice(format!("{:?}", stats).as_bytes());
    }
    snapshot
}
