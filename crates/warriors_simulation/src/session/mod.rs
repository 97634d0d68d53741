//! Session: всё, что уходит из симуляции наружу
//!
//! - sink: persistence (stats, final score), fire-and-forget
//! - hud: presentation cues + HUD события
//! - effects: impact / pickup эффекты
//! - outcome: victory / defeat, финальный экран, freeze

use bevy::prelude::*;

use crate::SimSet;

pub mod effects;
pub mod hud;
pub mod outcome;
pub mod sink;

pub use effects::{expire_effects, spawn_effect, Effect, EffectKind, EFFECT_LIFETIME};
pub use hud::{BossBar, HudEvent, PresentationCue};
pub use outcome::{RunOutcome, RunState, SessionTiming};
pub use sink::{LogSink, MemorySink, SessionEvent, SessionSink, SessionSinkHandle, SinkError, StatKind};

/// Session Plugin
///
/// Sink по умолчанию — `LogSink`; хост подменяет `SessionSinkHandle`
/// до первого тика.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SessionSinkHandle>()
            .init_resource::<SessionTiming>()
            .init_resource::<RunState>()
            .init_resource::<BossBar>()
            .add_event::<PresentationCue>()
            .add_event::<HudEvent>()
            .add_systems(FixedUpdate, expire_effects.in_set(SimSet::World))
            .add_systems(
                FixedUpdate,
                (
                    hud::announce_boss,
                    hud::track_health,
                    outcome::conclude_run,
                    outcome::show_end_screen,
                )
                    .chain()
                    .in_set(SimSet::Session),
            );
    }
}
