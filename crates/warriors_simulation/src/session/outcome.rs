//! End of run: victory / defeat → stats, final score, end screen, freeze.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::hud::HudEvent;
use super::sink::{SessionEvent, SessionSinkHandle, StatKind};
use crate::combat::EntityDied;
use crate::components::{Archetype, Faction};
use crate::score::{RunStats, ScorePolicy};
use crate::timer::{Deadline, SimClock};

/// Паузы перед финальным экраном
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionTiming {
    pub victory_delay: f32,
    pub defeat_delay: f32,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            victory_delay: 3.0,
            defeat_delay: 1.5,
        }
    }
}

/// Итог забега (фиксируется один раз)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub victory: bool,
    pub score: i64,
    pub decided_at: f32,
    pub end_screen: Deadline,
    pub shown: bool,
}

#[derive(Resource, Debug, Default)]
pub struct RunState {
    pub outcome: Option<RunOutcome>,
}

impl RunState {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
}

/// System: смерти → stat события; босс → victory, игрок → defeat
///
/// Первый исход побеждает: смерть игрока после смерти босса ничего не меняет.
pub fn conclude_run(
    mut deaths: EventReader<EntityDied>,
    mut run: ResMut<RunState>,
    stats: Res<RunStats>,
    policy: Res<ScorePolicy>,
    timing: Res<SessionTiming>,
    sink: Res<SessionSinkHandle>,
    clock: Res<SimClock>,
) {
    let now = clock.now();

    for event in deaths.read() {
        if event.faction == Faction::Hostile {
            sink.send(SessionEvent::Stat {
                kind: StatKind::Kill,
                delta: 1,
            });
        }

        let victory = match (event.archetype, event.faction) {
            (Archetype::Boss, _) => true,
            (_, Faction::Player) => false,
            _ => continue,
        };
        if run.is_over() {
            continue;
        }

        let score = stats.compute_final_score(victory, &policy);
        let (kind, delay) = if victory {
            (StatKind::Win, timing.victory_delay)
        } else {
            (StatKind::Loss, timing.defeat_delay)
        };

        crate::logger::log_info(&format!(
            "Session: run over ({}), score {} (kills {}, currency {})",
            if victory { "victory" } else { "defeat" },
            score,
            stats.kills,
            stats.currency
        ));

        sink.send(SessionEvent::Stat { kind, delta: 1 });
        sink.send(SessionEvent::FinalScore(score));

        run.outcome = Some(RunOutcome {
            victory,
            score,
            decided_at: now,
            end_screen: Deadline::after(now, delay),
            shown: false,
        });
    }
}

/// System: дедлайн финального экрана → EndScreen + глобальный freeze
pub fn show_end_screen(mut run: ResMut<RunState>, mut clock: ResMut<SimClock>, mut hud: EventWriter<HudEvent>) {
    let now = clock.now();
    let Some(outcome) = run.outcome.as_mut() else {
        return;
    };
    if outcome.shown || !outcome.end_screen.is_due(now) {
        return;
    }

    outcome.shown = true;
    hud.write(HudEvent::EndScreen {
        victory: outcome.victory,
        score: outcome.score,
    });
    clock.pause();
    crate::logger::log_info(&format!("Session: end screen at {:.2}s, simulation frozen", now));
}
