//! Player controls: input → те же состояния и атаки, что у AI.
//!
//! Игрок живёт в той же `CombatState` машине (Idle ↔ Attack ↔ Hurt → Dead),
//! только решения принимает input, а не guards. Атака не рутит игрока:
//! можно бежать и бить одновременно.

use bevy::prelude::*;

use super::player::{Player, PlayerInput};
use crate::ai::{
    advance_attack, begin_attack, strike_through_stagger, ArchetypeProfile, AttackCooldown, CombatState, Directive,
};
use crate::combat::{AttackKind, StrikeRequest};
use crate::components::MovementIntent;
use crate::session::PresentationCue;
use crate::timer::{Cooldown, SimClock};

/// |axis| ниже deadzone только разворачивает, без шага
pub const AXIS_DEADZONE: f32 = 0.1;

/// Один тик игрока (чистая функция)
///
/// - Dead: ничего
/// - Hurt: input подавлен до конца stagger, прерванный swing всё равно бьёт
/// - иначе: движение по axis, melee приоритетнее throw
pub fn player_step(
    input: &PlayerInput,
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    profile: &ArchetypeProfile,
    now: f32,
) -> Directive {
    let mut carried = None;
    match *state {
        CombatState::Dead { .. } | CombatState::Dormant => return Directive::default(),
        CombatState::Hurt {
            until,
            resume_chase,
            mut pending,
        } => {
            carried = strike_through_stagger(&mut pending, profile, now);
            if now < until {
                *state = CombatState::Hurt {
                    until,
                    resume_chase,
                    pending,
                };
                return Directive {
                    strike: carried,
                    ..Directive::default()
                };
            }
            *state = pending.map_or(CombatState::Idle, CombatState::Attack);
        }
        _ => {}
    }

    let mut directive = Directive {
        strike: carried,
        ..Directive::default()
    };

    if matches!(state, CombatState::Attack(_)) {
        directive.strike = directive.strike.or(advance_attack(state, profile, now, false));
    } else {
        let wanted = if input.melee {
            Some(AttackKind::Melee)
        } else if input.throw {
            Some(AttackKind::Ranged)
        } else {
            None
        };
        if let Some(kind) = wanted {
            if cooldown.is_ready(now) && profile.attack(kind).is_some() {
                directive.strike = begin_attack(state, cooldown, profile, kind, now, false);
                directive.started = Some(kind);
            }
        }
    }

    let rooted = match *state {
        CombatState::Attack(progress) => profile.attack(progress.kind).is_some_and(|a| a.roots_attacker),
        _ => false,
    };
    if !rooted {
        let base = if input.axis.abs() >= AXIS_DEADZONE {
            MovementIntent::toward(input.axis, profile.chase_speed)
        } else {
            MovementIntent::hold_facing(input.axis)
        };
        directive.intent = MovementIntent {
            jump: input.jump,
            ..base
        };
    }

    directive
}

/// System: input → intent / StrikeRequest для `Player` entities
pub fn drive_players(
    clock: Res<SimClock>,
    mut players: Query<
        (
            Entity,
            &ArchetypeProfile,
            &mut PlayerInput,
            &mut CombatState,
            &mut AttackCooldown,
            &mut MovementIntent,
        ),
        With<Player>,
    >,
    mut strikes: EventWriter<StrikeRequest>,
    mut cues: EventWriter<PresentationCue>,
) {
    let now = clock.now();

    for (entity, profile, mut input, mut state, mut cooldown, mut intent) in players.iter_mut() {
        let previous = *state;
        let directive = player_step(&input, &mut state, &mut cooldown.0, profile, now);
        input.clear_presses();

        if previous.name() != state.name() {
            crate::logger::log(&format!("Player: {:?} {} → {}", entity, previous.name(), state.name()));
        }

        if let Some(kind) = directive.started {
            cues.write(PresentationCue::trigger(entity, kind.trigger_name()));
        }
        if let Some(kind) = directive.strike {
            if let Some(attack) = profile.attack(kind) {
                strikes.write(StrikeRequest {
                    attacker: entity,
                    attack: *attack,
                    target: None,
                });
            }
        }

        let speed = if directive.intent.is_moving() { directive.intent.speed } else { 0.0 };
        let previous_speed = if intent.is_moving() { intent.speed } else { 0.0 };
        if speed != previous_speed {
            cues.write(PresentationCue::float(entity, "Speed", speed));
        }
        *intent = directive.intent;
    }
}
