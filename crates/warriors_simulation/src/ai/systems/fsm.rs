//! Combat FSM: решения (чистая функция) + system обёртка.
//!
//! # Architecture
//!
//! `decide` — один параметризованный движок для всех архетипов.
//! Различия архетипов — только `ArchetypeProfile` + `Capabilities`.
//! На вход: состояние, cooldown, патрульный маршрут, `Perception` снимок.
//! На выход: `Directive` (movement intent + начатая атака + strike instant).
//!
//! Порядок guards в Chase (single-attack архетипы):
//! 1. цель в strike range и cooldown готов → Attack
//! 2. цель в strike range, cooldown не готов → стоим
//! 3. avoids_ledges и впереди нет пола → стоим лицом к цели
//! 4. can_disengage и цель дальше disengage_range → rest state
//! 5. иначе двигаемся к цели на chase speed

use bevy::prelude::*;

use crate::ai::{
    AnimatorFeedback, ArchetypeProfile, AttackCooldown, AttackInProgress, CombatState, CombatTarget, Senses,
    VerticalBand,
};
use crate::combat::{AttackKind, StrikeRequest};
use crate::components::{MovementIntent, PatrolRoute};
use crate::player::Player;
use crate::session::PresentationCue;
use crate::timer::{Cooldown, SimClock};

/// Снимок мира для одного решения
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Perception {
    pub now: f32,
    pub position: Vec2,
    /// Позиция цели (None — цели нет или она удалена)
    pub target: Option<Vec2>,
    pub wall_ahead: bool,
    pub ledge_ahead: bool,
    pub attack_clip_playing: bool,
}

/// Результат одного тика FSM
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Directive {
    pub intent: MovementIntent,
    /// Атака началась в этом тике (cue "entered Attack")
    pub started: Option<AttackKind>,
    /// Strike instant в этом тике (Attack Resolver)
    pub strike: Option<AttackKind>,
}

impl Directive {
    fn hold() -> Self {
        Self::default()
    }

    fn hold_facing(dx: f32) -> Self {
        Self {
            intent: MovementIntent::hold_facing(dx),
            ..Self::default()
        }
    }

    fn advance(dx: f32, speed: f32) -> Self {
        Self {
            intent: MovementIntent {
                face: (dx != 0.0).then(|| dx.signum()),
                ..MovementIntent::toward(dx, speed)
            },
            ..Self::default()
        }
    }
}

/// Начать атаку: cooldown стартует в момент инициации
///
/// Возвращает strike если strike_delay == 0 (удар в тот же тик).
pub fn begin_attack(
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    profile: &ArchetypeProfile,
    kind: AttackKind,
    now: f32,
    has_target: bool,
) -> Option<AttackKind> {
    let attack = profile.attack(kind)?;
    if !cooldown.is_ready(now) {
        return None;
    }
    cooldown.start(now, attack.cooldown);
    *state = CombatState::Attack(AttackInProgress {
        kind,
        started_at: now,
        struck: false,
    });
    advance_attack(state, profile, now, has_target)
}

/// Продвинуть Attack state: strike ровно один раз, потом возврат в Chase / rest
pub fn advance_attack(
    state: &mut CombatState,
    profile: &ArchetypeProfile,
    now: f32,
    has_target: bool,
) -> Option<AttackKind> {
    let CombatState::Attack(mut progress) = *state else {
        return None;
    };

    let Some(attack) = profile.attack(progress.kind) else {
        *state = CombatState::rest(profile.capabilities.patrols);
        return None;
    };

    let mut strike = None;
    if !progress.struck && attack.strike_due(progress.started_at, now) {
        progress.struck = true;
        strike = Some(progress.kind);
    }

    *state = if attack.finished(progress.started_at, now) {
        if has_target {
            CombatState::Chase
        } else {
            CombatState::rest(profile.capabilities.patrols)
        }
    } else {
        CombatState::Attack(progress)
    };

    strike
}

/// Strike прерванной атаки во время Hurt (ровно один раз, в свой instant)
///
/// Разрешённый strike очищает `pending`.
pub fn strike_through_stagger(
    pending: &mut Option<AttackInProgress>,
    profile: &ArchetypeProfile,
    now: f32,
) -> Option<AttackKind> {
    let progress = (*pending)?;
    let Some(attack) = profile.attack(progress.kind) else {
        *pending = None;
        return None;
    };
    if !attack.strike_due(progress.started_at, now) {
        return None;
    }
    *pending = None;
    Some(progress.kind)
}

/// Idle/Patrol → Chase guard
fn should_aggro(profile: &ArchetypeProfile, perception: &Perception) -> bool {
    let Some(target) = perception.target else {
        return false;
    };
    if let Some(zone) = profile.capabilities.vertical_safe_zone {
        if zone.classify(perception.position.y - target.y) == VerticalBand::Trench {
            return false;
        }
    }
    perception.position.distance(target) < profile.aggro_range
}

/// Один тик FSM
pub fn decide(
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    route: Option<&mut PatrolRoute>,
    profile: &ArchetypeProfile,
    perception: &Perception,
) -> Directive {
    let now = perception.now;

    match *state {
        CombatState::Dead { .. } | CombatState::Dormant => Directive::hold(),

        CombatState::Hurt {
            until,
            resume_chase,
            mut pending,
        } => {
            let strike = strike_through_stagger(&mut pending, profile, now);
            *state = if now < until {
                CombatState::Hurt {
                    until,
                    resume_chase,
                    pending,
                }
            } else if let Some(progress) = pending {
                // Stagger короче wind-up: атака продолжается до своего strike
                CombatState::Attack(progress)
            } else if resume_chase && perception.target.is_some() {
                CombatState::Chase
            } else {
                CombatState::rest(profile.capabilities.patrols)
            };
            Directive {
                strike,
                ..Directive::hold()
            }
        }

        CombatState::Attack(progress) => {
            let attack = profile.attack(progress.kind);
            let strike = advance_attack(state, profile, now, perception.target.is_some());
            let dx = perception.target.map_or(0.0, |t| t.x - perception.position.x);
            let mut directive = if attack.is_some_and(|a| a.roots_attacker) {
                Directive::hold_facing(dx)
            } else {
                Directive::hold()
            };
            directive.strike = strike;
            directive
        }

        CombatState::Patrol => {
            if should_aggro(profile, perception) {
                *state = CombatState::Chase;
                return chase(state, cooldown, profile, perception);
            }
            match route {
                Some(route) => {
                    if route.reached_edge(perception.position.x) || perception.wall_ahead {
                        route.flip();
                    }
                    Directive {
                        intent: MovementIntent::toward(route.dir, profile.patrol_speed),
                        ..Directive::default()
                    }
                }
                None => Directive::hold(),
            }
        }

        CombatState::Idle => {
            if should_aggro(profile, perception) {
                *state = CombatState::Chase;
                return chase(state, cooldown, profile, perception);
            }
            Directive::hold()
        }

        CombatState::Chase => chase(state, cooldown, profile, perception),
    }
}

fn chase(
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    profile: &ArchetypeProfile,
    perception: &Perception,
) -> Directive {
    let Some(target) = perception.target else {
        // Цель пропала → rest state, без ошибки
        *state = CombatState::rest(profile.capabilities.patrols);
        return Directive::hold();
    };

    if profile.capabilities.waits_for_attack_clip && perception.attack_clip_playing {
        return Directive::hold();
    }

    let delta = target - perception.position;
    let distance = delta.length();
    let now = perception.now;

    if profile.capabilities.dual_attack_mode {
        return chase_dual(state, cooldown, profile, perception, target);
    }

    let Some(melee) = profile.melee else {
        return Directive::hold_facing(delta.x);
    };

    // 1-2: strike range
    if distance <= melee.range {
        let mut directive = Directive::hold_facing(delta.x);
        if cooldown.is_ready(now) {
            directive.strike = begin_attack(state, cooldown, profile, AttackKind::Melee, now, true);
            directive.started = Some(AttackKind::Melee);
        }
        return directive;
    }

    // 3: обрыв впереди
    if profile.capabilities.avoids_ledges && perception.ledge_ahead {
        return Directive::hold_facing(delta.x);
    }

    // 4: disengage
    if profile.capabilities.can_disengage && distance > profile.disengage_range {
        *state = CombatState::rest(profile.capabilities.patrols);
        return Directive::hold();
    }

    Directive::advance(delta.x, profile.chase_speed)
}

/// Chase для dual-attack архетипа (босс): trench / melee / ranged / wait
fn chase_dual(
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    profile: &ArchetypeProfile,
    perception: &Perception,
    target: Vec2,
) -> Directive {
    let now = perception.now;
    let delta = target - perception.position;
    let distance = delta.length();

    let band = profile
        .capabilities
        .vertical_safe_zone
        .map_or(VerticalBand::MeleeReachable, |zone| zone.classify(-delta.y));

    if band == VerticalBand::Trench {
        // Цель в траншее: ни движения, ни атак, только смотрим на неё
        return Directive::hold_facing(delta.x);
    }

    if let Some(melee) = profile.melee {
        if band == VerticalBand::MeleeReachable && distance <= profile.melee_engage_range {
            if distance > melee.range {
                return Directive::advance(delta.x, profile.chase_speed);
            }
            let mut directive = Directive::hold_facing(delta.x);
            if cooldown.is_ready(now) {
                directive.strike = begin_attack(state, cooldown, profile, AttackKind::Melee, now, true);
                directive.started = Some(AttackKind::Melee);
            }
            return directive;
        }
    }

    let mut directive = Directive::hold_facing(delta.x);
    if let Some(ranged) = profile.ranged {
        if distance <= ranged.range && cooldown.is_ready(now) {
            directive.strike = begin_attack(state, cooldown, profile, AttackKind::Ranged, now, true);
            directive.started = Some(AttackKind::Ranged);
        }
    }
    // Дальше ranged range — ждём, оставаясь в Chase
    directive
}

/// System: один тик FSM для каждого AI актора
///
/// Каждый актор оценивает свою машину ровно один раз за тик.
/// Strike instants уходят в `StrikeRequest` и разрешаются в этом же тике.
pub fn run_combat_fsm(
    clock: Res<SimClock>,
    mut actors: Query<
        (
            Entity,
            &Transform,
            &ArchetypeProfile,
            &CombatTarget,
            &Senses,
            &mut CombatState,
            &mut AttackCooldown,
            &mut MovementIntent,
            Option<&mut PatrolRoute>,
            Option<&AnimatorFeedback>,
        ),
        Without<Player>,
    >,
    targets: Query<&Transform>,
    mut strikes: EventWriter<StrikeRequest>,
    mut cues: EventWriter<PresentationCue>,
) {
    let now = clock.now();

    for (entity, transform, profile, target, senses, mut state, mut cooldown, mut intent, route, feedback) in
        actors.iter_mut()
    {
        let target_position = target
            .0
            .and_then(|t| targets.get(t).ok())
            .map(|t| t.translation.truncate());

        let perception = Perception {
            now,
            position: transform.translation.truncate(),
            target: target_position,
            wall_ahead: senses.wall_ahead,
            ledge_ahead: senses.ledge_ahead,
            attack_clip_playing: feedback.is_some_and(|f| f.attack_clip_playing),
        };

        let previous = *state;
        let directive = decide(
            &mut state,
            &mut cooldown.0,
            route.map(|r| r.into_inner()),
            profile,
            &perception,
        );

        if previous.name() != state.name() {
            crate::logger::log(&format!(
                "AI: {:?} ({}) {} → {}",
                entity,
                profile.archetype.name(),
                previous.name(),
                state.name()
            ));
        }

        if let Some(kind) = directive.started {
            cues.write(PresentationCue::trigger(entity, kind.trigger_name()));
        }

        if let Some(kind) = directive.strike {
            if let Some(attack) = profile.attack(kind) {
                strikes.write(StrikeRequest {
                    attacker: entity,
                    attack: *attack,
                    target: target.0,
                });
            }
        }

        if intent.speed != directive.intent.speed {
            cues.write(PresentationCue::float(entity, "Speed", directive.intent.speed));
        }
        *intent = directive.intent;
    }
}
