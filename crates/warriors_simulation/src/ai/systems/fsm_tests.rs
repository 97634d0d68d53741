//! Tests for combat FSM decisions.

use bevy::prelude::*;

use super::fsm::{decide, Directive, Perception};
use crate::ai::{ArchetypeProfile, CombatState};
use crate::combat::{apply_damage, AttackKind, Hit, KnockbackTuning};
use crate::components::{Health, KnockbackLock, PatrolRoute};
use crate::timer::Cooldown;

const DT: f32 = 1.0 / 60.0;

fn see(now: f32, position: Vec2, target: Option<Vec2>) -> Perception {
    Perception {
        now,
        position,
        target,
        ..Default::default()
    }
}

/// Прогоняет FSM `ticks` тиков с неподвижными участниками, собирает директивы
fn run(
    state: &mut CombatState,
    cooldown: &mut Cooldown,
    profile: &ArchetypeProfile,
    position: Vec2,
    target: Option<Vec2>,
    ticks: usize,
) -> Vec<(f32, Directive)> {
    (1..=ticks)
        .map(|tick| {
            let now = tick as f32 * DT;
            let directive = decide(state, cooldown, None, profile, &see(now, position, target));
            (now, directive)
        })
        .collect()
}

#[test]
fn test_stalker_aggro_then_chase() {
    let profile = ArchetypeProfile::stalker();
    let mut state = CombatState::Idle;
    let mut cooldown = Cooldown::default();

    // Далеко: стоим
    let far = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(8.0, 0.0))));
    assert_eq!(state, CombatState::Idle);
    assert!(!far.intent.is_moving());

    // Ближе aggro range: Chase в этом же тике, бежим на chase speed
    let near = decide(&mut state, &mut cooldown, None, &profile, &see(0.1, Vec2::ZERO, Some(Vec2::new(-4.0, 0.0))));
    assert_eq!(state, CombatState::Chase);
    assert_eq!(near.intent.direction, -1.0);
    assert_eq!(near.intent.speed, 6.0);
    assert_eq!(near.intent.face, Some(-1.0));
}

#[test]
fn test_attack_strikes_exactly_once_at_strike_delay() {
    let profile = ArchetypeProfile::zombie();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();

    let directives = run(&mut state, &mut cooldown, &profile, Vec2::ZERO, Some(Vec2::new(0.8, 0.0)), 30);

    let started: Vec<f32> = directives.iter().filter(|(_, d)| d.started.is_some()).map(|(t, _)| *t).collect();
    let strikes: Vec<f32> = directives.iter().filter(|(_, d)| d.strike.is_some()).map(|(t, _)| *t).collect();

    assert_eq!(started.len(), 1);
    assert_eq!(strikes.len(), 1);
    let delay = strikes[0] - started[0];
    assert!(delay >= 0.3 - 1e-4 && delay < 0.3 + DT + 1e-4, "strike delay {}", delay);
}

#[test]
fn test_attack_initiations_respect_cooldown() {
    let profile = ArchetypeProfile::zombie();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();

    let directives = run(&mut state, &mut cooldown, &profile, Vec2::ZERO, Some(Vec2::new(0.5, 0.0)), 600);
    let starts: Vec<f32> = directives.iter().filter(|(_, d)| d.started.is_some()).map(|(t, _)| *t).collect();

    assert!(starts.len() >= 5, "starts = {:?}", starts);
    for pair in starts.windows(2) {
        assert!(pair[1] - pair[0] >= 1.5 - 1e-4, "initiations {:?}", pair);
    }
}

#[test]
fn test_in_range_on_cooldown_holds_position() {
    let profile = ArchetypeProfile::zombie();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown { until: 10.0 };

    let directive = decide(&mut state, &mut cooldown, None, &profile, &see(1.0, Vec2::ZERO, Some(Vec2::new(-0.9, 0.0))));
    assert_eq!(state, CombatState::Chase);
    assert!(!directive.intent.is_moving());
    assert_eq!(directive.intent.face, Some(-1.0));
    assert!(directive.started.is_none());
}

#[test]
fn test_zombie_disengages_to_patrol() {
    let profile = ArchetypeProfile::zombie();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();

    decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(3.5, 0.0))));
    assert_eq!(state, CombatState::Patrol);
}

#[test]
fn test_boss_never_disengages() {
    let profile = ArchetypeProfile::boss();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();

    let directive = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(40.0, 0.0))));
    assert_eq!(state, CombatState::Chase);
    assert!(!directive.intent.is_moving());
    assert!(directive.started.is_none());
}

#[test]
fn test_stalker_holds_at_ledge_facing_target() {
    let profile = ArchetypeProfile::stalker();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    let perception = Perception {
        ledge_ahead: true,
        ..see(0.0, Vec2::ZERO, Some(Vec2::new(3.0, -2.0)))
    };

    let directive = decide(&mut state, &mut cooldown, None, &profile, &perception);
    assert_eq!(state, CombatState::Chase);
    assert!(!directive.intent.is_moving());
    assert_eq!(directive.intent.face, Some(1.0));
}

#[test]
fn test_boss_in_trench_never_moves_or_attacks() {
    let profile = ArchetypeProfile::boss();

    for dx in [0.5_f32, 2.0, 6.0, 12.0, 30.0] {
        let mut state = CombatState::Chase;
        let mut cooldown = Cooldown::default();
        // Цель на 4 м ниже босса (safe_height = 3)
        let directives = run(&mut state, &mut cooldown, &profile, Vec2::new(0.0, 4.0), Some(Vec2::new(dx, 0.0)), 120);

        assert!(directives.iter().all(|(_, d)| !d.intent.is_moving() && d.started.is_none() && d.strike.is_none()));
        assert_eq!(state, CombatState::Chase);
    }
}

#[test]
fn test_boss_melee_close_ranged_far() {
    let profile = ArchetypeProfile::boss();

    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    let close = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(2.0, 0.0))));
    assert_eq!(close.started, Some(AttackKind::Melee));
    assert_eq!(cooldown.until, 2.0);

    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    let approach = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(-6.0, 0.0))));
    assert!(approach.intent.is_moving());
    assert_eq!(approach.intent.direction, -1.0);
    assert_eq!(approach.intent.speed, 3.0);

    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    let far = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(12.0, 0.0))));
    assert_eq!(far.started, Some(AttackKind::Ranged));
    assert_eq!(cooldown.until, 3.5);
}

#[test]
fn test_boss_target_far_below_gets_ranged_only() {
    let profile = ArchetypeProfile::boss();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();

    // Цель на 4 м выше босса: melee недостижим, хотя по X рядом
    let directive = decide(&mut state, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(1.0, 4.0))));
    assert_eq!(directive.started, Some(AttackKind::Ranged));
}

#[test]
fn test_dormant_and_dead_do_nothing() {
    let profile = ArchetypeProfile::boss();
    let mut cooldown = Cooldown::default();

    let mut dormant = CombatState::Dormant;
    let directive = decide(&mut dormant, &mut cooldown, None, &profile, &see(0.0, Vec2::ZERO, Some(Vec2::new(1.0, 0.0))));
    assert_eq!(dormant, CombatState::Dormant);
    assert_eq!(directive, Directive::default());

    let mut dead = CombatState::Dead { since: 0.0 };
    let directives = run(&mut dead, &mut cooldown, &profile, Vec2::ZERO, Some(Vec2::new(1.0, 0.0)), 60);
    assert!(directives.iter().all(|(_, d)| *d == Directive::default()));
    assert!(dead.is_dead());
}

#[test]
fn test_missing_target_falls_back_to_rest_state() {
    let zombie = ArchetypeProfile::zombie();
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    decide(&mut state, &mut cooldown, None, &zombie, &see(0.0, Vec2::ZERO, None));
    assert_eq!(state, CombatState::Patrol);

    let stalker = ArchetypeProfile::stalker();
    let mut state = CombatState::Chase;
    decide(&mut state, &mut cooldown, None, &stalker, &see(0.0, Vec2::ZERO, None));
    assert_eq!(state, CombatState::Idle);
}

#[test]
fn test_hurt_resumes_after_stagger() {
    let profile = ArchetypeProfile::stalker();
    let mut state = CombatState::Hurt {
        until: 0.3,
        resume_chase: true,
        pending: None,
    };
    let mut cooldown = Cooldown::default();
    let target = Some(Vec2::new(20.0, 0.0));

    let during = decide(&mut state, &mut cooldown, None, &profile, &see(0.2, Vec2::ZERO, target));
    assert!(!during.intent.is_moving());
    assert!(matches!(state, CombatState::Hurt { .. }));

    decide(&mut state, &mut cooldown, None, &profile, &see(0.3, Vec2::ZERO, target));
    assert_eq!(state, CombatState::Chase);
}

#[test]
fn test_patrol_flips_at_edge_and_wall() {
    let profile = ArchetypeProfile::zombie();
    let mut state = CombatState::Patrol;
    let mut cooldown = Cooldown::default();
    let mut route = PatrolRoute::new(0.0, 3.0);

    let walking = decide(&mut state, &mut cooldown, Some(&mut route), &profile, &see(0.0, Vec2::new(1.0, 0.0), None));
    assert_eq!(walking.intent.direction, 1.0);
    assert_eq!(walking.intent.speed, 2.0);

    let at_edge = decide(&mut state, &mut cooldown, Some(&mut route), &profile, &see(0.1, Vec2::new(3.2, 0.0), None));
    assert_eq!(at_edge.intent.direction, -1.0);

    let wall = Perception {
        wall_ahead: true,
        ..see(0.2, Vec2::new(0.0, 0.0), None)
    };
    let at_wall = decide(&mut state, &mut cooldown, Some(&mut route), &profile, &wall);
    assert_eq!(at_wall.intent.direction, 1.0);
    assert_eq!(state, CombatState::Patrol);
}

/// Zombie атакует неподвижную цель, на тике `hit_tick` получает удар без knockback
fn bite_interrupted_at(profile: &ArchetypeProfile, hit_tick: usize) -> Vec<(f32, Directive)> {
    let mut state = CombatState::Chase;
    let mut cooldown = Cooldown::default();
    let mut health = Health::new(profile.max_health);
    let mut lock = KnockbackLock::default();
    let target = Some(Vec2::new(0.8, 0.0));

    (1..=60)
        .map(|tick| {
            let now = tick as f32 * DT;
            if tick == hit_tick {
                assert!(matches!(state, CombatState::Attack(_)), "state = {:?}", state);
                let hit = Hit {
                    amount: 1,
                    source: None,
                    position: Vec2::ZERO,
                    now,
                };
                apply_damage(&mut health, &mut state, &mut lock, profile, &hit, &KnockbackTuning::default());
                assert!(matches!(state, CombatState::Hurt { pending: Some(_), .. }));
            }
            let directive = decide(&mut state, &mut cooldown, None, profile, &see(now, Vec2::ZERO, target));
            (now, directive)
        })
        .collect()
}

#[test]
fn test_hit_during_windup_still_strikes_once() {
    let profile = ArchetypeProfile::zombie();
    let directives = bite_interrupted_at(&profile, 6);

    let started: Vec<f32> = directives.iter().filter(|(_, d)| d.started.is_some()).map(|(t, _)| *t).collect();
    let strikes: Vec<f32> = directives.iter().filter(|(_, d)| d.strike.is_some()).map(|(t, _)| *t).collect();

    assert_eq!(started.len(), 1);
    assert_eq!(strikes.len(), 1, "strikes = {:?}", strikes);
    let delay = strikes[0] - started[0];
    assert!(delay >= 0.3 - 1e-4 && delay < 0.3 + DT + 1e-4, "strike delay {}", delay);
}

#[test]
fn test_short_stagger_resumes_interrupted_attack() {
    let mut profile = ArchetypeProfile::zombie();
    profile.stagger_duration = 0.05;
    let directives = bite_interrupted_at(&profile, 3);

    let started = directives.iter().filter(|(_, d)| d.started.is_some()).count();
    let strikes: Vec<f32> = directives.iter().filter(|(_, d)| d.strike.is_some()).map(|(t, _)| *t).collect();

    assert_eq!(started, 1);
    assert_eq!(strikes.len(), 1, "strikes = {:?}", strikes);
    // Атака началась на первом тике: strike в свой instant, не раньше
    assert!(strikes[0] >= DT + 0.3 - 1e-4, "strike at {}", strikes[0]);
}
