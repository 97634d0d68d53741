//! Tests for ApplyDamage.

use bevy::prelude::*;

use super::damage::{apply_damage, DamageOutcome, Hit, KnockbackTuning};
use crate::ai::{ArchetypeProfile, AttackInProgress, CombatState};
use crate::combat::AttackKind;
use crate::components::{Health, KnockbackLock};

fn hit(amount: u32, now: f32) -> Hit {
    Hit {
        amount,
        source: None,
        position: Vec2::ZERO,
        now,
    }
}

#[test]
fn test_damage_then_death() {
    let profile = ArchetypeProfile::zombie();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(3);
    let mut state = CombatState::Patrol;
    let mut lock = KnockbackLock::default();

    let outcome = apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(1, 1.0), &tuning);
    assert_eq!(outcome, DamageOutcome::Staggered { knockback: None });
    assert_eq!(health.current, 2);
    assert!(matches!(state, CombatState::Hurt { .. }));

    let outcome = apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(5, 1.1), &tuning);
    assert_eq!(outcome, DamageOutcome::Killed);
    assert_eq!(health.current, 0); // clamp at 0
    assert_eq!(state, CombatState::Dead { since: 1.1 });
}

#[test]
fn test_dead_ignores_further_damage() {
    let profile = ArchetypeProfile::stalker();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(3);
    let mut state = CombatState::Chase;
    let mut lock = KnockbackLock::default();

    apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(3, 0.5), &tuning);
    assert!(state.is_dead());

    for tick in 0..10 {
        let with_source = Hit {
            source: Some(Vec2::new(-1.0, 0.0)),
            ..hit(1, 1.0 + tick as f32)
        };
        let outcome = apply_damage(&mut health, &mut state, &mut lock, &profile, &with_source, &tuning);
        assert_eq!(outcome, DamageOutcome::Ignored);
        assert_eq!(state, CombatState::Dead { since: 0.5 });
        assert_eq!(lock, KnockbackLock::default());
    }
}

#[test]
fn test_hurt_does_not_restart_stagger() {
    let profile = ArchetypeProfile::boss();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(100);
    let mut state = CombatState::Chase;
    let mut lock = KnockbackLock::default();

    apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(1, 2.0), &tuning);
    let first = state;
    apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(1, 2.2), &tuning);

    assert_eq!(state, first);
    assert_eq!(
        state,
        CombatState::Hurt {
            until: 2.0 + profile.stagger_duration,
            resume_chase: true,
            pending: None,
        }
    );
    assert_eq!(health.current, 98);
}

#[test]
fn test_hurt_forces_aggro_only_for_flagged_archetype() {
    let tuning = KnockbackTuning::default();
    let mut lock = KnockbackLock::default();

    let stalker = ArchetypeProfile::stalker();
    let mut state = CombatState::Idle;
    let mut health = Health::new(3);
    apply_damage(&mut health, &mut state, &mut lock, &stalker, &hit(1, 0.0), &tuning);
    assert!(matches!(state, CombatState::Hurt { resume_chase: true, .. }));

    let zombie = ArchetypeProfile::zombie();
    let mut state = CombatState::Patrol;
    let mut health = Health::new(3);
    apply_damage(&mut health, &mut state, &mut lock, &zombie, &hit(1, 0.0), &tuning);
    assert!(matches!(state, CombatState::Hurt { resume_chase: false, .. }));

    // Удар посреди атаки: после stagger — обратно в Chase
    let mut state = CombatState::Attack(AttackInProgress {
        kind: AttackKind::Melee,
        started_at: 0.0,
        struck: false,
    });
    apply_damage(&mut health, &mut state, &mut lock, &zombie, &hit(1, 0.1), &tuning);
    assert!(matches!(state, CombatState::Hurt { resume_chase: true, .. }));
}

#[test]
fn test_hit_mid_windup_keeps_pending_strike() {
    let zombie = ArchetypeProfile::zombie();
    let tuning = KnockbackTuning::default();
    let mut lock = KnockbackLock::default();
    let mut health = Health::new(3);
    let windup = AttackInProgress {
        kind: AttackKind::Melee,
        started_at: 0.0,
        struck: false,
    };

    let mut state = CombatState::Attack(windup);
    apply_damage(&mut health, &mut state, &mut lock, &zombie, &hit(1, 0.1), &tuning);
    assert!(matches!(state, CombatState::Hurt { pending: Some(p), .. } if p == windup));

    // Повторный удар в stagger не теряет pending
    apply_damage(&mut health, &mut state, &mut lock, &zombie, &hit(1, 0.2), &tuning);
    assert!(matches!(state, CombatState::Hurt { pending: Some(_), .. }));

    // Strike уже был: нечего доигрывать
    let mut state = CombatState::Attack(AttackInProgress { struck: true, ..windup });
    let mut health = Health::new(3);
    apply_damage(&mut health, &mut state, &mut lock, &zombie, &hit(1, 0.35), &tuning);
    assert!(matches!(state, CombatState::Hurt { pending: None, .. }));
}

#[test]
fn test_knockback_away_from_source_with_lock() {
    let profile = ArchetypeProfile::player();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(5);
    let mut state = CombatState::Idle;
    let mut lock = KnockbackLock::default();

    let from_right = Hit {
        source: Some(Vec2::new(2.0, 0.0)),
        ..hit(1, 3.0)
    };
    let outcome = apply_damage(&mut health, &mut state, &mut lock, &profile, &from_right, &tuning);

    let DamageOutcome::Staggered { knockback: Some(impulse) } = outcome else {
        panic!("expected knockback, got {:?}", outcome);
    };
    assert!(impulse.x < 0.0);
    assert!(impulse.y > 0.0);
    assert!((impulse.length() - tuning.strength).abs() < 1e-4);
    assert!(lock.is_active(3.2));
    assert!(!lock.is_active(3.0 + tuning.lock_duration));
}

#[test]
fn test_killing_blow_has_no_knockback() {
    let profile = ArchetypeProfile::zombie();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(1);
    let mut state = CombatState::Chase;
    let mut lock = KnockbackLock::default();

    let blow = Hit {
        source: Some(Vec2::new(-1.0, 0.0)),
        ..hit(1, 0.0)
    };
    assert_eq!(
        apply_damage(&mut health, &mut state, &mut lock, &profile, &blow, &tuning),
        DamageOutcome::Killed
    );
    assert_eq!(lock.until, None);
}

#[test]
fn test_damage_wakes_dormant_boss() {
    let profile = ArchetypeProfile::boss();
    let tuning = KnockbackTuning::default();
    let mut health = Health::new(100);
    let mut state = CombatState::Dormant;
    let mut lock = KnockbackLock::default();

    apply_damage(&mut health, &mut state, &mut lock, &profile, &hit(1, 0.0), &tuning);
    assert!(!state.is_dormant());
    assert!(matches!(state, CombatState::Hurt { resume_chase: false, .. }));
    assert_eq!(health.current, 99);
}
