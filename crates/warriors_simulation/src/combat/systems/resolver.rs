//! Attack Resolver: strike instant → hit volume / projectile.
//!
//! Читает `StrikeRequest` (FSM и player controls пишут их в SimSet::Decide)
//! и разрешает каждый в этом же тике, в порядке записи.

use bevy::prelude::*;

use super::damage::Damageables;
use super::projectile::spawn_projectile;
use crate::combat::{AimMode, AttackDelivery, StrikeRequest};
use crate::components::{Actor, Facing};
use crate::physics::{LayerMask, PhysicsWorld, SceneQueries};
use crate::timer::SimClock;

/// Точка относительно тела с флипом X по facing
pub fn facing_offset(position: Vec2, offset: Vec2, facing: f32) -> Vec2 {
    position + Vec2::new(offset.x * facing, offset.y)
}

/// Направление выстрела (None — целиться не во что)
pub fn aim_direction(aim: AimMode, fire_point: Vec2, facing: f32, target: Option<Vec2>) -> Option<Vec2> {
    match aim {
        AimMode::Facing => Some(Vec2::new(facing, 0.0)),
        AimMode::AtTarget => target.and_then(|t| (t - fire_point).try_normalize()),
    }
}

/// System: разрешение strike instants
///
/// Melee: все живые тела другой фракции в круге (без single-target cap).
/// Ranged: снаряд из fire point к текущей позиции цели.
/// Атакующий, убитый раньше в этом тике, не бьёт.
pub fn resolve_strikes(
    mut commands: Commands,
    mut strikes: EventReader<StrikeRequest>,
    scene: SceneQueries,
    mut damageables: Damageables,
    attackers: Query<(&Transform, &Facing, &Actor)>,
    positions: Query<&Transform>,
    clock: Res<SimClock>,
) {
    let now = clock.now();

    for strike in strikes.read() {
        let Ok((transform, facing, actor)) = attackers.get(strike.attacker) else {
            continue;
        };
        if !damageables.is_alive(strike.attacker) {
            crate::logger::log(&format!("Resolver: {:?} died before its strike", strike.attacker));
            continue;
        }

        let position = transform.translation.truncate();
        let attack = &strike.attack;

        match attack.delivery {
            AttackDelivery::Volume { radius, offset } => {
                let center = facing_offset(position, offset, facing.sign());
                let hits = scene.overlap_circle(center, radius, LayerMask::ACTORS, Some(strike.attacker));

                crate::logger::log(&format!(
                    "Resolver: {:?} {:?} strike at {:?}, {} bodies in volume",
                    strike.attacker,
                    attack.kind,
                    center,
                    hits.len()
                ));

                for target in hits {
                    match damageables.faction_if_alive(target) {
                        Some(faction) if faction != actor.faction => {
                            damageables.apply(
                                target,
                                attack.damage,
                                attack.knockback.then_some(position),
                                Some(strike.attacker),
                            );
                        }
                        _ => {}
                    }
                }
            }
            AttackDelivery::Projectile(template) => {
                let fire_point = facing_offset(position, template.fire_offset, facing.sign());
                let target = strike
                    .target
                    .and_then(|t| positions.get(t).ok())
                    .map(|t| t.translation.truncate());

                let Some(direction) = aim_direction(template.aim, fire_point, facing.sign(), target) else {
                    crate::logger::log(&format!("Resolver: {:?} has nothing to aim at", strike.attacker));
                    continue;
                };

                let projectile = spawn_projectile(
                    &mut commands,
                    &template,
                    Some(strike.attacker),
                    actor.faction,
                    fire_point,
                    direction,
                    now,
                );
                crate::logger::log(&format!(
                    "Resolver: {:?} fired {:?} towards {:?}",
                    strike.attacker, projectile, direction
                ));
            }
        }
    }
}
