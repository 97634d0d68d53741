//! AI perception: выбор цели + scene queries (стены, обрывы).

use bevy::prelude::*;

use crate::ai::{ArchetypeProfile, CombatState, CombatTarget, Senses};
use crate::components::{Actor, Facing, GroundSensor, PatrolRoute};
use crate::physics::{LayerMask, PhysicsWorld, SceneQueries};

/// Насколько далеко за краем тела проверяется пол под следующим шагом
const LEDGE_PROBE_AHEAD: f32 = 0.3;
const LEDGE_PROBE_DEPTH: f32 = 1.0;

/// System: цель = ближайший живой актор другой фракции
///
/// Порядок кандидатов детерминирован (дистанция, затем Entity).
pub fn acquire_targets(
    mut seekers: Query<(Entity, &Actor, &Transform, &CombatState, &mut CombatTarget)>,
    candidates: Query<(Entity, &Actor, &Transform, &CombatState)>,
) {
    for (entity, actor, transform, state, mut target) in seekers.iter_mut() {
        if state.is_dead() {
            target.0 = None;
            continue;
        }
        let position = transform.translation.truncate();

        let nearest = candidates
            .iter()
            .filter(|(other, other_actor, _, other_state)| {
                *other != entity && other_actor.faction != actor.faction && !other_state.is_dead()
            })
            .map(|(other, _, other_transform, _)| {
                (other, position.distance_squared(other_transform.translation.truncate()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(other, _)| other);

        if target.0 != nearest {
            crate::logger::log(&format!("AI: {:?} target {:?} → {:?}", entity, target.0, nearest));
            target.0 = nearest;
        }
    }
}

/// System: стена по направлению патруля, обрыв по направлению к цели
pub fn sense_surroundings(
    scene: SceneQueries,
    mut actors: Query<(
        Entity,
        &Transform,
        &ArchetypeProfile,
        &Facing,
        &CombatTarget,
        Option<&PatrolRoute>,
        Option<&GroundSensor>,
        &mut Senses,
    )>,
    positions: Query<&Transform>,
) {
    for (entity, transform, profile, facing, target, route, sensor, mut senses) in actors.iter_mut() {
        let position = transform.translation.truncate();
        let half = profile.body_half_extents;

        // Стена
        let walk_dir = route.map_or(facing.sign(), |r| r.dir);
        let wall_ahead = profile.wall_check_distance > 0.0
            && scene
                .cast_ray(
                    position + Vec2::new(walk_dir * half.x, 0.0),
                    Vec2::new(walk_dir, 0.0),
                    profile.wall_check_distance,
                    LayerMask::GROUND,
                    Some(entity),
                )
                .is_some();

        // Обрыв (только на земле и только для тех, кто их избегает)
        let grounded = sensor.is_some_and(|s| s.grounded);
        let ledge_ahead = profile.capabilities.avoids_ledges && grounded && {
            let dir = target
                .0
                .and_then(|t| positions.get(t).ok())
                .map(|t| t.translation.x - position.x)
                .filter(|dx| *dx != 0.0)
                .map_or(facing.sign(), f32::signum);
            let foot_y = position.y - half.y + 0.1;
            let probe = Vec2::new(position.x + dir * (half.x + LEDGE_PROBE_AHEAD), foot_y);
            scene
                .cast_ray(probe, Vec2::NEG_Y, LEDGE_PROBE_DEPTH, LayerMask::GROUND, Some(entity))
                .is_none()
        };

        let next = Senses {
            wall_ahead,
            ledge_ahead,
        };
        if *senses != next {
            *senses = next;
        }
    }
}
