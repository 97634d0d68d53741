//! Movement Controller: intent → horizontal velocity
//!
//! # Architecture
//!
//! `resolve_intent` — чистая функция (тестируется без App).
//! `resolve_movement` — system: ground probe через `PhysicsWorld`,
//! knockback lock, прыжок с coyote time, запись `Velocity`.
//!
//! Вертикальная velocity принадлежит физике: controller меняет её только
//! при прыжке.

use bevy::prelude::*;
use bevy_rapier2d::prelude::Velocity;
use serde::{Deserialize, Serialize};

use crate::ai::CombatState;
use crate::components::{ArenaBounds, Facing, GroundSensor, KnockbackLock, MovementIntent};
use crate::physics::{probe_ground, SceneQueries};
use crate::timer::SimClock;

/// Прыжок (есть только у игрока)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct JumpTuning {
    pub velocity: f32,
    /// Окно после схода с платформы, в котором прыжок ещё разрешён
    pub coyote_time: f32,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            velocity: 12.0,
            coyote_time: 0.1,
        }
    }
}

/// Горизонтальная velocity для intent + разворот facing
///
/// Возвращает новую velocity (vy сохраняется). Facing:
/// - `intent.face` (разворот к цели) приоритетнее знака движения
/// - иначе разворот по знаку горизонтального движения
pub fn resolve_intent(
    intent: &MovementIntent,
    velocity: Vec2,
    x: f32,
    bounds: Option<&ArenaBounds>,
    facing: &mut Facing,
) -> Vec2 {
    let mut direction = if intent.is_moving() { intent.direction.signum() } else { 0.0 };

    if let Some(bounds) = bounds {
        if !bounds.allows(x, direction) {
            direction = 0.0;
        }
    }

    match intent.face {
        Some(face) => {
            facing.turn_toward(face);
        }
        None => {
            facing.turn_toward(direction);
        }
    }

    Vec2::new(direction * intent.speed, velocity.y)
}

/// Coyote time: прыжок разрешён на земле или в течение окна после схода
pub fn can_jump(sensor: &GroundSensor, tuning: &JumpTuning, now: f32) -> bool {
    sensor.grounded
        || sensor
            .last_grounded_at
            .is_some_and(|at| now - at <= tuning.coyote_time)
}

/// System: Resolve() для всех живых тел
///
/// Тела без `CombatState` считаются живыми.
pub fn resolve_movement(
    clock: Res<SimClock>,
    scene: SceneQueries,
    mut bodies: Query<(
        Entity,
        &Transform,
        &MovementIntent,
        &mut Velocity,
        &mut Facing,
        &mut GroundSensor,
        &mut KnockbackLock,
        Option<&ArenaBounds>,
        Option<&JumpTuning>,
        Option<&CombatState>,
    )>,
) {
    let now = clock.now();

    for (entity, transform, intent, mut velocity, mut facing, mut sensor, mut lock, bounds, jump, state) in
        bodies.iter_mut()
    {
        // Dead игнорирует любые intents
        if state.is_some_and(|s| s.is_dead()) {
            continue;
        }
        let position = transform.translation.truncate();

        // (a) ground contact
        sensor.grounded = probe_ground(
            &scene,
            entity,
            position + sensor.foot_offset,
            sensor.radius,
            sensor.ray_length,
            velocity.linvel.y,
        );
        if sensor.grounded {
            sensor.last_grounded_at = Some(now);
        }

        if lock.release_if_due(now) {
            crate::logger::log(&format!("Movement: knockback lock released for {:?}", entity));
        }
        if lock.is_active(now) {
            // Физика сама ведёт тело до конца lock
            continue;
        }

        // (b)-(d) velocity, bounds, facing
        let mut linvel = resolve_intent(intent, velocity.linvel, position.x, bounds, &mut facing);

        if let Some(tuning) = jump {
            if intent.jump && can_jump(&sensor, tuning, now) {
                linvel.y = tuning.velocity;
                sensor.grounded = false;
                sensor.last_grounded_at = None;
            }
        }

        velocity.linvel = linvel;
    }
}
