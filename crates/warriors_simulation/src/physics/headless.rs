//! Headless backend (без rapier)
//!
//! Интеграция velocity → Transform, импульсы (масса = 1), gravity,
//! snap на платформы и выталкивание из стен по Footprint AABB,
//! синтез contact событий для тел с `ReportContacts`.
//!
//! Детерминизм: fixed timestep + сортировка по Entity везде где важен порядок.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ExternalImpulse, GravityScale, Velocity};

use super::collision::{CollisionLayer, Footprint, LayerMask};
use super::world::{PhysicsBackend, PhysicsWorld, SceneQueries};
use super::{ContactStarted, ReportContacts};

/// Гравитация headless backend (m/s²)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct HeadlessGravity(pub f32);

impl Default for HeadlessGravity {
    fn default() -> Self {
        Self(-9.81)
    }
}

/// Run condition: выбран headless backend
pub fn headless_backend(backend: Res<PhysicsBackend>) -> bool {
    *backend == PhysicsBackend::Headless
}

/// Максимальная глубина, с которой тело ещё "встаёт" на платформу сверху
const SNAP_TOLERANCE: f32 = 0.25;

/// System: интеграция динамических тел
///
/// Порядок: gravity → impulse → position → snap на пол → выталкивание из стен.
pub fn integrate_bodies(
    mut bodies: Query<(
        &mut Transform,
        &mut Velocity,
        Option<&mut ExternalImpulse>,
        Option<&GravityScale>,
        Option<&Footprint>,
    )>,
    geometry: Query<(&Transform, &Footprint), Without<Velocity>>,
    gravity: Res<HeadlessGravity>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    let ground: Vec<(Vec2, Vec2)> = geometry
        .iter()
        .filter(|(_, footprint)| footprint.layer == CollisionLayer::Ground && !footprint.sensor)
        .map(|(transform, footprint)| (transform.translation.truncate(), footprint.half_extents))
        .collect();

    for (mut transform, mut velocity, impulse, gravity_scale, footprint) in bodies.iter_mut() {
        let scale = gravity_scale.map_or(1.0, |g| g.0);
        velocity.linvel.y += gravity.0 * scale * delta;

        if let Some(mut impulse) = impulse {
            // Масса 1 → Δv = impulse
            velocity.linvel += impulse.impulse;
            impulse.impulse = Vec2::ZERO;
        }

        let previous = transform.translation.truncate();
        let mut position = previous + velocity.linvel * delta;

        if let Some(footprint) = footprint.filter(|fp| !fp.sensor) {
            let half = footprint.half_extents;
            for (ground_center, ground_half) in &ground {
                let dx = position.x - ground_center.x;
                if dx.abs() >= half.x + ground_half.x {
                    continue;
                }
                let top = ground_center.y + ground_half.y;
                let bottom = position.y - half.y;
                let previous_bottom = previous.y - half.y;

                if velocity.linvel.y <= 0.0 && bottom < top && previous_bottom >= top - SNAP_TOLERANCE {
                    // Приземление / стоим на платформе
                    position.y = top + half.y;
                    velocity.linvel.y = 0.0;
                } else if (position.y - ground_center.y).abs() < half.y + ground_half.y - SNAP_TOLERANCE {
                    // Стена: выталкиваем по X туда, откуда пришли
                    let side = if previous.x < ground_center.x { -1.0 } else { 1.0 };
                    position.x = ground_center.x + side * (ground_half.x + half.x);
                    velocity.linvel.x = 0.0;
                }
            }
        }

        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// System: синтез контактов для `ReportContacts` тел (снаряды)
///
/// Эмитит по одному событию на каждое пересечённое тело за тик; снаряд сам
/// решает какой контакт валиден и гарантирует единственную детонацию.
pub fn synthesize_contacts(
    reporters: Query<(Entity, &Transform, &Footprint), With<ReportContacts>>,
    scene: SceneQueries,
    mut contacts: EventWriter<ContactStarted>,
) {
    let mut sorted: Vec<_> = reporters.iter().collect();
    sorted.sort_by_key(|(entity, _, _)| *entity);

    for (entity, transform, footprint) in sorted {
        let center = transform.translation.truncate();
        let hits = scene.overlap_box(
            center,
            footprint.half_extents,
            LayerMask::GROUND | LayerMask::ACTORS,
            Some(entity),
        );
        for other in hits {
            contacts.write(ContactStarted {
                reporter: entity,
                other,
                point: center,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn physics_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .insert_resource(bevy::time::TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
            .init_resource::<HeadlessGravity>()
            .add_systems(FixedUpdate, integrate_bodies);
        app
    }

    fn spawn_floor(app: &mut App) {
        app.world_mut().spawn((
            Transform::from_xyz(0.0, -0.5, 0.0),
            Footprint::solid(CollisionLayer::Ground, Vec2::new(20.0, 0.5)),
        ));
    }

    #[test]
    fn test_body_falls_and_lands_on_floor() {
        let mut app = physics_app();
        spawn_floor(&mut app);
        let body = app
            .world_mut()
            .spawn((
                Transform::from_xyz(0.0, 3.0, 0.0),
                Velocity::zero(),
                Footprint::solid(CollisionLayer::Player, Vec2::new(0.4, 0.9)),
            ))
            .id();

        for _ in 0..240 {
            app.update();
        }

        let transform = app.world().get::<Transform>(body).unwrap();
        let velocity = app.world().get::<Velocity>(body).unwrap();
        assert!((transform.translation.y - 0.9).abs() < 1e-4, "y = {}", transform.translation.y);
        assert_eq!(velocity.linvel.y, 0.0);
    }

    #[test]
    fn test_impulse_consumed_once() {
        let mut app = physics_app();
        let body = app
            .world_mut()
            .spawn((
                Transform::default(),
                Velocity::zero(),
                GravityScale(0.0),
                ExternalImpulse {
                    impulse: Vec2::new(3.0, 0.0),
                    torque_impulse: 0.0,
                },
            ))
            .id();

        for _ in 0..10 {
            app.update();
        }

        let velocity = app.world().get::<Velocity>(body).unwrap();
        let impulse = app.world().get::<ExternalImpulse>(body).unwrap();
        assert_eq!(velocity.linvel, Vec2::new(3.0, 0.0));
        assert_eq!(impulse.impulse, Vec2::ZERO);
    }
}
