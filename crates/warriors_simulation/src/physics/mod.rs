//! Physics World Adapter
//!
//! Тела, коллайдеры и интеграция — bevy_rapier2d (или headless backend).
//! Логика боя видит физику только через `PhysicsWorld` + rapier компоненты
//! `Velocity` / `ExternalImpulse`.
//!
//! - collision: слои, маски, footprint геометрия
//! - world: `PhysicsWorld` trait, `SceneQueries`, ground probe
//! - headless: интеграция и контакты без rapier

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;

use crate::SimSet;

pub mod collision;
pub mod headless;
pub mod world;

pub use collision::{CollisionLayer, Footprint, LayerMask};
pub use headless::HeadlessGravity;
pub use world::{probe_ground, PhysicsBackend, PhysicsWorld, RayHit, SceneQueries};

/// Маркер: тело хочет получать `ContactStarted` (снаряды)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ReportContacts;

/// Event: `reporter` впервые коснулся `other` в точке `point`
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContactStarted {
    pub reporter: Entity,
    pub other: Entity,
    pub point: Vec2,
}

/// Run condition: выбран rapier backend
pub fn rapier_backend(backend: Res<PhysicsBackend>) -> bool {
    *backend == PhysicsBackend::Rapier
}

/// System: rapier `CollisionEvent::Started` → `ContactStarted`
///
/// Sensor коллайдеры не дают точку контакта, берём позицию reporter'а.
pub fn collect_rapier_contacts(
    mut collisions: EventReader<CollisionEvent>,
    reporters: Query<&Transform, With<ReportContacts>>,
    mut contacts: EventWriter<ContactStarted>,
) {
    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = event else {
            continue;
        };

        for (reporter, other) in [(*a, *b), (*b, *a)] {
            if let Ok(transform) = reporters.get(reporter) {
                contacts.write(ContactStarted {
                    reporter,
                    other,
                    point: transform.translation.truncate(),
                });
            }
        }
    }
}

/// Plugin: physics adapter (backend resource, контакты, headless интеграция)
///
/// RapierPhysicsPlugin хост добавляет сам (и выставляет `PhysicsBackend::Rapier`).
pub struct PhysicsAdapterPlugin;

impl Plugin for PhysicsAdapterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsBackend>()
            .init_resource::<HeadlessGravity>()
            .add_event::<ContactStarted>()
            // Events<CollisionEvent> нужен системе и без RapierPhysicsPlugin
            .add_event::<CollisionEvent>()
            .add_systems(
                FixedUpdate,
                (
                    headless::synthesize_contacts.run_if(headless::headless_backend),
                    collect_rapier_contacts.run_if(rapier_backend),
                )
                    .in_set(SimSet::Contacts),
            )
            .add_systems(
                FixedUpdate,
                headless::integrate_bodies
                    .run_if(headless::headless_backend)
                    .in_set(SimSet::Integrate),
            );
    }
}
