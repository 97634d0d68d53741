//! Projectile systems: spawn, contact → detonation, lifetime.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ActiveEvents, Collider, GravityScale, LockedAxes, RigidBody, Sensor, Velocity};

use super::damage::Damageables;
use crate::combat::{impact_point, resolve_contact, ContactTarget, ContactVerdict, Projectile, ProjectileTemplate};
use crate::components::Faction;
use crate::physics::{CollisionLayer, ContactStarted, Footprint, PhysicsWorld, SceneQueries};
use crate::session::{spawn_effect, EffectKind};
use crate::timer::SimClock;

/// Спавн снаряда: velocity = dir × speed, поворот по velocity
///
/// Sensor коллайдер: снаряд ничего не толкает, только сообщает о контактах.
pub fn spawn_projectile(
    commands: &mut Commands,
    template: &ProjectileTemplate,
    owner: Option<Entity>,
    faction: Faction,
    fire_point: Vec2,
    direction: Vec2,
    now: f32,
) -> Entity {
    let velocity = direction.normalize_or_zero() * template.speed;
    let angle = velocity.y.atan2(velocity.x);
    let half = template.half_extents;

    commands
        .spawn((
            Projectile {
                owner,
                faction,
                damage: template.damage,
                knockback: template.knockback,
                impact_offset: template.impact_offset,
                expires_at: now + template.lifetime,
                spent: false,
            },
            Transform::from_translation(fire_point.extend(0.0)).with_rotation(Quat::from_rotation_z(angle)),
            Footprint::sensor(CollisionLayer::Projectile, half),
            RigidBody::Dynamic,
            Collider::cuboid(half.x, half.y),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            CollisionLayer::Projectile.collision_groups(),
            LockedAxes::ROTATION_LOCKED,
            Velocity::linear(velocity),
            GravityScale(template.gravity_scale),
        ))
        .id()
}

/// System: первый валидный контакт → урон / детонация → impact + destroy
///
/// Контакты обрабатываются в детерминированном порядке (reporter, other).
/// `spent` гарантирует единственную детонацию, даже если в одном тике
/// снаряд коснулся нескольких тел.
pub fn process_projectile_contacts(
    mut commands: Commands,
    mut contacts: EventReader<ContactStarted>,
    mut projectiles: Query<(&mut Projectile, &Transform, &Velocity)>,
    scene: SceneQueries,
    mut damageables: Damageables,
    clock: Res<SimClock>,
) {
    let mut pending: Vec<ContactStarted> = contacts.read().copied().collect();
    pending.sort_by_key(|contact| (contact.reporter, contact.other));

    for contact in pending {
        let Ok((mut projectile, transform, velocity)) = projectiles.get_mut(contact.reporter) else {
            continue;
        };

        let target = ContactTarget {
            entity: contact.other,
            layer: scene.layer_of(contact.other),
            damageable: damageables.faction_if_alive(contact.other),
        };

        let verdict = resolve_contact(&projectile, &target);
        if verdict == ContactVerdict::Ignore {
            continue;
        }

        let position = transform.translation.truncate();
        if verdict == ContactVerdict::Damage {
            damageables.apply(
                contact.other,
                projectile.damage,
                projectile.knockback.then_some(position),
                projectile.owner,
            );
        }

        projectile.spent = true;
        let point = impact_point(position, velocity.linvel, projectile.impact_offset);
        crate::logger::log(&format!(
            "Projectile: {:?} {:?} on {:?} at {:?}",
            contact.reporter, verdict, contact.other, point
        ));

        spawn_effect(&mut commands, EffectKind::Impact, point, clock.now());
        commands.entity(contact.reporter).despawn();
    }
}

/// System: снаряды без попадания удаляются по истечении lifetime
pub fn expire_projectiles(mut commands: Commands, projectiles: Query<(Entity, &Projectile)>, clock: Res<SimClock>) {
    let now = clock.now();

    for (entity, projectile) in projectiles.iter() {
        if !projectile.spent && now >= projectile.expires_at {
            crate::logger::log(&format!("Projectile: {:?} expired", entity));
            commands.entity(entity).despawn();
        }
    }
}
