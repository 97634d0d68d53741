//! Tests for projectile contact verdicts.

use bevy::prelude::*;

use super::projectile::{impact_point, resolve_contact, ContactTarget, ContactVerdict, Projectile};
use crate::components::Faction;
use crate::physics::CollisionLayer;

fn rock(owner: Entity) -> Projectile {
    Projectile {
        owner: Some(owner),
        faction: Faction::Hostile,
        damage: 1,
        knockback: true,
        impact_offset: 0.0,
        expires_at: 4.0,
        spent: false,
    }
}

fn target(index: u32, layer: CollisionLayer, damageable: Option<Faction>) -> ContactTarget {
    ContactTarget {
        entity: Entity::from_raw(index),
        layer: Some(layer),
        damageable,
    }
}

#[test]
fn test_rock_damages_player() {
    let projectile = rock(Entity::from_raw(1));
    let player = target(2, CollisionLayer::Player, Some(Faction::Player));
    assert_eq!(resolve_contact(&projectile, &player), ContactVerdict::Damage);
}

#[test]
fn test_rock_ignores_own_faction_and_owner() {
    let projectile = rock(Entity::from_raw(1));
    let zombie = target(3, CollisionLayer::Enemy, Some(Faction::Hostile));
    let owner = target(1, CollisionLayer::Enemy, Some(Faction::Hostile));
    assert_eq!(resolve_contact(&projectile, &zombie), ContactVerdict::Ignore);
    assert_eq!(resolve_contact(&projectile, &owner), ContactVerdict::Ignore);
}

#[test]
fn test_terrain_detonates_without_damage() {
    let projectile = rock(Entity::from_raw(1));
    let wall = target(4, CollisionLayer::Ground, None);
    assert_eq!(resolve_contact(&projectile, &wall), ContactVerdict::Detonate);
}

#[test]
fn test_trigger_pickup_and_corpse_never_detonate() {
    let projectile = rock(Entity::from_raw(1));
    for layer in [CollisionLayer::Trigger, CollisionLayer::Pickup, CollisionLayer::Corpse] {
        assert_eq!(resolve_contact(&projectile, &target(5, layer, None)), ContactVerdict::Ignore);
    }
}

#[test]
fn test_spent_projectile_ignores_everything() {
    let mut projectile = rock(Entity::from_raw(1));
    projectile.spent = true;
    let player = target(2, CollisionLayer::Player, Some(Faction::Player));
    assert_eq!(resolve_contact(&projectile, &player), ContactVerdict::Ignore);
}

#[test]
fn test_impact_point_at_tip() {
    let point = impact_point(Vec2::new(1.0, 1.0), Vec2::new(-15.0, 0.0), 0.8);
    assert!((point - Vec2::new(0.2, 1.0)).length() < 1e-6);
}
