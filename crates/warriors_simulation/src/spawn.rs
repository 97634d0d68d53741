//! Spawn helpers: акторы, геометрия уровня, пикапы, reference arena
//!
//! Все helpers работают через `Commands`: из системы или через
//! `world.commands()` + `world.flush()` (тесты, CLI runner).

use bevy::prelude::*;
use bevy_rapier2d::prelude::{
    Collider, ColliderMassProperties, ExternalImpulse, GravityScale, LockedAxes, RigidBody, Sensor, Velocity,
};

use crate::ai::{AnimatorFeedback, ArchetypeProfile, AttackCooldown, CombatState, CombatTarget, Senses};
use crate::components::{
    Actor, Archetype, ArenaBounds, Facing, GroundSensor, Health, KnockbackLock, MovementIntent, PatrolRoute,
};
use crate::config::SimConfig;
use crate::physics::{CollisionLayer, Footprint};
use crate::player::{Autopilot, Player};
use crate::score::Coin;
use crate::zone::{Barrier, ZoneTrigger};

pub const BOSS_NAME: &str = "The Overlord";

const COIN_HALF_EXTENTS: Vec2 = Vec2::new(0.25, 0.25);

/// Живой боец по профилю архетипа
///
/// Позиция — центр тела. AI акторы получают target / senses,
/// патрульные — маршрут от точки спавна и арену: маршрут + disengage_range
/// (в Chase дальше не уходят).
pub fn spawn_actor(commands: &mut Commands, profile: &ArchetypeProfile, position: Vec2) -> Entity {
    let archetype = profile.archetype;
    let half = profile.body_half_extents;
    let layer = match archetype {
        Archetype::Player => CollisionLayer::Player,
        _ => CollisionLayer::Enemy,
    };
    let state = if profile.capabilities.starts_dormant {
        CombatState::Dormant
    } else {
        CombatState::rest(profile.capabilities.patrols)
    };

    let mut entity = commands.spawn((
        (
            Name::new(archetype.name()),
            Actor::new(archetype),
            Health::new(profile.max_health),
            *profile,
            state,
            AttackCooldown::default(),
            MovementIntent::default(),
            KnockbackLock::default(),
            GroundSensor {
                foot_offset: Vec2::new(0.0, -half.y),
                ..default()
            },
            Facing::default(),
            Transform::from_translation(position.extend(0.0)),
        ),
        (
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::cuboid(half.x, half.y),
            ColliderMassProperties::Mass(1.0),
            layer.collision_groups(),
            Velocity::zero(),
            ExternalImpulse::default(),
            GravityScale(1.0),
            Footprint::solid(layer, half),
        ),
    ));

    if archetype != Archetype::Player {
        entity.insert((CombatTarget::default(), Senses::default(), AnimatorFeedback::default()));
    }
    if profile.capabilities.patrols {
        entity.insert((
            PatrolRoute::new(position.x, profile.patrol_distance),
            ArenaBounds::around(position.x, profile.patrol_distance + profile.disengage_range),
        ));
    }

    let id = entity.id();
    crate::logger::log(&format!(
        "Spawn: {} {:?} at ({:.1}, {:.1}) state {}",
        archetype.name(),
        id,
        position.x,
        position.y,
        state.name()
    ));
    id
}

/// Игрок: профиль + прыжок, опционально headless autopilot
pub fn spawn_player(commands: &mut Commands, config: &SimConfig, position: Vec2, autopilot: bool) -> Entity {
    let player = spawn_actor(commands, &config.player, position);
    commands.entity(player).insert((Player, config.jump));
    if autopilot {
        commands.entity(player).insert(Autopilot::default());
    }
    player
}

/// Босс: спит до зонного триггера, не покидает арену
pub fn spawn_boss(commands: &mut Commands, config: &SimConfig, position: Vec2, arena: ArenaBounds) -> Entity {
    let boss = spawn_actor(commands, &config.boss, position);
    commands.entity(boss).insert((Name::new(BOSS_NAME), arena));
    boss
}

/// Статичная геометрия: пол, стены, платформы
pub fn spawn_ground(commands: &mut Commands, center: Vec2, half_extents: Vec2) -> Entity {
    commands
        .spawn((
            Transform::from_translation(center.extend(0.0)),
            Footprint::solid(CollisionLayer::Ground, half_extents),
            RigidBody::Fixed,
            Collider::cuboid(half_extents.x, half_extents.y),
            CollisionLayer::Ground.collision_groups(),
        ))
        .id()
}

pub fn spawn_coin(commands: &mut Commands, position: Vec2, value: u32) -> Entity {
    commands
        .spawn((
            Coin { value },
            Transform::from_translation(position.extend(0.0)),
            Footprint::sensor(CollisionLayer::Pickup, COIN_HALF_EXTENTS),
            Collider::cuboid(COIN_HALF_EXTENTS.x, COIN_HALF_EXTENTS.y),
            Sensor,
            CollisionLayer::Pickup.collision_groups(),
        ))
        .id()
}

/// Опущенный барьер (коллайдер появится при срабатывании триггера)
pub fn spawn_barrier(commands: &mut Commands, center: Vec2, half_extents: Vec2) -> Entity {
    commands
        .spawn((Barrier::lowered(half_extents), Transform::from_translation(center.extend(0.0))))
        .id()
}

pub fn spawn_zone_trigger(commands: &mut Commands, trigger: ZoneTrigger) -> Entity {
    let center = trigger.region.center();
    commands
        .spawn((trigger, Transform::from_translation(center.extend(0.0))))
        .id()
}

/// Handles reference arena (для тестов и CLI отчёта)
#[derive(Debug, Clone)]
pub struct ArenaHandles {
    pub player: Entity,
    pub zombies: Vec<Entity>,
    pub stalker: Entity,
    pub boss: Entity,
    pub barrier: Entity,
    pub boss_trigger: Entity,
    pub coins: Vec<Entity>,
}

/// Reference arena: коридор с двумя зомби и сталкером, арена босса в конце
///
/// Пол на y = 0, x ∈ [-40, 40]. Арена босса x ∈ [17, 38]: вход игрока
/// будит босса и поднимает барьер за спиной.
pub fn spawn_reference_arena(commands: &mut Commands, config: &SimConfig, autopilot: bool) -> ArenaHandles {
    spawn_ground(commands, Vec2::new(0.0, -0.5), Vec2::new(40.0, 0.5));
    spawn_ground(commands, Vec2::new(-40.5, 5.0), Vec2::new(0.5, 5.0));
    spawn_ground(commands, Vec2::new(40.5, 5.0), Vec2::new(0.5, 5.0));

    let on_floor = |profile: &ArchetypeProfile, x: f32| Vec2::new(x, profile.body_half_extents.y);

    let player = spawn_player(commands, config, on_floor(&config.player, -30.0), autopilot);
    let zombies = vec![
        spawn_actor(commands, &config.zombie, on_floor(&config.zombie, -18.0)),
        spawn_actor(commands, &config.zombie, on_floor(&config.zombie, -8.0)),
    ];
    let stalker = spawn_actor(commands, &config.stalker, on_floor(&config.stalker, 2.0));
    let boss = spawn_boss(commands, config, on_floor(&config.boss, 28.0), ArenaBounds::new(18.0, 38.0));

    let barrier = spawn_barrier(commands, Vec2::new(15.0, 3.0), Vec2::new(0.5, 3.0));
    let boss_trigger = spawn_zone_trigger(
        commands,
        ZoneTrigger::boss_arena(
            Rect::from_center_half_size(Vec2::new(27.5, 3.0), Vec2::new(10.5, 3.0)),
            boss,
            Some(barrier),
        ),
    );

    let coins = [-24.0, -12.0, -3.0, 8.0]
        .into_iter()
        .map(|x| spawn_coin(commands, Vec2::new(x, 0.5), 1))
        .collect();

    crate::logger::log_info("Spawn: reference arena ready");

    ArenaHandles {
        player,
        zombies,
        stalker,
        boss,
        barrier,
        boss_trigger,
        coins,
    }
}
