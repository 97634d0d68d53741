//! Zone triggers: одноразовые пространственные гейты
//!
//! Игрок входит в регион → эффекты срабатывают ровно один раз:
//! - `WakeBoss` — Activate() на спящем боссе (+ boss bar через `EntityActivated`)
//! - `RaiseBarrier` — включает коллайдер барьера (стена арены / путь назад)
//!
//! Path activator — триггер с одним `RaiseBarrier`, удаляется после срабатывания.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, RigidBody};

use crate::ai::{ArchetypeProfile, CombatState, EntityActivated};
use crate::components::{Actor, Faction, Health};
use crate::physics::{CollisionLayer, Footprint};
use crate::SimSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEffect {
    WakeBoss(Entity),
    RaiseBarrier(Entity),
}

#[derive(Component, Debug, Clone)]
pub struct ZoneTrigger {
    /// Регион в world space
    pub region: Rect,
    pub effects: Vec<ZoneEffect>,
    /// Удалить триггер после срабатывания (path activator)
    pub consume: bool,
    pub fired: bool,
}

impl ZoneTrigger {
    /// Триггер арены босса: будит босса и закрывает выход
    pub fn boss_arena(region: Rect, boss: Entity, barrier: Option<Entity>) -> Self {
        let mut effects = vec![ZoneEffect::WakeBoss(boss)];
        effects.extend(barrier.map(ZoneEffect::RaiseBarrier));
        Self {
            region,
            effects,
            consume: false,
            fired: false,
        }
    }

    pub fn path_activator(region: Rect, barrier: Entity) -> Self {
        Self {
            region,
            effects: vec![ZoneEffect::RaiseBarrier(barrier)],
            consume: true,
            fired: false,
        }
    }

    /// Тело (центр + half extents) пересекает регион
    pub fn contains(&self, center: Vec2, half_extents: Vec2) -> bool {
        let delta = (center - self.region.center()).abs();
        let reach = self.region.half_size() + half_extents;
        delta.x <= reach.x && delta.y <= reach.y
    }
}

/// Барьер: опущен (без коллайдера) до срабатывания триггера
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Barrier {
    pub half_extents: Vec2,
    pub raised: bool,
}

impl Barrier {
    pub fn lowered(half_extents: Vec2) -> Self {
        Self {
            half_extents,
            raised: false,
        }
    }
}

/// System: вход игрока в регион → эффекты (один раз)
pub fn fire_zone_triggers(
    mut commands: Commands,
    mut triggers: Query<(Entity, &mut ZoneTrigger)>,
    players: Query<(&Actor, &Transform, &Footprint, &Health)>,
    mut sleepers: Query<(&mut CombatState, &ArchetypeProfile)>,
    mut barriers: Query<&mut Barrier>,
    mut activated: EventWriter<EntityActivated>,
) {
    for (trigger_entity, mut trigger) in triggers.iter_mut() {
        if trigger.fired {
            continue;
        }

        let entered = players.iter().any(|(actor, transform, footprint, health)| {
            actor.faction == Faction::Player
                && health.is_alive()
                && trigger.contains(transform.translation.truncate(), footprint.half_extents)
        });
        if !entered {
            continue;
        }

        trigger.fired = true;
        crate::logger::log_info(&format!("Zone: {:?} fired", trigger_entity));

        for effect in trigger.effects.iter().copied() {
            match effect {
                ZoneEffect::WakeBoss(boss) => {
                    let Ok((mut state, profile)) = sleepers.get_mut(boss) else {
                        crate::logger::log_warning(&format!("Zone: boss {:?} missing", boss));
                        continue;
                    };
                    if state.activate(profile.capabilities.patrols) {
                        crate::logger::log_info(&format!("Zone: {:?} activated", boss));
                        activated.write(EntityActivated {
                            entity: boss,
                            by: None,
                        });
                    }
                }
                ZoneEffect::RaiseBarrier(barrier_entity) => {
                    let Ok(mut barrier) = barriers.get_mut(barrier_entity) else {
                        crate::logger::log_warning(&format!("Zone: barrier {:?} missing", barrier_entity));
                        continue;
                    };
                    if barrier.raised {
                        continue;
                    }
                    barrier.raised = true;
                    let half = barrier.half_extents;
                    commands.entity(barrier_entity).insert((
                        Footprint::solid(CollisionLayer::Ground, half),
                        RigidBody::Fixed,
                        Collider::cuboid(half.x, half.y),
                        CollisionLayer::Ground.collision_groups(),
                    ));
                    crate::logger::log_info(&format!("Zone: barrier {:?} raised", barrier_entity));
                }
            }
        }

        if trigger.consume {
            commands.entity(trigger_entity).despawn();
        }
    }
}

/// Zone Plugin
pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, fire_zone_triggers.in_set(SimSet::World));
    }
}
