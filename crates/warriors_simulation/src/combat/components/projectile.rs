//! Projectile component + contact verdict

use bevy::prelude::*;

use crate::components::Faction;
use crate::physics::{CollisionLayer, ReportContacts};

/// Снаряд (камень босса, копьё игрока)
///
/// Живёт независимо от стрелка: `owner` может быть уже удалён.
/// Инвариант: после первого валидного контакта `spent == true`
/// и снаряд удаляется в том же тике.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(ReportContacts)]
pub struct Projectile {
    pub owner: Option<Entity>,
    pub faction: Faction,
    pub damage: u32,
    pub knockback: bool,
    /// Смещение impact эффекта вперёд по направлению полёта
    pub impact_offset: f32,
    pub expires_at: f32,
    pub spent: bool,
}

/// Что делать с контактом
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactVerdict {
    /// Не детонируем (свой, триггер, пикап, труп, уже spent)
    Ignore,
    /// ApplyDamage + impact + destroy
    Damage,
    /// Террейн: impact + destroy без урона
    Detonate,
}

/// Что известно о втором участнике контакта
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactTarget {
    pub entity: Entity,
    pub layer: Option<CollisionLayer>,
    /// Some — тело живое и принимает ApplyDamage
    pub damageable: Option<Faction>,
}

/// Вердикт для одного контакта
pub fn resolve_contact(projectile: &Projectile, target: &ContactTarget) -> ContactVerdict {
    if projectile.spent || projectile.owner == Some(target.entity) {
        return ContactVerdict::Ignore;
    }

    match target.layer {
        None
        | Some(CollisionLayer::Trigger)
        | Some(CollisionLayer::Pickup)
        | Some(CollisionLayer::Projectile)
        | Some(CollisionLayer::Corpse) => ContactVerdict::Ignore,
        Some(CollisionLayer::Ground) => ContactVerdict::Detonate,
        Some(CollisionLayer::Player) | Some(CollisionLayer::Enemy) => match target.damageable {
            Some(faction) if faction == projectile.faction => ContactVerdict::Ignore,
            Some(_) => ContactVerdict::Damage,
            None => ContactVerdict::Ignore,
        },
    }
}

/// Точка impact эффекта: позиция снаряда + offset вдоль velocity
pub fn impact_point(position: Vec2, velocity: Vec2, impact_offset: f32) -> Vec2 {
    position + velocity.normalize_or_zero() * impact_offset
}
