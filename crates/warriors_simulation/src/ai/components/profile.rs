//! Archetype profiles: один FSM, разные параметры + capability flags

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::{AttackDefinition, AttackDelivery, AttackKind, ProjectileTemplate};
use crate::components::Archetype;

/// Вертикальная "trench" зона босса
///
/// diff_y = attacker.y - target.y:
/// - diff_y > safe_height → trench (цель недостижима, босс ждёт)
/// - diff_y > -melee_reach_below → melee-reachable
/// - иначе только ranged
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct VerticalSafeZone {
    pub safe_height: f32,
    pub melee_reach_below: f32,
}

/// Вертикальная классификация цели
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalBand {
    Trench,
    MeleeReachable,
    RangedOnly,
}

impl VerticalSafeZone {
    pub fn classify(&self, diff_y: f32) -> VerticalBand {
        if diff_y > self.safe_height {
            VerticalBand::Trench
        } else if diff_y > -self.melee_reach_below {
            VerticalBand::MeleeReachable
        } else {
            VerticalBand::RangedOnly
        }
    }
}

/// Что умеет архетип (включённые состояния / guards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Chase → Patrol/Idle когда цель дальше disengage_range
    pub can_disengage: bool,
    pub vertical_safe_zone: Option<VerticalSafeZone>,
    /// Melee ближе strike range, ranged дальше (босс)
    pub dual_attack_mode: bool,
    /// После Hurt всегда Chase, независимо от дистанции
    pub hurt_forces_aggro: bool,
    pub starts_dormant: bool,
    /// Не шагать туда, где нет пола
    pub avoids_ledges: bool,
    /// Rest state = Patrol (иначе Idle)
    pub patrols: bool,
    /// Стоять на месте пока презентация играет attack clip
    pub waits_for_attack_clip: bool,
}

/// Параметры архетипа (копия из SimConfig на каждом entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ArchetypeProfile {
    pub archetype: Archetype,
    pub max_health: u32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Idle/Patrol → Chase ближе этой дистанции
    pub aggro_range: f32,
    /// Chase → rest дальше этой дистанции (только can_disengage)
    pub disengage_range: f32,
    /// Dual mode: ближе этой дистанции босс идёт на melee, дальше — ranged
    pub melee_engage_range: f32,
    /// Половина патрульного маршрута от точки спавна
    pub patrol_distance: f32,
    pub wall_check_distance: f32,
    pub melee: Option<AttackDefinition>,
    pub ranged: Option<AttackDefinition>,
    pub stagger_duration: f32,
    /// None — тело не удаляется после смерти (игрок)
    pub removal_delay: Option<f32>,
    pub body_half_extents: Vec2,
    pub capabilities: Capabilities,
}

impl ArchetypeProfile {
    pub fn attack(&self, kind: AttackKind) -> Option<&AttackDefinition> {
        match kind {
            AttackKind::Melee => self.melee.as_ref(),
            AttackKind::Ranged => self.ranged.as_ref(),
        }
    }

    /// Укус при контакте (zombie / stalker)
    fn contact_bite() -> AttackDefinition {
        AttackDefinition {
            kind: AttackKind::Melee,
            damage: 1,
            cooldown: 1.5,
            strike_delay: 0.3,
            total_duration: 0.4,
            range: 1.0,
            roots_attacker: true,
            knockback: true,
            delivery: AttackDelivery::Volume {
                radius: 0.7,
                offset: Vec2::new(0.5, 0.0),
            },
        }
    }

    pub fn zombie() -> Self {
        Self {
            archetype: Archetype::Zombie,
            max_health: 3,
            patrol_speed: 2.0,
            chase_speed: 2.0,
            aggro_range: 2.0,
            disengage_range: 3.0,
            melee_engage_range: 0.0,
            patrol_distance: 3.0,
            wall_check_distance: 0.5,
            melee: Some(Self::contact_bite()),
            ranged: None,
            stagger_duration: 0.3,
            removal_delay: Some(2.0),
            body_half_extents: Vec2::new(0.4, 0.9),
            capabilities: Capabilities {
                can_disengage: true,
                patrols: true,
                ..Default::default()
            },
        }
    }

    pub fn stalker() -> Self {
        Self {
            archetype: Archetype::Stalker,
            max_health: 3,
            patrol_speed: 0.0,
            chase_speed: 6.0,
            aggro_range: 5.0,
            disengage_range: 0.0,
            melee_engage_range: 0.0,
            patrol_distance: 0.0,
            wall_check_distance: 0.5,
            melee: Some(Self::contact_bite()),
            ranged: None,
            stagger_duration: 0.3,
            removal_delay: Some(2.0),
            body_half_extents: Vec2::new(0.4, 0.9),
            capabilities: Capabilities {
                hurt_forces_aggro: true,
                avoids_ledges: true,
                ..Default::default()
            },
        }
    }

    pub fn boss() -> Self {
        Self {
            archetype: Archetype::Boss,
            max_health: 100,
            patrol_speed: 0.0,
            chase_speed: 3.0,
            aggro_range: 15.0,
            disengage_range: 0.0,
            melee_engage_range: 8.0,
            patrol_distance: 0.0,
            wall_check_distance: 0.5,
            melee: Some(AttackDefinition {
                kind: AttackKind::Melee,
                damage: 20,
                cooldown: 2.0,
                strike_delay: 0.5,
                total_duration: 1.0,
                range: 2.5,
                roots_attacker: true,
                knockback: true,
                delivery: AttackDelivery::Volume {
                    radius: 1.5,
                    offset: Vec2::new(1.5, 0.0),
                },
            }),
            ranged: Some(AttackDefinition {
                kind: AttackKind::Ranged,
                damage: 1,
                cooldown: 3.5,
                strike_delay: 0.6,
                total_duration: 1.0,
                range: 15.0,
                roots_attacker: true,
                knockback: true,
                delivery: AttackDelivery::Projectile(ProjectileTemplate::boss_rock()),
            }),
            stagger_duration: 0.4,
            removal_delay: Some(3.0),
            body_half_extents: Vec2::new(1.0, 1.5),
            capabilities: Capabilities {
                vertical_safe_zone: Some(VerticalSafeZone {
                    safe_height: 3.0,
                    melee_reach_below: 3.0,
                }),
                dual_attack_mode: true,
                starts_dormant: true,
                waits_for_attack_clip: true,
                ..Default::default()
            },
        }
    }

    /// Игрок: FSM решения принимает input, профиль даёт здоровье и атаки
    pub fn player() -> Self {
        Self {
            archetype: Archetype::Player,
            max_health: 5,
            patrol_speed: 0.0,
            chase_speed: 8.0,
            aggro_range: 0.0,
            disengage_range: 0.0,
            melee_engage_range: 0.0,
            patrol_distance: 0.0,
            wall_check_distance: 0.0,
            melee: Some(AttackDefinition {
                kind: AttackKind::Melee,
                damage: 1,
                cooldown: 0.4,
                strike_delay: 0.15,
                total_duration: 0.3,
                range: 1.2,
                roots_attacker: false,
                knockback: false,
                delivery: AttackDelivery::Volume {
                    radius: 0.8,
                    offset: Vec2::new(0.8, 0.0),
                },
            }),
            ranged: Some(AttackDefinition {
                kind: AttackKind::Ranged,
                damage: 1,
                cooldown: 0.6,
                strike_delay: 0.1,
                total_duration: 0.25,
                range: 100.0,
                roots_attacker: false,
                knockback: false,
                delivery: AttackDelivery::Projectile(ProjectileTemplate::spear()),
            }),
            stagger_duration: 0.2,
            removal_delay: None,
            body_half_extents: Vec2::new(0.4, 0.9),
            capabilities: Capabilities::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_bands() {
        let zone = VerticalSafeZone {
            safe_height: 3.0,
            melee_reach_below: 3.0,
        };
        assert_eq!(zone.classify(3.5), VerticalBand::Trench);
        assert_eq!(zone.classify(3.0), VerticalBand::MeleeReachable);
        assert_eq!(zone.classify(-2.9), VerticalBand::MeleeReachable);
        assert_eq!(zone.classify(-3.0), VerticalBand::RangedOnly);
    }

    #[test]
    fn test_boss_ranged_cooldown_longer_than_melee() {
        let boss = ArchetypeProfile::boss();
        let melee = boss.attack(AttackKind::Melee).map(|a| a.cooldown);
        let ranged = boss.attack(AttackKind::Ranged).map(|a| a.cooldown);
        assert_eq!(melee, Some(2.0));
        assert_eq!(ranged, Some(3.5));
    }
}
