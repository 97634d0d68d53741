//! Attack definitions (per-archetype константы)
//!
//! Тайминг атаки задан числами, а не анимацией:
//! - `strike_delay` — от начала атаки до оценки попадания (wind-up)
//! - `total_duration` — от начала атаки до возврата в Chase/Patrol
//! - `cooldown` — от НАЧАЛА атаки до следующей атаки

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Melee или Ranged (для cue презентации и выбора ветки resolver'а)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum AttackKind {
    Melee,
    Ranged,
}

impl AttackKind {
    pub fn trigger_name(&self) -> &'static str {
        match self {
            AttackKind::Melee => "AttackMelee",
            AttackKind::Ranged => "AttackRanged",
        }
    }
}

/// Куда целится снаряд в момент выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum AimMode {
    /// Вектор fire point → текущая позиция цели (без доводки в полёте)
    AtTarget,
    /// По направлению взгляда (копьё игрока)
    Facing,
}

/// Шаблон снаряда
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct ProjectileTemplate {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: u32,
    /// 0.0 — прямолинейный полёт (камни босса)
    pub gravity_scale: f32,
    pub half_extents: Vec2,
    /// Fire point относительно стрелка (x флипается по facing)
    pub fire_offset: Vec2,
    /// Смещение impact эффекта вперёд по направлению полёта (наконечник)
    pub impact_offset: f32,
    pub aim: AimMode,
    /// Отбрасывает ли цель при попадании
    pub knockback: bool,
}

impl ProjectileTemplate {
    /// Камень босса
    pub fn boss_rock() -> Self {
        Self {
            speed: 10.0,
            lifetime: 4.0,
            damage: 1,
            gravity_scale: 0.0,
            half_extents: Vec2::splat(0.3),
            fire_offset: Vec2::new(1.2, 1.0),
            impact_offset: 0.0,
            aim: AimMode::AtTarget,
            knockback: true,
        }
    }

    /// Копьё игрока
    pub fn spear() -> Self {
        Self {
            speed: 15.0,
            lifetime: 3.0,
            damage: 1,
            gravity_scale: 0.0,
            half_extents: Vec2::new(0.8, 0.1),
            fire_offset: Vec2::new(0.6, 0.2),
            impact_offset: 0.8,
            aim: AimMode::Facing,
            knockback: false,
        }
    }
}

/// Как доставляется урон
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub enum AttackDelivery {
    /// Overlap круга в attack point (offset.x флипается по facing)
    Volume { radius: f32, offset: Vec2 },
    Projectile(ProjectileTemplate),
}

/// Описание одной атаки архетипа
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub kind: AttackKind,
    pub damage: u32,
    pub cooldown: f32,
    pub strike_delay: f32,
    pub total_duration: f32,
    /// Strike range: дистанция, с которой атака начинается
    pub range: f32,
    /// Держать velocity = 0 пока идёт атака
    pub roots_attacker: bool,
    /// Отбрасывает ли цель (источник урона передаётся в ApplyDamage)
    pub knockback: bool,
    pub delivery: AttackDelivery,
}

impl AttackDefinition {
    /// Strike instant уже наступил для атаки, начатой в `started_at`
    pub fn strike_due(&self, started_at: f32, now: f32) -> bool {
        now >= started_at + self.strike_delay
    }

    pub fn finished(&self, started_at: f32, now: f32) -> bool {
        now >= started_at + self.total_duration
    }

    /// Урон доставки (для Projectile — урон снаряда)
    pub fn delivered_damage(&self) -> u32 {
        match self.delivery {
            AttackDelivery::Volume { .. } => self.damage,
            AttackDelivery::Projectile(template) => template.damage,
        }
    }
}

/// Атака, которую надо разрешить в этом тике (strike instant)
///
/// Пишет FSM (или player controls), читает Attack Resolver в том же тике.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StrikeRequest {
    pub attacker: Entity,
    pub attack: AttackDefinition,
    /// Цель на момент удара (для AimMode::AtTarget)
    pub target: Option<Entity>,
}
