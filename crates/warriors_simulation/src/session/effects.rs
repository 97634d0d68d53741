//! Короткоживущие эффекты (impact, pickup)
//!
//! Это просто entity с позицией и дедлайном: презентация рисует их,
//! симуляция удаляет по истечении lifetime.

use bevy::prelude::*;

use crate::timer::{Deadline, SimClock};

pub const EFFECT_LIFETIME: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum EffectKind {
    /// Попадание / детонация снаряда
    Impact,
    /// Подобранная монета
    Pickup,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Effect {
    pub kind: EffectKind,
    pub expires: Deadline,
}

pub fn spawn_effect(commands: &mut Commands, kind: EffectKind, point: Vec2, now: f32) -> Entity {
    commands
        .spawn((
            Effect {
                kind,
                expires: Deadline::after(now, EFFECT_LIFETIME),
            },
            Transform::from_translation(point.extend(0.0)),
        ))
        .id()
}

/// System: удаление истёкших эффектов
pub fn expire_effects(mut commands: Commands, effects: Query<(Entity, &Effect)>, clock: Res<SimClock>) {
    let now = clock.now();
    for (entity, effect) in effects.iter() {
        if effect.expires.is_due(now) {
            commands.entity(entity).despawn();
        }
    }
}
