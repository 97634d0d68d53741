//! Presentation + HUD sinks (ECS → внешний слой)
//!
//! Симуляция только пишет события; рендер, анимации, звук и UI
//! читают их снаружи.

use bevy::prelude::*;

use crate::ai::EntityActivated;
use crate::combat::{DamageDealt, EntityDied};
use crate::components::{Actor, Archetype, Health};

/// Named параметр для animation/audio слоя
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PresentationCue {
    Trigger { entity: Entity, name: &'static str },
    Bool { entity: Entity, name: &'static str, value: bool },
    Float { entity: Entity, name: &'static str, value: f32 },
}

impl PresentationCue {
    pub fn trigger(entity: Entity, name: &'static str) -> Self {
        Self::Trigger { entity, name }
    }

    pub fn boolean(entity: Entity, name: &'static str, value: bool) -> Self {
        Self::Bool { entity, name, value }
    }

    pub fn float(entity: Entity, name: &'static str, value: f32) -> Self {
        Self::Float { entity, name, value }
    }
}

/// HUD уведомления
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HudEvent {
    ShowBossBar { max: u32, name: String },
    BossHealth { current: u32 },
    HideBossBar,
    PlayerHealth { current: u32, max: u32 },
    Coins { total: u32 },
    EndScreen { victory: bool, score: i64 },
}

/// Boss bar показывается ровно один раз за уровень
#[derive(Resource, Debug, Default)]
pub struct BossBar {
    pub shown_for: Option<Entity>,
}

/// System: первая активация босса → ShowBossBar(max, name)
pub fn announce_boss(
    mut activations: EventReader<EntityActivated>,
    bosses: Query<(&Actor, &Health, Option<&Name>)>,
    mut bar: ResMut<BossBar>,
    mut hud: EventWriter<HudEvent>,
) {
    for event in activations.read() {
        if bar.shown_for.is_some() {
            break;
        }
        let Ok((actor, health, name)) = bosses.get(event.entity) else {
            continue;
        };
        if actor.archetype != Archetype::Boss {
            continue;
        }

        let name = name.map_or_else(|| actor.archetype.name().to_string(), |n| n.as_str().to_string());
        crate::logger::log_info(&format!("HUD: boss bar '{}' ({} hp)", name, health.max));
        bar.shown_for = Some(event.entity);
        hud.write(HudEvent::ShowBossBar { max: health.max, name });
    }
}

/// System: урон → boss bar / сердечки игрока; смерть босса → HideBossBar
pub fn track_health(
    mut damage: EventReader<DamageDealt>,
    mut deaths: EventReader<EntityDied>,
    mut hud: EventWriter<HudEvent>,
) {
    for event in damage.read() {
        match event.archetype {
            Archetype::Boss => hud.write(HudEvent::BossHealth {
                current: event.remaining,
            }),
            Archetype::Player => hud.write(HudEvent::PlayerHealth {
                current: event.remaining,
                max: event.max,
            }),
            _ => continue,
        };
    }

    for event in deaths.read() {
        if event.archetype == Archetype::Boss {
            hud.write(HudEvent::HideBossBar);
        }
    }
}
