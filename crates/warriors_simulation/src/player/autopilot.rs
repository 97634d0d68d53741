//! Headless autopilot: seeded input вместо клавиатуры
//!
//! Для CLI runner'а и тестов детерминизма. Каждые `decision_interval`
//! секунд выбирает новое действие через `DeterministicRng`:
//! враг в melee reach → удар, враг на линии → бросок копья (иногда),
//! иначе идём к ближайшему врагу с редкими прыжками.

use bevy::prelude::*;
use rand::Rng;

use super::player::{Player, PlayerInput};
use crate::ai::{ArchetypeProfile, CombatState};
use crate::combat::AttackKind;
use crate::components::{Actor, Faction};
use crate::timer::SimClock;
use crate::DeterministicRng;

/// Вертикальный допуск "враг на линии броска"
const THROW_LANE: f32 = 1.0;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Autopilot {
    pub decision_interval: f32,
    pub next_decision_at: f32,
    pub throw_chance: f64,
    pub jump_chance: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            decision_interval: 0.25,
            next_decision_at: 0.0,
            throw_chance: 0.3,
            jump_chance: 0.05,
        }
    }
}

/// System: autopilot → PlayerInput
///
/// Кандидаты сортируются по Entity: одинаковый seed → одинаковый забег.
pub fn autopilot_input(
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut pilots: Query<(&Transform, &ArchetypeProfile, &mut Autopilot, &mut PlayerInput), With<Player>>,
    hostiles: Query<(Entity, &Actor, &Transform, &CombatState)>,
) {
    let now = clock.now();

    let mut enemies: Vec<(Entity, Vec2)> = hostiles
        .iter()
        .filter(|(_, actor, _, state)| actor.faction == Faction::Hostile && !state.is_dead())
        .map(|(entity, _, transform, _)| (entity, transform.translation.truncate()))
        .collect();
    enemies.sort_by_key(|(entity, _)| *entity);

    for (transform, profile, mut pilot, mut input) in pilots.iter_mut() {
        if now < pilot.next_decision_at {
            continue;
        }
        pilot.next_decision_at = now + pilot.decision_interval;

        let position = transform.translation.truncate();
        let nearest = enemies
            .iter()
            .map(|(_, p)| *p)
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

        let Some(enemy) = nearest else {
            // Врагов нет: бродим
            input.axis = rng.rng.gen_range(-1..=1) as f32;
            input.jump = rng.rng.gen_bool(pilot.jump_chance);
            continue;
        };

        let delta = enemy - position;
        let melee_reach = profile.attack(AttackKind::Melee).map_or(0.0, |a| a.range);

        if delta.length() <= melee_reach {
            input.axis = delta.x.signum() * 0.01; // разворот к врагу без шага
            input.melee = true;
        } else if delta.y.abs() <= THROW_LANE && rng.rng.gen_bool(pilot.throw_chance) {
            input.axis = delta.x.signum() * 0.01;
            input.throw = true;
        } else {
            input.axis = delta.x.signum();
            input.jump = rng.rng.gen_bool(pilot.jump_chance);
        }
    }
}
