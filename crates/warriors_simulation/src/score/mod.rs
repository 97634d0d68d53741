//! Score / stat aggregator + монеты
//!
//! `RunStats` — счётчики забега (kills, собранная валюта, bank до лечения).
//! `compute_final_score` — чистая функция от счётчиков.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::EntityDied;
use crate::components::{Actor, Faction, Health};
use crate::physics::Footprint;
use crate::session::{spawn_effect, EffectKind, HudEvent, PresentationCue};
use crate::timer::SimClock;
use crate::SimSet;

/// Правила подсчёта очков
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePolicy {
    /// Bank ≥ threshold → одна единица лечения
    pub heal_threshold: u32,
    pub heal_amount: u32,
    pub victory_bonus: i64,
    pub defeat_bonus: i64,
    pub points_per_kill: i64,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            heal_threshold: 20,
            heal_amount: 1,
            victory_bonus: 100,
            defeat_bonus: -50,
            points_per_kill: 10,
        }
    }
}

/// Счётчики забега
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub kills: u32,
    /// Вся собранная валюта (идёт в score)
    pub currency: u32,
    /// Валюта с последнего лечения
    pub bank: u32,
}

impl RunStats {
    pub fn register_kill(&mut self) {
        self.kills += 1;
    }

    /// Возвращает сколько единиц лечения заработано этим сбором
    pub fn collect_currency(&mut self, amount: u32, policy: &ScorePolicy) -> u32 {
        self.currency = self.currency.saturating_add(amount);
        self.bank = self.bank.saturating_add(amount);

        if policy.heal_threshold == 0 {
            return 0;
        }
        let mut heals = 0;
        while self.bank >= policy.heal_threshold {
            self.bank -= policy.heal_threshold;
            heals += policy.heal_amount;
        }
        heals
    }

    pub fn compute_final_score(&self, victory: bool, policy: &ScorePolicy) -> i64 {
        let bonus = if victory { policy.victory_bonus } else { policy.defeat_bonus };
        (bonus + self.kills as i64 * policy.points_per_kill + self.currency as i64).max(0)
    }
}

/// Пикап-монета
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Coin {
    pub value: u32,
}

/// System: kill credit за каждого убитого врага
pub fn register_kills(mut deaths: EventReader<EntityDied>, mut stats: ResMut<RunStats>) {
    for event in deaths.read() {
        if event.faction == Faction::Hostile {
            stats.register_kill();
            crate::logger::log(&format!(
                "Score: kill {} by {:?} (total {})",
                event.archetype.name(),
                event.killer,
                stats.kills
            ));
        }
    }
}

/// System: игрок касается монеты → валюта, лечение на пороге, pickup эффект
pub fn collect_coins(
    mut commands: Commands,
    coins: Query<(Entity, &Coin, &Transform, &Footprint)>,
    mut collectors: Query<(Entity, &Actor, &Transform, &Footprint, &mut Health)>,
    mut stats: ResMut<RunStats>,
    policy: Res<ScorePolicy>,
    clock: Res<SimClock>,
    mut hud: EventWriter<HudEvent>,
    mut cues: EventWriter<PresentationCue>,
) {
    let mut sorted: Vec<_> = coins.iter().collect();
    sorted.sort_by_key(|(entity, ..)| *entity);

    for (coin_entity, coin, coin_transform, coin_footprint) in sorted {
        let coin_center = coin_transform.translation.truncate();

        let collector = collectors.iter_mut().find(|(_, actor, transform, footprint, health)| {
            actor.faction == Faction::Player
                && health.is_alive()
                && footprint.overlaps_box(transform.translation.truncate(), coin_center, coin_footprint.half_extents)
        });
        let Some((player, _, _, _, mut health)) = collector else {
            continue;
        };

        let heals = stats.collect_currency(coin.value, &policy);
        if heals > 0 {
            health.heal(heals);
            crate::logger::log_info(&format!("Score: bank threshold reached, {:?} healed +{}", player, heals));
            hud.write(HudEvent::PlayerHealth {
                current: health.current,
                max: health.max,
            });
        }

        hud.write(HudEvent::Coins { total: stats.currency });
        cues.write(PresentationCue::trigger(player, "Pickup"));
        spawn_effect(&mut commands, EffectKind::Pickup, coin_center, clock.now());
        commands.entity(coin_entity).despawn();
    }
}

/// Score Plugin
pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunStats>()
            .init_resource::<ScorePolicy>()
            .add_systems(
                FixedUpdate,
                (register_kills, collect_coins).chain().in_set(SimSet::World),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_score_examples() {
        let policy = ScorePolicy::default();

        assert_eq!(RunStats::default().compute_final_score(true, &policy), 100);

        let stats = RunStats {
            kills: 3,
            currency: 40,
            bank: 0,
        };
        assert_eq!(stats.compute_final_score(true, &policy), 170);

        let stats = RunStats {
            kills: 2,
            currency: 0,
            bank: 0,
        };
        assert_eq!(stats.compute_final_score(false, &policy), 0); // -50 + 20 → floor 0
    }

    #[test]
    fn test_final_score_is_pure() {
        let policy = ScorePolicy::default();
        let stats = RunStats {
            kills: 7,
            currency: 12,
            bank: 12,
        };
        let first = stats.compute_final_score(false, &policy);
        assert_eq!(first, 32);
        assert_eq!(stats.compute_final_score(false, &policy), first);
    }

    #[test]
    fn test_collect_heals_on_threshold() {
        let policy = ScorePolicy::default();
        let mut stats = RunStats {
            kills: 0,
            currency: 15,
            bank: 15,
        };

        let heals = stats.collect_currency(10, &policy);
        assert_eq!(heals, 1);
        assert_eq!(stats.bank, 5);
        assert_eq!(stats.currency, 25);
    }

    #[test]
    fn test_collect_crossing_several_thresholds() {
        let policy = ScorePolicy::default();
        let mut stats = RunStats::default();

        assert_eq!(stats.collect_currency(45, &policy), 2);
        assert_eq!(stats.bank, 5);
        assert_eq!(stats.currency, 45);

        assert_eq!(stats.collect_currency(3, &policy), 0);
        assert_eq!(stats.bank, 8);
    }
}
