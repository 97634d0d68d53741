//! ApplyDamage contract + death handling.
//!
//! Урон применяется немедленно (без очереди): цель может получить удар и
//! умереть до того, как её увидит следующий атакующий в этом же тике.
//! Все "мёртвые" и "уже удалённые" цели — это no-op, не ошибка.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier2d::prelude::{Collider, ExternalImpulse, GravityScale, RigidBody, Sensor, Velocity};
use serde::{Deserialize, Serialize};

use crate::ai::{ArchetypeProfile, CombatState, EntityActivated};
use crate::combat::Projectile;
use crate::components::{Actor, Archetype, Faction, Health, KnockbackLock};
use crate::physics::{CollisionLayer, Footprint};
use crate::session::PresentationCue;
use crate::timer::{Deadline, SimClock};

/// Компонент-маркер: entity мертв (Health == 0)
///
/// Ставится в `handle_deaths`. Состояние FSM (`CombatState::Dead`)
/// выставляется раньше, в момент удара.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Компонент-маркер: деспавн entity в момент `at`
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub at: Deadline,
}

/// Footprint трупа: маленький, не блокирует проход, не получает урон
pub const CORPSE_HALF_EXTENTS: Vec2 = Vec2::new(0.5, 0.1);

/// Параметры отбрасывания (общие для всех архетипов)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KnockbackTuning {
    /// Модуль импульса
    pub strength: f32,
    /// Вертикальная составляющая до нормализации (горизонталь = ±1)
    pub upward_bias: f32,
    pub lock_duration: f32,
}

impl Default for KnockbackTuning {
    fn default() -> Self {
        Self {
            strength: 6.0,
            upward_bias: 0.5,
            lock_duration: 0.3,
        }
    }
}

impl KnockbackTuning {
    /// Импульс от источника: прочь по X + фиксированный подъём
    pub fn impulse(&self, position: Vec2, source: Vec2) -> Vec2 {
        let away = if position.x < source.x { -1.0 } else { 1.0 };
        Vec2::new(away, self.upward_bias).normalize_or_zero() * self.strength
    }
}

/// Один удар для ApplyDamage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub amount: u32,
    /// Позиция источника knockback (None — без отбрасывания)
    pub source: Option<Vec2>,
    /// Позиция цели на момент удара
    pub position: Vec2,
    pub now: f32,
}

/// Результат ApplyDamage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Цель уже мертва / удалена
    Ignored,
    /// Выжила, Hurt. `knockback` — импульс, который надо приложить
    Staggered { knockback: Option<Vec2> },
    Killed,
}

/// ApplyDamage(amount, source) для одной цели (чистая функция)
///
/// - Dead → no-op
/// - Dormant просыпается (Activate) до применения урона
/// - Health 0 → Dead, иначе Hurt (повторный Hurt не продлевает stagger)
/// - удар посреди wind-up не отменяет strike атаки (`Hurt::pending`)
/// - knockback только если цель выжила
pub fn apply_damage(
    health: &mut Health,
    state: &mut CombatState,
    lock: &mut KnockbackLock,
    profile: &ArchetypeProfile,
    hit: &Hit,
    tuning: &KnockbackTuning,
) -> DamageOutcome {
    if state.is_dead() || !health.is_alive() {
        return DamageOutcome::Ignored;
    }

    state.activate(profile.capabilities.patrols);
    health.take_damage(hit.amount);

    if !health.is_alive() {
        *state = CombatState::Dead { since: hit.now };
        return DamageOutcome::Killed;
    }

    *state = match *state {
        hurt @ CombatState::Hurt { .. } => hurt,
        previous => CombatState::Hurt {
            until: hit.now + profile.stagger_duration,
            resume_chase: profile.capabilities.hurt_forces_aggro
                || matches!(previous, CombatState::Chase | CombatState::Attack(_)),
            pending: match previous {
                CombatState::Attack(progress) if !progress.struck => Some(progress),
                _ => None,
            },
        },
    };

    let knockback = hit.source.map(|source| {
        lock.engage(hit.now, tuning.lock_duration);
        tuning.impulse(hit.position, source)
    });

    DamageOutcome::Staggered { knockback }
}

/// Event: урон нанесён (HUD, логи, тесты)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    /// Health цели после удара
    pub remaining: u32,
    pub max: u32,
    pub archetype: Archetype,
}

/// Event: entity умер (kill credit)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    /// Чья атака убила (может быть уже удалён)
    pub killer: Option<Entity>,
    pub archetype: Archetype,
    pub faction: Faction,
}

/// SystemParam: Damageable contract для resolver'а и снарядов
#[derive(SystemParam)]
pub struct Damageables<'w, 's> {
    clock: Res<'w, SimClock>,
    tuning: Res<'w, KnockbackTuning>,
    targets: Query<
        'w,
        's,
        (
            &'static Actor,
            &'static Transform,
            &'static ArchetypeProfile,
            &'static mut Health,
            &'static mut CombatState,
            &'static mut KnockbackLock,
            Option<&'static mut Velocity>,
            Option<&'static mut ExternalImpulse>,
        ),
        Without<Projectile>,
    >,
    dealt: EventWriter<'w, DamageDealt>,
    died: EventWriter<'w, EntityDied>,
    activated: EventWriter<'w, EntityActivated>,
}

impl Damageables<'_, '_> {
    /// Фракция живой цели (None — мертва, удалена или не damageable)
    pub fn faction_if_alive(&self, entity: Entity) -> Option<Faction> {
        let (actor, _, _, health, state, ..) = self.targets.get(entity).ok()?;
        (health.is_alive() && !state.is_dead()).then_some(actor.faction)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.faction_if_alive(entity).is_some()
    }

    /// ApplyDamage(amount, source) + события
    pub fn apply(
        &mut self,
        target: Entity,
        amount: u32,
        source: Option<Vec2>,
        attacker: Option<Entity>,
    ) -> DamageOutcome {
        let now = self.clock.now();
        let Ok((actor, transform, profile, mut health, mut state, mut lock, velocity, impulse)) =
            self.targets.get_mut(target)
        else {
            return DamageOutcome::Ignored;
        };

        let was_dormant = state.is_dormant();
        let hit = Hit {
            amount,
            source,
            position: transform.translation.truncate(),
            now,
        };
        let outcome = apply_damage(&mut health, &mut state, &mut lock, profile, &hit, &self.tuning);

        if outcome == DamageOutcome::Ignored {
            return outcome;
        }

        if was_dormant && !state.is_dormant() {
            crate::logger::log_info(&format!("Combat: {:?} woken by damage", target));
            self.activated.write(EntityActivated {
                entity: target,
                by: attacker,
            });
        }

        self.dealt.write(DamageDealt {
            attacker,
            target,
            damage: amount,
            remaining: health.current,
            max: health.max,
            archetype: actor.archetype,
        });

        match outcome {
            DamageOutcome::Killed => {
                crate::logger::log_info(&format!(
                    "Combat: {:?} ({}) killed by {:?}",
                    target,
                    actor.archetype.name(),
                    attacker
                ));
                if let Some(mut velocity) = velocity {
                    *velocity = Velocity::zero();
                }
                self.died.write(EntityDied {
                    entity: target,
                    killer: attacker,
                    archetype: actor.archetype,
                    faction: actor.faction,
                });
            }
            DamageOutcome::Staggered { knockback } => {
                crate::logger::log(&format!(
                    "Combat: {:?} hit for {} ({}/{})",
                    target, amount, health.current, health.max
                ));
                if let Some(knockback) = knockback {
                    match (impulse, velocity) {
                        (Some(mut impulse), _) => impulse.impulse += knockback,
                        (None, Some(mut velocity)) => velocity.linvel += knockback,
                        (None, None) => {}
                    }
                }
            }
            DamageOutcome::Ignored => {}
        }

        outcome
    }
}

/// Система: смерть → труп
///
/// Dead маркер, sensor footprint трупа (сквозь него проходят), тело
/// замораживается на месте, IsDead cue, деспавн через removal_delay
/// (игрок остаётся на месте).
pub fn handle_deaths(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    profiles: Query<&ArchetypeProfile>,
    clock: Res<SimClock>,
    mut cues: EventWriter<PresentationCue>,
) {
    let now = clock.now();

    for event in deaths.read() {
        let Ok(mut entity_commands) = commands.get_entity(event.entity) else {
            continue;
        };

        entity_commands.insert((
            Dead,
            Footprint::sensor(CollisionLayer::Corpse, CORPSE_HALF_EXTENTS),
            Collider::cuboid(CORPSE_HALF_EXTENTS.x, CORPSE_HALF_EXTENTS.y),
            Sensor,
            CollisionLayer::Corpse.collision_groups(),
            RigidBody::KinematicPositionBased,
            GravityScale(0.0),
            Velocity::zero(),
        ));

        if let Some(delay) = profiles.get(event.entity).ok().and_then(|p| p.removal_delay) {
            entity_commands.insert(DespawnAfter {
                at: Deadline::after(now, delay),
            });
        }

        cues.write(PresentationCue::boolean(event.entity, "IsDead", true));
    }
}

/// Система: деспавн entities с истёкшим DespawnAfter
pub fn despawn_expired(mut commands: Commands, query: Query<(Entity, &DespawnAfter)>, clock: Res<SimClock>) {
    let now = clock.now();

    for (entity, despawn_after) in query.iter() {
        if despawn_after.at.is_due(now) {
            crate::logger::log(&format!("Combat: despawning {:?} (removal delay)", entity));
            commands.entity(entity).despawn();
        }
    }
}
