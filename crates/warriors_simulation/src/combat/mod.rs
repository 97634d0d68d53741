//! Combat system module
//!
//! - components: attack definitions, projectile + contact verdict
//! - systems: ApplyDamage (`Damageables`), Attack Resolver, projectiles, death
//! - Events: StrikeRequest, DamageDealt, EntityDied

use bevy::prelude::*;

use crate::SimSet;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use systems::{
    apply_damage, spawn_projectile, DamageDealt, DamageOutcome, Damageables, Dead, DespawnAfter, EntityDied, Hit,
    KnockbackTuning, CORPSE_HALF_EXTENTS,
};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения (по SimSet):
/// 1. Resolve — resolve_strikes (melee overlap / спавн снарядов)
/// 2. Projectiles — контакты снарядов, lifetime
/// 3. Death — handle_deaths (труп, removal delay)
/// 4. World — despawn_expired
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.init_resource::<KnockbackTuning>()
            .add_event::<StrikeRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        // Регистрация систем в FixedUpdate
        app.add_systems(FixedUpdate, systems::resolve_strikes.in_set(SimSet::Resolve))
            .add_systems(
                FixedUpdate,
                (systems::process_projectile_contacts, systems::expire_projectiles)
                    .chain()
                    .in_set(SimSet::Projectiles),
            )
            .add_systems(FixedUpdate, systems::handle_deaths.in_set(SimSet::Death))
            .add_systems(FixedUpdate, systems::despawn_expired.in_set(SimSet::World));
    }
}
