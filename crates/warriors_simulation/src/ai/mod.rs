//! AI decision-making module
//!
//! Одна параметризованная combat FSM для Zombie / Stalker / Boss
//! (Player использует те же состояния, но решения принимает input).
//! Dormant → Idle/Patrol ↔ Chase ↔ Attack ↔ Hurt → Dead

use bevy::prelude::*;

use crate::SimSet;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::EntityActivated;
pub use systems::{advance_attack, begin_attack, decide, strike_through_stagger, Directive, Perception};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate (SimSet::Decide).
/// Порядок выполнения:
/// 1. acquire_targets — ближайший живой враг
/// 2. sense_surroundings — стены / обрывы через PhysicsWorld
/// 3. run_combat_fsm — решения, movement intent, strike requests
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EntityActivated>();

        app.add_systems(
            FixedUpdate,
            (
                systems::acquire_targets,
                systems::sense_surroundings,
                systems::run_combat_fsm,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(SimSet::Decide),
        );
    }
}
