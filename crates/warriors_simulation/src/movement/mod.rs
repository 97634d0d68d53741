//! Movement domain — intent → velocity
//!
//! Содержит:
//! - controller: Resolve() (ground probe, knockback lock, bounds, facing, прыжок)
//!
//! Компоненты intent / sensor / lock живут в `crate::components::movement`.

use bevy::prelude::*;

use crate::SimSet;

pub mod controller;

pub use controller::{can_jump, resolve_intent, resolve_movement, JumpTuning};

/// Movement Plugin
///
/// `resolve_movement` выполняется после решений FSM и атак текущего тика,
/// до интеграции физики.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, resolve_movement.in_set(SimSet::Move));
    }
}
