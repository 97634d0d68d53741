//! Player archetype: input → combat state machine
//!
//! - player: `Player` marker + `PlayerInput`
//! - controls: input → intent / strikes (та же `CombatState`, что у AI)
//! - autopilot: seeded input для headless прогонов

use bevy::prelude::*;

use crate::SimSet;

pub mod autopilot;
pub mod controls;
pub mod player;

pub use autopilot::Autopilot;
pub use controls::{player_step, AXIS_DEADZONE};
pub use player::{Player, PlayerInput};

/// Player Plugin
///
/// autopilot (если есть) → controls, оба в SimSet::Decide.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (autopilot::autopilot_input, controls::drive_players)
                .chain()
                .in_set(SimSet::Decide),
        );
    }
}
