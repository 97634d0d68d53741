//! Player control marker + input component
//!
//! Отмечает entity которым управляет игрок через input (в отличие от AI).

use bevy::prelude::*;

/// Marker component для player-controlled entity
///
/// - AI systems используют `Without<Player>` filter
/// - Input systems используют `With<Player>` filter
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PlayerInput)]
pub struct Player;

/// Input снимок на текущий тик (пишет хост или autopilot)
///
/// `axis` — удерживаемое состояние, `jump` / `melee` / `throw` — нажатия
/// в этом тике: controls сбрасывают их после чтения.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// -1..1, знак = направление
    pub axis: f32,
    pub jump: bool,
    pub melee: bool,
    pub throw: bool,
}

impl PlayerInput {
    pub fn clear_presses(&mut self) {
        self.jump = false;
        self.melee = false;
        self.throw = false;
    }
}
