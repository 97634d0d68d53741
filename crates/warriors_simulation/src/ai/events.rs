//! AI Events
//!
//! Activate() приходит из двух мест: зонный триггер и урон по спящему боссу.
//! Оба пишут `EntityActivated`, HUD показывает boss bar по первому из них.

use bevy::prelude::*;

/// Entity вышел из Dormant (Activate())
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityActivated {
    pub entity: Entity,
    /// Кто разбудил (None — зонный триггер)
    pub by: Option<Entity>,
}
