//! Базовые компоненты акторов: Actor, Health, Facing

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Архетип бойца. Один FSM, разные профили (см. `ArchetypeProfile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    Player,
    /// Melee-патрульный: ходит от точки спавна туда-обратно, бьёт при контакте
    Zombie,
    /// Преследователь: стоит до aggro, потом не отстаёт
    Stalker,
    /// Босс арены: спит до зонного триггера, melee + ranged
    Boss,
}

impl Archetype {
    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Player => "player",
            Archetype::Zombie => "zombie",
            Archetype::Stalker => "stalker",
            Archetype::Boss => "boss",
        }
    }
}

/// Фракция (friendly fire выключен внутри фракции)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Faction {
    #[default]
    Player,
    Hostile,
}

/// Актор (игрок, враг, босс) — базовый компонент для живых бойцов
///
/// Автоматически добавляет Health и Facing через Required Components.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Facing)]
pub struct Actor {
    pub archetype: Archetype,
    pub faction: Faction,
}

impl Actor {
    pub fn new(archetype: Archetype) -> Self {
        let faction = match archetype {
            Archetype::Player => Faction::Player,
            _ => Faction::Hostile,
        };
        Self { archetype, faction }
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Направление взгляда: +1 вправо, -1 влево
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing(pub f32);

impl Default for Facing {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Facing {
    pub fn sign(&self) -> f32 {
        if self.0 < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Разворот по знаку dx. Нулевой dx не меняет facing.
    pub fn turn_toward(&mut self, dx: f32) -> bool {
        if dx == 0.0 {
            return false;
        }
        let wanted = dx.signum();
        if wanted != self.sign() {
            self.0 = wanted;
            return true;
        }
        false
    }
}
