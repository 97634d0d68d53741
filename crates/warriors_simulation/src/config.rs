//! SimConfig: все числовые константы симуляции в одном RON документе
//!
//! `SimConfig::default()` — игровой баланс по умолчанию. Файл (`--config`)
//! переопределяет секции верхнего уровня; отсутствующие секции берутся из default.
//!
//! Профиль архетипа (`player`, `zombie`, `stalker`, `boss`) задаётся целиком:
//! default у профиля зависит от архетипа, поэтому частичный профиль — ошибка
//! парсинга. Исключение — `capabilities`: пропущенные флаги = false.
//! Полный документ для правки даёт `SimConfig::to_ron_string`.
//!
//! ```ron
//! (
//!     gravity: -9.81,
//!     score: (heal_threshold: 20, heal_amount: 1, victory_bonus: 100, defeat_bonus: -50, points_per_kill: 10),
//! )
//! ```

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::ArchetypeProfile;
use crate::combat::KnockbackTuning;
use crate::components::Archetype;
use crate::movement::JumpTuning;
use crate::physics::HeadlessGravity;
use crate::score::ScorePolicy;
use crate::session::SessionTiming;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Resource: конфигурация симуляции
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub player: ArchetypeProfile,
    pub zombie: ArchetypeProfile,
    pub stalker: ArchetypeProfile,
    pub boss: ArchetypeProfile,
    pub jump: JumpTuning,
    pub knockback: KnockbackTuning,
    pub score: ScorePolicy,
    pub session: SessionTiming,
    /// Гравитация headless backend (m/s²)
    pub gravity: f32,
    pub tick_hz: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player: ArchetypeProfile::player(),
            zombie: ArchetypeProfile::zombie(),
            stalker: ArchetypeProfile::stalker(),
            boss: ArchetypeProfile::boss(),
            jump: JumpTuning::default(),
            knockback: KnockbackTuning::default(),
            score: ScorePolicy::default(),
            session: SessionTiming::default(),
            gravity: HeadlessGravity::default().0,
            tick_hz: 60.0,
        }
    }
}

impl SimConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&text)?;
        crate::logger::log_info(&format!("Config: loaded {}", path.display()));
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn profile(&self, archetype: Archetype) -> &ArchetypeProfile {
        match archetype {
            Archetype::Player => &self.player,
            Archetype::Zombie => &self.zombie,
            Archetype::Stalker => &self.stalker,
            Archetype::Boss => &self.boss,
        }
    }

    /// Проверка инвариантов, которые нельзя выразить типами
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!("tick_hz must be positive, got {}", self.tick_hz)));
        }
        if self.score.heal_threshold == 0 {
            return Err(ConfigError::Invalid("score.heal_threshold must be > 0".into()));
        }

        for archetype in [Archetype::Player, Archetype::Zombie, Archetype::Stalker, Archetype::Boss] {
            let profile = self.profile(archetype);
            let name = archetype.name();
            if profile.archetype != archetype {
                return Err(ConfigError::Invalid(format!(
                    "{} profile is tagged as {}",
                    name,
                    profile.archetype.name()
                )));
            }
            if profile.max_health == 0 {
                return Err(ConfigError::Invalid(format!("{}: max_health must be > 0", name)));
            }
            for attack in [profile.melee.as_ref(), profile.ranged.as_ref()].into_iter().flatten() {
                if attack.strike_delay > attack.total_duration {
                    return Err(ConfigError::Invalid(format!(
                        "{}: {:?} strike_delay {} exceeds total_duration {}",
                        name, attack.kind, attack.strike_delay, attack.total_duration
                    )));
                }
                if attack.cooldown < 0.0 || attack.range < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{}: {:?} has negative cooldown or range",
                        name, attack.kind
                    )));
                }
            }
        }
        Ok(())
    }

    /// Вставляет производные resources (tuning, score, timing, gravity)
    pub fn apply(&self, app: &mut App) {
        app.insert_resource(self.knockback)
            .insert_resource(self.score)
            .insert_resource(self.session)
            .insert_resource(HeadlessGravity(self.gravity))
            .insert_resource(Time::<Fixed>::from_hz(self.tick_hz))
            .insert_resource(self.clone());
    }
}
