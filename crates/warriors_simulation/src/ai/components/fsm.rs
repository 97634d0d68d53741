//! Combat FSM components (state, cooldown, target, perception inputs).

use bevy::prelude::*;

use crate::combat::AttackKind;
use crate::timer::Cooldown;

/// Атака в процессе (одна инвокация Attack state)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackInProgress {
    pub kind: AttackKind,
    pub started_at: f32,
    /// Strike instant уже разрешён (ровно один раз за инвокацию)
    pub struck: bool,
}

/// Combat FSM состояния (одна машина для всех архетипов)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum CombatState {
    /// Босс до активации: никакой логики
    Dormant,

    /// Патрульный: ходит ± patrol_distance от спавна
    Patrol,

    /// Стоит на месте (stalker до aggro, босс после пробуждения, игрок)
    Idle,

    /// Преследование цели
    Chase,

    Attack(AttackInProgress),

    /// Stagger: движение подавлено до `until`
    Hurt {
        until: f32,
        /// Вернуться в Chase (иначе в rest state)
        resume_chase: bool,
        /// Прерванная атака, чей strike ещё не разрешён: он всё равно
        /// случится в свой strike instant
        pending: Option<AttackInProgress>,
    },

    /// Терминальное состояние
    Dead { since: f32 },
}

impl Default for CombatState {
    fn default() -> Self {
        Self::Idle
    }
}

impl CombatState {
    pub fn is_dead(&self) -> bool {
        matches!(self, CombatState::Dead { .. })
    }

    pub fn is_dormant(&self) -> bool {
        matches!(self, CombatState::Dormant)
    }

    /// Имя для логов / presentation cues
    pub fn name(&self) -> &'static str {
        match self {
            CombatState::Dormant => "Dormant",
            CombatState::Patrol => "Patrol",
            CombatState::Idle => "Idle",
            CombatState::Chase => "Chase",
            CombatState::Attack(_) => "Attack",
            CombatState::Hurt { .. } => "Hurt",
            CombatState::Dead { .. } => "Dead",
        }
    }

    /// Rest state архетипа (Patrol для патрульных, иначе Idle)
    pub fn rest(patrols: bool) -> Self {
        if patrols {
            CombatState::Patrol
        } else {
            CombatState::Idle
        }
    }

    /// Activate(): Dormant → rest state. Для остальных состояний no-op.
    pub fn activate(&mut self, patrols: bool) -> bool {
        if self.is_dormant() {
            *self = Self::rest(patrols);
            return true;
        }
        false
    }
}

/// "Следующая атака разрешена с момента X" (общий для melee и ranged)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttackCooldown(pub Cooldown);

/// Текущая цель (пишет perception, None — цели нет / удалена)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CombatTarget(pub Option<Entity>);

/// Единственный read-back из презентации: играет ли сейчас attack clip
///
/// Пишет внешний animation layer. В headless режиме всегда false.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimatorFeedback {
    pub attack_clip_playing: bool,
}

/// Результат scene queries перед решением FSM (пишет perception)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Senses {
    /// Стена на расстоянии wall_check_distance по направлению патруля
    pub wall_ahead: bool,
    /// Под следующим шагом к цели нет пола
    pub ledge_ahead: bool,
}
