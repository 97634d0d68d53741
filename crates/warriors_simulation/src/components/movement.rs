//! Movement компоненты: intent, ground sensor, knockback lock, границы арены

use bevy::prelude::*;
use crate::timer::Deadline;

/// Намерение движения на текущий тик (пишет FSM / player controls)
///
/// Movement controller конвертирует его в горизонтальную velocity.
/// Вертикальная составляющая velocity принадлежит физике (gravity, прыжок, knockback).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementIntent {
    /// -1 / 0 / +1 (одномерное движение)
    pub direction: f32,
    /// Желаемая скорость (m/s)
    pub speed: f32,
    /// Явный разворот к цели (target-relative), имеет приоритет над знаком движения
    pub face: Option<f32>,
    /// Прыжок запрошен в этом тике
    pub jump: bool,
}

impl MovementIntent {
    pub fn stop() -> Self {
        Self::default()
    }

    pub fn toward(direction: f32, speed: f32) -> Self {
        Self {
            direction: if direction == 0.0 { 0.0 } else { direction.signum() },
            speed,
            face: None,
            jump: false,
        }
    }

    /// Стоять на месте, но смотреть в сторону `dx`
    pub fn hold_facing(dx: f32) -> Self {
        Self {
            face: (dx != 0.0).then(|| dx.signum()),
            ..Self::default()
        }
    }

    pub fn is_moving(&self) -> bool {
        self.direction != 0.0 && self.speed > 0.0
    }
}

/// Knockback lock: пока активен, Resolve() movement controller'а — no-op
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KnockbackLock {
    pub until: Option<Deadline>,
}

impl KnockbackLock {
    pub fn engage(&mut self, now: f32, duration: f32) {
        self.until = Some(Deadline::after(now, duration));
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.until.is_some_and(|deadline| !deadline.is_due(now))
    }

    /// Снимает истёкший lock (возвращает true если снят в этом вызове)
    pub fn release_if_due(&mut self, now: f32) -> bool {
        match self.until {
            Some(deadline) if deadline.is_due(now) => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}

/// Ground check: overlap круга у ног + fallback ray вниз
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct GroundSensor {
    /// Якорь "ног" относительно центра тела
    pub foot_offset: Vec2,
    /// Радиус overlap круга
    pub radius: f32,
    /// Длина fallback луча вниз (склоны / край платформы)
    pub ray_length: f32,
    /// Результат последнего Resolve()
    pub grounded: bool,
    /// Последний момент контакта с землёй (coyote time)
    pub last_grounded_at: Option<f32>,
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self {
            foot_offset: Vec2::new(0.0, -0.9),
            radius: 0.2,
            ray_length: 0.35,
            grounded: false,
            last_grounded_at: None,
        }
    }
}

/// Горизонтальные границы арены (патрульные и босс не покидают её)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ArenaBounds {
    pub min_x: f32,
    pub max_x: f32,
}

impl ArenaBounds {
    pub fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    /// Симметричная арена вокруг точки
    pub fn around(center_x: f32, half_width: f32) -> Self {
        Self::new(center_x - half_width, center_x + half_width)
    }

    /// Можно ли двигаться из `x` в направлении `direction`
    pub fn allows(&self, x: f32, direction: f32) -> bool {
        !((direction > 0.0 && x >= self.max_x) || (direction < 0.0 && x <= self.min_x))
    }
}

/// Патрульный маршрут: ± half_span от точки спавна
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub origin_x: f32,
    pub half_span: f32,
    /// Текущее направление патруля (±1)
    pub dir: f32,
}

impl PatrolRoute {
    pub fn new(origin_x: f32, half_span: f32) -> Self {
        Self {
            origin_x,
            half_span,
            dir: 1.0,
        }
    }

    /// Дошли до края маршрута в текущем направлении
    pub fn reached_edge(&self, x: f32) -> bool {
        let offset = x - self.origin_x;
        (self.dir > 0.0 && offset > self.half_span) || (self.dir < 0.0 && offset < -self.half_span)
    }

    pub fn flip(&mut self) {
        self.dir = -self.dir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knockback_lock_deadline() {
        let mut lock = KnockbackLock::default();
        assert!(!lock.is_active(0.0));

        lock.engage(1.0, 0.5);
        assert!(lock.is_active(1.2));
        assert!(!lock.release_if_due(1.2));
        assert!(!lock.is_active(1.5));
        assert!(lock.release_if_due(1.5));
        assert_eq!(lock.until, None);
    }

    #[test]
    fn test_bounds_block_outward_motion_only() {
        let bounds = ArenaBounds::new(-10.0, 10.0);
        assert!(!bounds.allows(10.0, 1.0));
        assert!(bounds.allows(10.0, -1.0));
        assert!(!bounds.allows(-10.5, -1.0));
        assert!(bounds.allows(0.0, 1.0));
        assert_eq!(ArenaBounds::around(2.0, 6.0), ArenaBounds::new(-4.0, 8.0));
    }

    #[test]
    fn test_patrol_route_edges() {
        let mut route = PatrolRoute::new(5.0, 3.0);
        assert!(!route.reached_edge(8.0));
        assert!(route.reached_edge(8.1));
        route.flip();
        assert!(!route.reached_edge(8.1));
        assert!(route.reached_edge(1.9));
    }

    #[test]
    fn test_hold_facing_intent() {
        let intent = MovementIntent::hold_facing(-3.0);
        assert!(!intent.is_moving());
        assert_eq!(intent.face, Some(-1.0));
        assert_eq!(MovementIntent::hold_facing(0.0).face, None);
    }
}
