//! Simulation clock + deadline primitives
//!
//! Все ожидания в симуляции (cooldown атаки, stagger, knockback lock,
//! удаление трупа, пауза перед финальным экраном) — это timestamp дедлайна,
//! который сравнивается с `SimClock::now()` каждый тик. Никаких корутин.
//!
//! `SimClock` двигается только в FixedUpdate и только пока не стоит пауза:
//! глобальный freeze (победа/поражение) останавливает и время, и логику.

use bevy::prelude::*;

/// Монотонные часы симуляции (секунды от старта сцены)
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    now: f32,
    ticks: u64,
    paused: bool,
}

impl SimClock {
    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Глобальный freeze (финальный экран). Проверяется до любой tick-логики.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn advance(&mut self, delta: f32) {
        if self.paused || delta <= 0.0 {
            return;
        }
        self.now += delta;
        self.ticks += 1;
    }
}

/// Cooldown: "следующее действие разрешено с момента `until`"
///
/// Стартует в момент начала действия, а не по его завершению.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct Cooldown {
    pub until: f32,
}

impl Cooldown {
    pub fn is_ready(&self, now: f32) -> bool {
        now >= self.until
    }

    pub fn start(&mut self, now: f32, duration: f32) {
        self.until = now + duration;
    }

    pub fn remaining(&self, now: f32) -> f32 {
        (self.until - now).max(0.0)
    }
}

/// Одноразовый дедлайн (stagger, knockback, despawn)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Deadline {
    pub at: f32,
}

impl Deadline {
    pub fn after(now: f32, delay: f32) -> Self {
        Self { at: now + delay }
    }

    pub fn is_due(&self, now: f32) -> bool {
        now >= self.at
    }
}

/// System: продвигает SimClock на fixed delta
pub fn advance_clock(mut clock: ResMut<SimClock>, time: Res<Time<Fixed>>) {
    clock.advance(time.delta_secs());
}

/// Run condition: симуляция не заморожена
pub fn simulation_running(clock: Res<SimClock>) -> bool {
    !clock.is_paused()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_until_paused() {
        let mut clock = SimClock::default();
        clock.advance(0.5);
        clock.advance(0.25);
        assert_eq!(clock.now(), 0.75);
        assert_eq!(clock.ticks(), 2);

        clock.pause();
        clock.advance(1.0);
        assert_eq!(clock.now(), 0.75);
        assert_eq!(clock.ticks(), 2);

        clock.resume();
        clock.advance(0.25);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn test_cooldown_starts_at_initiation() {
        let mut cooldown = Cooldown::default();
        assert!(cooldown.is_ready(0.0));

        cooldown.start(2.0, 1.5);
        assert!(!cooldown.is_ready(3.0));
        assert_eq!(cooldown.remaining(3.0), 0.5);
        assert!(cooldown.is_ready(3.5));
        assert_eq!(cooldown.remaining(10.0), 0.0);
    }

    #[test]
    fn test_deadline() {
        let deadline = Deadline::after(1.0, 0.4);
        assert!(!deadline.is_due(1.2));
        assert!(deadline.is_due(1.4));
    }
}
