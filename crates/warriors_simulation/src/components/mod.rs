//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: базовые характеристики (archetype, faction, health, facing)
//! - movement: intent, ground sensor, knockback lock, arena bounds, patrol route
//!
//! Доменные компоненты FSM, атак и снарядов живут в своих модулях
//! (`ai::components`, `combat::components`).

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
