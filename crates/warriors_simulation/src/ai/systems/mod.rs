//! AI systems (perception → decision)

pub mod fsm;
pub mod perception;

#[cfg(test)]
mod fsm_tests;

// Re-export all systems
pub use fsm::*;
pub use perception::*;
