//! Combat components

pub mod attack;
pub mod projectile;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod projectile_tests;

// Re-export all components
pub use attack::*;
pub use projectile::*;
