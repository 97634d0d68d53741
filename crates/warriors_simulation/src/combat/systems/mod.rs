//! Combat systems (ApplyDamage, resolver, projectiles, death)

pub mod damage;
pub mod projectile;
pub mod resolver;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod damage_tests;

// Re-export all systems
pub use damage::*;
pub use projectile::*;
pub use resolver::*;
