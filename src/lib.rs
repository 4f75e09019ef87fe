/// Lib for hardpoint
///
/// The combat resolution engine: attack validation, to-hit, hit location, damage transfer, critical hits, cluster
/// weapons and pilot damage.  `main.rs` is a thin scenario runner over this library, which is also what the
/// integration tests build against.
pub mod action;
pub mod cluster;
pub mod combat;
pub mod combat_tables;
pub mod critical;
pub mod damage;
pub mod damage_tables;
pub mod dice;
pub mod location;
pub mod modifiers;
pub mod payloads;
pub mod pilot;
pub mod position;
pub mod rules_tables;
pub mod scenario;
pub mod unit;
pub mod validation;

#[macro_use]
mod cov_util;

#[cfg(test)]
pub mod unit_tests;

pub const LOG_FILE_USE: &str = "READ_FILE";
pub const LOG_PHASE_ACTIVITY: &str = "FIRE_PHASE";
