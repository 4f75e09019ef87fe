//! Positional snapshot handed to the engine by the movement collaborator, plus the arc geometry derived from it.
//!
//! Hex directions run clockwise from 0.  A direction *relative* to a facing is `(direction - facing) mod 6`, so
//! relative 0 is straight ahead, 1 front-right, 2 rear-right, 3 straight behind, 4 rear-left and 5 front-left.
use serde::{Deserialize, Serialize};
use strum_macros::FromRepr;

use crate::unit::WeaponStats;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, FromRepr, Default)]
pub enum HexDirection {
  #[default]
  North = 0,
  NorthEast,
  SouthEast,
  South,
  SouthWest,
  NorthWest,
}

impl HexDirection {
  /// This direction as seen from something facing `facing`: 0 ahead through 5 front-left.
  #[must_use]
  pub fn relative_to(self, facing: HexDirection) -> u8 {
    ((self as u8) + 6 - (facing as u8)) % 6
  }

  #[must_use]
  pub fn opposite(self) -> HexDirection {
    HexDirection::from_repr(((self as usize) + 3) % 6).unwrap_or_default()
  }
}

/// Weapon firing arcs.  Front and rear span three hexsides, each side two; neighbouring arcs share a hexside.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringArc {
  Front,
  Left,
  Right,
  Rear,
}

impl FiringArc {
  #[must_use]
  pub fn contains(self, relative: u8) -> bool {
    match self {
      FiringArc::Front => matches!(relative, 5 | 0 | 1),
      FiringArc::Right => matches!(relative, 1 | 2),
      FiringArc::Left => matches!(relative, 4 | 5),
      FiringArc::Rear => matches!(relative, 2..=4),
    }
  }
}

/// The side of the target struck, which selects the hit location table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackDirection {
  Front,
  Left,
  Right,
  Rear,
}

impl AttackDirection {
  /// Map the attacker's direction relative to the target's facing onto the side it strikes.
  #[must_use]
  pub fn from_relative(relative: u8) -> AttackDirection {
    match relative % 6 {
      0 => AttackDirection::Front,
      1 | 2 => AttackDirection::Right,
      3 => AttackDirection::Rear,
      _ => AttackDirection::Left,
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
  #[default]
  Stationary = 0,
  Walked,
  Ran,
  Jumped,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
pub enum RangeBracket {
  Short = 0,
  Medium,
  Long,
}

impl RangeBracket {
  /// The bracket `range` falls in for a weapon, or `None` beyond long range.
  #[must_use]
  pub fn for_weapon(weapon: &WeaponStats, range: u32) -> Option<RangeBracket> {
    if range <= weapon.short_range {
      Some(RangeBracket::Short)
    } else if range <= weapon.medium_range {
      Some(RangeBracket::Medium)
    } else if range <= weapon.long_range {
      Some(RangeBracket::Long)
    } else {
      None
    }
  }
}

/// A named to-hit modifier from terrain, lighting, partial cover and the like.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SituationalModifier {
  pub source: String,
  pub value: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PositionSnapshot {
  /// Range in hexes.
  pub range: u32,
  #[serde(default)]
  pub attacker_facing: HexDirection,
  #[serde(default)]
  pub target_facing: HexDirection,
  /// Direction from the attacker's hex to the target's hex.
  #[serde(default)]
  pub bearing: HexDirection,
  #[serde(default)]
  pub attacker_movement: MovementMode,
  #[serde(default)]
  pub attacker_mp_spent: u32,
  #[serde(default)]
  pub target_hexes_moved: u32,
  #[serde(default)]
  pub target_jumped: bool,
  #[serde(default)]
  pub situational: Vec<SituationalModifier>,
}

impl PositionSnapshot {
  /// Where the target sits relative to the attacker's facing.
  #[must_use]
  pub fn target_relative_to_attacker(&self) -> u8 {
    self.bearing.relative_to(self.attacker_facing)
  }

  /// Which side of the target the attack strikes.
  #[must_use]
  pub fn attack_direction(&self) -> AttackDirection {
    AttackDirection::from_relative(self.bearing.opposite().relative_to(self.target_facing))
  }
}
