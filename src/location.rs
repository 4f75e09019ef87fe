use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::damage_tables::{
  FRONT_HIT_TABLE, KICK_FRONT_TABLE, KICK_LEFT_TABLE, KICK_RIGHT_TABLE, LEFT_HIT_TABLE, PUNCH_FRONT_TABLE,
  PUNCH_LEFT_TABLE, PUNCH_RIGHT_TABLE, RIGHT_HIT_TABLE,
};
use crate::debug;
use crate::dice::{self, DiceRoll};
use crate::payloads::{CombatEvent, RollPurpose};
use crate::position::AttackDirection;
use crate::unit::Location;

/// Selects the family of hit location tables.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackType {
  Weapon,
  Punch,
  Kick,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitLocation {
  pub location: Location,
  /// Strikes rear armor.  Only ever set for torso locations hit from behind.
  pub rear: bool,
}

fn weapon_table(direction: AttackDirection) -> &'static [Location; 11] {
  match direction {
    AttackDirection::Front | AttackDirection::Rear => &FRONT_HIT_TABLE,
    AttackDirection::Left => &LEFT_HIT_TABLE,
    AttackDirection::Right => &RIGHT_HIT_TABLE,
  }
}

fn physical_table(attack_type: AttackType, direction: AttackDirection) -> &'static [Location; 6] {
  match (attack_type, direction) {
    (AttackType::Punch, AttackDirection::Front | AttackDirection::Rear) => &PUNCH_FRONT_TABLE,
    (AttackType::Punch, AttackDirection::Left) => &PUNCH_LEFT_TABLE,
    (AttackType::Punch, AttackDirection::Right) => &PUNCH_RIGHT_TABLE,
    (AttackType::Kick, AttackDirection::Front | AttackDirection::Rear) => &KICK_FRONT_TABLE,
    (AttackType::Kick, AttackDirection::Left) => &KICK_LEFT_TABLE,
    (AttackType::Kick, AttackDirection::Right) => &KICK_RIGHT_TABLE,
    (AttackType::Weapon, _) => panic!("(Location.physical_table) Weapon attacks use the 2d6 tables."),
  }
}

fn hit_location(location: Location, direction: AttackDirection) -> HitLocation {
  HitLocation {
    location,
    rear: direction == AttackDirection::Rear && location.has_rear_armor(),
  }
}

/// Look up the location for a roll already made: a 2d6 total for weapon attacks, a single die for punches and kicks.
///
/// # Panics
/// Panics if the roll is outside the range of the table for the attack type.
#[must_use]
pub fn lookup_hit_location(attack_type: AttackType, direction: AttackDirection, roll: u8) -> HitLocation {
  let location = match attack_type {
    AttackType::Weapon => {
      assert!(
        (2..=12).contains(&roll),
        "(Location.lookup_hit_location) Weapon location roll {roll} outside 2-12."
      );
      weapon_table(direction)[usize::from(roll - 2)]
    }
    AttackType::Punch | AttackType::Kick => {
      assert!(
        (1..=6).contains(&roll),
        "(Location.lookup_hit_location) Physical attack location roll {roll} outside 1-6."
      );
      physical_table(attack_type, direction)[usize::from(roll - 1)]
    }
  };
  hit_location(location, direction)
}

/// Roll for where a hit lands.  Returns the location along with the `DiceRolled` event for the roll.
pub fn resolve_hit_location(
  attack_type: AttackType, direction: AttackDirection, rng: &mut dyn RngCore,
) -> (HitLocation, CombatEvent) {
  let (roll, event) = match attack_type {
    AttackType::Weapon => {
      let roll = DiceRoll::roll(rng);
      (roll.sum(), CombatEvent::dice(RollPurpose::HitLocation, roll))
    }
    AttackType::Punch | AttackType::Kick => {
      let face = dice::roll(rng);
      (face, CombatEvent::die(RollPurpose::HitLocation, face))
    }
  };

  let hit = lookup_hit_location(attack_type, direction, roll);
  debug!("(Location.resolve_hit_location) {attack_type:?} from {direction:?} rolled {roll}: {hit:?}");
  (hit, event)
}
