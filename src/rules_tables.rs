use crate::position::{MovementMode, RangeBracket};

// Index by RangeBracket: Short, Medium, Long
pub const RANGE_MOD: [i32; 3] = [0, 2, 4];

// Index by MovementMode: Stationary, Walked, Ran, Jumped
const ATTACKER_MOVEMENT_MOD: [i32; 4] = [0, 1, 2, 3];

// Upper bound (inclusive) of hexes moved for each target movement modifier step.  25+ hexes is +6.
const TARGET_MOVEMENT_BANDS: [u32; 6] = [2, 4, 6, 9, 17, 24];

// Lower bound (inclusive) of heat for each heat modifier step.
const HEAT_BANDS: [u32; 4] = [8, 13, 17, 24];

// Extra TMM for a target that jumped.
pub const JUMPED_TARGET_MOD: i32 = 1;

// Each sensor critical.
pub const SENSOR_HIT_MOD: i32 = 2;

// Kicks are easier to land than punches.
pub const KICK_TO_HIT_MOD: i32 = -2;

pub const PUNCH_DAMAGE_DIVISOR: u32 = 10;
pub const KICK_DAMAGE_DIVISOR: u32 = 5;

// Wounds at which the pilot is dead outright.
pub const LETHAL_WOUNDS: u8 = 6;

// Index by wounds - 1.  Consciousness roll needed for 1 through 5 wounds.
const CONSCIOUSNESS_TARGET: [u8; 5] = [3, 5, 7, 10, 11];

// Number of criticals for a critical check roll, indexed by roll - 2.
const CRITICAL_HITS: [u8; 11] = [0, 0, 0, 0, 0, 0, 1, 2, 2, 0, 3];

#[must_use]
pub fn range_mod(bracket: RangeBracket) -> i32 {
  RANGE_MOD[bracket as usize]
}

/// Penalty for firing at a target inside the weapon's minimum range.
#[must_use]
pub fn minimum_range_mod(min_range: u32, range: u32) -> i32 {
  if min_range == 0 || range > min_range {
    0
  } else {
    i32::try_from(min_range - range + 1).unwrap_or(i32::MAX)
  }
}

#[must_use]
pub fn attacker_movement_mod(mode: MovementMode) -> i32 {
  ATTACKER_MOVEMENT_MOD[mode as usize]
}

/// The target movement modifier (TMM) for a target that moved `hexes_moved` this turn.
#[must_use]
pub fn target_movement_mod(hexes_moved: u32, jumped: bool) -> i32 {
  let band = TARGET_MOVEMENT_BANDS
    .iter()
    .position(|&top| hexes_moved <= top)
    .unwrap_or(TARGET_MOVEMENT_BANDS.len());
  i32::try_from(band).unwrap_or(0) + if jumped { JUMPED_TARGET_MOD } else { 0 }
}

#[must_use]
pub fn heat_mod(heat: u32) -> i32 {
  let steps = HEAT_BANDS.iter().filter(|&&bottom| heat >= bottom).count();
  i32::try_from(steps).unwrap_or(0)
}

/// How many critical slots a critical check roll (2-12) destroys.
///
/// # Panics
/// Panics if the roll is not a legal 2d6 total.
#[must_use]
pub fn critical_hits_for_roll(roll: u8) -> u8 {
  assert!(
    (2..=12).contains(&roll),
    "(RulesTables.critical_hits_for_roll) Critical roll {roll} outside 2-12."
  );
  CRITICAL_HITS[usize::from(roll - 2)]
}

/// The consciousness roll needed at a given wound count, or `None` once the wounds are lethal.
#[must_use]
pub fn consciousness_target(wounds: u8) -> Option<u8> {
  match wounds {
    0 => Some(0),
    w if w >= LETHAL_WOUNDS => None,
    w => Some(CONSCIOUSNESS_TARGET[usize::from(w - 1)]),
  }
}

#[must_use]
pub fn punch_damage(tonnage: u32) -> u32 {
  tonnage.div_ceil(PUNCH_DAMAGE_DIVISOR)
}

#[must_use]
pub fn kick_damage(tonnage: u32) -> u32 {
  tonnage.div_ceil(KICK_DAMAGE_DIVISOR)
}
