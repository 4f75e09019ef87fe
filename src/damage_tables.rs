use crate::unit::Location;

// 2d6 hit location tables, indexed by roll - 2.  The rear table is the front table; torso hits from behind land on
// rear armor.
pub const FRONT_HIT_TABLE: [Location; 11] = [
  Location::CenterTorso,
  Location::RightArm,
  Location::RightArm,
  Location::RightLeg,
  Location::RightTorso,
  Location::CenterTorso,
  Location::LeftTorso,
  Location::LeftLeg,
  Location::LeftArm,
  Location::LeftArm,
  Location::Head,
];

pub const LEFT_HIT_TABLE: [Location; 11] = [
  Location::LeftTorso,
  Location::LeftLeg,
  Location::LeftArm,
  Location::LeftArm,
  Location::LeftLeg,
  Location::LeftTorso,
  Location::CenterTorso,
  Location::RightTorso,
  Location::RightArm,
  Location::RightLeg,
  Location::Head,
];

pub const RIGHT_HIT_TABLE: [Location; 11] = [
  Location::RightTorso,
  Location::RightLeg,
  Location::RightArm,
  Location::RightArm,
  Location::RightLeg,
  Location::RightTorso,
  Location::CenterTorso,
  Location::LeftTorso,
  Location::LeftArm,
  Location::LeftLeg,
  Location::Head,
];

// 1d6 punch tables, indexed by roll - 1.
pub const PUNCH_FRONT_TABLE: [Location; 6] = [
  Location::LeftArm,
  Location::LeftTorso,
  Location::CenterTorso,
  Location::RightTorso,
  Location::RightArm,
  Location::Head,
];

pub const PUNCH_LEFT_TABLE: [Location; 6] = [
  Location::LeftTorso,
  Location::LeftTorso,
  Location::CenterTorso,
  Location::LeftArm,
  Location::LeftArm,
  Location::Head,
];

pub const PUNCH_RIGHT_TABLE: [Location; 6] = [
  Location::RightTorso,
  Location::RightTorso,
  Location::CenterTorso,
  Location::RightArm,
  Location::RightArm,
  Location::Head,
];

// 1d6 kick tables, indexed by roll - 1.
pub const KICK_FRONT_TABLE: [Location; 6] = [
  Location::RightLeg,
  Location::RightLeg,
  Location::RightLeg,
  Location::LeftLeg,
  Location::LeftLeg,
  Location::LeftLeg,
];

pub const KICK_LEFT_TABLE: [Location; 6] = [Location::LeftLeg; 6];

pub const KICK_RIGHT_TABLE: [Location; 6] = [Location::RightLeg; 6];
