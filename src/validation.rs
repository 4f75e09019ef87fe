//! Attack declaration checks.  Nothing here mutates a unit: a declaration is either accepted as a
//! [`ValidatedAttack`] or rejected with the reason it is illegal.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{AttackDeclaration, AttackKind};
use crate::debug;
use crate::location::AttackType;
use crate::position::{FiringArc, PositionSnapshot, RangeBracket};
use crate::rules_tables::{kick_damage, punch_damage};
use crate::unit::{EquipmentKind, Location, Unit, WeaponStats};

/// Physical attacks reach only adjacent hexes.
const PHYSICAL_ATTACK_RANGE: u32 = 1;

const KICK_ARCS: &[FiringArc] = &[FiringArc::Front];

#[derive(Error, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDeclaration {
  #[error("{0} is destroyed")]
  WeaponDestroyed(String),
  #[error("{0} has no usable ammunition")]
  NoAmmo(String),
  #[error("target is not in the {0:?} arc or the weapon cannot fire into it")]
  OutOfArc(FiringArc),
  #[error("target at range {0} is out of range")]
  OutOfRange(u32),
  #[error("no weapon or limb {0}")]
  NoSuchWeapon(String),
  #[error("no unit named {0}")]
  NoSuchUnit(String),
  #[error("{0} cannot attack itself")]
  SelfTarget(String),
  #[error("{0} is not able to attack")]
  AttackerDisabled(String),
  #[error("{0} is already destroyed")]
  TargetDestroyed(String),
}

/// What a validated attack will do, resolved from the attacker's design.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackProfile {
  Weapon {
    name: String,
    weapon: usize,
    stats: WeaponStats,
    bracket: RangeBracket,
    ammo: Option<usize>,
  },
  Punch {
    arm: Location,
    damage: u32,
  },
  Kick {
    leg: Location,
    damage: u32,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAttack {
  pub declaration: AttackDeclaration,
  pub profile: AttackProfile,
}

impl ValidatedAttack {
  #[must_use]
  pub fn name(&self) -> String {
    match &self.profile {
      AttackProfile::Weapon { name, .. } => name.clone(),
      AttackProfile::Punch { arm, .. } => format!("{} punch", String::from(*arm)),
      AttackProfile::Kick { leg, .. } => format!("{} kick", String::from(*leg)),
    }
  }

  #[must_use]
  pub fn attack_type(&self) -> AttackType {
    match self.profile {
      AttackProfile::Weapon { .. } => AttackType::Weapon,
      AttackProfile::Punch { .. } => AttackType::Punch,
      AttackProfile::Kick { .. } => AttackType::Kick,
    }
  }
}

/// Arcs a weapon may be declared into, given where it is mounted.
fn allowed_arcs(location: Location, rear_mounted: bool) -> &'static [FiringArc] {
  if rear_mounted {
    return &[FiringArc::Rear];
  }
  match location {
    Location::LeftArm => &[FiringArc::Front, FiringArc::Left],
    Location::RightArm => &[FiringArc::Front, FiringArc::Right],
    _ => &[FiringArc::Front],
  }
}

fn check_arc(
  declared: FiringArc, allowed: &[FiringArc], position: &PositionSnapshot,
) -> Result<(), InvalidDeclaration> {
  if allowed.contains(&declared) && declared.contains(position.target_relative_to_attacker()) {
    Ok(())
  } else {
    Err(InvalidDeclaration::OutOfArc(declared))
  }
}

fn validate_weapon(
  declaration: &AttackDeclaration, weapon: usize, ammo: Option<usize>, attacker: &Unit, position: &PositionSnapshot,
) -> Result<AttackProfile, InvalidDeclaration> {
  let equipment = attacker
    .equipment(weapon)
    .ok_or_else(|| InvalidDeclaration::NoSuchWeapon(format!("#{weapon}")))?;
  let stats = equipment
    .weapon_stats()
    .ok_or_else(|| InvalidDeclaration::NoSuchWeapon(equipment.name.clone()))?;
  let mount = attacker
    .design
    .equipment_location(weapon)
    .ok_or_else(|| InvalidDeclaration::NoSuchWeapon(equipment.name.clone()))?;

  if attacker.is_equipment_destroyed(weapon) {
    return Err(InvalidDeclaration::WeaponDestroyed(equipment.name.clone()));
  }

  // Ammunition must come from an intact, non-empty bin of the matching type.  Declaring a bin for a weapon that
  // takes none is equally illegal.
  match (&stats.ammo_type, ammo) {
    (None, None) => {}
    (Some(ammo_type), Some(bin)) => {
      let compatible = attacker.equipment(bin).is_some_and(
        |bin_equipment| matches!(&bin_equipment.kind, EquipmentKind::Ammo { ammo_type: t, .. } if t == ammo_type),
      );
      if !compatible || attacker.is_equipment_destroyed(bin) || attacker.ammo_remaining(bin) == 0 {
        return Err(InvalidDeclaration::NoAmmo(equipment.name.clone()));
      }
    }
    _ => return Err(InvalidDeclaration::NoAmmo(equipment.name.clone())),
  }

  check_arc(declaration.arc, allowed_arcs(mount, stats.rear_mounted), position)?;

  let bracket =
    RangeBracket::for_weapon(stats, position.range).ok_or(InvalidDeclaration::OutOfRange(position.range))?;

  Ok(AttackProfile::Weapon {
    name: equipment.name.clone(),
    weapon,
    stats: stats.clone(),
    bracket,
    ammo,
  })
}

fn validate_physical(
  declaration: &AttackDeclaration, attacker: &Unit, position: &PositionSnapshot,
) -> Result<AttackProfile, InvalidDeclaration> {
  let (limb, allowed, profile) = match declaration.attack {
    AttackKind::Punch { arm } => {
      if !arm.is_arm() {
        return Err(InvalidDeclaration::NoSuchWeapon(format!("{} punch", String::from(arm))));
      }
      let damage = punch_damage(attacker.design.tonnage);
      (arm, allowed_arcs(arm, false), AttackProfile::Punch { arm, damage })
    }
    AttackKind::Kick { leg } => {
      if !leg.is_leg() {
        return Err(InvalidDeclaration::NoSuchWeapon(format!("{} kick", String::from(leg))));
      }
      let damage = kick_damage(attacker.design.tonnage);
      (leg, KICK_ARCS, AttackProfile::Kick { leg, damage })
    }
    AttackKind::Weapon { weapon, .. } => {
      return Err(InvalidDeclaration::NoSuchWeapon(format!("#{weapon}")));
    }
  };

  if attacker.location(limb).is_destroyed() {
    return Err(InvalidDeclaration::WeaponDestroyed(String::from(limb)));
  }

  check_arc(declaration.arc, allowed, position)?;

  if position.range != PHYSICAL_ATTACK_RANGE {
    return Err(InvalidDeclaration::OutOfRange(position.range));
  }

  Ok(profile)
}

/// Check a declaration is legal.  Checks run in a fixed order: the units themselves, then that the weapon exists
/// and is intact, then ammunition, then arc, then range.  The first failure is returned.
///
/// Inside minimum range is legal; it costs a to-hit penalty rather than rejecting the attack.
///
/// # Errors
/// Returns the `InvalidDeclaration` reason for the first check that fails.
pub fn validate_declaration(
  declaration: &AttackDeclaration, attacker: &Unit, target: &Unit, position: &PositionSnapshot,
) -> Result<ValidatedAttack, InvalidDeclaration> {
  if declaration.attacker == declaration.target {
    return Err(InvalidDeclaration::SelfTarget(declaration.attacker.clone()));
  }
  if attacker.get_name() != declaration.attacker {
    return Err(InvalidDeclaration::NoSuchUnit(declaration.attacker.clone()));
  }
  if target.get_name() != declaration.target {
    return Err(InvalidDeclaration::NoSuchUnit(declaration.target.clone()));
  }
  if attacker.is_destroyed() || !attacker.pilot.is_conscious() {
    return Err(InvalidDeclaration::AttackerDisabled(declaration.attacker.clone()));
  }
  if target.is_destroyed() {
    return Err(InvalidDeclaration::TargetDestroyed(declaration.target.clone()));
  }

  let profile = match declaration.attack {
    AttackKind::Weapon { weapon, ammo } => validate_weapon(declaration, weapon, ammo, attacker, position),
    AttackKind::Punch { .. } | AttackKind::Kick { .. } => validate_physical(declaration, attacker, position),
  }
  .inspect_err(|e| {
    debug!("(Validation.validate_declaration) Rejected {declaration:?}: {e}");
  })?;

  Ok(ValidatedAttack {
    declaration: declaration.clone(),
    profile,
  })
}
