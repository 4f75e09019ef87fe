//! Damage & transfer.  This is the only code that writes a unit's armor or structure.
//!
//! Damage comes off armor first (front or rear pool), then structure.  Once a location's structure is gone the
//! location, and anything hanging off it, is destroyed and the excess moves one step inward along
//! [`Location::transfer_target`].  Losing the head or center torso destroys the unit.
use serde::{Deserialize, Serialize};

use crate::payloads::{CombatEvent, DamageEvent, DamagePool};
use crate::pilot::PilotTrigger;
use crate::unit::{Location, Unit, LOCATION_COUNT};
use crate::{debug, info};

/// Which armor, if any, stands in front of the damage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmorFacing {
  Front,
  Rear,
  /// Damage from inside the unit, e.g. an ammunition explosion.  Goes straight to structure.
  Internal,
}

/// The outcome of one call to [`apply_damage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DamageReport {
  pub damage: Vec<DamageEvent>,
  pub events: Vec<CombatEvent>,
  /// Every location destroyed by this damage, including those lost with a destroyed torso.
  pub destroyed_locations: Vec<Location>,
  /// Locations that took structure damage and are still standing, in the order they were hit.
  pub structure_damaged: Vec<Location>,
  /// Set if this damage destroyed the unit.  A unit already destroyed beforehand does not set it again.
  pub unit_destroyed: bool,
  /// Damage left over after the end of the transfer chain.
  pub unabsorbed: u32,
}

impl DamageReport {
  /// Total damage absorbed by armor and structure.
  #[must_use]
  pub fn absorbed(&self) -> u32 {
    self.damage.iter().map(|event| event.amount).sum()
  }

  #[must_use]
  pub fn structure_damage(&self) -> u32 {
    self
      .damage
      .iter()
      .filter(|event| event.pool == DamagePool::Structure)
      .map(|event| event.amount)
      .sum()
  }

  /// Pilot triggers raised by this damage, in order.
  #[must_use]
  pub fn pilot_triggers(&self) -> Vec<PilotTrigger> {
    let mut triggers = vec![];
    if self.destroyed_locations.contains(&Location::Head) {
      triggers.push(PilotTrigger::HeadDestroyed);
    } else if self
      .damage
      .iter()
      .any(|event| event.location == Location::Head && event.pool == DamagePool::Structure)
    {
      triggers.push(PilotTrigger::HeadStructureDamage);
    }
    if self.unit_destroyed {
      triggers.push(PilotTrigger::UnitDestroyed);
    }
    triggers
  }

  /// Fold a later report (e.g. from a follow-on explosion) into this one.
  pub fn extend(&mut self, other: DamageReport) {
    self.damage.extend(other.damage);
    self.events.extend(other.events);
    self.destroyed_locations.extend(other.destroyed_locations);
    self.structure_damaged.retain(|location| !self.destroyed_locations.contains(location));
    self.structure_damaged.extend(other.structure_damaged);
    self.unit_destroyed |= other.unit_destroyed;
    self.unabsorbed += other.unabsorbed;
  }
}

/// Mark the unit destroyed, reporting it only the first time.
pub(crate) fn destroy_unit(unit: &mut Unit, report: &mut DamageReport) {
  if unit.destroyed {
    return;
  }
  info!("(Damage.destroy_unit) {} destroyed.", unit.get_name());
  unit.destroyed = true;
  report.unit_destroyed = true;
  report.events.push(CombatEvent::UnitDestroyed {
    unit: unit.get_name().to_string(),
  });
}

fn destroy_location(unit: &mut Unit, location: Location, report: &mut DamageReport) {
  let name = unit.get_name().to_string();
  let state = unit.location_mut(location);
  if state.destroyed {
    return;
  }
  state.destroyed = true;
  debug!("(Damage.destroy_location) {name}'s {} destroyed.", String::from(location));
  report.destroyed_locations.push(location);
  report.structure_damaged.retain(|l| *l != location);
  report.events.push(CombatEvent::LocationDestroyed { unit: name, location });

  for distal in location.distal() {
    destroy_location(unit, *distal, report);
  }

  if location.is_vital() {
    destroy_unit(unit, report);
  }
}

/// Apply `amount` damage to `location`, transferring the excess inward.
///
/// Each location along the chain absorbs what it can: armor (unless the damage is internal) then structure.
/// Already destroyed locations are passed straight through.  The report's events are in the order the damage
/// was absorbed.
///
/// # Panics
/// Panics if the transfer chain visits more locations than a unit has; the transfer map is then corrupt.
pub fn apply_damage(unit: &mut Unit, location: Location, amount: u32, facing: ArmorFacing) -> DamageReport {
  let name = unit.get_name().to_string();
  let mut report = DamageReport::default();
  let mut remaining = amount;
  let mut current = location;
  let mut steps = 0;

  debug!(
    "(Damage.apply_damage) {name} takes {amount} damage to {} ({facing:?}).",
    String::from(location)
  );

  while remaining > 0 {
    steps += 1;
    assert!(
      steps <= LOCATION_COUNT,
      "(Damage.apply_damage) Transfer chain from {location:?} does not terminate."
    );

    let state = unit.location_mut(current);
    if !state.destroyed {
      if facing != ArmorFacing::Internal {
        let (pool, armor) = if facing == ArmorFacing::Rear && current.has_rear_armor() {
          (DamagePool::RearArmor, &mut state.rear_armor)
        } else {
          (DamagePool::Armor, &mut state.armor)
        };
        let absorbed = remaining.min(*armor);
        if absorbed > 0 {
          *armor -= absorbed;
          remaining -= absorbed;
          report.damage.push(DamageEvent {
            unit: name.clone(),
            location: current,
            amount: absorbed,
            pool,
            destroyed: false,
          });
          report.events.push(CombatEvent::DamageApplied {
            unit: name.clone(),
            location: current,
            amount: absorbed,
            pool,
          });
        }
      }

      let absorbed = remaining.min(state.structure);
      if absorbed > 0 {
        state.structure -= absorbed;
        remaining -= absorbed;
        let destroyed = state.structure == 0;
        report.damage.push(DamageEvent {
          unit: name.clone(),
          location: current,
          amount: absorbed,
          pool: DamagePool::Structure,
          destroyed,
        });
        report.events.push(CombatEvent::DamageApplied {
          unit: name.clone(),
          location: current,
          amount: absorbed,
          pool: DamagePool::Structure,
        });

        if destroyed {
          destroy_location(unit, current, &mut report);
        } else if !report.structure_damaged.contains(&current) {
          report.structure_damaged.push(current);
        }
      }
    }

    if remaining == 0 {
      break;
    }

    if let Some(next) = current.transfer_target() {
      debug!(
        "(Damage.apply_damage) {remaining} damage transfers from {} to {}.",
        String::from(current),
        String::from(next)
      );
      current = next;
    } else {
      debug!("(Damage.apply_damage) {remaining} damage has nowhere left to go on {name}.");
      report.unabsorbed = remaining;
      break;
    }
  }

  report
}
