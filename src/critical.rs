use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::damage::{apply_damage, destroy_unit, ArmorFacing, DamageReport};
use crate::dice::{self, DiceRoll};
use crate::payloads::{CombatEvent, DamageEvent, RollPurpose};
use crate::pilot::PilotTrigger;
use crate::rules_tables::critical_hits_for_roll;
use crate::unit::{EquipmentKind, Location, Unit};
use crate::{debug, info};

/// What one critical hit did.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum CriticalEffect {
  /// Every occupied slot here was already gone.
  NoEffect,
  EquipmentDestroyed { slot: usize, equipment: String },
  AmmoExplosion { slot: usize, equipment: String, damage: u32 },
  EngineHit { slot: usize, hits: u8 },
  GyroHit { slot: usize, hits: u8 },
  SensorHit { slot: usize, hits: u8 },
  CockpitDestroyed { slot: usize },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CriticalHitResult {
  pub location: Location,
  pub roll: DiceRoll,
  pub count: u8,
  pub effects: Vec<CriticalEffect>,
  /// Damage from ammunition explosions, applied after the slot was destroyed.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub follow_on: Vec<DamageEvent>,
}

/// A critical check together with the side effects the orchestrator needs to thread onward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalResolution {
  pub result: CriticalHitResult,
  pub events: Vec<CombatEvent>,
  pub pilot_triggers: Vec<PilotTrigger>,
  /// Everything the follow-on explosions did.  Its locations never roll for further criticals.
  pub follow_on: DamageReport,
}

/// Slots at `location` holding equipment that has not yet been hit.
fn live_slots(unit: &Unit, location: Location) -> Vec<usize> {
  let state = unit.location(location);
  unit
    .design
    .location(location)
    .slots
    .iter()
    .enumerate()
    .filter(|(slot, content)| content.is_some() && !state.is_slot_destroyed(*slot))
    .map(|(slot, _)| slot)
    .collect()
}

/// Does `location` have anything left for a critical hit to find?
#[must_use]
pub fn has_critical_slots(unit: &Unit, location: Location) -> bool {
  !unit.location(location).is_destroyed() && !live_slots(unit, location).is_empty()
}

/// Roll for critical hits after structure damage at `location`, and apply them.
///
/// Returns `None` without rolling if the location is destroyed or has no live occupied slots.  Otherwise 2d6 on the
/// critical table gives the number of hits; each picks one live slot uniformly, without replacement.  Ammunition
/// that is hit explodes for its remaining shots as internal damage.  Engine and gyro hits apply the design's
/// penalty and may destroy the unit.  Explosion damage does not roll for further criticals.
pub fn resolve_critical(unit: &mut Unit, location: Location, rng: &mut dyn RngCore) -> Option<CriticalResolution> {
  if !has_critical_slots(unit, location) {
    return None;
  }

  let name = unit.get_name().to_string();
  let roll = DiceRoll::roll(rng);
  let count = critical_hits_for_roll(roll.sum());

  let mut events = vec![CombatEvent::dice(RollPurpose::CriticalCheck, roll)];
  let mut effects = vec![];
  let mut pilot_triggers = vec![];
  let mut follow_on = DamageReport::default();

  debug!(
    "(Critical.resolve_critical) {name}'s {} rolls {} for {count} critical hit(s).",
    String::from(location),
    roll.sum()
  );

  if count > 0 {
    events.push(CombatEvent::CriticalHitTriggered {
      unit: name.clone(),
      location,
      count,
    });
  }

  for _ in 0..count {
    let candidates = live_slots(unit, location);
    if candidates.is_empty() {
      effects.push(CriticalEffect::NoEffect);
      continue;
    }
    let slot = candidates[dice::pick(candidates.len(), rng)];
    unit.location_mut(location).destroyed_slots[slot] = true;

    let Some(equipment_index) = unit.design.location(location).slots[slot] else {
      panic!("(Critical.resolve_critical) Picked empty slot {slot} in {location:?}.");
    };
    let equipment = unit.design.equipment[equipment_index].clone();

    events.push(CombatEvent::EquipmentDestroyed {
      unit: name.clone(),
      location,
      slot,
      equipment: equipment.name.clone(),
    });

    let effect = match equipment.kind {
      EquipmentKind::Ammo { damage_per_shot, .. } => {
        let shots = unit.empty_ammo(equipment_index);
        let damage = shots * damage_per_shot;
        if damage == 0 {
          CriticalEffect::EquipmentDestroyed {
            slot,
            equipment: equipment.name,
          }
        } else {
          info!(
            "(Critical.resolve_critical) {name}'s {} explodes for {damage}.",
            equipment.name
          );
          events.push(CombatEvent::AmmoExploded {
            unit: name.clone(),
            location,
            amount: damage,
          });
          pilot_triggers.push(PilotTrigger::AmmoExplosion);
          let report = apply_damage(unit, location, damage, ArmorFacing::Internal);
          events.extend(report.events.iter().cloned());
          pilot_triggers.extend(report.pilot_triggers());
          follow_on.extend(report);
          CriticalEffect::AmmoExplosion {
            slot,
            equipment: equipment.name,
            damage,
          }
        }
      }
      EquipmentKind::Engine => {
        unit.engine_hits += 1;
        if unit
          .design
          .engine_penalty
          .destroys_unit_after
          .is_some_and(|limit| unit.engine_hits >= limit)
        {
          let mut report = DamageReport::default();
          destroy_unit(unit, &mut report);
          events.extend(report.events.iter().cloned());
          pilot_triggers.extend(report.pilot_triggers());
          follow_on.extend(report);
        }
        CriticalEffect::EngineHit {
          slot,
          hits: unit.engine_hits,
        }
      }
      EquipmentKind::Gyro => {
        unit.gyro_hits += 1;
        if unit
          .design
          .gyro_penalty
          .destroys_unit_after
          .is_some_and(|limit| unit.gyro_hits >= limit)
        {
          let mut report = DamageReport::default();
          destroy_unit(unit, &mut report);
          events.extend(report.events.iter().cloned());
          pilot_triggers.extend(report.pilot_triggers());
          follow_on.extend(report);
        }
        CriticalEffect::GyroHit {
          slot,
          hits: unit.gyro_hits,
        }
      }
      EquipmentKind::Sensors => {
        unit.sensor_hits += 1;
        CriticalEffect::SensorHit {
          slot,
          hits: unit.sensor_hits,
        }
      }
      EquipmentKind::Cockpit => {
        pilot_triggers.push(PilotTrigger::CockpitDestroyed);
        CriticalEffect::CockpitDestroyed { slot }
      }
      EquipmentKind::Weapon(_)
      | EquipmentKind::LifeSupport
      | EquipmentKind::Actuator
      | EquipmentKind::HeatSink
      | EquipmentKind::Other => CriticalEffect::EquipmentDestroyed {
        slot,
        equipment: equipment.name,
      },
    };
    debug!("(Critical.resolve_critical) {name}: {effect:?}");
    effects.push(effect);

    // An explosion can take out the location we are rolling on; nothing left to hit.
    if unit.location(location).is_destroyed() {
      break;
    }
  }

  Some(CriticalResolution {
    result: CriticalHitResult {
      location,
      roll,
      count,
      effects,
      follow_on: follow_on.damage.clone(),
    },
    events,
    pilot_triggers,
    follow_on,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use crate::dice::LoadedDice;
  use crate::pilot::Pilot;
  use crate::unit::UnitDesign;

  fn unit() -> Unit {
    Unit::new("Target".to_string(), &Arc::new(UnitDesign::default()), Pilot::default())
  }

  #[test]
  fn test_no_roll_without_slots() {
    let mut target = unit();
    let mut dice = LoadedDice::default();
    target.location_mut(Location::Head).destroyed = true;
    assert!(resolve_critical(&mut target, Location::Head, &mut dice).is_none());

    for slot in &mut target.location_mut(Location::LeftLeg).destroyed_slots {
      *slot = true;
    }
    assert!(resolve_critical(&mut target, Location::LeftLeg, &mut dice).is_none());
  }

  #[test]
  fn test_no_critical_on_low_roll() {
    let mut target = unit();
    let mut dice = LoadedDice::from_faces(&[3, 4]);
    let resolution = resolve_critical(&mut target, Location::LeftArm, &mut dice).unwrap();
    assert_eq!(resolution.result.count, 0);
    assert!(resolution.result.effects.is_empty());
    assert_eq!(resolution.events.len(), 1);
    assert!(target.location(Location::LeftArm).destroyed_slots.iter().all(|d| !d));
  }

  #[test_log::test]
  fn test_two_criticals_without_replacement() {
    let mut target = unit();
    // Roll 9 then pick index 4 (the laser) of five live slots, then index 0 of the remaining four.
    let mut dice = LoadedDice::from_faces(&[4, 5]);
    dice.push_pick(4).push_pick(0);
    let resolution = resolve_critical(&mut target, Location::LeftArm, &mut dice).unwrap();

    assert_eq!(resolution.result.count, 2);
    assert_eq!(
      resolution.result.effects,
      vec![
        CriticalEffect::EquipmentDestroyed {
          slot: 4,
          equipment: "Medium Laser".to_string()
        },
        CriticalEffect::EquipmentDestroyed {
          slot: 0,
          equipment: "Left Arm Actuators".to_string()
        },
      ]
    );
    let destroyed = target
      .location(Location::LeftArm)
      .destroyed_slots
      .iter()
      .filter(|d| **d)
      .count();
    assert_eq!(destroyed, 2);
    assert!(target.is_equipment_destroyed(5));
    assert_eq!(dice.remaining(), 0);
  }

  #[test]
  fn test_more_criticals_than_slots() {
    let mut target = unit();
    let slots = &mut target.location_mut(Location::RightArm).destroyed_slots;
    slots[0] = true;
    slots[1] = true;
    slots[2] = true;
    // Boxcars: three criticals, but only two live slots.
    let mut dice = LoadedDice::from_faces(&[6, 6]);
    dice.push_pick(0).push_pick(0);
    let resolution = resolve_critical(&mut target, Location::RightArm, &mut dice).unwrap();
    assert_eq!(resolution.result.count, 3);
    assert_eq!(resolution.result.effects.len(), 3);
    assert_eq!(resolution.result.effects[2], CriticalEffect::NoEffect);
  }

  #[test_log::test]
  fn test_ammo_explosion() {
    let mut target = unit();
    // Roll 8: one critical.  Left torso live slots are 0, 1, 2 (LRM) and 3 (ammo); pick the ammo.
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(3);
    let resolution = resolve_critical(&mut target, Location::LeftTorso, &mut dice).unwrap();

    // 8 shots of 15 is 120 internal damage: torso (12) and center torso (16) gone, the rest unabsorbed.
    assert_eq!(
      resolution.result.effects,
      vec![CriticalEffect::AmmoExplosion {
        slot: 3,
        equipment: "LRM 15 Ammo".to_string(),
        damage: 120
      }]
    );
    assert_eq!(target.ammo_remaining(8), 0);
    assert!(target.is_destroyed());
    assert!(target.location(Location::LeftArm).is_destroyed());
    assert_eq!(target.location(Location::CenterTorso).armor(), 24);
    assert_eq!(
      resolution.pilot_triggers,
      vec![PilotTrigger::AmmoExplosion, PilotTrigger::UnitDestroyed]
    );
    assert_eq!(resolution.result.follow_on.len(), 2);
    assert!(resolution
      .events
      .iter()
      .any(|e| matches!(e, CombatEvent::AmmoExploded { amount: 120, .. })));
  }

  #[test]
  fn test_empty_ammo_does_not_explode() {
    let mut target = unit();
    let _ = target.empty_ammo(10);
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(1);
    let resolution = resolve_critical(&mut target, Location::RightTorso, &mut dice).unwrap();
    assert_eq!(
      resolution.result.effects,
      vec![CriticalEffect::EquipmentDestroyed {
        slot: 1,
        equipment: "SRM 4 Ammo".to_string()
      }]
    );
    assert!(resolution.pilot_triggers.is_empty());
    assert!(!target.is_destroyed());
  }

  #[test]
  fn test_engine_hits_destroy_unit() {
    let mut target = unit();
    target.engine_hits = 2;
    // Center torso slot 0 is engine.
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(0);
    let resolution = resolve_critical(&mut target, Location::CenterTorso, &mut dice).unwrap();
    assert_eq!(resolution.result.effects, vec![CriticalEffect::EngineHit { slot: 0, hits: 3 }]);
    assert!(target.is_destroyed());
    assert_eq!(resolution.pilot_triggers, vec![PilotTrigger::UnitDestroyed]);
    assert_eq!(target.heat_penalty(), 15);
  }

  #[test]
  fn test_gyro_and_sensor_penalties() {
    let mut target = unit();
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(3);
    let resolution = resolve_critical(&mut target, Location::CenterTorso, &mut dice).unwrap();
    assert_eq!(resolution.result.effects, vec![CriticalEffect::GyroHit { slot: 3, hits: 1 }]);
    assert_eq!(target.piloting_penalty(), 3);
    assert!(!target.is_destroyed());

    // Head live slots: 0 life support, 1 sensors, 2 cockpit, 4 sensors, 5 life support.
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(1);
    let _ = resolve_critical(&mut target, Location::Head, &mut dice).unwrap();
    assert_eq!(target.sensor_hits, 1);
    assert_eq!(target.damage_to_hit_penalty(), 2);
  }

  #[test]
  fn test_cockpit_is_lethal_trigger() {
    let mut target = unit();
    let mut dice = LoadedDice::from_faces(&[4, 4]);
    dice.push_pick(2);
    let resolution = resolve_critical(&mut target, Location::Head, &mut dice).unwrap();
    assert_eq!(resolution.result.effects, vec![CriticalEffect::CockpitDestroyed { slot: 2 }]);
    assert_eq!(resolution.pilot_triggers, vec![PilotTrigger::CockpitDestroyed]);
  }
}
