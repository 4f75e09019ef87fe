use std::collections::HashMap;
use std::sync::Arc;

use derivative::Derivative;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none};
use strum_macros::FromRepr;

use crate::pilot::Pilot;
use crate::rules_tables::SENSOR_HIT_MOD;
use crate::scenario::ScenarioError;

/// Every unit design known to this process, keyed by design name.  Set once at start up from the design catalog.
pub static UNIT_DESIGNS: OnceCell<HashMap<String, Arc<UnitDesign>>> = OnceCell::new();

pub const LOCATION_COUNT: usize = 8;

/// Body locations of a biped `BattleMech`.  The discriminant indexes every per-location array in this crate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr)]
pub enum Location {
  Head = 0,
  CenterTorso,
  LeftTorso,
  RightTorso,
  LeftArm,
  RightArm,
  LeftLeg,
  RightLeg,
}

impl Location {
  pub const ALL: [Location; LOCATION_COUNT] = [
    Location::Head,
    Location::CenterTorso,
    Location::LeftTorso,
    Location::RightTorso,
    Location::LeftArm,
    Location::RightArm,
    Location::LeftLeg,
    Location::RightLeg,
  ];

  /// Where damage goes once this location is used up.  Center torso and head are the end of every chain.
  #[must_use]
  pub fn transfer_target(self) -> Option<Location> {
    match self {
      Location::LeftArm | Location::LeftLeg => Some(Location::LeftTorso),
      Location::RightArm | Location::RightLeg => Some(Location::RightTorso),
      Location::LeftTorso | Location::RightTorso => Some(Location::CenterTorso),
      Location::CenterTorso | Location::Head => None,
    }
  }

  /// Locations that are lost along with this one.
  #[must_use]
  pub fn distal(self) -> &'static [Location] {
    match self {
      Location::LeftTorso => &[Location::LeftArm],
      Location::RightTorso => &[Location::RightArm],
      _ => &[],
    }
  }

  #[must_use]
  pub fn has_rear_armor(self) -> bool {
    matches!(
      self,
      Location::CenterTorso | Location::LeftTorso | Location::RightTorso
    )
  }

  #[must_use]
  pub fn is_arm(self) -> bool {
    matches!(self, Location::LeftArm | Location::RightArm)
  }

  #[must_use]
  pub fn is_leg(self) -> bool {
    matches!(self, Location::LeftLeg | Location::RightLeg)
  }

  /// Critical slots available in this location.
  #[must_use]
  pub fn slot_capacity(self) -> usize {
    match self {
      Location::Head | Location::LeftLeg | Location::RightLeg => 6,
      _ => 12,
    }
  }

  /// Losing all structure here destroys the whole unit.
  #[must_use]
  pub fn is_vital(self) -> bool {
    matches!(self, Location::Head | Location::CenterTorso)
  }
}

impl From<Location> for String {
  fn from(l: Location) -> Self {
    match l {
      Location::Head => "head".to_string(),
      Location::CenterTorso => "center torso".to_string(),
      Location::LeftTorso => "left torso".to_string(),
      Location::RightTorso => "right torso".to_string(),
      Location::LeftArm => "left arm".to_string(),
      Location::RightArm => "right arm".to_string(),
      Location::LeftLeg => "left leg".to_string(),
      Location::RightLeg => "right leg".to_string(),
    }
  }
}

/// The engine or gyro penalty for each critical hit taken, as defined by the equipment catalog.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CriticalPenalty {
  #[serde(default)]
  pub heat: u32,
  #[serde(default)]
  pub piloting: i32,
  #[serde(default)]
  pub to_hit: i32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub destroys_unit_after: Option<u8>,
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WeaponStats {
  /// Damage of one shot, or of one projectile for cluster weapons.
  pub damage: u32,
  /// Projectiles per shot.  Present only for cluster weapons.
  #[serde(default)]
  pub rack_size: Option<u8>,
  #[serde(default)]
  pub cluster_modifier: i32,
  #[serde(default)]
  pub ammo_type: Option<String>,
  #[serde(default)]
  pub min_range: u32,
  pub short_range: u32,
  pub medium_range: u32,
  pub long_range: u32,
  #[serde(default)]
  pub heat: u32,
  #[serde(default)]
  pub rear_mounted: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EquipmentKind {
  Weapon(WeaponStats),
  Ammo {
    ammo_type: String,
    shots: u32,
    damage_per_shot: u32,
  },
  Engine,
  Gyro,
  Sensors,
  Cockpit,
  LifeSupport,
  Actuator,
  HeatSink,
  Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Equipment {
  pub name: String,
  pub kind: EquipmentKind,
}

impl Equipment {
  #[must_use]
  pub fn weapon_stats(&self) -> Option<&WeaponStats> {
    match &self.kind {
      EquipmentKind::Weapon(stats) => Some(stats),
      _ => None,
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LocationDesign {
  pub armor: u32,
  #[serde(default)]
  pub rear_armor: u32,
  pub structure: u32,
  /// Critical slot layout.  Each occupied slot holds an index into the design's equipment list.
  #[serde(default)]
  pub slots: Vec<Option<usize>>,
}

/// Static description of a unit, supplied by the unit construction collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UnitDesign {
  pub name: String,
  pub tonnage: u32,
  /// Indexed by `Location as usize`.
  pub locations: [LocationDesign; LOCATION_COUNT],
  pub equipment: Vec<Equipment>,
  #[serde(default = "default_engine_penalty")]
  pub engine_penalty: CriticalPenalty,
  #[serde(default = "default_gyro_penalty")]
  pub gyro_penalty: CriticalPenalty,
}

fn default_engine_penalty() -> CriticalPenalty {
  CriticalPenalty {
    heat: 5,
    piloting: 0,
    to_hit: 0,
    destroys_unit_after: Some(3),
  }
}

fn default_gyro_penalty() -> CriticalPenalty {
  CriticalPenalty {
    heat: 0,
    piloting: 3,
    to_hit: 0,
    destroys_unit_after: None,
  }
}

impl UnitDesign {
  #[must_use]
  pub fn location(&self, location: Location) -> &LocationDesign {
    &self.locations[location as usize]
  }

  /// The location holding the first slot of a piece of equipment.
  #[must_use]
  pub fn equipment_location(&self, equipment: usize) -> Option<Location> {
    Location::ALL
      .into_iter()
      .find(|location| self.location(*location).slots.contains(&Some(equipment)))
  }

  /// Check the layout is self consistent: slot counts fit their locations, every slot names real equipment,
  /// and rear armor appears only on torso locations.
  ///
  /// # Errors
  /// Returns `ScenarioError::InvalidDesign` naming the first problem found.
  pub fn validate(&self) -> Result<(), ScenarioError> {
    for location in Location::ALL {
      let layout = self.location(location);
      if layout.slots.len() > location.slot_capacity() {
        return Err(ScenarioError::InvalidDesign(
          self.name.clone(),
          format!(
            "{} has {} slots but holds at most {}",
            String::from(location),
            layout.slots.len(),
            location.slot_capacity()
          ),
        ));
      }
      if let Some(bad) = layout.slots.iter().flatten().find(|index| **index >= self.equipment.len()) {
        return Err(ScenarioError::InvalidDesign(
          self.name.clone(),
          format!("{} references unknown equipment #{bad}", String::from(location)),
        ));
      }
      if layout.rear_armor > 0 && !location.has_rear_armor() {
        return Err(ScenarioError::InvalidDesign(
          self.name.clone(),
          format!("{} cannot carry rear armor", String::from(location)),
        ));
      }
      if layout.structure == 0 {
        return Err(ScenarioError::InvalidDesign(
          self.name.clone(),
          format!("{} has no internal structure", String::from(location)),
        ));
      }
    }
    Ok(())
  }
}

/// Live state of one location.  Armor and structure are only ever written by the damage engine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
  pub(crate) armor: u32,
  #[serde(default)]
  pub(crate) rear_armor: u32,
  pub(crate) structure: u32,
  #[serde(default)]
  pub(crate) destroyed: bool,
  /// Parallel to the design's slot layout.
  pub(crate) destroyed_slots: Vec<bool>,
}

impl LocationState {
  fn new(design: &LocationDesign) -> Self {
    LocationState {
      armor: design.armor,
      rear_armor: design.rear_armor,
      structure: design.structure,
      destroyed: false,
      destroyed_slots: vec![false; design.slots.len()],
    }
  }

  #[must_use]
  pub fn armor(&self) -> u32 {
    self.armor
  }

  #[must_use]
  pub fn rear_armor(&self) -> u32 {
    self.rear_armor
  }

  #[must_use]
  pub fn structure(&self) -> u32 {
    self.structure
  }

  #[must_use]
  pub fn is_destroyed(&self) -> bool {
    self.destroyed
  }

  #[must_use]
  pub fn is_slot_destroyed(&self, slot: usize) -> bool {
    self.destroyed_slots.get(slot).copied().unwrap_or(false)
  }
}

/// A unit in play: its design plus everything that changes during combat.
#[serde_as]
#[derive(Derivative)]
#[derivative(PartialEq)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Unit {
  name: String,

  #[serde_as(as = "DesignNameOnly")]
  #[derivative(PartialEq = "ignore")]
  pub design: Arc<UnitDesign>,

  /// Indexed by `Location as usize`.
  pub(crate) locations: [LocationState; LOCATION_COUNT],

  /// Remaining shots, indexed by equipment.  Zero for anything that is not an ammunition bin.
  #[serde(default)]
  pub ammo: Vec<u32>,
  #[serde(default)]
  pub heat: u32,
  #[serde(default)]
  pub engine_hits: u8,
  #[serde(default)]
  pub gyro_hits: u8,
  #[serde(default)]
  pub sensor_hits: u8,
  #[serde(default)]
  pub(crate) destroyed: bool,
  #[serde(default)]
  pub pilot: Pilot,
}

impl Unit {
  #[must_use]
  pub fn new(name: String, design: &Arc<UnitDesign>, pilot: Pilot) -> Self {
    let locations = Location::ALL.map(|location| LocationState::new(design.location(location)));
    let ammo = design
      .equipment
      .iter()
      .map(|equipment| match equipment.kind {
        EquipmentKind::Ammo { shots, .. } => shots,
        _ => 0,
      })
      .collect();

    Unit {
      name,
      design: design.clone(),
      locations,
      ammo,
      heat: 0,
      engine_hits: 0,
      gyro_hits: 0,
      sensor_hits: 0,
      destroyed: false,
      pilot,
    }
  }

  #[must_use]
  pub fn get_name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn location(&self, location: Location) -> &LocationState {
    &self.locations[location as usize]
  }

  pub(crate) fn location_mut(&mut self, location: Location) -> &mut LocationState {
    &mut self.locations[location as usize]
  }

  #[must_use]
  pub fn is_destroyed(&self) -> bool {
    self.destroyed
  }

  #[must_use]
  pub fn equipment(&self, index: usize) -> Option<&Equipment> {
    self.design.equipment.get(index)
  }

  /// Equipment is lost once any of its slots takes a critical hit or the location holding it is destroyed.
  #[must_use]
  pub fn is_equipment_destroyed(&self, index: usize) -> bool {
    Location::ALL.into_iter().any(|location| {
      let state = self.location(location);
      self
        .design
        .location(location)
        .slots
        .iter()
        .enumerate()
        .any(|(slot, content)| *content == Some(index) && (state.destroyed || state.is_slot_destroyed(slot)))
    })
  }

  #[must_use]
  pub fn ammo_remaining(&self, index: usize) -> u32 {
    self.ammo.get(index).copied().unwrap_or(0)
  }

  pub(crate) fn spend_ammo(&mut self, index: usize) {
    if let Some(shots) = self.ammo.get_mut(index) {
      *shots = shots.saturating_sub(1);
    }
  }

  pub(crate) fn empty_ammo(&mut self, index: usize) -> u32 {
    self.ammo.get_mut(index).map(std::mem::take).unwrap_or(0)
  }

  /// To-hit penalty from the unit's own critical damage.
  #[must_use]
  pub fn damage_to_hit_penalty(&self) -> i32 {
    SENSOR_HIT_MOD * i32::from(self.sensor_hits)
      + i32::from(self.engine_hits) * self.design.engine_penalty.to_hit
      + i32::from(self.gyro_hits) * self.design.gyro_penalty.to_hit
  }

  #[must_use]
  pub fn piloting_penalty(&self) -> i32 {
    i32::from(self.engine_hits) * self.design.engine_penalty.piloting
      + i32::from(self.gyro_hits) * self.design.gyro_penalty.piloting
  }

  /// Extra heat generated each turn due to engine shielding damage.
  #[must_use]
  pub fn heat_penalty(&self) -> u32 {
    u32::from(self.engine_hits) * self.design.engine_penalty.heat
      + u32::from(self.gyro_hits) * self.design.gyro_penalty.heat
  }

  #[must_use]
  pub fn total_armor(&self) -> u32 {
    self.locations.iter().map(|l| l.armor + l.rear_armor).sum()
  }

  #[must_use]
  pub fn total_structure(&self) -> u32 {
    self.locations.iter().map(|l| l.structure).sum()
  }

  /// Check state read back from a file still lines up with the unit's design: one slot flag per critical slot and
  /// one shot count per piece of equipment.
  ///
  /// # Errors
  /// Returns `ScenarioError::InvalidState` naming the first mismatch found.
  pub fn validate(&self) -> Result<(), ScenarioError> {
    for location in Location::ALL {
      let slots = self.design.location(location).slots.len();
      let flags = self.location(location).destroyed_slots.len();
      if flags != slots {
        return Err(ScenarioError::InvalidState(
          self.name.clone(),
          format!("{} tracks {flags} slots but its design has {slots}", String::from(location)),
        ));
      }
    }
    if self.ammo.len() != self.design.equipment.len() {
      return Err(ScenarioError::InvalidState(
        self.name.clone(),
        format!(
          "ammo tracks {} entries but its design has {} pieces of equipment",
          self.ammo.len(),
          self.design.equipment.len()
        ),
      ));
    }
    Ok(())
  }
}

serde_with::serde_conv!(
  pub DesignNameOnly,
  Arc<UnitDesign>,
  |d: &Arc<UnitDesign>| d.name.clone(),
  |value: String| -> Result<_, String> {
    UNIT_DESIGNS
      .get()
      .ok_or_else(|| "(Deserializing Unit) Unit designs not loaded".to_string())?
      .get(&value)
      .cloned()
      .ok_or_else(|| format!("(Deserializing Unit) Unknown unit design {value}"))
  }
);

impl Default for UnitDesign {
  fn default() -> Self {
    // 50 ton fire support design: LRM-15 and SRM-4 in the torsos, a medium laser in each arm.
    let engine = Some(0);
    let gyro = Some(1);
    UnitDesign {
      name: "Trebuchet TBT-5N".to_string(),
      tonnage: 50,
      locations: [
        LocationDesign {
          armor: 9,
          rear_armor: 0,
          structure: 3,
          slots: vec![Some(4), Some(3), Some(2), None, Some(3), Some(4)],
        },
        LocationDesign {
          armor: 24,
          rear_armor: 8,
          structure: 16,
          slots: vec![
            engine, engine, engine, gyro, gyro, gyro, gyro, engine, engine, engine, None, None,
          ],
        },
        LocationDesign {
          armor: 16,
          rear_armor: 6,
          structure: 12,
          slots: vec![Some(7), Some(7), Some(7), Some(8), None, None],
        },
        LocationDesign {
          armor: 16,
          rear_armor: 6,
          structure: 12,
          slots: vec![Some(9), Some(10), Some(11), None],
        },
        LocationDesign {
          armor: 12,
          rear_armor: 0,
          structure: 8,
          slots: vec![Some(12), Some(12), Some(12), Some(12), Some(5)],
        },
        LocationDesign {
          armor: 12,
          rear_armor: 0,
          structure: 8,
          slots: vec![Some(13), Some(13), Some(13), Some(13), Some(6)],
        },
        LocationDesign {
          armor: 16,
          rear_armor: 0,
          structure: 12,
          slots: vec![Some(14), Some(14), Some(14), Some(14), None, None],
        },
        LocationDesign {
          armor: 16,
          rear_armor: 0,
          structure: 12,
          slots: vec![Some(15), Some(15), Some(15), Some(15), None, None],
        },
      ],
      equipment: vec![
        Equipment {
          name: "Fusion Engine".to_string(),
          kind: EquipmentKind::Engine,
        },
        Equipment {
          name: "Gyro".to_string(),
          kind: EquipmentKind::Gyro,
        },
        Equipment {
          name: "Cockpit".to_string(),
          kind: EquipmentKind::Cockpit,
        },
        Equipment {
          name: "Sensors".to_string(),
          kind: EquipmentKind::Sensors,
        },
        Equipment {
          name: "Life Support".to_string(),
          kind: EquipmentKind::LifeSupport,
        },
        Equipment {
          name: "Medium Laser".to_string(),
          kind: EquipmentKind::Weapon(WeaponStats {
            damage: 5,
            short_range: 3,
            medium_range: 6,
            long_range: 9,
            heat: 3,
            ..WeaponStats::default()
          }),
        },
        Equipment {
          name: "Medium Laser".to_string(),
          kind: EquipmentKind::Weapon(WeaponStats {
            damage: 5,
            short_range: 3,
            medium_range: 6,
            long_range: 9,
            heat: 3,
            ..WeaponStats::default()
          }),
        },
        Equipment {
          name: "LRM 15".to_string(),
          kind: EquipmentKind::Weapon(WeaponStats {
            damage: 1,
            rack_size: Some(15),
            ammo_type: Some("LRM 15".to_string()),
            min_range: 6,
            short_range: 7,
            medium_range: 14,
            long_range: 21,
            heat: 5,
            ..WeaponStats::default()
          }),
        },
        Equipment {
          name: "LRM 15 Ammo".to_string(),
          kind: EquipmentKind::Ammo {
            ammo_type: "LRM 15".to_string(),
            shots: 8,
            damage_per_shot: 15,
          },
        },
        Equipment {
          name: "SRM 4".to_string(),
          kind: EquipmentKind::Weapon(WeaponStats {
            damage: 2,
            rack_size: Some(4),
            ammo_type: Some("SRM 4".to_string()),
            short_range: 3,
            medium_range: 6,
            long_range: 9,
            heat: 3,
            ..WeaponStats::default()
          }),
        },
        Equipment {
          name: "SRM 4 Ammo".to_string(),
          kind: EquipmentKind::Ammo {
            ammo_type: "SRM 4".to_string(),
            shots: 25,
            damage_per_shot: 8,
          },
        },
        Equipment {
          name: "Heat Sink".to_string(),
          kind: EquipmentKind::HeatSink,
        },
        Equipment {
          name: "Left Arm Actuators".to_string(),
          kind: EquipmentKind::Actuator,
        },
        Equipment {
          name: "Right Arm Actuators".to_string(),
          kind: EquipmentKind::Actuator,
        },
        Equipment {
          name: "Left Leg Actuators".to_string(),
          kind: EquipmentKind::Actuator,
        },
        Equipment {
          name: "Right Leg Actuators".to_string(),
          kind: EquipmentKind::Actuator,
        },
      ],
      engine_penalty: default_engine_penalty(),
      gyro_penalty: default_gyro_penalty(),
    }
  }
}
