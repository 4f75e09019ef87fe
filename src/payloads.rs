/*** The typed records the engine hands back to its callers.  `CombatEvent` is the ordered event log consumed by the
 * log/UI side; the remaining types are the per-attack result values.
 */
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::cluster::ClusterResult;
use crate::combat::HitOutcome;
use crate::critical::CriticalHitResult;
use crate::dice::DiceRoll;
use crate::modifiers::Modifier;
use crate::unit::Location;
use crate::validation::InvalidDeclaration;

/// Why a set of dice was rolled.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollPurpose {
  ToHit,
  HitLocation,
  CriticalCheck,
  Cluster,
  Consciousness,
}

/// Which pool a piece of damage came out of.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamagePool {
  Armor,
  RearArmor,
  Structure,
}

impl From<DamagePool> for String {
  fn from(pool: DamagePool) -> Self {
    match pool {
      DamagePool::Armor => "armor".to_string(),
      DamagePool::RearArmor => "rear armor".to_string(),
      DamagePool::Structure => "structure".to_string(),
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CombatEvent {
  AttackDeclared {
    attacker: String,
    target: String,
    weapon: String,
  },
  ToHitCalculated {
    target_number: i32,
    modifiers: Vec<Modifier>,
  },
  DiceRolled {
    purpose: RollPurpose,
    faces: Vec<u8>,
  },
  AttackResolved {
    outcome: HitOutcome,
  },
  LocationHit {
    unit: String,
    location: Location,
    rear: bool,
  },
  DamageApplied {
    unit: String,
    location: Location,
    amount: u32,
    pool: DamagePool,
  },
  LocationDestroyed {
    unit: String,
    location: Location,
  },
  UnitDestroyed {
    unit: String,
  },
  CriticalHitTriggered {
    unit: String,
    location: Location,
    count: u8,
  },
  EquipmentDestroyed {
    unit: String,
    location: Location,
    slot: usize,
    equipment: String,
  },
  AmmoExploded {
    unit: String,
    location: Location,
    amount: u32,
  },
  PilotWounded {
    unit: String,
    wounds: u8,
  },
  PilotUnconscious {
    unit: String,
  },
  PilotKilled {
    unit: String,
  },
}

impl CombatEvent {
  #[must_use]
  pub fn dice(purpose: RollPurpose, roll: DiceRoll) -> CombatEvent {
    let (d1, d2) = roll.faces();
    CombatEvent::DiceRolled {
      purpose,
      faces: vec![d1, d2],
    }
  }

  #[must_use]
  pub fn die(purpose: RollPurpose, face: u8) -> CombatEvent {
    CombatEvent::DiceRolled {
      purpose,
      faces: vec![face],
    }
  }
}

impl Display for CombatEvent {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      CombatEvent::AttackDeclared {
        attacker,
        target,
        weapon,
      } => write!(f, "{attacker} attacks {target} with {weapon}"),
      CombatEvent::ToHitCalculated {
        target_number,
        modifiers,
      } => {
        write!(f, "Target number {target_number} (")?;
        for (i, modifier) in modifiers.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{modifier}")?;
        }
        write!(f, ")")
      }
      CombatEvent::DiceRolled { purpose, faces } => {
        let total: u32 = faces.iter().map(|face| u32::from(*face)).sum();
        write!(f, "Rolled {faces:?} = {total} for {purpose:?}")
      }
      CombatEvent::AttackResolved { outcome } => write!(f, "Attack result: {outcome:?}"),
      CombatEvent::LocationHit { unit, location, rear } => write!(
        f,
        "{unit} hit in the {}{}",
        String::from(*location),
        if *rear { " (rear)" } else { "" }
      ),
      CombatEvent::DamageApplied {
        unit,
        location,
        amount,
        pool,
      } => write!(
        f,
        "{unit} takes {amount} damage to {} {}",
        String::from(*location),
        String::from(*pool)
      ),
      CombatEvent::LocationDestroyed { unit, location } => {
        write!(f, "{unit}'s {} is destroyed", String::from(*location))
      }
      CombatEvent::UnitDestroyed { unit } => write!(f, "{unit} is destroyed"),
      CombatEvent::CriticalHitTriggered { unit, location, count } => write!(
        f,
        "{count} critical hit(s) on {unit}'s {}",
        String::from(*location)
      ),
      CombatEvent::EquipmentDestroyed {
        unit,
        location,
        slot,
        equipment,
      } => write!(
        f,
        "{unit}'s {equipment} destroyed ({} slot {})",
        String::from(*location),
        slot + 1
      ),
      CombatEvent::AmmoExploded { unit, location, amount } => write!(
        f,
        "Ammunition explodes in {unit}'s {} for {amount} damage",
        String::from(*location)
      ),
      CombatEvent::PilotWounded { unit, wounds } => write!(f, "{unit}'s pilot wounded ({wounds} wounds)"),
      CombatEvent::PilotUnconscious { unit } => write!(f, "{unit}'s pilot is knocked unconscious"),
      CombatEvent::PilotKilled { unit } => write!(f, "{unit}'s pilot is killed"),
    }
  }
}

/// One change to a unit's armor or structure.  Never mutated once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DamageEvent {
  pub unit: String,
  pub location: Location,
  pub amount: u32,
  pub pool: DamagePool,
  /// Whether this damage exhausted the location's structure.
  pub destroyed: bool,
}

/// A single damaging hit: one weapon hit, one physical attack or one cluster projectile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HitRecord {
  pub location: Location,
  pub rear: bool,
  pub damage: u32,
}

/// Everything that came out of resolving one validated attack.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttackResolution {
  pub attacker: String,
  pub target: String,
  pub target_number: i32,
  pub roll: DiceRoll,
  pub outcome: HitOutcome,
  /// Heat the attacker built up making this attack.
  #[serde(default)]
  pub heat: u32,
  #[serde(default)]
  pub hits: Vec<HitRecord>,
  #[serde(default)]
  pub cluster: Option<ClusterResult>,
  #[serde(default)]
  pub damage: Vec<DamageEvent>,
  #[serde(default)]
  pub criticals: Vec<CriticalHitResult>,
  pub events: Vec<CombatEvent>,
}

/// One line of a fire phase: the attack as declared and how it went.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
  pub attacker: String,
  pub target: String,
  pub result: Result<AttackResolution, InvalidDeclaration>,
}
