use serde::{Deserialize, Serialize};

use crate::position::{FiringArc, PositionSnapshot};
use crate::unit::Location;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum AttackKind {
  Weapon {
    weapon: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ammo: Option<usize>,
  },
  Punch {
    arm: Location,
  },
  Kick {
    leg: Location,
  },
}

impl AttackKind {
  #[must_use]
  pub fn is_physical(&self) -> bool {
    matches!(self, AttackKind::Punch { .. } | AttackKind::Kick { .. })
  }
}

/// A proposed attack.  Immutable once it passes validation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttackDeclaration {
  pub attacker: String,
  pub target: String,
  pub attack: AttackKind,
  pub arc: FiringArc,
}

/// A declaration together with the positional snapshot it is resolved against.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAttack {
  pub declaration: AttackDeclaration,
  pub position: PositionSnapshot,
}

pub type AttackList = Vec<ScheduledAttack>;

/// Merge newly declared attacks into a phase's attack list.
///
/// A weapon fires at most once per phase, so a later declaration for the same attacker and weapon replaces the
/// earlier one.  A unit either kicks once or punches once with each arm: a kick replaces all of that unit's physical
/// attacks and a punch replaces any kick and any earlier punch with the same arm.
pub fn merge(current: &mut AttackList, other: AttackList) {
  for next in other {
    let attacker = next.declaration.attacker.clone();
    let same_attacker = |scheduled: &ScheduledAttack| scheduled.declaration.attacker == attacker;

    match &next.declaration.attack {
      AttackKind::Weapon { weapon, .. } => {
        current.retain(|scheduled| {
          !(same_attacker(scheduled)
            && matches!(scheduled.declaration.attack, AttackKind::Weapon { weapon: id, .. } if id == *weapon))
        });
      }
      AttackKind::Kick { .. } => {
        current.retain(|scheduled| !(same_attacker(scheduled) && scheduled.declaration.attack.is_physical()));
      }
      AttackKind::Punch { arm } => {
        current.retain(|scheduled| {
          !(same_attacker(scheduled)
            && match scheduled.declaration.attack {
              AttackKind::Kick { .. } => true,
              AttackKind::Punch { arm: other_arm } => other_arm == *arm,
              AttackKind::Weapon { .. } => false,
            })
        });
      }
    }
    current.push(next);
  }
}
