use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::combat::{strike, Aftermath};
use crate::combat_tables::cluster_hits;
use crate::debug;
use crate::dice::DiceRoll;
use crate::location::AttackType;
use crate::payloads::{CombatEvent, HitRecord, RollPurpose};
use crate::position::AttackDirection;
use crate::unit::{Unit, WeaponStats};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClusterResult {
  pub rack_size: u8,
  pub roll: DiceRoll,
  /// The roll after the weapon's cluster modifier, clamped to 2-12.
  pub modified_roll: u8,
  pub projectiles_hit: u8,
  pub damage_per_projectile: u32,
  /// One entry per connecting projectile, in the order they were resolved.
  pub hits: Vec<HitRecord>,
}

impl ClusterResult {
  #[must_use]
  pub fn total_damage(&self) -> u32 {
    self.hits.iter().map(|hit| hit.damage).sum()
  }
}

/// Apply a cluster modifier to a 2d6 roll, keeping it on the table.
#[must_use]
pub fn modified_cluster_roll(roll: u8, modifier: i32) -> u8 {
  u8::try_from((i32::from(roll) + modifier).clamp(2, 12)).unwrap_or(2)
}

/// Resolve a cluster weapon hit: one roll on the cluster table for how many projectiles connect, then each
/// projectile strikes on its own, one after another, with its own location roll, damage and critical checks.
///
/// # Panics
/// Panics if the weapon has no rack size or the rack size has no cluster table column.
pub fn resolve_cluster(
  stats: &WeaponStats, target: &mut Unit, direction: AttackDirection, rng: &mut dyn RngCore, aftermath: &mut Aftermath,
) -> ClusterResult {
  let Some(rack_size) = stats.rack_size else {
    panic!("(Cluster.resolve_cluster) Weapon {stats:?} is not a cluster weapon.");
  };

  let roll = DiceRoll::roll(rng);
  aftermath.events.push(CombatEvent::dice(RollPurpose::Cluster, roll));
  let modified_roll = modified_cluster_roll(roll.sum(), stats.cluster_modifier);
  let projectiles_hit = cluster_hits(rack_size, modified_roll);

  debug!(
    "(Cluster.resolve_cluster) Rack of {rack_size} rolls {} (modified {modified_roll}): {projectiles_hit} hit {}.",
    roll.sum(),
    target.get_name()
  );

  let first = aftermath.hits.len();
  for _ in 0..projectiles_hit {
    strike(target, AttackType::Weapon, direction, stats.damage, rng, aftermath);
  }

  ClusterResult {
    rack_size,
    roll,
    modified_roll,
    projectiles_hit,
    damage_per_projectile: stats.damage,
    hits: aftermath.hits[first..].to_vec(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use proptest::prelude::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use crate::dice::LoadedDice;
  use crate::pilot::Pilot;
  use crate::unit::{Location, UnitDesign};

  fn srm(rack_size: u8, cluster_modifier: i32) -> WeaponStats {
    WeaponStats {
      damage: 2,
      rack_size: Some(rack_size),
      cluster_modifier,
      ammo_type: Some("SRM".to_string()),
      short_range: 3,
      medium_range: 6,
      long_range: 9,
      ..WeaponStats::default()
    }
  }

  fn target() -> Unit {
    Unit::new("Target".to_string(), &Arc::new(UnitDesign::default()), Pilot::default())
  }

  #[test]
  fn test_modified_roll_clamps() {
    assert_eq!(modified_cluster_roll(7, 0), 7);
    assert_eq!(modified_cluster_roll(11, 2), 12);
    assert_eq!(modified_cluster_roll(3, -4), 2);
  }

  #[test_log::test]
  fn test_each_projectile_rolls_its_own_location() {
    let mut unit = target();
    let mut aftermath = Aftermath::default();
    // Cluster roll 7 on a 4-rack: 3 hit.  Then three location rolls: 7 (CT), 6 (RT), 12 (head).
    let mut dice = LoadedDice::from_faces(&[3, 4, 3, 4, 2, 4, 6, 6]);

    let result = resolve_cluster(&srm(4, 0), &mut unit, AttackDirection::Front, &mut dice, &mut aftermath);

    assert_eq!(result.projectiles_hit, 3);
    assert_eq!(result.total_damage(), 6);
    let locations: Vec<Location> = result.hits.iter().map(|hit| hit.location).collect();
    assert_eq!(
      locations,
      vec![Location::CenterTorso, Location::RightTorso, Location::Head]
    );
    assert_eq!(unit.location(Location::CenterTorso).armor(), 22);
    assert_eq!(unit.location(Location::Head).armor(), 7);
    assert_eq!(dice.remaining(), 0);
    assert!(matches!(
      aftermath.events[0],
      CombatEvent::DiceRolled {
        purpose: RollPurpose::Cluster,
        ..
      }
    ));
  }

  #[test]
  fn test_cluster_modifier_applies() {
    let mut unit = target();
    let mut aftermath = Aftermath::default();
    // Roll 9 + 2 = 11: the whole 2-rack connects.
    let mut dice = LoadedDice::from_faces(&[4, 5, 3, 4, 3, 4]);
    let result = resolve_cluster(&srm(2, 2), &mut unit, AttackDirection::Front, &mut dice, &mut aftermath);
    assert_eq!(result.modified_roll, 11);
    assert_eq!(result.projectiles_hit, 2);
  }

  proptest! {
    #[test]
    fn prop_cluster_damage_adds_up(seed in any::<u64>(), rack in prop::sample::select(vec![2u8, 4, 5, 6, 10, 15, 20])) {
      let mut unit = target();
      let mut aftermath = Aftermath::default();
      let mut rng = StdRng::seed_from_u64(seed);
      let result = resolve_cluster(&srm(rack, 0), &mut unit, AttackDirection::Front, &mut rng, &mut aftermath);

      prop_assert!(result.projectiles_hit <= rack);
      prop_assert_eq!(result.hits.len(), usize::from(result.projectiles_hit));
      prop_assert_eq!(result.total_damage(), u32::from(result.projectiles_hit) * 2);
    }
  }
}
