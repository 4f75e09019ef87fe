use std::collections::HashMap;
use std::hash::BuildHasher;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::action::{AttackDeclaration, ScheduledAttack};
use crate::cluster::resolve_cluster;
use crate::critical::{resolve_critical, CriticalHitResult};
use crate::damage::{apply_damage, ArmorFacing};
use crate::dice::DiceRoll;
use crate::location::{resolve_hit_location, AttackType};
use crate::modifiers::build_to_hit;
use crate::payloads::{AttackReport, AttackResolution, CombatEvent, DamageEvent, HitRecord, RollPurpose};
use crate::pilot::{resolve_pilot_damage, PilotTrigger};
use crate::position::{AttackDirection, PositionSnapshot};
use crate::unit::Unit;
use crate::validation::{validate_declaration, AttackProfile, InvalidDeclaration};
use crate::LOG_PHASE_ACTIVITY;
use crate::{debug, info, warn};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
  AutoMiss,
  Miss,
  Hit,
  /// A hit on boxcars.  Flags the result for critical margin treatment; it does not change how damage resolves.
  HitWithCriticalMargin,
}

impl HitOutcome {
  #[must_use]
  pub fn is_hit(self) -> bool {
    matches!(self, HitOutcome::Hit | HitOutcome::HitWithCriticalMargin)
  }
}

/// Classify a to-hit roll.  Snake eyes always misses and boxcars always hits, whatever the target number;
/// anything else hits when it meets or beats the target number.
#[must_use]
pub fn classify(roll: &DiceRoll, target_number: i32) -> HitOutcome {
  if roll.is_snake_eyes() {
    HitOutcome::AutoMiss
  } else if roll.is_boxcars() {
    HitOutcome::HitWithCriticalMargin
  } else if i32::from(roll.sum()) >= target_number {
    HitOutcome::Hit
  } else {
    HitOutcome::Miss
  }
}

/// What has happened to the target so far in one attack.  Accumulates across every strike of the attack so the
/// pilot triggers can be resolved once at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aftermath {
  pub hits: Vec<HitRecord>,
  pub damage: Vec<DamageEvent>,
  pub criticals: Vec<CriticalHitResult>,
  pub events: Vec<CombatEvent>,
  pub pilot_triggers: Vec<PilotTrigger>,
}

/// Land one damaging hit: roll its location, apply the damage, then roll criticals for every location whose structure
/// it reached and which is still standing.
pub fn strike(
  target: &mut Unit, attack_type: AttackType, direction: AttackDirection, damage: u32, rng: &mut dyn RngCore,
  aftermath: &mut Aftermath,
) {
  let (hit, roll_event) = resolve_hit_location(attack_type, direction, rng);
  aftermath.events.push(roll_event);
  aftermath.events.push(CombatEvent::LocationHit {
    unit: target.get_name().to_string(),
    location: hit.location,
    rear: hit.rear,
  });

  let facing = if hit.rear {
    ArmorFacing::Rear
  } else {
    ArmorFacing::Front
  };
  let report = apply_damage(target, hit.location, damage, facing);

  aftermath.pilot_triggers.extend(report.pilot_triggers());
  aftermath.events.extend(report.events);
  aftermath.damage.extend(report.damage);

  for location in report.structure_damaged {
    if let Some(critical) = resolve_critical(target, location, rng) {
      aftermath.events.extend(critical.events);
      aftermath.pilot_triggers.extend(critical.pilot_triggers);
      aftermath.damage.extend(critical.follow_on.damage);
      aftermath.criticals.push(critical.result);
    }
  }

  aftermath.hits.push(HitRecord {
    location: hit.location,
    rear: hit.rear,
    damage,
  });
}

/// Resolve one attack from start to finish.
///
/// Validation comes first and is the only way this can fail; a rejected declaration leaves both units untouched.
/// After that the attack always runs to completion: ammunition is spent, the to-hit roll is made, and on a hit the
/// damage, critical hits and finally the target's pilot are resolved.  Dice are consumed strictly in that order.
///
/// # Arguments
/// * `declaration` - The attack being made.
/// * `attacker` - The attacking unit.  Only its ammunition changes.
/// * `target` - The unit being attacked.  Takes all damage and pilot effects.
/// * `position` - Range, facings and movement for this pair of units.
/// * `rng` - The source of every die roll and slot selection.
///
/// # Errors
/// Returns the `InvalidDeclaration` reason if the declaration is not legal.
pub fn resolve_attack(
  declaration: &AttackDeclaration, attacker: &mut Unit, target: &mut Unit, position: &PositionSnapshot,
  rng: &mut dyn RngCore,
) -> Result<AttackResolution, InvalidDeclaration> {
  let attack = validate_declaration(declaration, attacker, target, position)?;

  let stack = build_to_hit(attacker, &attack, position);
  let target_number = stack.target_number();

  let heat = match &attack.profile {
    AttackProfile::Weapon { stats, ammo, .. } => {
      if let Some(bin) = ammo {
        attacker.spend_ammo(*bin);
      }
      stats.heat
    }
    AttackProfile::Punch { .. } | AttackProfile::Kick { .. } => 0,
  };

  let mut events = vec![
    CombatEvent::AttackDeclared {
      attacker: declaration.attacker.clone(),
      target: declaration.target.clone(),
      weapon: attack.name(),
    },
    CombatEvent::ToHitCalculated {
      target_number,
      modifiers: stack.into_modifiers(),
    },
  ];

  let roll = DiceRoll::roll(rng);
  let outcome = classify(&roll, target_number);
  events.push(CombatEvent::dice(RollPurpose::ToHit, roll));
  events.push(CombatEvent::AttackResolved { outcome });

  info!(
    "(Combat.resolve_attack) {} fires {} at {}: needs {target_number}, rolls {} for {outcome:?}.",
    declaration.attacker,
    attack.name(),
    declaration.target,
    roll.sum()
  );

  let mut aftermath = Aftermath::default();
  let mut cluster = None;

  if outcome.is_hit() {
    let direction = position.attack_direction();
    match &attack.profile {
      AttackProfile::Weapon { stats, .. } if stats.rack_size.is_some() => {
        cluster = Some(resolve_cluster(stats, target, direction, rng, &mut aftermath));
      }
      AttackProfile::Weapon { stats, .. } => {
        strike(target, AttackType::Weapon, direction, stats.damage, rng, &mut aftermath);
      }
      AttackProfile::Punch { damage, .. } => {
        strike(target, AttackType::Punch, direction, *damage, rng, &mut aftermath);
      }
      AttackProfile::Kick { damage, .. } => {
        strike(target, AttackType::Kick, direction, *damage, rng, &mut aftermath);
      }
    }
  }

  events.append(&mut aftermath.events);

  if !aftermath.pilot_triggers.is_empty() {
    let target_name = target.get_name().to_string();
    debug!(
      "(Combat.resolve_attack) Pilot triggers for {target_name}: {:?}",
      aftermath.pilot_triggers
    );
    events.extend(resolve_pilot_damage(
      &target_name,
      &mut target.pilot,
      &aftermath.pilot_triggers,
      rng,
    ));
  }

  Ok(AttackResolution {
    attacker: declaration.attacker.clone(),
    target: declaration.target.clone(),
    target_number,
    roll,
    outcome,
    heat,
    hits: aftermath.hits,
    cluster,
    damage: aftermath.damage,
    criticals: aftermath.criticals,
    events,
  })
}

/// Resolve a phase's attacks in order, each as its own transaction against the current state of `units`.
/// A rejected declaration is reported and the phase carries on.
pub fn resolve_fire_phase<S: BuildHasher>(
  units: &mut HashMap<String, Unit, S>, attacks: &[ScheduledAttack], rng: &mut dyn RngCore,
) -> Vec<AttackReport> {
  let mut reports = Vec::with_capacity(attacks.len());

  for scheduled in attacks {
    let declaration = &scheduled.declaration;

    let result = if declaration.attacker == declaration.target {
      Err(InvalidDeclaration::SelfTarget(declaration.attacker.clone()))
    } else if let Some(mut attacker) = units.remove(&declaration.attacker) {
      let result = match units.get_mut(&declaration.target) {
        Some(target) => resolve_attack(declaration, &mut attacker, target, &scheduled.position, rng),
        None => Err(InvalidDeclaration::NoSuchUnit(declaration.target.clone())),
      };
      units.insert(declaration.attacker.clone(), attacker);
      result
    } else {
      Err(InvalidDeclaration::NoSuchUnit(declaration.attacker.clone()))
    };

    if let Err(reason) = &result {
      warn!(
        "(Combat.resolve_fire_phase) {} cannot attack {}: {reason}",
        declaration.attacker, declaration.target
      );
    }

    reports.push(AttackReport {
      attacker: declaration.attacker.clone(),
      target: declaration.target.clone(),
      result,
    });
  }

  info!(
    target: LOG_PHASE_ACTIVITY,
    "(Combat.resolve_fire_phase) Resolved {} attacks, {} rejected, {} units destroyed.",
    reports.len(),
    reports.iter().filter(|report| report.result.is_err()).count(),
    units.values().filter(|unit| unit.is_destroyed()).count()
  );

  reports
}
