use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::dice::DiceRoll;
use crate::payloads::{CombatEvent, RollPurpose};
use crate::rules_tables::{consciousness_target, LETHAL_WOUNDS};
use crate::{debug, info};

/// Pilot consciousness.  `Dead` is terminal; the way back from `Unconscious` is [`Pilot::attempt_recovery`], which
/// only the turn sequencer calls.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consciousness {
  #[default]
  Conscious,
  Unconscious,
  Dead,
}

/// Something that happened to the unit this attack that can hurt its pilot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PilotTrigger {
  HeadStructureDamage,
  HeadDestroyed,
  CockpitDestroyed,
  AmmoExplosion,
  UnitDestroyed,
}

impl PilotTrigger {
  /// Lethal triggers kill the pilot regardless of any consciousness roll.
  #[must_use]
  pub fn is_lethal(self) -> bool {
    matches!(self, PilotTrigger::HeadDestroyed | PilotTrigger::CockpitDestroyed)
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pilot {
  #[serde(default)]
  name: String,
  #[serde(default = "default_gunnery")]
  gunnery: u8,
  #[serde(default = "default_piloting")]
  piloting: u8,
  #[serde(default)]
  wounds: u8,
  #[serde(default)]
  state: Consciousness,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  last_check_target: Option<u8>,
}

fn default_gunnery() -> u8 {
  4
}

fn default_piloting() -> u8 {
  5
}

impl Pilot {
  #[must_use]
  pub fn new(name: &str, gunnery: u8, piloting: u8) -> Pilot {
    Pilot {
      name: name.to_string(),
      gunnery,
      piloting,
      wounds: 0,
      state: Consciousness::Conscious,
      last_check_target: None,
    }
  }

  #[must_use]
  pub fn get_name(&self) -> &str {
    &self.name
  }

  #[must_use]
  pub fn get_gunnery(&self) -> u8 {
    self.gunnery
  }

  #[must_use]
  pub fn get_piloting(&self) -> u8 {
    self.piloting
  }

  #[must_use]
  pub fn get_wounds(&self) -> u8 {
    self.wounds
  }

  #[must_use]
  pub fn get_state(&self) -> Consciousness {
    self.state
  }

  #[must_use]
  pub fn last_check_target(&self) -> Option<u8> {
    self.last_check_target
  }

  #[must_use]
  pub fn is_conscious(&self) -> bool {
    self.state == Consciousness::Conscious
  }

  /// Roll to wake an unconscious pilot.  Returns whether the pilot is conscious afterwards; dead pilots never are.
  pub fn attempt_recovery(&mut self, rng: &mut dyn RngCore) -> bool {
    match self.state {
      Consciousness::Conscious => true,
      Consciousness::Dead => false,
      Consciousness::Unconscious => {
        let Some(target) = consciousness_target(self.wounds) else {
          return false;
        };
        let roll = DiceRoll::roll(rng);
        self.last_check_target = Some(target);
        debug!(
          "(Pilot.attempt_recovery) {} rolls {} against {} to recover.",
          self.name,
          roll.sum(),
          target
        );
        if roll.sum() >= target {
          self.state = Consciousness::Conscious;
        }
        self.is_conscious()
      }
    }
  }
}

impl Default for Pilot {
  fn default() -> Self {
    Pilot::new("", default_gunnery(), default_piloting())
  }
}

/// Apply the pilot triggers raised during one attack, in the order they were raised.
///
/// Each trigger adds a wound.  Lethal triggers, or reaching the lethal wound count, kill the pilot.  Otherwise a
/// conscious pilot rolls 2d6 against the consciousness target for the new wound total and is knocked out on a
/// failure.  An unconscious pilot keeps taking wounds but does not roll, and a dead pilot ignores everything.
pub fn resolve_pilot_damage(
  unit: &str, pilot: &mut Pilot, triggers: &[PilotTrigger], rng: &mut dyn RngCore,
) -> Vec<CombatEvent> {
  let mut events = vec![];

  for trigger in triggers {
    if pilot.state == Consciousness::Dead {
      debug!("(Pilot.resolve_pilot_damage) {unit}'s pilot is already dead; ignoring {trigger:?}.");
      continue;
    }

    pilot.wounds = pilot.wounds.saturating_add(1);
    events.push(CombatEvent::PilotWounded {
      unit: unit.to_string(),
      wounds: pilot.wounds,
    });

    let target = consciousness_target(pilot.wounds);
    if trigger.is_lethal() || target.is_none() {
      info!(
        "(Pilot.resolve_pilot_damage) {unit}'s pilot killed by {trigger:?} with {} wounds.",
        pilot.wounds
      );
      pilot.state = Consciousness::Dead;
      events.push(CombatEvent::PilotKilled { unit: unit.to_string() });
      continue;
    }

    if pilot.state == Consciousness::Unconscious {
      debug!("(Pilot.resolve_pilot_damage) {unit}'s pilot is unconscious; no roll for {trigger:?}.");
      continue;
    }

    let target = target.unwrap_or(LETHAL_WOUNDS);
    let roll = DiceRoll::roll(rng);
    pilot.last_check_target = Some(target);
    events.push(CombatEvent::dice(RollPurpose::Consciousness, roll));

    debug!(
      "(Pilot.resolve_pilot_damage) {unit}'s pilot rolls {} against {target} after {trigger:?}.",
      roll.sum()
    );

    if roll.sum() < target {
      pilot.state = Consciousness::Unconscious;
      events.push(CombatEvent::PilotUnconscious { unit: unit.to_string() });
    }
  }

  events
}
