use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::debug;
use crate::position::PositionSnapshot;
use crate::rules_tables::{
  attacker_movement_mod, heat_mod, minimum_range_mod, range_mod, target_movement_mod, KICK_TO_HIT_MOD,
};
use crate::unit::Unit;
use crate::validation::{AttackProfile, ValidatedAttack};

/// Where a to-hit modifier came from.  Each source may contribute at most once to a target number.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModifierSource {
  Gunnery,
  Piloting,
  Range,
  MinimumRange,
  AttackerMovement,
  TargetMovement,
  Heat,
  Damage,
  PhysicalAttack,
  Situational(String),
}

impl Display for ModifierSource {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      ModifierSource::Gunnery => write!(f, "gunnery"),
      ModifierSource::Piloting => write!(f, "piloting"),
      ModifierSource::Range => write!(f, "range"),
      ModifierSource::MinimumRange => write!(f, "minimum range"),
      ModifierSource::AttackerMovement => write!(f, "attacker movement"),
      ModifierSource::TargetMovement => write!(f, "target movement"),
      ModifierSource::Heat => write!(f, "heat"),
      ModifierSource::Damage => write!(f, "damage"),
      ModifierSource::PhysicalAttack => write!(f, "physical attack"),
      ModifierSource::Situational(name) => write!(f, "{name}"),
    }
  }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
  pub source: ModifierSource,
  pub value: i32,
}

impl Modifier {
  #[must_use]
  pub fn new(source: ModifierSource, value: i32) -> Self {
    Modifier { source, value }
  }
}

impl Display for Modifier {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} {:+}", self.source, self.value)
  }
}

/// Ordered, source tagged contributions to one target number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierStack {
  modifiers: Vec<Modifier>,
}

impl ModifierStack {
  #[must_use]
  pub fn new() -> Self {
    ModifierStack::default()
  }

  /// Add a contribution.
  ///
  /// # Panics
  /// Panics if `source` has already contributed to this stack.
  pub fn push(&mut self, source: ModifierSource, value: i32) -> &mut Self {
    assert!(
      !self.contains(&source),
      "(ModifierStack.push) Modifier source {source:?} applied twice."
    );
    self.modifiers.push(Modifier::new(source, value));
    self
  }

  #[must_use]
  pub fn contains(&self, source: &ModifierSource) -> bool {
    self.modifiers.iter().any(|m| &m.source == source)
  }

  #[must_use]
  pub fn modifiers(&self) -> &[Modifier] {
    &self.modifiers
  }

  #[must_use]
  pub fn into_modifiers(self) -> Vec<Modifier> {
    self.modifiers
  }

  /// The sum of every contribution.  Not clamped: anything at or below 2 can only miss on snake eyes.
  #[must_use]
  pub fn target_number(&self) -> i32 {
    self.modifiers.iter().map(|m| m.value).sum()
  }
}

/// Assemble the to-hit stack for a validated attack.
///
/// Weapon attacks start from gunnery and take range and minimum range penalties.  Punches start from piloting and
/// kicks from piloting with the kick bonus; neither takes a range modifier.  Movement, heat and the attacker's own
/// critical damage apply to both, followed by whatever situational modifiers the position snapshot carries.
#[must_use]
pub fn build_to_hit(attacker: &Unit, attack: &ValidatedAttack, position: &PositionSnapshot) -> ModifierStack {
  let mut stack = ModifierStack::new();
  let pilot = &attacker.pilot;

  match &attack.profile {
    AttackProfile::Weapon { stats, bracket, .. } => {
      stack.push(ModifierSource::Gunnery, i32::from(pilot.get_gunnery()));
      stack.push(ModifierSource::Range, range_mod(*bracket));
      let min_range = minimum_range_mod(stats.min_range, position.range);
      if min_range != 0 {
        stack.push(ModifierSource::MinimumRange, min_range);
      }
    }
    AttackProfile::Punch { .. } => {
      stack.push(ModifierSource::Piloting, i32::from(pilot.get_piloting()));
    }
    AttackProfile::Kick { .. } => {
      stack.push(ModifierSource::Piloting, i32::from(pilot.get_piloting()));
      stack.push(ModifierSource::PhysicalAttack, KICK_TO_HIT_MOD);
    }
  }

  stack.push(
    ModifierSource::AttackerMovement,
    attacker_movement_mod(position.attacker_movement),
  );
  stack.push(
    ModifierSource::TargetMovement,
    target_movement_mod(position.target_hexes_moved, position.target_jumped),
  );

  let heat = heat_mod(attacker.heat);
  if heat != 0 {
    stack.push(ModifierSource::Heat, heat);
  }

  let damage = attacker.damage_to_hit_penalty();
  if damage != 0 {
    stack.push(ModifierSource::Damage, damage);
  }

  for situational in &position.situational {
    stack.push(ModifierSource::Situational(situational.source.clone()), situational.value);
  }

  debug!(
    "(Modifiers.build_to_hit) {} ({:?}, {} MP spent) needs {} to hit: {:?}",
    attacker.get_name(),
    position.attacker_movement,
    position.attacker_mp_spent,
    stack.target_number(),
    stack.modifiers()
  );

  stack
}
