//! Configuration: the unit design catalog and scenario files.
//!
//! Designs are a JSON list of [`UnitDesign`], loaded once at start up into [`UNIT_DESIGNS`].  A scenario names the
//! units in play (fresh from a design, or carried over from an earlier phase) and the attacks of one fire phase.
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{merge, AttackList};
use crate::pilot::Pilot;
use crate::unit::{Unit, UnitDesign, UNIT_DESIGNS};
use crate::LOG_FILE_USE;
use crate::{debug, info};

pub type UnitDesigns = HashMap<String, Arc<UnitDesign>>;

#[derive(Error, Debug)]
pub enum ScenarioError {
  #[error("unable to read {0}: {1}")]
  Io(String, #[source] std::io::Error),
  #[error("unable to parse {0}: {1}")]
  Json(String, #[source] serde_json::Error),
  #[error("unit {unit} uses unknown design {design}")]
  UnknownDesign { unit: String, design: String },
  #[error("design {0} is invalid: {1}")]
  InvalidDesign(String, String),
  #[error("design {0} is defined more than once")]
  DuplicateDesign(String),
  #[error("unit {0} is defined more than once")]
  DuplicateUnit(String),
  #[error("attack names unknown unit {0}")]
  UnknownUnit(String),
  #[error("unit {0} does not match its design: {1}")]
  InvalidState(String, String),
  #[error("attack by {attacker} applies situational modifier {tag} more than once")]
  DuplicateSituational { attacker: String, tag: String },
}

/// A unit entering play fresh from its design.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScenarioUnit {
  pub name: String,
  pub design: String,
  #[serde(default)]
  pub pilot: Pilot,
  #[serde(default)]
  pub heat: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Scenario {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub units: Vec<ScenarioUnit>,
  /// Units carried over, damage and all, from an earlier phase.
  #[serde(default)]
  pub state: Vec<Unit>,
  #[serde(default)]
  pub attacks: AttackList,
}

/// Parse and check a design catalog.
///
/// # Errors
/// Returns `ScenarioError` if the catalog is not valid JSON, a design is not self consistent, or two designs share a
/// name.
pub fn parse_unit_designs(source: &str, json: &str) -> Result<UnitDesigns, ScenarioError> {
  let designs: Vec<UnitDesign> = serde_json::from_str(json).map_err(|e| ScenarioError::Json(source.to_string(), e))?;
  let mut table = HashMap::new();
  for design in designs {
    design.validate()?;
    debug!("(Scenario.parse_unit_designs) Loaded design {}.", design.name);
    if table.insert(design.name.clone(), Arc::new(design.clone())).is_some() {
      return Err(ScenarioError::DuplicateDesign(design.name));
    }
  }
  Ok(table)
}

/// Read a design catalog from disk.
///
/// # Errors
/// Returns `ScenarioError` if the file cannot be read or its contents are not a valid catalog.
pub async fn load_unit_designs_from_file(file_name: &str) -> Result<UnitDesigns, ScenarioError> {
  let json = tokio::fs::read_to_string(file_name)
    .await
    .map_err(|e| ScenarioError::Io(file_name.to_string(), e))?;
  let designs = parse_unit_designs(file_name, &json)?;
  info!(
    target: LOG_FILE_USE,
    "(Scenario.load_unit_designs_from_file) Loaded {} designs from {file_name}.",
    designs.len()
  );
  Ok(designs)
}

/// Helper for tests: load the default catalog into `UNIT_DESIGNS`.
///
/// # Panics
/// Panics if the default catalog cannot be read or parsed.
pub fn config_test_unit_designs() {
  const DEFAULT_UNIT_DESIGNS_FILE: &str = "./scenarios/default_unit_designs.json";
  let json = std::fs::read_to_string(DEFAULT_UNIT_DESIGNS_FILE).expect("Unable to read unit design file.");
  let designs = parse_unit_designs(DEFAULT_UNIT_DESIGNS_FILE, &json).expect("Unable to parse unit design file.");
  UNIT_DESIGNS
    .set(designs)
    .unwrap_or_else(|_e| {
      debug!("(config_test_unit_designs) attempting to set UNIT_DESIGNS twice!");
    });
}

impl Scenario {
  /// Parse a scenario.  Carried over units are resolved against `UNIT_DESIGNS`, which must already be set.
  ///
  /// # Errors
  /// Returns `ScenarioError::Json` if the scenario does not parse.
  pub fn parse(source: &str, json: &str) -> Result<Scenario, ScenarioError> {
    let mut scenario: Scenario =
      serde_json::from_str(json).map_err(|e| ScenarioError::Json(source.to_string(), e))?;
    // A weapon fires once per phase: later declarations win.
    let attacks = std::mem::take(&mut scenario.attacks);
    merge(&mut scenario.attacks, attacks);
    Ok(scenario)
  }

  /// Read a scenario from disk.
  ///
  /// # Errors
  /// Returns `ScenarioError` if the file cannot be read or parsed.
  pub async fn load_from_file(file_name: &str) -> Result<Scenario, ScenarioError> {
    let json = tokio::fs::read_to_string(file_name)
      .await
      .map_err(|e| ScenarioError::Io(file_name.to_string(), e))?;
    let scenario = Scenario::parse(file_name, &json)?;
    info!(
      target: LOG_FILE_USE,
      "(Scenario.load_from_file) Loaded scenario \"{}\" from {file_name}: {} units, {} attacks.",
      scenario.name,
      scenario.units.len() + scenario.state.len(),
      scenario.attacks.len()
    );
    Ok(scenario)
  }

  /// Build every unit in play, keyed by name, and check each attack names units that exist.
  ///
  /// # Errors
  /// Returns `ScenarioError` for an unknown design, a repeated unit name, carried over state that no longer fits its
  /// design, or an attack that names an unknown unit or repeats a situational modifier.
  pub fn build_units(&self, designs: &UnitDesigns) -> Result<HashMap<String, Unit>, ScenarioError> {
    let mut units = HashMap::new();

    for entry in &self.units {
      let design = designs.get(&entry.design).ok_or_else(|| ScenarioError::UnknownDesign {
        unit: entry.name.clone(),
        design: entry.design.clone(),
      })?;
      let mut unit = Unit::new(entry.name.clone(), design, entry.pilot.clone());
      unit.heat = entry.heat;
      if units.insert(entry.name.clone(), unit).is_some() {
        return Err(ScenarioError::DuplicateUnit(entry.name.clone()));
      }
    }

    for unit in &self.state {
      unit.validate()?;
      if units.insert(unit.get_name().to_string(), unit.clone()).is_some() {
        return Err(ScenarioError::DuplicateUnit(unit.get_name().to_string()));
      }
    }

    for scheduled in &self.attacks {
      for name in [&scheduled.declaration.attacker, &scheduled.declaration.target] {
        if !units.contains_key(name) {
          return Err(ScenarioError::UnknownUnit(name.clone()));
        }
      }
      let situational = &scheduled.position.situational;
      for (index, modifier) in situational.iter().enumerate() {
        if situational[..index].iter().any(|earlier| earlier.source == modifier.source) {
          return Err(ScenarioError::DuplicateSituational {
            attacker: scheduled.declaration.attacker.clone(),
            tag: modifier.source.clone(),
          });
        }
      }
    }

    Ok(units)
  }
}
