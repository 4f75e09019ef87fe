//! Dice primitives.
//!
//! Every random decision in a resolution goes through [`roll`] (a single die face) or [`pick`] (a uniform
//! choice among `n` candidates).  Keeping randomness to these two entry points is what makes the order of
//! consumption reproducible, and is what [`LoadedDice`] replays.
use std::collections::VecDeque;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error;

const DIE_SIZE: u32 = 6;

/// Roll a single six sided die.
pub fn roll(rng: &mut dyn RngCore) -> u8 {
  u8::try_from(rng.next_u32() % DIE_SIZE + 1).unwrap_or(1)
}

/// Uniformly choose an index in `0..candidates`.
///
/// # Panics
/// Panics if `candidates` is zero; callers must check for an empty candidate list first.
pub fn pick(candidates: usize, rng: &mut dyn RngCore) -> usize {
  assert!(candidates > 0, "(Dice.pick) Cannot pick from an empty candidate list.");
  usize::try_from(rng.next_u32()).unwrap_or_else(|_e| {
    error!("(Dice.pick) Usize cannot contain u32!");
    0
  }) % candidates
}

/// The two faces of a 2d6 roll.  Immutable once generated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
  d1: u8,
  d2: u8,
}

impl DiceRoll {
  /// Build a roll from known faces, e.g. when replaying a logged roll.
  ///
  /// # Panics
  /// Panics if either face is outside 1-6.
  #[must_use]
  pub fn from_faces(d1: u8, d2: u8) -> Self {
    assert!(
      (1..=6).contains(&d1) && (1..=6).contains(&d2),
      "(DiceRoll.from_faces) Illegal die faces ({d1}, {d2})."
    );
    DiceRoll { d1, d2 }
  }

  pub fn roll(rng: &mut dyn RngCore) -> Self {
    let d1 = roll(rng);
    let d2 = roll(rng);
    DiceRoll { d1, d2 }
  }

  #[must_use]
  pub fn faces(&self) -> (u8, u8) {
    (self.d1, self.d2)
  }

  #[must_use]
  pub fn sum(&self) -> u8 {
    self.d1 + self.d2
  }

  #[must_use]
  pub fn is_boxcars(&self) -> bool {
    self.sum() == 12
  }

  #[must_use]
  pub fn is_snake_eyes(&self) -> bool {
    self.sum() == 2
  }
}

/// A pre-loaded source of randomness.  Each entry is the raw value handed back by `next_u32`, so die faces are
/// stored as `face - 1` and picks as the index wanted.  Used to replay a logged resolution exactly, and in tests to
/// force specific rolls.
#[derive(Debug, Clone, Default)]
pub struct LoadedDice {
  values: VecDeque<u32>,
}

impl LoadedDice {
  /// Load a sequence of die faces (1-6).
  ///
  /// # Panics
  /// Panics if a face is outside 1-6.
  #[must_use]
  pub fn from_faces(faces: &[u8]) -> Self {
    let mut dice = LoadedDice::default();
    for face in faces {
      dice.push_face(*face);
    }
    dice
  }

  /// Queue one die face.
  ///
  /// # Panics
  /// Panics if the face is outside 1-6.
  pub fn push_face(&mut self, face: u8) -> &mut Self {
    assert!((1..=6).contains(&face), "(LoadedDice.push_face) Illegal die face {face}.");
    self.values.push_back(u32::from(face) - 1);
    self
  }

  /// Queue a slot selection.  The value is taken modulo the candidate count when consumed.
  pub fn push_pick(&mut self, index: u32) -> &mut Self {
    self.values.push_back(index);
    self
  }

  #[must_use]
  pub fn remaining(&self) -> usize {
    self.values.len()
  }
}

impl RngCore for LoadedDice {
  fn next_u32(&mut self) -> u32 {
    self
      .values
      .pop_front()
      .unwrap_or_else(|| panic!("(LoadedDice.next_u32) Loaded dice exhausted."))
  }

  fn next_u64(&mut self) -> u64 {
    u64::from(self.next_u32())
  }

  fn fill_bytes(&mut self, dest: &mut [u8]) {
    for chunk in dest.chunks_mut(4) {
      let bytes = self.next_u32().to_le_bytes();
      chunk.copy_from_slice(&bytes[..chunk.len()]);
    }
  }

  fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
    self.fill_bytes(dest);
    Ok(())
  }
}
