// Cluster hits table.  Indexed first by rack size, then by the (modified) 2d6 roll less two.
// Each column is the number of projectiles that connect for rolls 2 through 12.
const CLUSTER_2: [u8; 11] = [1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2];
const CLUSTER_3: [u8; 11] = [1, 1, 1, 2, 2, 2, 2, 2, 3, 3, 3];
const CLUSTER_4: [u8; 11] = [1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4];
const CLUSTER_5: [u8; 11] = [1, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5];
const CLUSTER_6: [u8; 11] = [2, 2, 3, 3, 4, 4, 4, 5, 5, 6, 6];
const CLUSTER_7: [u8; 11] = [2, 2, 3, 4, 4, 4, 4, 6, 6, 7, 7];
const CLUSTER_8: [u8; 11] = [3, 3, 4, 4, 5, 5, 5, 6, 6, 8, 8];
const CLUSTER_9: [u8; 11] = [3, 3, 4, 5, 5, 5, 5, 7, 7, 9, 9];
const CLUSTER_10: [u8; 11] = [3, 3, 4, 6, 6, 6, 6, 8, 8, 10, 10];
const CLUSTER_11: [u8; 11] = [4, 4, 5, 7, 7, 7, 7, 9, 9, 11, 11];
const CLUSTER_12: [u8; 11] = [4, 4, 5, 8, 8, 8, 8, 10, 10, 12, 12];
const CLUSTER_13: [u8; 11] = [4, 4, 5, 8, 8, 8, 8, 11, 11, 13, 13];
const CLUSTER_14: [u8; 11] = [5, 5, 6, 9, 9, 9, 9, 11, 11, 14, 14];
const CLUSTER_15: [u8; 11] = [5, 5, 6, 9, 9, 9, 9, 12, 12, 15, 15];
const CLUSTER_16: [u8; 11] = [5, 5, 7, 10, 10, 10, 10, 13, 13, 16, 16];
const CLUSTER_17: [u8; 11] = [5, 5, 7, 10, 10, 10, 10, 14, 14, 17, 17];
const CLUSTER_18: [u8; 11] = [6, 6, 8, 11, 11, 11, 11, 14, 14, 18, 18];
const CLUSTER_19: [u8; 11] = [6, 6, 8, 11, 11, 11, 11, 15, 15, 19, 19];
const CLUSTER_20: [u8; 11] = [6, 6, 9, 12, 12, 12, 12, 16, 16, 20, 20];
const CLUSTER_21: [u8; 11] = [7, 7, 9, 13, 13, 13, 13, 17, 17, 21, 21];
const CLUSTER_22: [u8; 11] = [7, 7, 9, 14, 14, 14, 14, 18, 18, 22, 22];
const CLUSTER_23: [u8; 11] = [7, 7, 10, 15, 15, 15, 15, 19, 19, 23, 23];
const CLUSTER_24: [u8; 11] = [8, 8, 10, 16, 16, 16, 16, 20, 20, 24, 24];
const CLUSTER_25: [u8; 11] = [8, 8, 10, 16, 16, 16, 16, 21, 21, 25, 25];
const CLUSTER_26: [u8; 11] = [9, 9, 11, 17, 17, 17, 17, 21, 21, 26, 26];
const CLUSTER_27: [u8; 11] = [9, 9, 11, 17, 17, 17, 17, 22, 22, 27, 27];
const CLUSTER_28: [u8; 11] = [9, 9, 11, 17, 17, 17, 17, 23, 23, 28, 28];
const CLUSTER_29: [u8; 11] = [10, 10, 12, 18, 18, 18, 18, 23, 23, 29, 29];
const CLUSTER_30: [u8; 11] = [10, 10, 12, 18, 18, 18, 18, 24, 24, 30, 30];
const CLUSTER_40: [u8; 11] = [12, 12, 18, 24, 24, 24, 24, 32, 32, 40, 40];

/// The column of the cluster hits table for a rack size, or `None` if the table has no such column.
#[must_use]
pub fn cluster_column(rack_size: u8) -> Option<&'static [u8; 11]> {
  match rack_size {
    2 => Some(&CLUSTER_2),
    3 => Some(&CLUSTER_3),
    4 => Some(&CLUSTER_4),
    5 => Some(&CLUSTER_5),
    6 => Some(&CLUSTER_6),
    7 => Some(&CLUSTER_7),
    8 => Some(&CLUSTER_8),
    9 => Some(&CLUSTER_9),
    10 => Some(&CLUSTER_10),
    11 => Some(&CLUSTER_11),
    12 => Some(&CLUSTER_12),
    13 => Some(&CLUSTER_13),
    14 => Some(&CLUSTER_14),
    15 => Some(&CLUSTER_15),
    16 => Some(&CLUSTER_16),
    17 => Some(&CLUSTER_17),
    18 => Some(&CLUSTER_18),
    19 => Some(&CLUSTER_19),
    20 => Some(&CLUSTER_20),
    21 => Some(&CLUSTER_21),
    22 => Some(&CLUSTER_22),
    23 => Some(&CLUSTER_23),
    24 => Some(&CLUSTER_24),
    25 => Some(&CLUSTER_25),
    26 => Some(&CLUSTER_26),
    27 => Some(&CLUSTER_27),
    28 => Some(&CLUSTER_28),
    29 => Some(&CLUSTER_29),
    30 => Some(&CLUSTER_30),
    40 => Some(&CLUSTER_40),
    _ => None,
  }
}

/// Look up how many projectiles from a rack of `rack_size` connect on a cluster roll of `roll` (2-12).
///
/// # Panics
/// An unsupported rack size, a roll outside 2-12, or a table entry that claims more hits than the rack fires
/// are all defects in the catalog or this table and panic rather than guess.
#[must_use]
pub fn cluster_hits(rack_size: u8, roll: u8) -> u8 {
  let column = cluster_column(rack_size)
    .unwrap_or_else(|| panic!("(CombatTables.cluster_hits) No cluster table column for rack size {rack_size}."));
  assert!(
    (2..=12).contains(&roll),
    "(CombatTables.cluster_hits) Cluster roll {roll} outside 2-12."
  );
  let hits = column[usize::from(roll - 2)];
  assert!(
    hits >= 1 && hits <= rack_size,
    "(CombatTables.cluster_hits) Corrupt cluster table: {hits} hits for rack size {rack_size}."
  );
  hits
}
