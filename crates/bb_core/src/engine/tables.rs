//! Ordered threshold tables
//!
//! Every tiered multiplier (block/steal ladders, foul-drawing regimes,
//! durability and athleticism minute adjustments) is a [`Ladder`]: rows of
//! `(threshold, value)` sorted from the highest threshold down. A lookup
//! returns the value of the first row whose threshold the rating reaches.

use serde::{Deserialize, Serialize};

use crate::models::ShotZone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<(u8, f64)>", into = "Vec<(u8, f64)>")]
pub struct Ladder {
    rows: Vec<(u8, f64)>,
}

impl From<Vec<(u8, f64)>> for Ladder {
    fn from(rows: Vec<(u8, f64)>) -> Self {
        Ladder::new(&rows)
    }
}

impl From<Ladder> for Vec<(u8, f64)> {
    fn from(ladder: Ladder) -> Self {
        ladder.rows
    }
}

impl Ladder {
    pub fn new(rows: &[(u8, f64)]) -> Self {
        let mut rows = rows.to_vec();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        Self { rows }
    }

    /// Value of the highest tier `rating` reaches. Below every threshold the
    /// lowest tier applies; an empty ladder is neutral (1.0).
    pub fn lookup(&self, rating: u8) -> f64 {
        self.rows
            .iter()
            .find(|(threshold, _)| rating >= *threshold)
            .or_else(|| self.rows.last())
            .map(|(_, value)| *value)
            .unwrap_or(1.0)
    }

    pub fn rows(&self) -> &[(u8, f64)] {
        &self.rows
    }
}

/// One value per shot zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneTable {
    pub rim: f64,
    pub paint: f64,
    pub mid: f64,
    pub three: f64,
}

impl ZoneTable {
    pub const fn new(rim: f64, paint: f64, mid: f64, three: f64) -> Self {
        Self {
            rim,
            paint,
            mid,
            three,
        }
    }

    #[inline]
    pub fn get(&self, zone: ShotZone) -> f64 {
        match zone {
            ShotZone::Rim => self.rim,
            ShotZone::Paint => self.paint,
            ShotZone::MidRange => self.mid,
            ShotZone::Three => self.three,
        }
    }
}

// ============================================================================
// Default tables
// ============================================================================

/// Block-rating bonus multiplier.
pub const BLOCK_LADDER: [(u8, f64); 5] = [(90, 2.0), (80, 1.6), (70, 1.25), (60, 1.0), (0, 0.7)];

/// Steal-rating bonus multiplier.
pub const STEAL_LADDER: [(u8, f64); 5] = [(90, 1.8), (80, 1.45), (70, 1.15), (60, 1.0), (0, 0.75)];

/// Foul-drawing regime multiplier (three regimes).
pub const DRAW_FOUL_REGIMES: [(u8, f64); 3] = [(85, 1.5), (65, 1.0), (0, 0.7)];

/// Starter target minutes by durability.
pub const DURABILITY_MINUTES: [(u8, f64); 5] =
    [(90, 36.0), (80, 34.0), (70, 32.0), (60, 30.0), (0, 28.0)];

/// Minutes added (or removed) by athleticism.
pub const ATHLETICISM_MINUTES: [(u8, f64); 3] = [(85, 2.0), (70, 0.0), (0, -2.0)];

/// Dunk share of rim attempts by dunk class score (max dunk rating).
pub const DUNK_SHARE: [(u8, f64); 3] = [(80, 0.50), (55, 0.25), (0, 0.05)];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_picks_highest_reached_tier() {
        let ladder = Ladder::new(&BLOCK_LADDER);
        assert_eq!(ladder.lookup(99), 2.0);
        assert_eq!(ladder.lookup(90), 2.0);
        assert_eq!(ladder.lookup(89), 1.6);
        assert_eq!(ladder.lookup(70), 1.25);
        assert_eq!(ladder.lookup(60), 1.0);
        assert_eq!(ladder.lookup(12), 0.7);
    }

    #[test]
    fn test_unsorted_rows_are_normalized() {
        let ladder = Ladder::new(&[(0, 0.5), (80, 2.0), (50, 1.0)]);
        assert_eq!(ladder.rows()[0].0, 80);
        assert_eq!(ladder.lookup(79), 1.0);
        assert_eq!(ladder.lookup(49), 0.5);
    }

    #[test]
    fn test_floor_and_empty() {
        let ladder = Ladder::new(&[(50, 1.2), (70, 1.5)]);
        assert_eq!(ladder.lookup(10), 1.2);
        assert_eq!(Ladder::new(&[]).lookup(80), 1.0);
    }

    #[test]
    fn test_zone_table() {
        let t = ZoneTable::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(t.get(ShotZone::Rim), 1.0);
        assert_eq!(t.get(ShotZone::Three), 4.0);
    }

    #[test]
    fn test_deserialized_rows_are_sorted() {
        let ladder: Ladder = serde_json::from_str("[[0,0.5],[90,3.0]]").unwrap();
        assert_eq!(ladder.lookup(95), 3.0);
    }

    #[test]
    fn test_serde_is_plain_rows() {
        let ladder = Ladder::new(&DRAW_FOUL_REGIMES);
        let json = serde_json::to_string(&ladder).unwrap();
        assert_eq!(json, "[[85,1.5],[65,1.0],[0,0.7]]");
        let back: Ladder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ladder);
    }
}
