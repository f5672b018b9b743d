//! Foul, free-throw and challenge tuning

use serde::{Deserialize, Serialize};

use crate::engine::tables::{Ladder, ZoneTable, DRAW_FOUL_REGIMES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoulConfig {
    /// Base foul rate on a made shot, by zone.
    pub and_one_rates: ZoneTable,
    /// Base foul rate on a missed shot, by zone.
    pub miss_rates: ZoneTable,
    /// Foul-drawing regime multiplier.
    pub draw_foul_regimes: Ladder,
    /// Star shooter guarded by a non-star.
    pub star_whistle_multiplier: f64,
    /// Share of normal-context fouls that are flagrant.
    pub flagrant_chance: f64,
    /// Reach-in foul before the shot.
    pub reach_in_chance: f64,
    /// Quarter team fouls after which every defensive foul shoots two.
    pub bonus_threshold: u8,
    pub foul_out_limit: u8,
    pub flagrant_ejection_limit: u8,

    // === Coach's challenge ===
    pub challenge_from_quarter: u8,
    pub challenge_attempt_chance: f64,
    pub challenge_success_chance: f64,
}

impl Default for FoulConfig {
    fn default() -> Self {
        Self {
            and_one_rates: ZoneTable::new(0.05, 0.03, 0.012, 0.005),
            miss_rates: ZoneTable::new(0.16, 0.10, 0.045, 0.02),
            draw_foul_regimes: Ladder::new(&DRAW_FOUL_REGIMES),
            star_whistle_multiplier: 1.2,
            flagrant_chance: 0.01,
            reach_in_chance: 0.035,
            bonus_threshold: 5,
            foul_out_limit: 6,
            flagrant_ejection_limit: 2,

            challenge_from_quarter: 3,
            challenge_attempt_chance: 0.25,
            challenge_success_chance: 0.45,
        }
    }
}
