//! Rebound, block and steal/turnover tuning

use serde::{Deserialize, Serialize};

use crate::engine::tables::{Ladder, ZoneTable, BLOCK_LADDER, STEAL_LADDER};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReboundConfig {
    /// Offensive rebound chance when the offense out-rates the defense.
    pub offensive_bonus: f64,
    /// Offensive rebound chance otherwise.
    pub offensive_base: f64,
    /// Rating at which a player can grab the board outright.
    pub elite_threshold: u8,
    pub elite_shortcut_chance: f64,
}

impl Default for ReboundConfig {
    fn default() -> Self {
        Self {
            offensive_bonus: 0.30,
            offensive_base: 0.22,
            elite_threshold: 85,
            elite_shortcut_chance: 0.30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseConfig {
    // === Blocks ===
    pub block_rates: ZoneTable,
    pub block_ladder: Ladder,
    /// Per rating point above the pivot.
    pub block_defense_weight: f64,
    pub block_athleticism_weight: f64,
    pub block_max: f64,
    pub block_out_of_bounds: f64,

    // === Steals / turnovers ===
    pub steal_base: f64,
    pub steal_ladder: Ladder,
    pub steal_defense_weight: f64,
    pub steal_athleticism_weight: f64,
    pub steal_min: f64,
    pub steal_max: f64,
    pub jump_ball_chance: f64,
    pub unforced_turnover_chance: f64,
    pub fast_break_chance: f64,
    /// Chance the stealer finishes the break; otherwise a weighted teammate does.
    pub stealer_finish_chance: f64,

    pub rating_pivot: f64,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            block_rates: ZoneTable::new(0.09, 0.06, 0.02, 0.008),
            block_ladder: Ladder::new(&BLOCK_LADDER),
            block_defense_weight: 0.0008,
            block_athleticism_weight: 0.0006,
            block_max: 0.20,
            block_out_of_bounds: 0.4,

            steal_base: 0.055,
            steal_ladder: Ladder::new(&STEAL_LADDER),
            steal_defense_weight: 0.0006,
            steal_athleticism_weight: 0.0004,
            steal_min: 0.01,
            steal_max: 0.14,
            jump_ball_chance: 0.003,
            unforced_turnover_chance: 0.065,
            fast_break_chance: 0.40,
            stealer_finish_chance: 0.5,

            rating_pivot: 70.0,
        }
    }
}
