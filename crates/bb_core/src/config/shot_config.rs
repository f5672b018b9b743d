//! Shot selection & make-percentage tuning

use serde::{Deserialize, Serialize};

use crate::engine::tables::{Ladder, ZoneTable, DUNK_SHARE};

/// Three-way defense density swing thresholds, in percent of a 1..=100 roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Roll ≤ this → open look.
    pub easy_pct: u8,
    /// Roll > 100 - this → crowded look.
    pub hard_pct: u8,
    /// Percentage points added/removed.
    pub swing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    // === Zones (feet) ===
    pub rim_distance: u8,
    pub paint_distance: u8,
    pub three_point_distance: u8,
    pub max_distance: u8,

    // === Base curve (percent) ===
    /// Close range: `close_base - close_offset * distance`.
    pub close_base: f64,
    pub close_offset: f64,
    /// Paint/mid-range: linear from `linear_base` at the first paint foot.
    pub linear_base: f64,
    pub linear_slope: f64,
    /// Three: `three_base - three_falloff * (d - three_point_distance)^2`.
    pub three_base: f64,
    pub three_falloff: f64,

    // === Distance shaping ===
    /// Balanced shooters: chance a long two gets pulled into the paint.
    pub balanced_pull_in: f64,
    /// Mid-range shooters: chance a long two gets pulled to the elbow.
    pub midrange_pull_in: f64,

    // === Shot type ===
    pub dunk_share: Ladder,
    pub dunk_scale: f64,
    pub dunk_rating_weight: f64,
    pub layup_rating_weight: f64,
    pub inside_rating_weight: f64,
    pub mid_rating_weight: f64,
    pub three_rating_weight: f64,
    pub rating_pivot: f64,

    // === Defense ===
    pub defense_weight: f64,
    pub density_regular: DensityConfig,
    pub density_playoff: DensityConfig,

    // === Consistency ===
    pub consistency_weight: f64,
    pub consistency_cap: f64,

    // === Athleticism (sigmoid) ===
    pub athleticism_max: f64,
    pub athleticism_scale: f64,
    pub athleticism_weights: ZoneTable,

    // === Clutch ===
    pub clutch_window_seconds: u32,
    pub clutch_margin: u16,
    pub clutch_max_penalty: f64,

    // === Lineup ===
    pub playmaker_threshold: u8,
    /// Bonus for 0, 1 and 2+ elite passers on the floor.
    pub playmaker_bonus: [f64; 3],
    pub star_penalty: f64,

    pub min_pct: f64,
    pub max_pct: f64,

    // === Usage / assists ===
    pub usage_floor: u8,
    pub star_usage_multiplier: f64,
    pub assist_chance: f64,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            rim_distance: 4,
            paint_distance: 10,
            three_point_distance: 23,
            max_distance: 30,

            close_base: 64.0,
            close_offset: 1.0,
            linear_base: 52.0,
            linear_slope: 0.9,
            three_base: 37.0,
            three_falloff: 0.35,

            balanced_pull_in: 0.4,
            midrange_pull_in: 0.5,

            dunk_share: Ladder::new(&DUNK_SHARE),
            dunk_scale: 1.3,
            dunk_rating_weight: 0.15,
            layup_rating_weight: 0.25,
            inside_rating_weight: 0.25,
            mid_rating_weight: 0.30,
            three_rating_weight: 0.35,
            rating_pivot: 70.0,

            defense_weight: 0.20,
            density_regular: DensityConfig {
                easy_pct: 15,
                hard_pct: 15,
                swing: 5.0,
            },
            density_playoff: DensityConfig {
                easy_pct: 10,
                hard_pct: 20,
                swing: 5.0,
            },

            consistency_weight: 0.1,
            consistency_cap: 3.0,

            athleticism_max: 6.0,
            athleticism_scale: 10.0,
            athleticism_weights: ZoneTable::new(1.0, 1.0, 0.5, 0.2),

            clutch_window_seconds: 120,
            clutch_margin: 5,
            clutch_max_penalty: 0.12,

            playmaker_threshold: 85,
            playmaker_bonus: [0.0, 1.5, 3.0],
            star_penalty: 2.0,

            min_pct: 2.0,
            max_pct: 95.0,

            usage_floor: 40,
            star_usage_multiplier: 1.25,
            assist_chance: 0.6,
        }
    }
}
