//! Substitution, fatigue and injury tuning

use serde::{Deserialize, Serialize};

use crate::engine::tables::{Ladder, ATHLETICISM_MINUTES, DURABILITY_MINUTES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    // === Opening lock ===
    /// No voluntary changes this long into the first quarter.
    pub opening_lock_seconds: u32,

    // === Foul trouble ===
    /// Fouls that send a player to the bench, for quarters 1..=4 (overtime uses the last).
    pub foul_trouble: [u8; 4],

    // === Fatigue ===
    pub starter_stint_cap: u32,
    pub bench_stint_cap: u32,
    /// Extra stint length allowed in a close second half.
    pub close_game_stint_bonus: u32,
    pub close_game_margin: u16,
    /// Starters need this much rest before the proactive return.
    pub starter_rest_seconds: u32,

    // === Minutes targets ===
    pub durability_minutes: Ladder,
    pub athleticism_minutes: Ladder,
    pub bench_minutes: f64,
    pub deep_bench_minutes: f64,
    pub close_game_minutes_bonus: f64,
    pub min_target_minutes: f64,

    // === Cold shooting ===
    pub cold_min_attempts: u16,
    pub cold_fg_pct: f64,

    // === Clutch ===
    pub clutch_window_seconds: u32,
    pub clutch_margin: u16,

    // === Garbage time ===
    pub garbage_margin: u16,
    pub garbage_rotation_chance: f64,

    // === Injuries ===
    /// Chance per possession that someone on the floor gets hurt.
    pub injury_chance: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            opening_lock_seconds: 240,

            foul_trouble: [2, 3, 4, 5],

            starter_stint_cap: 420,
            bench_stint_cap: 300,
            close_game_stint_bonus: 120,
            close_game_margin: 8,
            starter_rest_seconds: 150,

            durability_minutes: Ladder::new(&DURABILITY_MINUTES),
            athleticism_minutes: Ladder::new(&ATHLETICISM_MINUTES),
            bench_minutes: 18.0,
            deep_bench_minutes: 6.0,
            close_game_minutes_bonus: 2.0,
            min_target_minutes: 4.0,

            cold_min_attempts: 6,
            cold_fg_pct: 0.25,

            clutch_window_seconds: 300,
            clutch_margin: 10,

            garbage_margin: 20,
            garbage_rotation_chance: 0.35,

            injury_chance: 0.0008,
        }
    }
}
