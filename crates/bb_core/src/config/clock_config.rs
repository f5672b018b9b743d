//! Game clock structure and possession lengths

use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: u32,
    pub max: u32,
}

impl SecondsRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub quarters: u8,
    pub quarter_seconds: u32,
    pub overtime_seconds: u32,
    /// Overtime periods before the game switches to sudden death.
    pub max_overtimes: u8,

    pub half_court: SecondsRange,
    pub putback: SecondsRange,
    pub fast_break: SecondsRange,
    pub dead_ball: SecondsRange,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            quarters: 4,
            quarter_seconds: 720,
            overtime_seconds: 300,
            max_overtimes: 8,

            half_court: SecondsRange::new(8, 22),
            putback: SecondsRange::new(2, 10),
            fast_break: SecondsRange::new(3, 7),
            dead_ball: SecondsRange::new(3, 10),
        }
    }
}

impl ClockConfig {
    pub fn regulation_seconds(&self) -> u32 {
        self.quarters as u32 * self.quarter_seconds
    }

    pub fn period_seconds(&self, period: u8) -> u32 {
        if period <= self.quarters {
            self.quarter_seconds
        } else {
            self.overtime_seconds
        }
    }
}
