//! # Engine Configuration
//!
//! Every tuning constant of the possession engine and rotation policy lives
//! here, grouped by concern. Files only need the fields they change:
//! every section is `#[serde(default)]`.
//!
//! ## Usage
//! ```rust
//! use bb_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let arcade = EngineConfig::arcade();
//! assert!(arcade.shot.three_base > config.shot.three_base);
//! ```

mod clock_config;
mod defense_config;
mod foul_config;
mod rotation_config;
mod shot_config;

pub use clock_config::{ClockConfig, SecondsRange};
pub use defense_config::{DefenseConfig, ReboundConfig};
pub use foul_config::FoulConfig;
pub use rotation_config::RotationConfig;
pub use shot_config::{DensityConfig, ShotConfig};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub shot: ShotConfig,
    pub foul: FoulConfig,
    pub rebound: ReboundConfig,
    pub defense: DefenseConfig,
    pub rotation: RotationConfig,
    pub clock: ClockConfig,
    /// Overall rating at which a player counts as a star.
    pub star_rating: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shot: ShotConfig::default(),
            foul: FoulConfig::default(),
            rebound: ReboundConfig::default(),
            defense: DefenseConfig::default(),
            rotation: RotationConfig::default(),
            clock: ClockConfig::default(),
            star_rating: 88,
        }
    }
}

impl EngineConfig {
    /// League-realistic defaults.
    pub fn regular_season() -> Self {
        Self::default()
    }

    /// Starters play longer and garbage-time rotation is rarer. Tighter
    /// shot density is selected per game from [`GameKind`](crate::models::GameKind).
    pub fn playoffs() -> Self {
        let mut cfg = Self::default();
        cfg.rotation.starter_stint_cap = 480;
        cfg.rotation.close_game_minutes_bonus = 4.0;
        cfg.rotation.bench_minutes = 15.0;
        cfg.rotation.garbage_rotation_chance = 0.2;
        cfg
    }

    /// Higher percentages, fewer whistles, more fast breaks.
    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.shot.close_base = 70.0;
        cfg.shot.linear_base = 56.0;
        cfg.shot.three_base = 41.0;
        cfg.shot.clutch_max_penalty = 0.0;
        cfg.foul.miss_rates = crate::engine::tables::ZoneTable::new(0.10, 0.06, 0.03, 0.01);
        cfg.defense.fast_break_chance = 0.6;
        cfg
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(raw).map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Structural checks only; probabilities are clamped where they are used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::InvalidConfig(msg.to_string()));
        if self.clock.quarters == 0 || self.clock.quarter_seconds == 0 {
            return fail("clock needs at least one non-empty quarter");
        }
        if self.clock.overtime_seconds == 0 {
            return fail("overtime_seconds must be positive");
        }
        for (name, range) in [
            ("half_court", self.clock.half_court),
            ("putback", self.clock.putback),
            ("fast_break", self.clock.fast_break),
            ("dead_ball", self.clock.dead_ball),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(ConfigError::InvalidConfig(format!(
                    "possession range {name} must satisfy 0 < min <= max"
                )));
            }
        }
        let s = &self.shot;
        if !(s.rim_distance < s.paint_distance
            && s.paint_distance < s.three_point_distance
            && s.three_point_distance <= s.max_distance)
        {
            return fail("shot zones must satisfy rim < paint < three <= max");
        }
        if s.min_pct > s.max_pct {
            return fail("shot min_pct exceeds max_pct");
        }
        if self.foul.foul_out_limit == 0 || self.foul.flagrant_ejection_limit == 0 {
            return fail("foul limits must be positive");
        }
        Ok(())
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.clock.regulation_seconds(), 2880);
        assert_eq!(cfg.foul.foul_out_limit, 6);
        assert_eq!(cfg.foul.bonus_threshold, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_playoff_density_is_tighter() {
        let cfg = EngineConfig::default();
        assert!(cfg.shot.density_playoff.easy_pct < cfg.shot.density_regular.easy_pct);
        assert!(cfg.shot.density_playoff.hard_pct > cfg.shot.density_regular.hard_pct);
    }

    #[test]
    fn test_playoff_preset_leans_on_starters() {
        let regular = EngineConfig::regular_season();
        let playoffs = EngineConfig::playoffs();
        assert!(playoffs.rotation.starter_stint_cap > regular.rotation.starter_stint_cap);
        assert!(
            playoffs.rotation.garbage_rotation_chance < regular.rotation.garbage_rotation_chance
        );
        assert_eq!(playoffs.shot, regular.shot);
    }

    #[test]
    fn test_arcade_is_easier() {
        let realistic = EngineConfig::regular_season();
        let arcade = EngineConfig::arcade();
        assert!(arcade.shot.close_base > realistic.shot.close_base);
        assert!(arcade.foul.miss_rates.rim < realistic.foul.miss_rates.rim);
        assert!(arcade.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_overrides_defaults() {
        let cfg = EngineConfig::from_yaml_str(
            "star_rating: 92\nfoul:\n  foul_out_limit: 5\nclock:\n  quarter_seconds: 600\n",
        )
        .unwrap();
        assert_eq!(cfg.star_rating, 92);
        assert_eq!(cfg.foul.foul_out_limit, 5);
        assert_eq!(cfg.foul.bonus_threshold, 5);
        assert_eq!(cfg.clock.quarter_seconds, 600);
        assert_eq!(cfg.clock.overtime_seconds, 300);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = EngineConfig::from_json_str(r#"{"clock": {"quarters": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));

        let err = EngineConfig::from_yaml_str("shot: [1, 2]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_serialization() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let parsed: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cfg);
    }
}
