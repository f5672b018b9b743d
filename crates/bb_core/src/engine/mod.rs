//! Possession engine
//!
//! ## Layers
//! - `tables`, `shot`, `defense`: stateless probability math
//! - `selection`, `rebound`, `fouls`, `fatigue`: single decisions against
//!   a team state, each with a fixed draw order
//! - `possession`: one possession end to end
//! - `substitutions`: the between-possession rotation policy
//! - `game`: quarters, overtime and the box score
//!
//! Everything below `game` takes the per-game state by `&mut` and the
//! random source explicitly; nothing is shared across games.

pub mod defense;
pub mod fatigue;
pub mod fouls;
pub mod game;
pub mod possession;
pub mod rebound;
pub mod selection;
pub mod shot;
pub mod substitutions;
pub mod tables;

pub use game::{GameEngine, GameOptions};
pub use possession::{resolve_possession, PossessionResult, Tempo};
pub use substitutions::{Phase, SubReason, Substitution};

use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::models::GameKind;

/// Where the game is when a decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    /// 1-based; periods past the regulation quarters are overtime.
    pub period: u8,
    /// Seconds left in the period.
    pub clock: u32,
    pub kind: GameKind,
}

impl Situation {
    pub fn elapsed(&self, clock: &ClockConfig) -> u32 {
        clock.period_seconds(self.period).saturating_sub(self.clock)
    }
}
