//! Game Result Data Structures
//!
//! Output of one simulated game. Everything downstream (season totals,
//! standings, series MVP, the CLI's JSON) reads from here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::outcome::PossessionRecord;
use super::player::{GameLine, Position, RotationTier};
use super::team::{TeamSide, TeamState};
use crate::config::ClockConfig;

/// Clock length of a game that lasted `periods` periods.
pub fn game_duration(periods: u8, clock: &ClockConfig) -> u32 {
    (1..=periods).map(|p| clock.period_seconds(p)).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[default]
    Regular,
    PlayIn,
    Playoff,
}

impl GameKind {
    pub fn is_postseason(self) -> bool {
        !matches!(self, GameKind::Regular)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBox {
    pub name: String,
    pub display_name: String,
    pub position: Position,
    pub tier: RotationTier,
    pub line: GameLine,
    pub played: bool,
    pub fouled_out: bool,
    pub ejected: bool,
    pub injured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub name: String,
    pub score: u16,
    pub players: Vec<PlayerBox>,
    pub totals: GameLine,
    pub allowed: GameLine,
}

impl TeamBox {
    pub fn from_state(team: &TeamState) -> Self {
        Self {
            name: team.name.clone(),
            score: team.score,
            players: team
                .roster
                .iter()
                .map(|p| PlayerBox {
                    name: p.profile.name.clone(),
                    display_name: p.profile.display_name.clone(),
                    position: p.profile.position,
                    tier: p.profile.tier,
                    line: p.line.clone(),
                    played: p.status.played,
                    fouled_out: p.status.fouled_out,
                    ejected: p.status.ejected,
                    injured: p.status.injured,
                })
                .collect(),
            totals: team.totals.clone(),
            allowed: team.allowed.clone(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&PlayerBox> {
        self.players.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub away: TeamBox,
    pub home: TeamBox,
}

impl BoxScore {
    pub fn team(&self, side: TeamSide) -> &TeamBox {
        match side {
            TeamSide::Away => &self.away,
            TeamSide::Home => &self.home,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub kind: GameKind,
    pub away: String,
    pub home: String,
    pub away_score: u16,
    pub home_score: u16,
    pub winner: String,
    pub loser: String,
    pub overtime: bool,
    /// Regulation quarters plus overtime periods.
    pub periods: u8,
    pub possessions: u32,
    pub box_score: BoxScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plays: Option<Vec<PossessionRecord>>,
}

impl GameResult {
    pub fn winner_side(&self) -> TeamSide {
        if self.home_score > self.away_score {
            TeamSide::Home
        } else {
            TeamSide::Away
        }
    }

    pub fn margin(&self) -> u16 {
        self.home_score.abs_diff(self.away_score)
    }

    pub fn score_of(&self, team: &str) -> Option<(u16, u16)> {
        if team == self.home {
            Some((self.home_score, self.away_score))
        } else if team == self.away {
            Some((self.away_score, self.home_score))
        } else {
            None
        }
    }

    pub fn box_for(&self, team: &str) -> Option<&TeamBox> {
        if team == self.home {
            Some(&self.box_score.home)
        } else if team == self.away {
            Some(&self.box_score.away)
        } else {
            None
        }
    }

    /// Total regulation + overtime length in seconds.
    pub fn duration_seconds(&self, clock: &ClockConfig) -> u32 {
        game_duration(self.periods, clock)
    }

    pub fn summary(&self, date: Option<NaiveDate>) -> GameSummary {
        GameSummary {
            date,
            kind: self.kind,
            away: self.away.clone(),
            home: self.home.clone(),
            away_score: self.away_score,
            home_score: self.home_score,
            overtime: self.overtime,
        }
    }
}

/// Scoreline without the box score, for season and series logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub kind: GameKind,
    pub away: String,
    pub home: String,
    pub away_score: u16,
    pub home_score: u16,
    pub overtime: bool,
}

impl GameSummary {
    pub fn winner(&self) -> &str {
        if self.home_score > self.away_score {
            &self.home
        } else {
            &self.away
        }
    }
}
