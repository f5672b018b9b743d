//! League layer
//!
//! Everything above a single game: schedules, standings, season totals,
//! play-in and playoff series, and the Monte Carlo prediction coordinator.
//! Each unit (season, series, prediction run) owns its rosters by reference
//! and its random stream by value; nothing here is shared between threads
//! except the read-only [`League`] and [`GameEngine`].
//!
//! [`GameEngine`]: crate::engine::GameEngine

pub mod playoffs;
pub mod prediction;
pub mod schedule;
pub mod season;
pub mod season_stats;
pub mod standings;

pub use playoffs::{
    play_series, PlayInResult, PlayoffFormat, Postseason, PostseasonResult, SeriesMvp, SeriesResult,
};
pub use prediction::{
    PredictionMode, PredictionProgress, PredictionRequest, PredictionResult, Predictor, TeamOdds,
};
pub use schedule::{Schedule, ScheduledGame};
pub use season::{AbortedGame, Season, SeasonResult};
pub use season_stats::{PerGame, PlayerSeason, SeasonStats};
pub use standings::{Standings, TeamRecord};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Conference, TeamRoster};

/// Validated set of rosters. Team names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    teams: Vec<TeamRoster>,
}

impl League {
    pub fn new(teams: Vec<TeamRoster>) -> Result<Self, ConfigError> {
        if teams.len() < 2 {
            return Err(ConfigError::InvalidLeague(format!(
                "need at least two teams, got {}",
                teams.len()
            )));
        }
        let mut names = HashSet::new();
        for team in &teams {
            if !names.insert(team.name.as_str()) {
                return Err(ConfigError::InvalidLeague(format!("duplicate team {}", team.name)));
            }
            team.validate()?;
        }
        Ok(Self { teams })
    }

    pub fn teams(&self) -> &[TeamRoster] {
        &self.teams
    }

    pub fn names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }

    pub fn team(&self, name: &str) -> Result<&TeamRoster, ConfigError> {
        self.teams
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::UnknownTeam(name.to_string()))
    }

    pub fn conference(&self, conference: Conference) -> impl Iterator<Item = &TeamRoster> {
        self.teams.iter().filter(move |t| t.conference == conference)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{PlayerProfile, Position, Ratings, RotationTier};

    /// Fifteen-man roster whose ratings sit `shift` points above or below
    /// the balanced test roster.
    pub(crate) fn graded_roster(name: &str, conference: Conference, shift: i16) -> TeamRoster {
        let mut players = Vec::new();
        for pos in Position::ALL {
            for (tier, overall) in [
                (RotationTier::Starter, 78i16),
                (RotationTier::Bench, 72),
                (RotationTier::DeepBench, 64),
            ] {
                let value = (overall + shift).clamp(30, 99) as u8;
                players.push(PlayerProfile::new(
                    format!("{name} {pos} {}", tier.label()),
                    name,
                    pos,
                    tier,
                    Ratings::uniform(value),
                ));
            }
        }
        TeamRoster::new(name, conference, players)
    }

    /// `per_conference` teams in each conference, strongest first.
    pub(crate) fn test_league(per_conference: usize) -> League {
        let mut teams = Vec::new();
        for (conference, prefix) in [(Conference::East, "E"), (Conference::West, "W")] {
            for i in 0..per_conference {
                let shift = 6 - 2 * i as i16;
                teams.push(graded_roster(&format!("{prefix}{i}"), conference, shift));
            }
        }
        League::new(teams).unwrap()
    }

    #[test]
    fn test_league_lookup() {
        let league = test_league(3);
        assert_eq!(league.teams().len(), 6);
        assert_eq!(league.conference(Conference::West).count(), 3);
        assert_eq!(league.team("E1").unwrap().name, "E1");
        assert_eq!(
            league.team("Nope").unwrap_err(),
            ConfigError::UnknownTeam("Nope".into())
        );
    }

    #[test]
    fn test_league_rejects_duplicates_and_bad_rosters() {
        let a = graded_roster("A", Conference::East, 0);
        assert!(matches!(
            League::new(vec![a.clone(), a.clone()]),
            Err(ConfigError::InvalidLeague(_))
        ));
        assert!(League::new(vec![a.clone()]).is_err());

        let mut broken = graded_roster("B", Conference::West, 0);
        broken.players.retain(|p| p.tier != RotationTier::Bench || p.position != Position::SF);
        assert!(matches!(
            League::new(vec![a, broken]),
            Err(ConfigError::MissingDepth { .. })
        ));
    }
}
