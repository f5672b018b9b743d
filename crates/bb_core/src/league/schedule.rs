//! Season schedules
//!
//! A schedule is an ordered list of `(date, away, home)`. It comes either
//! from a file (loaded by the CLI) or from [`Schedule::balanced`], a
//! circle-method round robin repeated until every team has its game count.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::League;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub date: NaiveDate,
    pub away: String,
    pub home: String,
}

impl ScheduledGame {
    pub fn new(date: NaiveDate, away: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            date,
            away: away.into(),
            home: home.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub games: Vec<ScheduledGame>,
}

impl Schedule {
    pub fn new(games: Vec<ScheduledGame>) -> Self {
        Self { games }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn games_for(&self, team: &str) -> usize {
        self.games
            .iter()
            .filter(|g| g.away == team || g.home == team)
            .count()
    }

    /// Every game names two different teams of `league`.
    pub fn validate(&self, league: &League) -> Result<(), ConfigError> {
        if self.games.is_empty() {
            return Err(ConfigError::InvalidSchedule("no games".to_string()));
        }
        for game in &self.games {
            league.team(&game.away)?;
            league.team(&game.home)?;
            if game.away == game.home {
                return Err(ConfigError::InvalidSchedule(format!(
                    "{} plays itself on {}",
                    game.home, game.date
                )));
            }
        }
        Ok(())
    }

    /// Round robin by the circle method: one round per day, every team
    /// plays once per round, home and away swap on each pass through the
    /// field. Needs an even number of teams.
    pub fn balanced(teams: &[String], games_per_team: u32, start: NaiveDate) -> Result<Self, ConfigError> {
        let n = teams.len();
        if n < 2 || n % 2 != 0 {
            return Err(ConfigError::InvalidSchedule(format!(
                "balanced schedule needs an even number of teams, got {n}"
            )));
        }

        let rounds_per_pass = n - 1;
        let mut ring: Vec<usize> = (0..n).collect();
        let mut games = Vec::with_capacity(n / 2 * games_per_team as usize);
        for round in 0..games_per_team as usize {
            let pass = round / rounds_per_pass;
            let date = start
                .checked_add_days(Days::new(round as u64))
                .ok_or_else(|| ConfigError::InvalidSchedule("schedule runs past the calendar".to_string()))?;
            for i in 0..n / 2 {
                let (a, b) = (ring[i], ring[n - 1 - i]);
                // The fixed team alternates every round, the rest every pass.
                let flip = if i == 0 { round + pass } else { pass };
                let (away, home) = if flip % 2 == 0 { (a, b) } else { (b, a) };
                games.push(ScheduledGame::new(date, teams[away].clone(), teams[home].clone()));
            }
            ring[1..].rotate_right(1);
        }
        Ok(Self { games })
    }
}
