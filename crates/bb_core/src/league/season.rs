//! Regular season runner
//!
//! Plays a schedule in order off one random stream. A game that trips a
//! state violation is logged, listed in [`SeasonResult::aborted`] and left
//! out of the standings and totals; everything aggregated before it stays.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::schedule::{Schedule, ScheduledGame};
use super::season_stats::SeasonStats;
use super::standings::Standings;
use super::League;
use crate::engine::{GameEngine, GameOptions};
use crate::error::SimError;
use crate::models::{GameKind, GameSummary};
use crate::rng::SimRng;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedGame {
    pub game: ScheduledGame,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub seed: u64,
    pub games: Vec<GameSummary>,
    pub standings: Standings,
    pub stats: SeasonStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aborted: Vec<AbortedGame>,
}

pub struct Season<'a> {
    league: &'a League,
    schedule: &'a Schedule,
    engine: &'a GameEngine,
}

impl<'a> Season<'a> {
    /// Checks the schedule against the league up front so nothing is
    /// simulated for a bad request.
    pub fn new(league: &'a League, schedule: &'a Schedule, engine: &'a GameEngine) -> Result<Self, SimError> {
        schedule.validate(league)?;
        Ok(Self {
            league,
            schedule,
            engine,
        })
    }

    pub fn league(&self) -> &'a League {
        self.league
    }

    pub fn engine(&self) -> &'a GameEngine {
        self.engine
    }

    pub fn run(&self, seed: u64) -> Result<SeasonResult, SimError> {
        let mut rng = SimRng::new(seed);
        self.run_with_rng(&mut rng)
    }

    pub fn run_with_rng(&self, rng: &mut SimRng) -> Result<SeasonResult, SimError> {
        let mut standings = Standings::new(self.league);
        let mut stats = SeasonStats::new();
        let mut games = Vec::with_capacity(self.schedule.len());
        let mut aborted = Vec::new();

        for (i, scheduled) in self.schedule.games.iter().enumerate() {
            let away = self.league.team(&scheduled.away)?;
            let home = self.league.team(&scheduled.home)?;
            match self
                .engine
                .simulate_with_rng(away, home, rng, GameOptions::new(GameKind::Regular))
            {
                Ok(result) => {
                    let summary = result.summary(Some(scheduled.date));
                    standings.record_game(&summary);
                    stats.record_game(&result);
                    games.push(summary);
                }
                Err(SimError::State(violation)) => {
                    warn!(game = i, away = %scheduled.away, home = %scheduled.home, "game aborted: {}", violation);
                    aborted.push(AbortedGame {
                        game: scheduled.clone(),
                        error: violation.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
            if (i + 1) % 100 == 0 {
                debug!("{} of {} games played", i + 1, self.schedule.len());
            }
        }

        if let Some(leader) = standings.leader() {
            debug!(
                games = games.len(),
                aborted = aborted.len(),
                "season complete, best record {} ({}-{})",
                leader.team,
                leader.wins,
                leader.losses
            );
        }
        Ok(SeasonResult {
            seed: rng.seed(),
            games,
            standings,
            stats,
            aborted,
        })
    }
}
