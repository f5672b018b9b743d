//! Win/loss table with conference split
//!
//! Ranking: win percentage, then point differential, then name.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::League;
use crate::models::{Conference, GameSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team: String,
    pub conference: Conference,
    pub wins: u32,
    pub losses: u32,
    pub home_wins: u32,
    pub away_wins: u32,
    pub points_for: u32,
    pub points_against: u32,
}

impl TeamRecord {
    pub fn new(team: impl Into<String>, conference: Conference) -> Self {
        Self {
            team: team.into(),
            conference,
            wins: 0,
            losses: 0,
            home_wins: 0,
            away_wins: 0,
            points_for: 0,
            points_against: 0,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// 0.0 before the first game.
    pub fn win_pct(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => self.wins as f64 / n as f64,
        }
    }

    pub fn point_diff(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }

    /// Better record first.
    pub fn rank_cmp(&self, other: &TeamRecord) -> Ordering {
        other
            .win_pct()
            .total_cmp(&self.win_pct())
            .then_with(|| other.point_diff().cmp(&self.point_diff()))
            .then_with(|| self.team.cmp(&other.team))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    records: BTreeMap<String, TeamRecord>,
}

impl Standings {
    /// Every team at 0-0.
    pub fn new(league: &League) -> Self {
        let records = league
            .teams()
            .iter()
            .map(|t| (t.name.clone(), TeamRecord::new(t.name.clone(), t.conference)))
            .collect();
        Self { records }
    }

    /// Counts a finished game. Teams outside the table are ignored.
    pub fn record_game(&mut self, game: &GameSummary) {
        let home_won = game.home_score > game.away_score;
        if let Some(home) = self.records.get_mut(&game.home) {
            home.points_for += game.home_score as u32;
            home.points_against += game.away_score as u32;
            if home_won {
                home.wins += 1;
                home.home_wins += 1;
            } else {
                home.losses += 1;
            }
        }
        if let Some(away) = self.records.get_mut(&game.away) {
            away.points_for += game.away_score as u32;
            away.points_against += game.home_score as u32;
            if home_won {
                away.losses += 1;
            } else {
                away.wins += 1;
                away.away_wins += 1;
            }
        }
    }

    pub fn record(&self, team: &str) -> Option<&TeamRecord> {
        self.records.get(team)
    }

    /// Whole league, best first.
    pub fn ranked(&self) -> Vec<&TeamRecord> {
        let mut all: Vec<&TeamRecord> = self.records.values().collect();
        all.sort_by(|a, b| a.rank_cmp(b));
        all
    }

    pub fn conference(&self, conference: Conference) -> Vec<&TeamRecord> {
        self.ranked()
            .into_iter()
            .filter(|r| r.conference == conference)
            .collect()
    }

    pub fn leader(&self) -> Option<&TeamRecord> {
        self.ranked().into_iter().next()
    }

    /// Whether `a` finished ahead of `b`. Unknown teams rank last.
    pub fn ahead_of(&self, a: &str, b: &str) -> bool {
        match (self.record(a), self.record(b)) {
            (Some(ra), Some(rb)) => ra.rank_cmp(rb) == Ordering::Less,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => a < b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::tests::test_league;
    use crate::models::GameKind;

    fn game(away: &str, home: &str, away_score: u16, home_score: u16) -> GameSummary {
        GameSummary {
            date: None,
            kind: GameKind::Regular,
            away: away.into(),
            home: home.into(),
            away_score,
            home_score,
            overtime: false,
        }
    }

    #[test]
    fn test_record_game() {
        let league = test_league(2);
        let mut standings = Standings::new(&league);
        standings.record_game(&game("E0", "E1", 101, 99));
        standings.record_game(&game("W0", "E1", 90, 120));

        let e1 = standings.record("E1").unwrap();
        assert_eq!((e1.wins, e1.losses, e1.home_wins), (1, 1, 1));
        assert_eq!(e1.point_diff(), 28);
        let e0 = standings.record("E0").unwrap();
        assert_eq!((e0.wins, e0.away_wins), (1, 1));
        assert_eq!(e0.win_pct(), 1.0);
        assert_eq!(standings.record("W1").unwrap().win_pct(), 0.0);
    }

    #[test]
    fn test_ranking_tie_breaks() {
        let league = test_league(2);
        let mut standings = Standings::new(&league);
        standings.record_game(&game("E0", "W0", 100, 90));
        standings.record_game(&game("E1", "W1", 100, 99));

        let ranked: Vec<&str> = standings.ranked().iter().map(|r| r.team.as_str()).collect();
        assert_eq!(ranked, ["E0", "E1", "W1", "W0"]);
        assert_eq!(standings.leader().unwrap().team, "E0");
        let west: Vec<&str> = standings
            .conference(Conference::West)
            .iter()
            .map(|r| r.team.as_str())
            .collect();
        assert_eq!(west, ["W1", "W0"]);
        assert!(standings.ahead_of("E1", "W1"));
        assert!(!standings.ahead_of("W0", "W1"));
    }
}
