//! Per-player season totals and averages

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{GameLine, GameResult, Position, TeamBox};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeason {
    pub name: String,
    pub display_name: String,
    pub team: String,
    pub position: Position,
    pub games: u32,
    pub totals: GameLine,
}

/// Per-game averages. Zero for a player who never played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerGame {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    pub minutes: f64,
}

impl PlayerSeason {
    pub fn per_game(&self) -> PerGame {
        if self.games == 0 {
            return PerGame::default();
        }
        let g = self.games as f64;
        let t = &self.totals;
        PerGame {
            points: t.points as f64 / g,
            rebounds: t.rebounds() as f64 / g,
            assists: t.assists as f64 / g,
            steals: t.steals as f64 / g,
            blocks: t.blocks as f64 / g,
            turnovers: t.turnovers as f64 / g,
            minutes: t.seconds_played as f64 / 60.0 / g,
        }
    }
}

/// Season totals, keyed team then player name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonStats {
    teams: BTreeMap<String, BTreeMap<String, PlayerSeason>>,
}

impl SeasonStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, result: &GameResult) {
        self.record_box(&result.box_score.away);
        self.record_box(&result.box_score.home);
    }

    fn record_box(&mut self, team: &TeamBox) {
        let players = self.teams.entry(team.name.clone()).or_default();
        for p in team.players.iter().filter(|p| p.played) {
            let season = players.entry(p.name.clone()).or_insert_with(|| PlayerSeason {
                name: p.name.clone(),
                display_name: p.display_name.clone(),
                team: team.name.clone(),
                position: p.position,
                games: 0,
                totals: GameLine::default(),
            });
            season.games += 1;
            season.totals.accumulate(&p.line);
        }
    }

    pub fn player(&self, team: &str, name: &str) -> Option<&PlayerSeason> {
        self.teams.get(team)?.get(name)
    }

    pub fn team(&self, team: &str) -> impl Iterator<Item = &PlayerSeason> {
        self.teams.get(team).into_iter().flat_map(|players| players.values())
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerSeason> {
        self.teams.values().flat_map(|players| players.values())
    }

    /// Top `n` by a per-game stat among players with at least `min_games`.
    pub fn leaders(&self, stat: impl Fn(&PerGame) -> f64, min_games: u32, n: usize) -> Vec<&PlayerSeason> {
        let mut eligible: Vec<(&PlayerSeason, f64)> = self
            .players()
            .filter(|p| p.games >= min_games)
            .map(|p| (p, stat(&p.per_game())))
            .collect();
        eligible.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
        eligible.into_iter().take(n).map(|(p, _)| p).collect()
    }
}
