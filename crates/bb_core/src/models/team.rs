//! Team definitions: the static roster handed in by the loader and the
//! per-game `TeamState` the engine mutates.
//!
//! Court slots are a fixed `[Option<usize>; 5]` indexed by [`Position`];
//! `None` only happens after a foul-out/ejection left no eligible substitute.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::player::{GameLine, Player, PlayerProfile, Position, Ratings, RotationTier};
use crate::error::{ConfigError, StateViolation};

/// Which team, for two-team game state arrays (`Away` = 0, `Home` = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TeamSide {
    Away,
    #[default]
    Home,
}

impl TeamSide {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            TeamSide::Away => 0,
            TeamSide::Home => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> TeamSide {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Conference {
    #[default]
    East,
    West,
}

// ============================================================================
// TeamRoster - static input
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub name: String,
    #[serde(default)]
    pub conference: Conference,
    pub players: Vec<PlayerProfile>,
}

impl TeamRoster {
    pub fn new(name: impl Into<String>, conference: Conference, players: Vec<PlayerProfile>) -> Self {
        Self {
            name: name.into(),
            conference,
            players,
        }
    }

    /// Fifteen players, one per tier and position, every rating equal to
    /// `starter_rating` for starters and six and fourteen points lower for
    /// the bench and deep bench. Used for demos and benchmarks.
    pub fn uniform(name: impl Into<String>, conference: Conference, starter_rating: u8) -> Self {
        let name = name.into();
        let mut players = Vec::with_capacity(15);
        for pos in Position::ALL {
            for (tier, drop) in [
                (RotationTier::Starter, 0),
                (RotationTier::Bench, 6),
                (RotationTier::DeepBench, 14),
            ] {
                let ratings = Ratings::uniform(starter_rating.saturating_sub(drop));
                players.push(PlayerProfile::new(
                    format!("{name} {pos} {}", tier.label()),
                    name.clone(),
                    pos,
                    tier,
                    ratings,
                ));
            }
        }
        Self::new(name, conference, players)
    }

    /// Exactly one starter, and at least one bench and one deep-bench player,
    /// per position. Ratings within 0..=100, unique names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for p in &self.players {
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigError::DuplicatePlayer {
                    team: self.name.clone(),
                    player: p.name.clone(),
                });
            }
            p.ratings.validate(&p.name)?;
        }

        for pos in Position::ALL {
            let count = |tier: RotationTier| {
                self.players
                    .iter()
                    .filter(|p| p.position == pos && p.tier == tier)
                    .count()
            };
            match count(RotationTier::Starter) {
                0 => {
                    return Err(ConfigError::MissingStarter {
                        team: self.name.clone(),
                        position: pos,
                    })
                }
                1 => {}
                _ => {
                    return Err(ConfigError::DuplicateStarter {
                        team: self.name.clone(),
                        position: pos,
                    })
                }
            }
            for tier in [RotationTier::Bench, RotationTier::DeepBench] {
                if count(tier) == 0 {
                    return Err(ConfigError::MissingDepth {
                        team: self.name.clone(),
                        position: pos,
                        tier: tier.label(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// TeamState - per game
// ============================================================================

/// Roster indices for one position, by tier, in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthChart {
    pub starter: usize,
    pub bench: Vec<usize>,
    pub deep: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamState {
    pub name: String,
    pub conference: Conference,
    pub roster: Vec<Player>,
    pub depth: [DepthChart; 5],
    pub on_court: [Option<usize>; 5],
    pub score: u16,
    pub totals: GameLine,
    /// Opponent totals, mirrored when the game is finalized.
    pub allowed: GameLine,
    pub has_ball: bool,
    pub challenge_available: bool,
    pub quarter_fouls: u8,
}

impl TeamState {
    /// Fresh game state: counters zeroed, starters on court.
    pub fn from_roster(roster: &TeamRoster, star_rating: u8) -> Result<Self, ConfigError> {
        roster.validate()?;

        let players: Vec<Player> = roster
            .players
            .iter()
            .cloned()
            .map(|mut profile| {
                profile.team = roster.name.clone();
                profile.classify(star_rating);
                Player::new(profile)
            })
            .collect();

        let mut depth: [DepthChart; 5] = Default::default();
        for pos in Position::ALL {
            let chart = &mut depth[pos.index()];
            for (idx, p) in players.iter().enumerate() {
                if p.profile.position != pos {
                    continue;
                }
                match p.profile.tier {
                    RotationTier::Starter => chart.starter = idx,
                    RotationTier::Bench => chart.bench.push(idx),
                    RotationTier::DeepBench => chart.deep.push(idx),
                }
            }
        }

        let mut team = Self {
            name: roster.name.clone(),
            conference: roster.conference,
            roster: players,
            depth,
            on_court: [None; 5],
            score: 0,
            totals: GameLine::default(),
            allowed: GameLine::default(),
            has_ball: false,
            challenge_available: true,
            quarter_fouls: 0,
        };
        for pos in Position::ALL {
            let starter = team.depth[pos.index()].starter;
            team.set_slot(pos, Some(starter));
        }
        Ok(team)
    }

    #[inline]
    pub fn player(&self, idx: usize) -> &Player {
        &self.roster[idx]
    }

    #[inline]
    pub fn player_mut(&mut self, idx: usize) -> &mut Player {
        &mut self.roster[idx]
    }

    #[inline]
    pub fn at(&self, pos: Position) -> Option<usize> {
        self.on_court[pos.index()]
    }

    /// On-court roster indices in slot order.
    pub fn lineup(&self) -> Vec<usize> {
        self.on_court.iter().flatten().copied().collect()
    }

    pub fn lineup_len(&self) -> usize {
        self.on_court.iter().flatten().count()
    }

    pub fn slot_of(&self, idx: usize) -> Option<Position> {
        Position::ALL
            .into_iter()
            .find(|pos| self.on_court[pos.index()] == Some(idx))
    }

    pub fn starter(&self, pos: Position) -> usize {
        self.depth[pos.index()].starter
    }

    pub fn require_lineup(&self) -> Result<(), StateViolation> {
        if self.lineup_len() == 0 {
            return Err(StateViolation::EmptyLineup {
                team: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Puts `incoming` in `slot` and returns whoever was there. The outgoing
    /// player's stint resets, the incoming player's bench clock resets.
    pub fn set_slot(&mut self, slot: Position, incoming: Option<usize>) -> Option<usize> {
        let outgoing = self.on_court[slot.index()];
        if let Some(out) = outgoing {
            let status = &mut self.roster[out].status;
            status.on_court = false;
            status.stint_seconds = 0;
            status.bench_seconds = 0;
        }
        if let Some(inc) = incoming {
            let status = &mut self.roster[inc].status;
            status.on_court = true;
            status.played = true;
            status.stint_seconds = 0;
            status.bench_seconds = 0;
        }
        self.on_court[slot.index()] = incoming;
        outgoing
    }

    pub fn reset_quarter(&mut self) {
        self.quarter_fouls = 0;
    }

    /// Lineup consistency: no player in two slots, on-court flags match the
    /// slots, nobody ineligible on the floor.
    pub fn verify_court(&self) -> Result<(), StateViolation> {
        let mut seen = HashSet::new();
        for idx in self.on_court.iter().flatten() {
            let p = &self.roster[*idx];
            if !seen.insert(*idx) {
                return Err(StateViolation::DoubleAssignment {
                    team: self.name.clone(),
                    player: p.profile.name.clone(),
                });
            }
            if !p.status.eligible {
                return Err(StateViolation::IneligibleOnCourt {
                    team: self.name.clone(),
                    player: p.profile.name.clone(),
                });
            }
        }
        let flagged = self.roster.iter().filter(|p| p.status.on_court).count();
        if flagged != seen.len() {
            return Err(StateViolation::CounterInvariant {
                player: self.name.clone(),
                detail: format!("{flagged} players flagged on court, {} in slots", seen.len()),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Scoring ledger: player line, team totals and score move together.
    // ------------------------------------------------------------------

    pub fn credit_field_goal(&mut self, idx: usize, three: bool, made: bool) {
        self.roster[idx].line.record_field_goal(three, made);
        self.totals.record_field_goal(three, made);
        if made {
            self.score += if three { 3 } else { 2 };
        }
    }

    pub fn credit_free_throw(&mut self, idx: usize, made: bool) {
        self.roster[idx].line.record_free_throw(made);
        self.totals.record_free_throw(made);
        if made {
            self.score += 1;
        }
    }

    pub fn credit_rebound(&mut self, idx: usize, offensive: bool) {
        self.roster[idx].line.record_rebound(offensive);
        self.totals.record_rebound(offensive);
    }

    pub fn credit_assist(&mut self, idx: usize) {
        self.roster[idx].line.assists += 1;
        self.totals.assists += 1;
    }

    pub fn credit_steal(&mut self, idx: usize) {
        self.roster[idx].line.steals += 1;
        self.totals.steals += 1;
    }

    pub fn credit_block(&mut self, idx: usize) {
        self.roster[idx].line.blocks += 1;
        self.totals.blocks += 1;
    }

    pub fn credit_turnover(&mut self, idx: usize) {
        self.roster[idx].line.turnovers += 1;
        self.totals.turnovers += 1;
    }

    /// Personal foul. `team_foul` is false for offensive fouls.
    pub fn charge_foul(&mut self, idx: usize, team_foul: bool) {
        let line = &mut self.roster[idx].line;
        line.fouls += 1;
        self.totals.fouls += 1;
        if team_foul {
            self.quarter_fouls = self.quarter_fouls.saturating_add(1);
        }
    }

    pub fn charge_flagrant(&mut self, idx: usize) {
        self.charge_foul(idx, true);
        let line = &mut self.roster[idx].line;
        line.flagrant_fouls += 1;
        self.totals.flagrant_fouls += 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Fifteen-man roster: starter, bench and deep-bench at every position.
    pub(crate) fn balanced_roster(name: &str) -> TeamRoster {
        let mut players = Vec::new();
        for pos in Position::ALL {
            for (tier, overall) in [
                (RotationTier::Starter, 78),
                (RotationTier::Bench, 72),
                (RotationTier::DeepBench, 64),
            ] {
                let ratings = Ratings::uniform(overall);
                players.push(PlayerProfile::new(
                    format!("{name} {pos} {}", tier.label()),
                    name,
                    pos,
                    tier,
                    ratings,
                ));
            }
        }
        TeamRoster::new(name, Conference::East, players)
    }

    #[test]
    fn test_uniform_roster_matches_balanced() {
        assert_eq!(TeamRoster::uniform("Hawks", Conference::East, 78), balanced_roster("Hawks"));
        assert!(TeamRoster::uniform("Bulls", Conference::East, 5).validate().is_ok());
    }

    #[test]
    fn test_from_roster_puts_starters_on_court() {
        let team = TeamState::from_roster(&balanced_roster("Hawks"), 88).unwrap();
        assert_eq!(team.lineup_len(), 5);
        for pos in Position::ALL {
            let idx = team.at(pos).unwrap();
            assert_eq!(team.player(idx).profile.tier, RotationTier::Starter);
            assert_eq!(team.player(idx).profile.position, pos);
            assert!(team.player(idx).status.on_court);
        }
        assert!(team.challenge_available);
        assert!(team.verify_court().is_ok());
    }

    #[test]
    fn test_validation_rejects_missing_depth() {
        let mut roster = balanced_roster("Nets");
        roster
            .players
            .retain(|p| !(p.position == Position::C && p.tier == RotationTier::DeepBench));
        let err = TeamState::from_roster(&roster, 88).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingDepth {
                team: "Nets".into(),
                position: Position::C,
                tier: "deep-bench",
            }
        );
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        let mut roster = balanced_roster("Heat");
        let dup = roster.players[0].clone();
        roster.players.push(dup);
        assert!(matches!(
            roster.validate(),
            Err(ConfigError::DuplicatePlayer { .. })
        ));

        let mut roster = balanced_roster("Heat");
        roster.players[1].tier = RotationTier::Starter;
        assert!(matches!(
            roster.validate(),
            Err(ConfigError::DuplicateStarter { position: Position::PG, .. })
        ));
    }

    #[test]
    fn test_set_slot_swaps_flags() {
        let mut team = TeamState::from_roster(&balanced_roster("Suns"), 88).unwrap();
        let bench = team.depth[Position::SG.index()].bench[0];
        let starter = team.starter(Position::SG);
        let out = team.set_slot(Position::SG, Some(bench));
        assert_eq!(out, Some(starter));
        assert!(!team.player(starter).status.on_court);
        assert!(team.player(bench).status.on_court);
        assert!(team.player(bench).status.played);
        assert_eq!(team.slot_of(bench), Some(Position::SG));
        assert!(team.verify_court().is_ok());
    }

    #[test]
    fn test_ledger_keeps_score_in_sync() {
        let mut team = TeamState::from_roster(&balanced_roster("Jazz"), 88).unwrap();
        let a = team.at(Position::PG).unwrap();
        let b = team.at(Position::C).unwrap();
        team.credit_field_goal(a, true, true);
        team.credit_field_goal(b, false, true);
        team.credit_free_throw(b, true);
        team.credit_free_throw(b, false);
        let sum: u16 = team.roster.iter().map(|p| p.line.points).sum();
        assert_eq!(team.score, 6);
        assert_eq!(sum, team.score);
        assert_eq!(team.totals.points, team.score);
    }

    #[test]
    fn test_offensive_foul_is_not_a_team_foul() {
        let mut team = TeamState::from_roster(&balanced_roster("Kings"), 88).unwrap();
        let idx = team.at(Position::SF).unwrap();
        team.charge_foul(idx, false);
        assert_eq!(team.quarter_fouls, 0);
        team.charge_foul(idx, true);
        team.charge_flagrant(idx);
        assert_eq!(team.quarter_fouls, 2);
        assert_eq!(team.player(idx).line.fouls, 3);
        assert_eq!(team.player(idx).line.flagrant_fouls, 1);
    }
}
