//! Game orchestrator
//!
//! Drives one game from the opening tip to the final possession:
//!
//! 1. opening jump between the two centers
//! 2. regulation quarters (tip loser starts Q2 and Q3, tip winner the last)
//! 3. overtime periods while tied, each with a new jump
//! 4. sudden-death possessions once `max_overtimes` is used up
//!
//! Between possessions: clock and minutes, the injury draw, forced removals
//! and the rotation policy for both teams, offense first. The finished game
//! is checked against the counter invariants before a result is returned.

use serde::{Deserialize, Serialize};

use super::fatigue::{advance_clock, injury_check};
use super::possession::{resolve_possession, Tempo};
use super::selection::{jump_ball, matchup_defender};
use super::substitutions::{apply_policy, forced_removals};
use super::Situation;
use crate::config::EngineConfig;
use crate::error::{ConfigError, SimError, StateViolation};
use crate::models::{
    game_duration, BoxScore, GameKind, GameResult, Position, PossessionRecord, TeamBox,
    TeamRoster, TeamSide, TeamState,
};
use crate::rng::SimRng;

/// Play-by-play of one game, one record per possession.
pub type PlayLog = Vec<PossessionRecord>;

/// Possessions allowed after the last overtime before giving up.
pub const SUDDEN_DEATH_LIMIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    pub kind: GameKind,
    /// Keep a [`PlayLog`] in the result.
    pub record_plays: bool,
}

impl GameOptions {
    pub fn new(kind: GameKind) -> Self {
        Self {
            kind,
            record_plays: false,
        }
    }

    pub fn with_plays(mut self) -> Self {
        self.record_plays = true;
        self
    }
}

/// Simulates games with one validated configuration.
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: EngineConfig,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// One game from a fresh generator seeded with `seed`.
    pub fn simulate(
        &self,
        away: &TeamRoster,
        home: &TeamRoster,
        seed: u64,
        options: GameOptions,
    ) -> Result<GameResult, SimError> {
        let mut rng = SimRng::new(seed);
        self.simulate_with_rng(away, home, &mut rng, options)
    }

    /// One game drawing from a caller-owned generator, so a series or a
    /// season can run many games off one stream.
    pub fn simulate_with_rng(
        &self,
        away: &TeamRoster,
        home: &TeamRoster,
        rng: &mut SimRng,
        options: GameOptions,
    ) -> Result<GameResult, SimError> {
        if away.name == home.name {
            return Err(ConfigError::InvalidSchedule(format!("{} cannot play itself", away.name)).into());
        }
        let teams = [
            TeamState::from_roster(away, self.config.star_rating)?,
            TeamState::from_roster(home, self.config.star_rating)?,
        ];
        let mut game = Game::new(teams, options, &self.config);
        game.play(rng)?;
        game.finish()
    }
}

/// Mutable state of one game in progress.
struct Game<'a> {
    cfg: &'a EngineConfig,
    teams: [TeamState; 2],
    kind: GameKind,
    plays: Option<PlayLog>,
    possessions: u32,
    periods: u8,
    offense: TeamSide,
    putback: bool,
}

impl<'a> Game<'a> {
    fn new(teams: [TeamState; 2], options: GameOptions, cfg: &'a EngineConfig) -> Self {
        Self {
            cfg,
            teams,
            kind: options.kind,
            plays: options.record_plays.then(Vec::new),
            possessions: 0,
            periods: 0,
            offense: TeamSide::Home,
            putback: false,
        }
    }

    fn tied(&self) -> bool {
        self.teams[0].score == self.teams[1].score
    }

    fn play(&mut self, rng: &mut SimRng) -> Result<(), SimError> {
        let quarters = self.cfg.clock.quarters;
        let tip = self.jump(rng)?;
        for period in 1..=quarters {
            let first = if period == 1 || period == quarters {
                tip
            } else {
                tip.opponent()
            };
            self.play_period(period, first, rng)?;
        }

        let last_overtime = quarters.saturating_add(self.cfg.clock.max_overtimes);
        let mut period = quarters;
        while self.tied() && period < last_overtime {
            period += 1;
            let tip = self.jump(rng)?;
            self.play_period(period, tip, rng)?;
        }

        if self.tied() {
            self.sudden_death(period, rng)?;
        }
        Ok(())
    }

    /// Center jump. Falls back to the nearest slot when a center is missing.
    fn jump(&self, rng: &mut SimRng) -> Result<TeamSide, StateViolation> {
        let away = matchup_defender(&self.teams[0], Position::C)?;
        let home = matchup_defender(&self.teams[1], Position::C)?;
        Ok(jump_ball(&self.teams, away, home, rng))
    }

    fn play_period(&mut self, period: u8, first: TeamSide, rng: &mut SimRng) -> Result<(), SimError> {
        for team in self.teams.iter_mut() {
            team.reset_quarter();
        }
        self.periods = period;
        self.offense = first;
        self.putback = false;

        let mut clock = self.cfg.clock.period_seconds(period);
        while clock > 0 {
            clock = self.step(period, clock, rng)?;
        }
        log::debug!(
            "end of period {}: {} {} - {} {}",
            period,
            self.teams[0].name,
            self.teams[0].score,
            self.teams[1].score,
            self.teams[1].name
        );
        Ok(())
    }

    /// Untimed possessions until someone leads.
    fn sudden_death(&mut self, period: u8, rng: &mut SimRng) -> Result<(), SimError> {
        log::debug!("sudden death after period {}", period);
        let mut played = 0;
        while self.tied() {
            if played >= SUDDEN_DEATH_LIMIT {
                return Err(StateViolation::Stalemate { possessions: played }.into());
            }
            self.step(period, 0, rng)?;
            played += 1;
        }
        Ok(())
    }

    /// One possession plus the between-possession bookkeeping. Returns the
    /// clock left in the period.
    fn step(&mut self, period: u8, clock: u32, rng: &mut SimRng) -> Result<u32, SimError> {
        let offense = self.offense;
        self.teams[offense.index()].has_ball = true;
        self.teams[offense.opponent().index()].has_ball = false;

        let situation = Situation {
            period,
            clock,
            kind: self.kind,
        };
        let result = resolve_possession(&mut self.teams, offense, &situation, self.putback, self.cfg, rng)?;
        let seconds = self.possession_seconds(result.tempo, clock, rng);
        advance_clock(&mut self.teams, seconds);
        let remaining = clock - seconds;

        self.possessions += 1;
        self.putback = result.is_putback();
        self.offense = result.next_offense;
        if let Some(plays) = self.plays.as_mut() {
            plays.push(PossessionRecord {
                period,
                clock: remaining,
                offense,
                seconds,
                outcome: result.outcome,
                next_offense: result.next_offense,
                score: [self.teams[0].score, self.teams[1].score],
            });
        }

        let after = Situation {
            clock: remaining,
            ..situation
        };
        self.between_possessions(&after, rng)?;
        Ok(remaining)
    }

    /// Seconds off the clock, drawn from the tempo's range and clamped to
    /// what is left. Untimed possessions take no draw.
    fn possession_seconds(&self, tempo: Tempo, clock: u32, rng: &mut SimRng) -> u32 {
        if clock == 0 {
            return 0;
        }
        let range = match tempo {
            Tempo::HalfCourt => self.cfg.clock.half_court,
            Tempo::Putback => self.cfg.clock.putback,
            Tempo::FastBreak => self.cfg.clock.fast_break,
            Tempo::DeadBall => self.cfg.clock.dead_ball,
        };
        let drawn = rng.range(range.min as i32, range.max as i32).max(1) as u32;
        drawn.min(clock)
    }

    fn between_possessions(&mut self, situation: &Situation, rng: &mut SimRng) -> Result<(), StateViolation> {
        injury_check(&mut self.teams, rng, &self.cfg.rotation);

        let order = [self.offense, self.offense.opponent()];
        for side in order {
            forced_removals(&mut self.teams[side.index()], side);
        }
        let margin = self.teams[0].score.abs_diff(self.teams[1].score);
        for side in order {
            apply_policy(&mut self.teams[side.index()], side, situation, margin, self.cfg, rng);
        }
        for team in &self.teams {
            team.verify_court()?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<GameResult, SimError> {
        let [away, home] = &mut self.teams;
        away.allowed = home.totals.clone();
        home.allowed = away.totals.clone();

        let duration = game_duration(self.periods, &self.cfg.clock);
        for team in &self.teams {
            check_team(team, duration)?;
        }

        let (away, home) = (&self.teams[0], &self.teams[1]);
        let (winner, loser) = if home.score > away.score {
            (home, away)
        } else {
            (away, home)
        };
        let overtime = self.periods > self.cfg.clock.quarters;
        log::debug!(
            "{} {} @ {} {}{} ({} possessions)",
            away.name,
            away.score,
            home.name,
            home.score,
            if overtime { " OT" } else { "" },
            self.possessions
        );

        Ok(GameResult {
            kind: self.kind,
            away: away.name.clone(),
            home: home.name.clone(),
            away_score: away.score,
            home_score: home.score,
            winner: winner.name.clone(),
            loser: loser.name.clone(),
            overtime,
            periods: self.periods,
            possessions: self.possessions,
            box_score: BoxScore {
                away: TeamBox::from_state(away),
                home: TeamBox::from_state(home),
            },
            plays: self.plays,
        })
    }
}

/// Final-whistle consistency: valid shooting lines, minutes within the
/// game, player points summing to the score.
fn check_team(team: &TeamState, duration: u32) -> Result<(), StateViolation> {
    team.totals
        .check_invariants()
        .map_err(|detail| StateViolation::CounterInvariant {
            player: team.name.clone(),
            detail,
        })?;

    let mut points = 0u32;
    for player in &team.roster {
        let line = &player.line;
        line.check_invariants()
            .map_err(|detail| StateViolation::CounterInvariant {
                player: player.profile.name.clone(),
                detail,
            })?;
        if line.seconds_played > duration {
            return Err(StateViolation::CounterInvariant {
                player: player.profile.name.clone(),
                detail: format!("{}s played in a {}s game", line.seconds_played, duration),
            });
        }
        points += line.points as u32;
    }
    if points != team.score as u32 {
        return Err(StateViolation::CounterInvariant {
            player: team.name.clone(),
            detail: format!("player points {} != score {}", points, team.score),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;
    use crate::models::team::tests::balanced_roster;
    use proptest::prelude::*;
    use sha2::{Digest, Sha256};

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let mut out = String::with_capacity(digest.len() * 2);
        for b in digest {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    fn short_clock(max_overtimes: u8) -> EngineConfig {
        EngineConfig {
            clock: ClockConfig {
                quarters: 1,
                quarter_seconds: 1,
                overtime_seconds: 1,
                max_overtimes,
                ..ClockConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_seed_12345_has_one_winner() {
        let engine = GameEngine::default();
        let result = engine
            .simulate(&balanced_roster("Away"), &balanced_roster("Home"), 12345, GameOptions::default())
            .unwrap();
        assert_ne!(result.away_score, result.home_score);
        assert_ne!(result.winner, result.loser);
        assert!(result.winner == "Away" || result.winner == "Home");
        assert_eq!(result.winner_side() == TeamSide::Home, result.winner == "Home");
        assert!(result.periods >= 4);
        assert_eq!(result.overtime, result.periods > 4);
        assert!(result.possessions > 100);
        assert!(result.plays.is_none());
    }

    #[test]
    fn test_replay_json_determinism_sha256() {
        let engine = GameEngine::default();
        let (away, home) = (balanced_roster("Away"), balanced_roster("Home"));
        let options = GameOptions::default().with_plays();
        let first = engine.simulate(&away, &home, 777, options).unwrap();
        let second = engine.simulate(&away, &home, 777, options).unwrap();
        let other = engine.simulate(&away, &home, 778, options).unwrap();

        let h1 = sha256_hex(serde_json::to_string(&first).unwrap().as_bytes());
        let h2 = sha256_hex(serde_json::to_string(&second).unwrap().as_bytes());
        let h3 = sha256_hex(serde_json::to_string(&other).unwrap().as_bytes());
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_team_cannot_play_itself() {
        let engine = GameEngine::default();
        let roster = balanced_roster("Heat");
        let err = engine
            .simulate(&roster, &roster, 1, GameOptions::default())
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_invalid_roster_fails_before_play() {
        let engine = GameEngine::default();
        let mut broken = balanced_roster("Heat");
        broken.players.retain(|p| p.position != Position::C);
        let err = engine
            .simulate(&broken, &balanced_roster("Magic"), 1, GameOptions::default())
            .unwrap_err();
        assert!(matches!(err, SimError::Config(ConfigError::MissingStarter { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.clock.quarters = 0;
        assert!(GameEngine::new(config).is_err());
    }

    #[test]
    fn test_play_log_matches_possessions() {
        let engine = GameEngine::default();
        let result = engine
            .simulate(
                &balanced_roster("Away"),
                &balanced_roster("Home"),
                99,
                GameOptions::new(GameKind::Playoff).with_plays(),
            )
            .unwrap();
        let plays = result.plays.as_ref().unwrap();
        assert_eq!(plays.len() as u32, result.possessions);
        assert_eq!(result.kind, GameKind::Playoff);

        let last = plays.last().unwrap();
        assert_eq!(last.score, [result.away_score, result.home_score]);
        assert_eq!(last.clock, 0);
        for pair in plays.windows(2).filter(|w| w[0].period == w[1].period) {
            assert_eq!(pair[1].offense, pair[0].next_offense);
        }
        let total: u32 = plays.iter().map(|p| p.seconds).sum();
        assert_eq!(total, result.duration_seconds(&engine.config().clock));
    }

    #[test]
    fn test_fouled_out_player_never_returns() {
        let mut config = EngineConfig::default();
        config.foul.foul_out_limit = 3;
        config.foul.flagrant_ejection_limit = 50;
        let engine = GameEngine::new(config).unwrap();

        let mut fouled_out = 0;
        for seed in 1..=8u64 {
            let result = engine
                .simulate(
                    &balanced_roster("Away"),
                    &balanced_roster("Home"),
                    seed,
                    GameOptions::default().with_plays(),
                )
                .unwrap();
            let plays = result.plays.as_ref().unwrap();
            for side in [TeamSide::Away, TeamSide::Home] {
                for (idx, player) in result.box_score.team(side).players.iter().enumerate() {
                    let me = crate::models::PlayerRef::new(side, idx);
                    let fouls: Vec<usize> = plays
                        .iter()
                        .enumerate()
                        .filter(|(_, p)| p.outcome.committed_foul() == Some(me))
                        .map(|(i, _)| i)
                        .collect();
                    assert_eq!(fouls.len(), player.line.fouls as usize);
                    if !player.fouled_out {
                        continue;
                    }
                    fouled_out += 1;
                    let last_foul = fouls[2];
                    assert!(plays[last_foul + 1..]
                        .iter()
                        .all(|p| !p.outcome.participants().contains(&me)));
                }
            }
        }
        assert!(fouled_out > 0);
    }

    #[test]
    fn test_sudden_death_after_regulation() {
        let engine = GameEngine::new(short_clock(0)).unwrap();
        for seed in 0..16u64 {
            let result = engine
                .simulate(&balanced_roster("Away"), &balanced_roster("Home"), seed, GameOptions::default())
                .unwrap();
            assert_eq!(result.periods, 1);
            assert!(!result.overtime);
            assert_ne!(result.away_score, result.home_score);
            for side in [TeamSide::Away, TeamSide::Home] {
                for p in &result.box_score.team(side).players {
                    assert!(p.line.seconds_played <= 1);
                }
            }
        }
    }

    #[test]
    fn test_overtime_until_untied() {
        let engine = GameEngine::new(short_clock(2)).unwrap();
        let mut went_to_overtime = false;
        for seed in 0..32u64 {
            let result = engine
                .simulate(&balanced_roster("Away"), &balanced_roster("Home"), seed, GameOptions::default())
                .unwrap();
            assert!(result.periods <= 3);
            assert_eq!(result.overtime, result.periods > 1);
            assert_ne!(result.away_score, result.home_score);
            went_to_overtime |= result.overtime;
        }
        assert!(went_to_overtime);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_game_counters_hold(seed in any::<u64>()) {
            let engine = GameEngine::default();
            let result = engine
                .simulate(&balanced_roster("Away"), &balanced_roster("Home"), seed, GameOptions::default())
                .unwrap();
            let duration = result.duration_seconds(&engine.config().clock);
            for side in [TeamSide::Away, TeamSide::Home] {
                let team = result.box_score.team(side);
                let points: u32 = team.players.iter().map(|p| p.line.points as u32).sum();
                prop_assert_eq!(points, team.score as u32);
                prop_assert_eq!(team.totals.points, team.score);
                for p in &team.players {
                    prop_assert!(p.line.fgm <= p.line.fga);
                    prop_assert!(p.line.tpm <= p.line.tpa);
                    prop_assert!(p.line.ftm <= p.line.fta);
                    prop_assert!(p.line.seconds_played <= duration);
                }
            }
            prop_assert_eq!(
                &result.box_score.home.allowed,
                &result.box_score.away.totals
            );
            prop_assert_ne!(result.away_score, result.home_score);
        }
    }
}
