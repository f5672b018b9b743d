//! Play-in, playoff bracket and best-of series
//!
//! ## Format (defaults)
//! - play-in per conference: 7 hosts 8 (winner is the 7 seed), 9 hosts 10
//!   (loser is out), loser of 7/8 hosts winner of 9/10 for the 8 seed
//! - bracket per conference: 1-8, 4-5, 3-6, 2-7, then adjacent winners
//! - finals between the conference champions, home court to the better
//!   regular-season record
//! - best of seven, 2-2-1-1-1: the higher seed hosts games 1, 2, 5 and 7
//!
//! Series MVP is the winning side's player with the best impact score over
//! the series (points, 1.2 per rebound, 1.5 per assist, 2 per steal or
//! block, minus turnovers).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::standings::Standings;
use super::League;
use crate::engine::{GameEngine, GameOptions};
use crate::error::{ConfigError, SimError};
use crate::models::{Conference, GameKind, GameLine, GameResult, GameSummary, TeamRoster};
use crate::rng::SimRng;

/// Higher seed hosts, by game number.
pub const HOME_PATTERN: [bool; 7] = [true, true, false, false, true, false, true];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoffFormat {
    pub play_in: bool,
    /// Bracket size per conference; a power of two.
    pub seeds_per_conference: usize,
    /// Odd, at most seven.
    pub best_of: u8,
}

impl Default for PlayoffFormat {
    fn default() -> Self {
        Self {
            play_in: true,
            seeds_per_conference: 8,
            best_of: 7,
        }
    }
}

impl PlayoffFormat {
    pub fn wins_needed(&self) -> u8 {
        self.best_of / 2 + 1
    }

    /// Teams a conference needs for this format.
    pub fn teams_needed(&self) -> usize {
        self.seeds_per_conference + if self.play_in { 2 } else { 0 }
    }

    pub fn validate(&self, league: &League) -> Result<(), ConfigError> {
        validate_best_of(self.best_of)?;
        let seeds = self.seeds_per_conference;
        if seeds == 0 || !seeds.is_power_of_two() {
            return Err(ConfigError::InvalidLeague(format!(
                "bracket size {seeds} is not a power of two"
            )));
        }
        if self.play_in && seeds < 2 {
            return Err(ConfigError::InvalidLeague(
                "play-in needs at least two seeds per conference".to_string(),
            ));
        }
        for conference in [Conference::East, Conference::West] {
            let count = league.conference(conference).count();
            if count < self.teams_needed() {
                return Err(ConfigError::InvalidLeague(format!(
                    "{conference:?} has {count} teams, format needs {}",
                    self.teams_needed()
                )));
            }
        }
        Ok(())
    }
}

fn validate_best_of(best_of: u8) -> Result<(), ConfigError> {
    if best_of % 2 == 0 || best_of as usize > HOME_PATTERN.len() {
        return Err(ConfigError::InvalidLeague(format!(
            "series length must be odd and at most {}, got {best_of}",
            HOME_PATTERN.len()
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMvp {
    pub name: String,
    pub team: String,
    pub games: u32,
    pub totals: GameLine,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResult {
    pub higher_seed: String,
    pub lower_seed: String,
    pub winner: String,
    pub loser: String,
    /// Higher seed first.
    pub wins: [u8; 2],
    pub games: Vec<GameSummary>,
    pub mvp: Option<SeriesMvp>,
}

impl SeriesResult {
    pub fn games_played(&self) -> usize {
        self.games.len()
    }

    pub fn wins_for(&self, team: &str) -> u8 {
        if team == self.higher_seed {
            self.wins[0]
        } else if team == self.lower_seed {
            self.wins[1]
        } else {
            0
        }
    }
}

fn impact(line: &GameLine) -> f64 {
    line.points as f64
        + 1.2 * line.rebounds() as f64
        + 1.5 * line.assists as f64
        + 2.0 * (line.steals + line.blocks) as f64
        - line.turnovers as f64
}

/// Series lines for one side, keyed by player name.
#[derive(Default)]
struct SeriesLines {
    players: BTreeMap<String, (u32, GameLine)>,
}

impl SeriesLines {
    fn add(&mut self, result: &GameResult, team: &str) {
        let Some(team_box) = result.box_for(team) else {
            return;
        };
        for p in team_box.players.iter().filter(|p| p.played) {
            let entry = self.players.entry(p.name.clone()).or_default();
            entry.0 += 1;
            entry.1.accumulate(&p.line);
        }
    }

    fn mvp(self, team: &str) -> Option<SeriesMvp> {
        self.players
            .into_iter()
            .map(|(name, (games, totals))| SeriesMvp {
                impact: impact(&totals),
                name,
                team: team.to_string(),
                games,
                totals,
            })
            .fold(None, |best: Option<SeriesMvp>, candidate| match best {
                Some(b) if b.impact >= candidate.impact => Some(b),
                _ => Some(candidate),
            })
    }
}

/// Plays a series until one side has a majority of `best_of`.
pub fn play_series(
    engine: &GameEngine,
    higher: &TeamRoster,
    lower: &TeamRoster,
    best_of: u8,
    rng: &mut SimRng,
) -> Result<SeriesResult, SimError> {
    validate_best_of(best_of)?;
    let needed = best_of / 2 + 1;
    let mut wins = [0u8; 2];
    let mut games = Vec::new();
    let mut lines = [SeriesLines::default(), SeriesLines::default()];

    for &higher_hosts in HOME_PATTERN.iter().take(best_of as usize) {
        let (away, home) = if higher_hosts { (lower, higher) } else { (higher, lower) };
        let result = engine.simulate_with_rng(away, home, rng, GameOptions::new(GameKind::Playoff))?;
        if result.winner == higher.name {
            wins[0] += 1;
        } else {
            wins[1] += 1;
        }
        lines[0].add(&result, &higher.name);
        lines[1].add(&result, &lower.name);
        debug!(
            "{} {}-{} {} after game {}",
            higher.name,
            wins[0],
            wins[1],
            lower.name,
            games.len() + 1
        );
        games.push(result.summary(None));
        if wins[0] == needed || wins[1] == needed {
            break;
        }
    }

    let [higher_lines, lower_lines] = lines;
    let (winner, loser, mvp) = if wins[0] > wins[1] {
        (&higher.name, &lower.name, higher_lines.mvp(&higher.name))
    } else {
        (&lower.name, &higher.name, lower_lines.mvp(&lower.name))
    };
    debug!("{} beat {} {}-{}", winner, loser, wins[0].max(wins[1]), wins[0].min(wins[1]));
    Ok(SeriesResult {
        higher_seed: higher.name.clone(),
        lower_seed: lower.name.clone(),
        winner: winner.clone(),
        loser: loser.clone(),
        wins,
        games,
        mvp,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayInResult {
    pub conference: Conference,
    /// Seeds N-1 and N.
    pub upper_game: GameSummary,
    /// Seeds N+1 and N+2.
    pub lower_game: GameSummary,
    /// Loser of the upper game hosts the winner of the lower game.
    pub decider: GameSummary,
    pub upper_seed: String,
    pub lower_seed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostseasonResult {
    pub play_in: Vec<PlayInResult>,
    /// Conference rounds in order, finals last.
    pub rounds: Vec<Vec<SeriesResult>>,
    pub champion: String,
    pub finals_mvp: Option<SeriesMvp>,
}

impl PostseasonResult {
    pub fn finals(&self) -> Option<&SeriesResult> {
        self.rounds.last()?.first()
    }
}

/// Seed order of a bracket of `n` so adjacent entries meet in round one
/// and the top two seeds can only meet in the final: 1,8,4,5,2,7,3,6.
fn bracket_order(n: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < n {
        let size = order.len() * 2;
        order = order.iter().flat_map(|&s| [s, size + 1 - s]).collect();
    }
    order
}

pub struct Postseason<'a> {
    league: &'a League,
    engine: &'a GameEngine,
    format: PlayoffFormat,
}

impl<'a> Postseason<'a> {
    pub fn new(league: &'a League, engine: &'a GameEngine, format: PlayoffFormat) -> Result<Self, ConfigError> {
        format.validate(league)?;
        Ok(Self {
            league,
            engine,
            format,
        })
    }

    pub fn format(&self) -> &PlayoffFormat {
        &self.format
    }

    pub fn run(&self, standings: &Standings, rng: &mut SimRng) -> Result<PostseasonResult, SimError> {
        let mut play_in = Vec::new();
        let mut fields: Vec<Vec<(usize, String)>> = Vec::new();
        for conference in [Conference::East, Conference::West] {
            let ranked: Vec<String> = standings
                .conference(conference)
                .into_iter()
                .map(|r| r.team.clone())
                .collect();
            let mut seeds: Vec<String> = ranked.iter().take(self.format.seeds_per_conference).cloned().collect();
            if seeds.len() < self.format.seeds_per_conference {
                return Err(ConfigError::InvalidLeague(format!(
                    "{conference:?} standings have {} teams",
                    ranked.len()
                ))
                .into());
            }
            if self.format.play_in {
                let result = self.play_in(conference, &ranked, rng)?;
                let n = seeds.len();
                seeds[n - 2] = result.upper_seed.clone();
                seeds[n - 1] = result.lower_seed.clone();
                play_in.push(result);
            }
            let field = bracket_order(seeds.len())
                .into_iter()
                .map(|seed| (seed, seeds[seed - 1].clone()))
                .collect();
            fields.push(field);
        }

        let mut rounds = Vec::new();
        while fields.iter().any(|f| f.len() > 1) {
            let mut round = Vec::new();
            for field in fields.iter_mut() {
                let mut next = Vec::with_capacity(field.len() / 2);
                for pair in field.chunks(2) {
                    let [(sa, a), (sb, b)] = pair else {
                        continue;
                    };
                    let (higher, lower, higher_seed, lower_seed) =
                        if sa < sb { (a, b, *sa, *sb) } else { (b, a, *sb, *sa) };
                    let series = play_series(
                        self.engine,
                        self.league.team(higher)?,
                        self.league.team(lower)?,
                        self.format.best_of,
                        rng,
                    )?;
                    let seed = if series.winner == *higher { higher_seed } else { lower_seed };
                    next.push((seed, series.winner.clone()));
                    round.push(series);
                }
                *field = next;
            }
            rounds.push(round);
        }

        let champions: Vec<&str> = fields
            .iter()
            .filter_map(|f| f.first().map(|(_, team)| team.as_str()))
            .collect();
        let [east, west] = champions.as_slice() else {
            return Err(ConfigError::InvalidLeague("missing conference champion".to_string()).into());
        };
        let (higher, lower) = if standings.ahead_of(east, west) { (*east, *west) } else { (*west, *east) };
        let finals = play_series(
            self.engine,
            self.league.team(higher)?,
            self.league.team(lower)?,
            self.format.best_of,
            rng,
        )?;
        let champion = finals.winner.clone();
        let finals_mvp = finals.mvp.clone();
        rounds.push(vec![finals]);

        debug!(
            champion = %champion,
            mvp = finals_mvp.as_ref().map(|m| m.name.as_str()).unwrap_or("-"),
            "postseason complete"
        );
        Ok(PostseasonResult {
            play_in,
            rounds,
            champion,
            finals_mvp,
        })
    }

    fn play_in(&self, conference: Conference, ranked: &[String], rng: &mut SimRng) -> Result<PlayInResult, SimError> {
        let n = self.format.seeds_per_conference;
        let entrant = |seed: usize| -> Result<&TeamRoster, SimError> {
            let name = ranked
                .get(seed - 1)
                .ok_or_else(|| ConfigError::InvalidLeague(format!("no {seed} seed in {conference:?}")))?;
            Ok(self.league.team(name)?)
        };

        let game = |away: &TeamRoster, home: &TeamRoster, rng: &mut SimRng| {
            self.engine
                .simulate_with_rng(away, home, rng, GameOptions::new(GameKind::PlayIn))
                .map(|r| r.summary(None))
        };

        let upper_game = game(entrant(n)?, entrant(n - 1)?, rng)?;
        let lower_game = game(entrant(n + 2)?, entrant(n + 1)?, rng)?;
        let upper_loser = if upper_game.winner() == upper_game.home {
            &upper_game.away
        } else {
            &upper_game.home
        };
        let decider = game(
            self.league.team(lower_game.winner())?,
            self.league.team(upper_loser)?,
            rng,
        )?;

        let result = PlayInResult {
            conference,
            upper_seed: upper_game.winner().to_string(),
            lower_seed: decider.winner().to_string(),
            upper_game,
            lower_game,
            decider,
        };
        debug!(
            "{:?} play-in: {} and {} advance",
            conference, result.upper_seed, result.lower_seed
        );
        Ok(result)
    }
}
