//! Monte Carlo championship prediction
//!
//! Runs `simulations` independent season + postseason simulations. Each one
//! owns a fresh `SimRng` seeded with `base_seed + index`, so the title
//! counts depend only on the base seed, never on thread scheduling or mode.
//!
//! - `Parallel`: a rayon pool runs simulations; each sends its outcome down
//!   an mpsc channel to a coordinator thread that keeps the tally and
//!   reports progress.
//! - `Sequential`: same work on the caller's thread, yielding every
//!   `yield_every` simulations.
//!
//! Cancellation is cooperative and checked before each simulation starts;
//! simulations already running finish and are counted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::playoffs::{PlayoffFormat, Postseason};
use super::schedule::Schedule;
use super::season::Season;
use super::League;
use crate::engine::GameEngine;
use crate::error::SimError;
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PredictionMode {
    #[default]
    Parallel,
    /// Caller's thread only.
    Sequential { yield_every: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub simulations: u32,
    pub base_seed: u64,
    #[serde(default)]
    pub mode: PredictionMode,
}

impl PredictionRequest {
    pub fn new(simulations: u32, base_seed: u64) -> Self {
        Self {
            simulations,
            base_seed,
            mode: PredictionMode::Parallel,
        }
    }

    pub fn sequential(mut self, yield_every: u32) -> Self {
        self.mode = PredictionMode::Sequential { yield_every };
        self
    }

    pub fn seed_for(&self, index: u32) -> u64 {
        self.base_seed.wrapping_add(index as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionProgress {
    pub completed: u32,
    pub total: u32,
    /// Most titles so far, ties broken by name.
    pub leader: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamOdds {
    pub team: String,
    pub titles: u32,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub total: u32,
    /// Simulations that produced a champion.
    pub completed: u32,
    /// Simulations aborted by a state violation.
    pub failed: u32,
    pub cancelled: bool,
    pub championships: BTreeMap<String, u32>,
    /// Every team, most likely champion first.
    pub ranking: Vec<TeamOdds>,
}

/// Coordinator-side aggregate.
struct Tally {
    total: u32,
    completed: u32,
    failed: u32,
    titles: BTreeMap<String, u32>,
}

impl Tally {
    fn new(total: u32) -> Self {
        Self {
            total,
            completed: 0,
            failed: 0,
            titles: BTreeMap::new(),
        }
    }

    fn record(&mut self, outcome: Result<String, SimError>) {
        match outcome {
            Ok(champion) => {
                self.completed += 1;
                *self.titles.entry(champion).or_default() += 1;
            }
            Err(err) => {
                warn!("simulation failed: {}", err);
                self.failed += 1;
            }
        }
    }

    fn leader(&self) -> Option<String> {
        // BTreeMap order makes the first maximum the alphabetical one.
        self.titles
            .iter()
            .fold(None, |best: Option<(&String, u32)>, (team, &n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((team, n)),
            })
            .map(|(team, _)| team.clone())
    }

    fn progress(&self) -> PredictionProgress {
        PredictionProgress {
            completed: self.completed + self.failed,
            total: self.total,
            leader: self.leader(),
        }
    }

    fn finish(self, teams: Vec<String>, cancelled: bool) -> PredictionResult {
        let mut ranking: Vec<TeamOdds> = teams
            .into_iter()
            .map(|team| {
                let titles = self.titles.get(&team).copied().unwrap_or(0);
                let probability = match self.completed {
                    0 => 0.0,
                    n => titles as f64 / n as f64,
                };
                TeamOdds {
                    team,
                    titles,
                    probability,
                }
            })
            .collect();
        ranking.sort_by(|a, b| b.titles.cmp(&a.titles).then_with(|| a.team.cmp(&b.team)));
        PredictionResult {
            total: self.total,
            completed: self.completed,
            failed: self.failed,
            cancelled,
            championships: self.titles,
            ranking,
        }
    }
}

pub struct Predictor<'a> {
    league: &'a League,
    season: Season<'a>,
    postseason: Postseason<'a>,
}

impl<'a> Predictor<'a> {
    /// Validates schedule and format once; simulations never hit a
    /// configuration error afterwards.
    pub fn new(
        league: &'a League,
        schedule: &'a Schedule,
        engine: &'a GameEngine,
        format: PlayoffFormat,
    ) -> Result<Self, SimError> {
        Ok(Self {
            league,
            season: Season::new(league, schedule, engine)?,
            postseason: Postseason::new(league, engine, format)?,
        })
    }

    /// One season and postseason. Returns the champion.
    pub fn simulate_once(&self, seed: u64) -> Result<String, SimError> {
        let mut rng = SimRng::new(seed);
        let season = self.season.run_with_rng(&mut rng)?;
        let postseason = self.postseason.run(&season.standings, &mut rng)?;
        Ok(postseason.champion)
    }

    pub fn run(&self, request: &PredictionRequest, cancel: &AtomicBool) -> PredictionResult {
        self.run_with_progress(request, cancel, |_| {})
    }

    /// `progress` is called after every finished simulation, from the
    /// coordinator thread in parallel mode.
    pub fn run_with_progress<F>(&self, request: &PredictionRequest, cancel: &AtomicBool, progress: F) -> PredictionResult
    where
        F: FnMut(&PredictionProgress) + Send,
    {
        info!(
            simulations = request.simulations,
            base_seed = request.base_seed,
            mode = ?request.mode,
            "prediction started"
        );
        let tally = match request.mode {
            PredictionMode::Parallel => self.run_parallel(request, cancel, progress),
            PredictionMode::Sequential { yield_every } => self.run_sequential(request, yield_every, cancel, progress),
        };
        let cancelled = cancel.load(Ordering::Relaxed) && tally.completed + tally.failed < tally.total;
        let result = tally.finish(self.league.names(), cancelled);
        info!(
            completed = result.completed,
            failed = result.failed,
            cancelled = result.cancelled,
            favourite = result.ranking.first().map(|o| o.team.as_str()).unwrap_or("-"),
            "prediction finished"
        );
        result
    }

    fn run_parallel<F>(&self, request: &PredictionRequest, cancel: &AtomicBool, mut progress: F) -> Tally
    where
        F: FnMut(&PredictionProgress) + Send,
    {
        let total = request.simulations;
        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Result<String, SimError>>();
            let coordinator = scope.spawn(move || {
                let mut tally = Tally::new(total);
                for outcome in rx {
                    tally.record(outcome);
                    progress(&tally.progress());
                }
                tally
            });

            (0..total).into_par_iter().for_each_with(tx, |tx, i| {
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                // A closed channel means the coordinator is gone; nothing left to report to.
                let _ = tx.send(self.simulate_once(request.seed_for(i)));
            });

            coordinator
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
        })
    }

    fn run_sequential<F>(&self, request: &PredictionRequest, yield_every: u32, cancel: &AtomicBool, mut progress: F) -> Tally
    where
        F: FnMut(&PredictionProgress),
    {
        let mut tally = Tally::new(request.simulations);
        for i in 0..request.simulations {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            tally.record(self.simulate_once(request.seed_for(i)));
            progress(&tally.progress());
            if yield_every > 0 && (i + 1) % yield_every == 0 {
                thread::yield_now();
            }
        }
        tally
    }
}
