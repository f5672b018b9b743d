//! bb_cli
//!
//! Game, season, series and championship prediction runs from roster CSVs.
//! Results are printed as JSON; logs go to stderr (`RUST_LOG`, default `info`).

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "cli")]
use std::sync::Arc;
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use bb_cli::{NameColumn, SEASON_GAMES};
#[cfg(feature = "cli")]
use bb_core::league::{play_series, PlayoffFormat, PredictionRequest, Predictor, Season};
#[cfg(feature = "cli")]
use bb_core::{GameEngine, GameKind, GameOptions, SimRng};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use serde::Serialize;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bb_cli")]
#[command(about = "Deterministic basketball league simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct Common {
    /// Directory of team roster CSVs
    #[arg(long, default_value = "data/rosters")]
    rosters: PathBuf,

    /// Random seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Display-name language tag (e.g. "en", "zh"); never affects results
    #[arg(long, default_value = "en")]
    lang: String,

    /// Engine config file (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named engine preset: regular-season, playoffs, arcade
    #[arg(long)]
    preset: Option<String>,

    /// Write JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Args)]
struct SeasonArgs {
    /// Schedule CSV (date,away,home); generated when omitted
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Games per team for a generated schedule
    #[arg(long, default_value_t = SEASON_GAMES)]
    games: u32,

    /// First day of a generated schedule (YYYY-MM-DD)
    #[arg(long, default_value = "2024-10-22")]
    start: NaiveDate,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Simulate one game
    Game {
        #[command(flatten)]
        common: Common,

        #[arg(long)]
        away: String,

        #[arg(long)]
        home: String,

        /// Playoff shot density
        #[arg(long, default_value = "false")]
        playoff: bool,

        /// Include the possession-by-possession log
        #[arg(long, default_value = "false")]
        plays: bool,
    },

    /// Simulate a regular season
    Season {
        #[command(flatten)]
        common: Common,

        #[command(flatten)]
        season: SeasonArgs,
    },

    /// Simulate a playoff series; the higher seed has home court
    Series {
        #[command(flatten)]
        common: Common,

        #[arg(long)]
        higher: String,

        #[arg(long)]
        lower: String,

        #[arg(long, default_value_t = 7)]
        best_of: u8,
    },

    /// Monte Carlo championship odds
    Predict {
        #[command(flatten)]
        common: Common,

        #[command(flatten)]
        season: SeasonArgs,

        /// Number of full season + postseason simulations
        #[arg(long, default_value_t = 1000)]
        simulations: u32,

        /// Run on this thread, yielding every N simulations
        #[arg(long)]
        sequential: Option<u32>,

        /// Skip the play-in tournament
        #[arg(long, default_value = "false")]
        no_play_in: bool,

        /// Playoff teams per conference
        #[arg(long, default_value_t = 8)]
        seeds: usize,

        #[arg(long, default_value_t = 7)]
        best_of: u8,

        /// Stop starting new simulations after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,
    },

    /// Rebuild team roster CSVs from a league-wide ratings export
    ImportRoster {
        /// Master ratings CSV
        #[arg(long)]
        ratings: PathBuf,

        /// Roster directory to update
        #[arg(long, default_value = "data/rosters")]
        out: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Game {
            common,
            away,
            home,
            playoff,
            plays,
        } => {
            let engine = engine(&common)?;
            let league = bb_cli::load_league(&common.rosters, names(&common))?;
            let kind = if playoff { GameKind::Playoff } else { GameKind::Regular };
            let mut options = GameOptions::new(kind);
            if plays {
                options = options.with_plays();
            }
            let result = engine
                .simulate(league.team(&away)?, league.team(&home)?, common.seed, options)
                .with_context(|| format!("{away} at {home} failed"))?;
            tracing::info!(
                "{} {} - {} {}{}",
                result.away,
                result.away_score,
                result.home_score,
                result.home,
                if result.overtime { " (OT)" } else { "" }
            );
            emit(&common.out, &result)?;
        }

        Commands::Season { common, season } => {
            let engine = engine(&common)?;
            let league = bb_cli::load_league(&common.rosters, names(&common))?;
            let schedule =
                bb_cli::schedule_for(&league, season.schedule.as_deref(), season.games, season.start)?;
            let result = Season::new(&league, &schedule, &engine)?.run(common.seed)?;
            if let Some(leader) = result.standings.leader() {
                tracing::info!(
                    "{} games played, best record {} ({}-{})",
                    result.games.len(),
                    leader.team,
                    leader.wins,
                    leader.losses
                );
            }
            emit(&common.out, &result)?;
        }

        Commands::Series {
            common,
            higher,
            lower,
            best_of,
        } => {
            let engine = engine(&common)?;
            let league = bb_cli::load_league(&common.rosters, names(&common))?;
            let mut rng = SimRng::new(common.seed);
            let result = play_series(&engine, league.team(&higher)?, league.team(&lower)?, best_of, &mut rng)?;
            tracing::info!(
                "{} win {}-{}",
                result.winner,
                result.wins_for(&result.winner),
                result.wins_for(&result.loser)
            );
            emit(&common.out, &result)?;
        }

        Commands::Predict {
            common,
            season,
            simulations,
            sequential,
            no_play_in,
            seeds,
            best_of,
            time_limit,
        } => {
            let engine = engine(&common)?;
            let league = bb_cli::load_league(&common.rosters, names(&common))?;
            let schedule =
                bb_cli::schedule_for(&league, season.schedule.as_deref(), season.games, season.start)?;
            let format = PlayoffFormat {
                play_in: !no_play_in,
                seeds_per_conference: seeds,
                best_of,
            };
            let predictor = Predictor::new(&league, &schedule, &engine, format)?;

            let mut request = PredictionRequest::new(simulations, common.seed);
            if let Some(every) = sequential {
                request = request.sequential(every);
            }

            let cancel = Arc::new(AtomicBool::new(false));
            if let Some(secs) = time_limit {
                let flag = Arc::clone(&cancel);
                std::thread::spawn(move || {
                    std::thread::sleep(Duration::from_secs(secs));
                    flag.store(true, Ordering::Relaxed);
                });
            }

            let step = (simulations / 10).max(1);
            let result = predictor.run_with_progress(&request, &cancel, |p| {
                if p.completed % step == 0 || p.completed == p.total {
                    tracing::info!(
                        "{}/{} simulations, leader {}",
                        p.completed,
                        p.total,
                        p.leader.as_deref().unwrap_or("-")
                    );
                }
            });
            emit(&common.out, &result)?;
        }

        Commands::ImportRoster { ratings, out } => {
            let report = bb_cli::import_master(&ratings, &out)?;
            tracing::info!("{} team files written", report.written.len());
            emit(&None, &report)?;
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn engine(common: &Common) -> Result<GameEngine> {
    let config = bb_cli::resolve(common.config.as_deref(), common.preset.as_deref())?;
    GameEngine::new(config).context("Invalid engine config")
}

#[cfg(feature = "cli")]
fn names(common: &Common) -> NameColumn {
    NameColumn::for_language(&common.lang)
}

#[cfg(feature = "cli")]
fn emit<T: Serialize>(out: &Option<PathBuf>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out.as_deref() {
        Some(path) => write_json(path, &json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

#[cfg(feature = "cli")]
fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("saved {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("bb_cli is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
