//! bb_cli library
//!
//! File-facing side of the simulator: team roster CSVs, schedule CSVs,
//! engine config files, and the master ratings import. The binary in
//! `main.rs` wires these into `bb_core`.

pub mod config;
pub mod roster;
pub mod schedule;

use std::path::Path;

use anyhow::{Context, Result};
use bb_core::league::{League, Schedule};
use chrono::NaiveDate;

pub use config::{load_config, preset, resolve};
pub use roster::{import_master, load_league_dir, load_team, ImportReport, NameColumn};
pub use schedule::{load_schedule, write_schedule};

/// Default games per team when no schedule file is given.
pub const SEASON_GAMES: u32 = 82;

/// Loads and validates every roster in `dir`.
pub fn load_league(dir: &Path, names: NameColumn) -> Result<League> {
    let teams = load_league_dir(dir, names)?;
    League::new(teams).context("Invalid league")
}

/// The schedule file if given, otherwise a balanced `games_per_team`
/// schedule starting on `start`.
pub fn schedule_for(
    league: &League,
    file: Option<&Path>,
    games_per_team: u32,
    start: NaiveDate,
) -> Result<Schedule> {
    let schedule = match file {
        Some(path) => load_schedule(path)?,
        None => Schedule::balanced(&league.names(), games_per_team, start)
            .context("Cannot build a balanced schedule")?,
    };
    schedule.validate(league).context("Schedule does not match the league")?;
    Ok(schedule)
}
