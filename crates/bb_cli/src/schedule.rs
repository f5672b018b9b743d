//! Schedule CSV: `date,away,home` with ISO dates (`2024-10-22`).

use std::path::Path;

use anyhow::{Context, Result};
use bb_core::league::{Schedule, ScheduledGame};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ScheduleRow {
    date: String,
    away: String,
    home: String,
}

pub fn load_schedule(path: &Path) -> Result<Schedule> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open schedule CSV: {}", path.display()))?;

    let mut games = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let line = i + 2;
        let row: ScheduleRow =
            record.with_context(|| format!("{}: bad row {}", path.display(), line))?;
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .with_context(|| format!("{}: bad date '{}' on line {}", path.display(), row.date, line))?;
        games.push(ScheduledGame::new(date, row.away, row.home));
    }
    Ok(Schedule::new(games))
}

pub fn write_schedule(path: &Path, schedule: &Schedule) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create schedule CSV: {}", path.display()))?;
    for game in &schedule.games {
        writer.serialize(ScheduleRow {
            date: game.date.format(DATE_FORMAT).to_string(),
            away: game.away.clone(),
            home: game.home.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
