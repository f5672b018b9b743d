//! Team roster CSV files
//!
//! One file per team, named after the team (`Celtics.csv`), with the
//! 25-column schema below. `name` is the display name (possibly localized),
//! `englishName` the stable key used in box scores and validation.
//!
//! Blank `rotationType` cells are filled per position in rating order:
//! the open starter slot first, then bench, then deep bench.
//!
//! [`import_master`] rebuilds team files from a league-wide ratings export,
//! keeping the hand-maintained identity columns of any existing file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bb_core::models::{Conference, PlayerProfile, Position, Ratings, RotationTier, ShotArchetype, TeamRoster};
use serde::{Deserialize, Serialize};

pub const ROSTER_COLUMNS: [&str; 25] = [
    "name",
    "englishName",
    "position",
    "playerType",
    "rotationType",
    "rating",
    "insideRating",
    "midRating",
    "threeRating",
    "freeThrowPercent",
    "interiorDefense",
    "perimeterDefense",
    "orbRating",
    "drbRating",
    "astRating",
    "stlRating",
    "blkRating",
    "layupRating",
    "standDunk",
    "drivingDunk",
    "athleticism",
    "durability",
    "offConst",
    "defConst",
    "drawFoul",
];

/// Full team name in the master export → roster file stem.
pub const TEAM_NAMES: [(&str, &str); 30] = [
    ("Atlanta Hawks", "Hawks"),
    ("Boston Celtics", "Celtics"),
    ("Brooklyn Nets", "Nets"),
    ("Charlotte Hornets", "Hornets"),
    ("Chicago Bulls", "Bulls"),
    ("Cleveland Cavaliers", "Cavaliers"),
    ("Dallas Mavericks", "Mavericks"),
    ("Denver Nuggets", "Nuggets"),
    ("Detroit Pistons", "Pistons"),
    ("Golden State Warriors", "Warriors"),
    ("Houston Rockets", "Rockets"),
    ("Indiana Pacers", "Pacers"),
    ("Los Angeles Clippers", "Clippers"),
    ("Los Angeles Lakers", "Lakers"),
    ("Memphis Grizzlies", "Grizzlies"),
    ("Miami Heat", "Heat"),
    ("Milwaukee Bucks", "Bucks"),
    ("Minnesota Timberwolves", "Timberwolves"),
    ("New Orleans Pelicans", "Pelicans"),
    ("New York Knicks", "Knicks"),
    ("Oklahoma City Thunder", "Thunder"),
    ("Orlando Magic", "Magic"),
    ("Philadelphia 76ers", "76ers"),
    ("Phoenix Suns", "Suns"),
    ("Portland Trail Blazers", "Trail Blazers"),
    ("Sacramento Kings", "Kings"),
    ("San Antonio Spurs", "Spurs"),
    ("Toronto Raptors", "Raptors"),
    ("Utah Jazz", "Jazz"),
    ("Washington Wizards", "Wizards"),
];

const WEST: [&str; 15] = [
    "Mavericks",
    "Nuggets",
    "Warriors",
    "Rockets",
    "Clippers",
    "Lakers",
    "Grizzlies",
    "Timberwolves",
    "Pelicans",
    "Thunder",
    "Suns",
    "Trail Blazers",
    "Kings",
    "Spurs",
    "Jazz",
];

const EAST: [&str; 15] = [
    "Hawks", "Celtics", "Nets", "Hornets", "Bulls", "Cavaliers", "Pistons", "Pacers", "Heat",
    "Bucks", "Knicks", "Magic", "76ers", "Raptors", "Wizards",
];

pub fn conference_of(team: &str) -> Option<Conference> {
    if EAST.contains(&team) {
        Some(Conference::East)
    } else if WEST.contains(&team) {
        Some(Conference::West)
    } else {
        None
    }
}

pub fn short_team_name(full: &str) -> Option<&'static str> {
    TEAM_NAMES
        .iter()
        .find(|(long, _)| *long == full.trim())
        .map(|(_, short)| *short)
}

/// Which roster column becomes the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameColumn {
    #[default]
    English,
    Local,
}

impl NameColumn {
    /// `en*` picks `englishName`; any other language tag picks `name`.
    pub fn for_language(tag: &str) -> Self {
        if tag.trim().to_ascii_lowercase().starts_with("en") {
            NameColumn::English
        } else {
            NameColumn::Local
        }
    }
}

/// One row of a team roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub name: String,
    #[serde(default)]
    pub english_name: String,
    pub position: String,
    #[serde(default)]
    pub player_type: String,
    #[serde(default)]
    pub rotation_type: String,
    pub rating: u8,
    pub inside_rating: u8,
    pub mid_rating: u8,
    pub three_rating: u8,
    /// Either a percentage (`78`) or a fraction (`0.78`).
    pub free_throw_percent: f32,
    pub interior_defense: u8,
    pub perimeter_defense: u8,
    pub orb_rating: u8,
    pub drb_rating: u8,
    pub ast_rating: u8,
    pub stl_rating: u8,
    pub blk_rating: u8,
    pub layup_rating: u8,
    pub stand_dunk: u8,
    pub driving_dunk: u8,
    pub athleticism: u8,
    pub durability: u8,
    pub off_const: u8,
    pub def_const: u8,
    pub draw_foul: u8,
}

impl RosterRow {
    /// Stable player key: `englishName`, or `name` when it is blank.
    pub fn key(&self) -> &str {
        if self.english_name.trim().is_empty() {
            self.name.trim()
        } else {
            self.english_name.trim()
        }
    }

    pub fn ratings(&self) -> Ratings {
        let ft = if self.free_throw_percent <= 1.0 {
            self.free_throw_percent * 100.0
        } else {
            self.free_throw_percent
        };
        Ratings {
            overall: self.rating,
            inside: self.inside_rating,
            mid: self.mid_rating,
            three: self.three_rating,
            free_throw: ft.round().clamp(0.0, 255.0) as u8,
            interior_defense: self.interior_defense,
            perimeter_defense: self.perimeter_defense,
            off_rebound: self.orb_rating,
            def_rebound: self.drb_rating,
            assist: self.ast_rating,
            steal: self.stl_rating,
            block: self.blk_rating,
            layup: self.layup_rating,
            standing_dunk: self.stand_dunk,
            driving_dunk: self.driving_dunk,
            athleticism: self.athleticism,
            durability: self.durability,
            off_consistency: self.off_const,
            def_consistency: self.def_const,
            draw_foul: self.draw_foul,
        }
    }

    fn profile(&self, team: &str, tier: RotationTier, names: NameColumn) -> Result<PlayerProfile> {
        let position: Position = self
            .position
            .parse()
            .with_context(|| format!("{}: bad position '{}'", self.key(), self.position))?;
        let display = match names {
            NameColumn::English => self.key(),
            NameColumn::Local if self.name.trim().is_empty() => self.key(),
            NameColumn::Local => self.name.trim(),
        }
        .to_string();
        let ratings = self.ratings();
        let mut profile =
            PlayerProfile::new(self.key(), team, position, tier, ratings).with_display_name(display);
        if let Some(archetype) = ShotArchetype::parse(&self.player_type) {
            profile = profile.with_archetype(archetype);
        }
        Ok(profile)
    }
}

pub fn read_rows(path: &Path) -> Result<Vec<RosterRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open roster CSV: {}", path.display()))?;
    let mut rows = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let row: RosterRow =
            record.with_context(|| format!("{}: bad row {}", path.display(), i + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn write_rows(path: &Path, rows: &[RosterRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create roster CSV: {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Builds a validated roster from parsed rows.
pub fn roster_from_rows(
    team: &str,
    conference: Conference,
    rows: &[RosterRow],
    names: NameColumn,
) -> Result<TeamRoster> {
    let mut tiers: Vec<Option<RotationTier>> = Vec::with_capacity(rows.len());
    for row in rows {
        let raw = row.rotation_type.trim();
        let tier = if raw.is_empty() {
            None
        } else {
            match RotationTier::parse(raw) {
                Some(tier) => Some(tier),
                None => bail!("{team}: {} has unknown rotationType '{raw}'", row.key()),
            }
        };
        tiers.push(tier);
    }

    // Blank tiers: best remaining rating first within each position.
    let mut open: Vec<usize> = (0..rows.len()).filter(|&i| tiers[i].is_none()).collect();
    open.sort_by(|&a, &b| rows[b].rating.cmp(&rows[a].rating).then(a.cmp(&b)));
    for i in open {
        let pos = rows[i].position.trim().to_ascii_uppercase();
        let taken = |tier: RotationTier, tiers: &[Option<RotationTier>]| {
            rows.iter()
                .zip(tiers)
                .any(|(r, t)| *t == Some(tier) && r.position.trim().eq_ignore_ascii_case(&pos))
        };
        let tier = if !taken(RotationTier::Starter, tiers.as_slice()) {
            RotationTier::Starter
        } else if !taken(RotationTier::Bench, tiers.as_slice()) {
            RotationTier::Bench
        } else {
            RotationTier::DeepBench
        };
        tiers[i] = Some(tier);
    }

    let mut players = Vec::with_capacity(rows.len());
    for (row, tier) in rows.iter().zip(tiers) {
        let tier = tier.unwrap_or(RotationTier::DeepBench);
        players.push(row.profile(team, tier, names)?);
    }
    let roster = TeamRoster::new(team, conference, players);
    roster.validate().with_context(|| format!("Invalid roster for {team}"))?;
    Ok(roster)
}

/// Loads one team file. The team name is the file stem.
pub fn load_team(path: &Path, conference: Conference, names: NameColumn) -> Result<TeamRoster> {
    let team = team_name(path)?;
    let rows = read_rows(path)?;
    roster_from_rows(&team, conference, &rows, names)
}

/// Loads every `*.csv` in `dir`, sorted by team name. Conferences come from
/// the built-in team map.
pub fn load_league_dir(dir: &Path, names: NameColumn) -> Result<Vec<TeamRoster>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read roster directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut teams = Vec::with_capacity(paths.len());
    for path in paths {
        let team = team_name(&path)?;
        let Some(conference) = conference_of(&team) else {
            tracing::warn!("skipping {}: no conference for team '{}'", path.display(), team);
            continue;
        };
        teams.push(load_team(&path, conference, names)?);
    }
    if teams.is_empty() {
        bail!("No team rosters found in {}", dir.display());
    }
    tracing::debug!("loaded {} rosters from {}", teams.len(), dir.display());
    Ok(teams)
}

fn team_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("Roster file has no usable name: {}", path.display()))
}

// ============================================================================
// Master ratings import
// ============================================================================

/// Row of the league-wide ratings export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterRow {
    pub name: String,
    pub team: String,
    pub position: String,
    pub overall_attribute: u8,
    pub close_shot: u8,
    pub mid_range_shot: u8,
    pub three_point_shot: u8,
    pub free_throw: f32,
    pub interior_defense: u8,
    pub perimeter_defense: u8,
    pub offensive_rebound: u8,
    pub defensive_rebound: u8,
    pub pass_accuracy: u16,
    #[serde(rename = "passIQ")]
    pub pass_iq: u16,
    pub pass_vision: u16,
    pub steal: u8,
    pub block: u8,
    pub layup: u8,
    pub standing_dunk: u8,
    pub driving_dunk: u8,
    pub speed: u16,
    pub agility: u16,
    pub strength: u16,
    pub vertical: u16,
    pub stamina: u16,
    pub hustle: u16,
    pub overall_durability: u8,
    pub offensive_consistency: u8,
    pub defensive_consistency: u8,
    pub draw_foul: u8,
}

impl MasterRow {
    /// Floor of the three passing ratings.
    pub fn assist_rating(&self) -> u8 {
        ((self.pass_accuracy + self.pass_iq + self.pass_vision) / 3).min(u8::MAX as u16) as u8
    }

    /// Floor of the six physical ratings.
    pub fn athleticism(&self) -> u8 {
        let sum = self.speed + self.agility + self.strength + self.vertical + self.stamina + self.hustle;
        (sum / 6).min(u8::MAX as u16) as u8
    }

    fn to_roster_row(&self) -> RosterRow {
        RosterRow {
            name: self.name.clone(),
            english_name: self.name.clone(),
            position: self.position.clone(),
            player_type: String::new(),
            rotation_type: String::new(),
            rating: self.overall_attribute,
            inside_rating: self.close_shot,
            mid_rating: self.mid_range_shot,
            three_rating: self.three_point_shot,
            free_throw_percent: self.free_throw,
            interior_defense: self.interior_defense,
            perimeter_defense: self.perimeter_defense,
            orb_rating: self.offensive_rebound,
            drb_rating: self.defensive_rebound,
            ast_rating: self.assist_rating(),
            stl_rating: self.steal,
            blk_rating: self.block,
            layup_rating: self.layup,
            stand_dunk: self.standing_dunk,
            driving_dunk: self.driving_dunk,
            athleticism: self.athleticism(),
            durability: self.overall_durability,
            off_const: self.offensive_consistency,
            def_const: self.defensive_consistency,
            draw_foul: self.draw_foul,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Team file stem → players written.
    pub written: BTreeMap<String, usize>,
    /// Full team names with no roster file mapping.
    pub unmapped: Vec<String>,
}

/// Splits the master export into per-team files under `out_dir`.
///
/// Existing files are read first; for players already listed (matched on
/// `englishName`) the `name`, `englishName`, `position`, `playerType` and
/// `rotationType` columns are preserved. Rows are written best rating first.
pub fn import_master(master: &Path, out_dir: &Path) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(master)
        .with_context(|| format!("Failed to open ratings CSV: {}", master.display()))?;

    let mut by_team: BTreeMap<String, Vec<MasterRow>> = BTreeMap::new();
    for (i, record) in reader.deserialize().enumerate() {
        let row: MasterRow =
            record.with_context(|| format!("{}: bad row {}", master.display(), i + 2))?;
        by_team.entry(row.team.clone()).or_default().push(row);
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut report = ImportReport::default();
    for (full, players) in by_team {
        let Some(short) = short_team_name(&full) else {
            tracing::warn!("no roster file mapping for team '{}'", full);
            report.unmapped.push(full);
            continue;
        };
        let path = out_dir.join(format!("{short}.csv"));
        let existing: HashMap<String, RosterRow> = if path.exists() {
            read_rows(&path)?
                .into_iter()
                .map(|r| (r.key().to_string(), r))
                .collect()
        } else {
            HashMap::new()
        };

        let mut rows: Vec<RosterRow> = players
            .iter()
            .map(|p| {
                let mut row = p.to_roster_row();
                if let Some(old) = existing.get(p.name.trim()) {
                    row.name = old.name.clone();
                    row.english_name = old.english_name.clone();
                    row.position = old.position.clone();
                    row.player_type = old.player_type.clone();
                    row.rotation_type = old.rotation_type.clone();
                }
                row
            })
            .collect();
        rows.sort_by(|a, b| b.rating.cmp(&a.rating));

        write_rows(&path, &rows)?;
        tracing::info!("{} -> {} ({} players)", full, path.display(), rows.len());
        report.written.insert(short.to_string(), rows.len());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn row_line(name: &str, pos: &str, tier: &str, rating: u8) -> String {
        let r = rating;
        format!(
            "{name},{name},{pos},,{tier},{r},{r},{r},{r},0.8,{r},{r},{r},{r},{r},{r},{r},{r},{r},{r},{r},{r},{r},{r},{r}"
        )
    }

    fn write_team(dir: &Path, team: &str, blank_tiers: bool) -> PathBuf {
        let path = dir.join(format!("{team}.csv"));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{}", ROSTER_COLUMNS.join(",")).unwrap();
        for pos in ["PG", "SG", "SF", "PF", "C"] {
            for (tier, rating) in [("starter", 80), ("bench", 72), ("deep", 64)] {
                let tier = if blank_tiers { "" } else { tier };
                writeln!(file, "{}", row_line(&format!("{team} {pos} {rating}"), pos, tier, rating)).unwrap();
            }
        }
        path
    }

    #[test]
    fn test_load_team_file() {
        let dir = TempDir::new().unwrap();
        let path = write_team(dir.path(), "Celtics", false);
        let roster = load_team(&path, Conference::East, NameColumn::English).unwrap();
        assert_eq!(roster.name, "Celtics");
        assert_eq!(roster.players.len(), 15);
        let pg = roster
            .players
            .iter()
            .find(|p| p.position == Position::PG && p.tier == RotationTier::Starter)
            .unwrap();
        assert_eq!(pg.ratings.overall, 80);
        assert_eq!(pg.ratings.free_throw, 80);
    }

    #[test]
    fn test_blank_tiers_filled_by_rating() {
        let dir = TempDir::new().unwrap();
        let path = write_team(dir.path(), "Nets", true);
        let roster = load_team(&path, Conference::East, NameColumn::English).unwrap();
        for p in &roster.players {
            let expected = match p.ratings.overall {
                80 => RotationTier::Starter,
                72 => RotationTier::Bench,
                _ => RotationTier::DeepBench,
            };
            assert_eq!(p.tier, expected, "{}", p.name);
        }
    }

    #[test]
    fn test_missing_starter_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Heat.csv");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{}", ROSTER_COLUMNS.join(",")).unwrap();
        writeln!(file, "{}", row_line("Solo", "PG", "starter", 80)).unwrap();
        drop(file);
        let err = load_team(&path, Conference::East, NameColumn::English).unwrap_err();
        assert!(format!("{err:#}").contains("Heat"));
    }

    #[test]
    fn test_bad_position_is_rejected() {
        let rows = vec![RosterRow {
            position: "QB".into(),
            ..read_rows(&write_team(TempDir::new().unwrap().path(), "Jazz", false)).unwrap()[0].clone()
        }];
        assert!(roster_from_rows("Jazz", Conference::West, &rows, NameColumn::English).is_err());
    }

    #[test]
    fn test_local_display_names() {
        let dir = TempDir::new().unwrap();
        let path = write_team(dir.path(), "Suns", false);
        let mut rows = read_rows(&path).unwrap();
        rows[0].name = "Local Name".into();
        let roster = roster_from_rows("Suns", Conference::West, &rows, NameColumn::Local).unwrap();
        assert_eq!(roster.players[0].display_name, "Local Name");
        assert_eq!(roster.players[0].name, rows[0].english_name);
        assert_eq!(NameColumn::for_language("en-US"), NameColumn::English);
        assert_eq!(NameColumn::for_language("zh"), NameColumn::Local);
    }

    #[test]
    fn test_load_league_dir_skips_unknown_teams() {
        let dir = TempDir::new().unwrap();
        write_team(dir.path(), "Celtics", false);
        write_team(dir.path(), "Lakers", false);
        write_team(dir.path(), "Barnstormers", false);
        let teams = load_league_dir(dir.path(), NameColumn::English).unwrap();
        let names: Vec<_> = teams.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Celtics", "Lakers"]);
        assert_eq!(teams[1].conference, Conference::West);
    }

    #[test]
    fn test_conference_map_covers_every_team() {
        for (_, short) in TEAM_NAMES {
            assert!(conference_of(short).is_some(), "{short}");
        }
        assert_eq!(short_team_name("Portland Trail Blazers"), Some("Trail Blazers"));
    }

    const MASTER_HEADER: &str = "name,team,position,overallAttribute,closeShot,midRangeShot,threePointShot,freeThrow,interiorDefense,perimeterDefense,offensiveRebound,defensiveRebound,passAccuracy,passIQ,passVision,steal,block,layup,standingDunk,drivingDunk,speed,agility,strength,vertical,stamina,hustle,overallDurability,offensiveConsistency,defensiveConsistency,drawFoul";

    #[test]
    fn test_import_master_derives_and_preserves() {
        let dir = TempDir::new().unwrap();
        let master = dir.path().join("master.csv");
        let mut file = fs::File::create(&master).unwrap();
        writeln!(file, "{MASTER_HEADER}").unwrap();
        writeln!(
            file,
            "Jay Star,Boston Celtics,SF,90,80,81,82,85,60,70,40,60,70,71,73,50,40,80,70,75,80,81,82,83,84,86,90,88,70,75"
        )
        .unwrap();
        writeln!(
            file,
            "Role Guy,Boston Celtics,PG,75,60,61,62,80,50,60,30,40,60,60,60,55,30,70,40,45,70,70,70,70,70,70,80,70,60,50"
        )
        .unwrap();
        writeln!(
            file,
            "Nobody,Seattle Sonics,C,70,60,61,62,80,50,60,30,40,60,60,60,55,30,70,40,45,70,70,70,70,70,70,80,70,60,50"
        )
        .unwrap();
        drop(file);

        // Existing file keeps the localized name and hand-set tier.
        let out = dir.path().join("rosters");
        fs::create_dir_all(&out).unwrap();
        let mut existing = read_rows(&write_team(dir.path(), "Tmp", false)).unwrap()[0].clone();
        existing.name = "Local Star".into();
        existing.english_name = "Jay Star".into();
        existing.position = "SG".into();
        existing.rotation_type = "starter".into();
        existing.player_type = "perimeter".into();
        write_rows(&out.join("Celtics.csv"), &[existing]).unwrap();

        let report = import_master(&master, &out).unwrap();
        assert_eq!(report.written.get("Celtics"), Some(&2));
        assert_eq!(report.unmapped, vec!["Seattle Sonics".to_string()]);

        let rows = read_rows(&out.join("Celtics.csv")).unwrap();
        assert_eq!(rows[0].english_name, "Jay Star");
        assert_eq!(rows[0].name, "Local Star");
        assert_eq!(rows[0].position, "SG");
        assert_eq!(rows[0].rotation_type, "starter");
        assert_eq!(rows[0].player_type, "perimeter");
        // (70 + 71 + 73) / 3 = 71.33
        assert_eq!(rows[0].ast_rating, 71);
        // (80 + 81 + 82 + 83 + 84 + 86) / 6 = 82.67
        assert_eq!(rows[0].athleticism, 82);
        assert_eq!(rows[1].name, "Role Guy");
        assert!(rows[1].rotation_type.is_empty());
    }
}
