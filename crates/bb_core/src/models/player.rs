use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// Position
// ============================================================================

/// The five court roles. Closed set; court slots are indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::PG,
        Position::SG,
        Position::SF,
        Position::PF,
        Position::C,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Position::PG => 0,
            Position::SG => 1,
            Position::SF => 2,
            Position::PF => 3,
            Position::C => 4,
        }
    }

    pub const fn from_index(idx: usize) -> Option<Position> {
        match idx {
            0 => Some(Position::PG),
            1 => Some(Position::SG),
            2 => Some(Position::SF),
            3 => Some(Position::PF),
            4 => Some(Position::C),
            _ => None,
        }
    }

    /// Other positions, closest role first. Used when a slot has to be
    /// covered by someone out of position.
    pub const fn neighbors(self) -> [Position; 4] {
        use Position::*;
        match self {
            PG => [SG, SF, PF, C],
            SG => [PG, SF, PF, C],
            SF => [SG, PF, PG, C],
            PF => [C, SF, SG, PG],
            C => [PF, SF, SG, PG],
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PG" => Ok(Position::PG),
            "SG" => Ok(Position::SG),
            "SF" => Ok(Position::SF),
            "PF" => Ok(Position::PF),
            "C" => Ok(Position::C),
            other => Err(ConfigError::InvalidPosition(other.to_string())),
        }
    }
}

// ============================================================================
// Derived classifications
// ============================================================================

/// Shot-selection profile; drives the distance distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShotArchetype {
    #[default]
    Balanced,
    Interior,
    MidRange,
    InsideOutside,
    Perimeter,
}

impl ShotArchetype {
    /// Parse the roster `playerType` column. Empty/unknown → `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "balanced" | "allround" | "allaround" => Some(ShotArchetype::Balanced),
            "interior" | "inside" | "post" | "big" => Some(ShotArchetype::Interior),
            "mid" | "midrange" => Some(ShotArchetype::MidRange),
            "insideoutside" | "stretch" => Some(ShotArchetype::InsideOutside),
            "perimeter" | "outside" | "shooter" | "three" => Some(ShotArchetype::Perimeter),
            _ => None,
        }
    }

    /// Fallback when the roster leaves the type blank.
    pub fn derive(ratings: &Ratings) -> Self {
        if ratings.three < 55 {
            ShotArchetype::Interior
        } else if ratings.three >= 80 && ratings.inside < 75 {
            ShotArchetype::Perimeter
        } else if ratings.inside >= 75 && ratings.three >= 75 {
            ShotArchetype::InsideOutside
        } else if ratings.mid >= 80 && ratings.mid > ratings.three {
            ShotArchetype::MidRange
        } else {
            ShotArchetype::Balanced
        }
    }
}

/// How often a player finishes at the rim with a dunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DunkClass {
    #[default]
    Rare,
    Occasional,
    Frequent,
}

impl DunkClass {
    pub fn from_ratings(ratings: &Ratings) -> Self {
        let best = ratings.standing_dunk.max(ratings.driving_dunk);
        if best >= 80 {
            DunkClass::Frequent
        } else if best >= 55 {
            DunkClass::Occasional
        } else {
            DunkClass::Rare
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationTier {
    #[default]
    Starter,
    Bench,
    DeepBench,
}

impl RotationTier {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starter" | "start" | "s" => Some(RotationTier::Starter),
            "bench" | "b" | "rotation" => Some(RotationTier::Bench),
            "deep" | "deep_bench" | "deepbench" | "deep-bench" | "reserve" | "d" => {
                Some(RotationTier::DeepBench)
            }
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RotationTier::Starter => "starter",
            RotationTier::Bench => "bench",
            RotationTier::DeepBench => "deep-bench",
        }
    }
}

// ============================================================================
// Ratings
// ============================================================================

/// Static 0–100 ratings. `free_throw` is a make percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratings {
    pub overall: u8,
    pub inside: u8,
    pub mid: u8,
    pub three: u8,
    pub free_throw: u8,
    pub interior_defense: u8,
    pub perimeter_defense: u8,
    pub off_rebound: u8,
    pub def_rebound: u8,
    pub assist: u8,
    pub steal: u8,
    pub block: u8,
    pub layup: u8,
    pub standing_dunk: u8,
    pub driving_dunk: u8,
    pub athleticism: u8,
    pub durability: u8,
    pub off_consistency: u8,
    pub def_consistency: u8,
    pub draw_foul: u8,
}

impl Default for Ratings {
    fn default() -> Self {
        Self::uniform(70)
    }
}

impl Ratings {
    /// Every rating equal to `value`; free throws at a league-average 75%.
    pub fn uniform(value: u8) -> Self {
        Self {
            overall: value,
            inside: value,
            mid: value,
            three: value,
            free_throw: 75,
            interior_defense: value,
            perimeter_defense: value,
            off_rebound: value,
            def_rebound: value,
            assist: value,
            steal: value,
            block: value,
            layup: value,
            standing_dunk: value,
            driving_dunk: value,
            athleticism: value,
            durability: value,
            off_consistency: value,
            def_consistency: value,
            draw_foul: value,
        }
    }

    pub fn fields(&self) -> [(&'static str, u8); 20] {
        [
            ("rating", self.overall),
            ("insideRating", self.inside),
            ("midRating", self.mid),
            ("threeRating", self.three),
            ("freeThrowPercent", self.free_throw),
            ("interiorDefense", self.interior_defense),
            ("perimeterDefense", self.perimeter_defense),
            ("orbRating", self.off_rebound),
            ("drbRating", self.def_rebound),
            ("astRating", self.assist),
            ("stlRating", self.steal),
            ("blkRating", self.block),
            ("layupRating", self.layup),
            ("standDunk", self.standing_dunk),
            ("drivingDunk", self.driving_dunk),
            ("athleticism", self.athleticism),
            ("durability", self.durability),
            ("offConst", self.off_consistency),
            ("defConst", self.def_consistency),
            ("drawFoul", self.draw_foul),
        ]
    }

    pub fn validate(&self, player: &str) -> Result<(), ConfigError> {
        for (field, value) in self.fields() {
            if value > 100 {
                return Err(ConfigError::InvalidRating {
                    player: player.to_string(),
                    field,
                    value: value as i64,
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Profile (static per game)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub display_name: String,
    pub position: Position,
    pub team: String,
    pub ratings: Ratings,
    pub archetype: ShotArchetype,
    pub dunk_class: DunkClass,
    pub tier: RotationTier,
    pub is_star: bool,
}

impl PlayerProfile {
    /// Profile with derived classifications; the star flag is set by
    /// [`PlayerProfile::classify`] once the league threshold is known.
    pub fn new(
        name: impl Into<String>,
        team: impl Into<String>,
        position: Position,
        tier: RotationTier,
        ratings: Ratings,
    ) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            position,
            team: team.into(),
            archetype: ShotArchetype::derive(&ratings),
            dunk_class: DunkClass::from_ratings(&ratings),
            tier,
            is_star: false,
            ratings,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_archetype(mut self, archetype: ShotArchetype) -> Self {
        self.archetype = archetype;
        self
    }

    pub fn classify(&mut self, star_rating: u8) {
        self.dunk_class = DunkClass::from_ratings(&self.ratings);
        self.is_star = self.ratings.overall >= star_rating;
    }
}

// ============================================================================
// Per-game counters
// ============================================================================

/// Box-score counters. Only mutated through the `record_*` methods so that
/// made ≤ attempted always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLine {
    pub points: u16,
    pub off_rebounds: u16,
    pub def_rebounds: u16,
    pub assists: u16,
    pub steals: u16,
    pub blocks: u16,
    pub turnovers: u16,
    pub fouls: u16,
    pub flagrant_fouls: u16,
    pub fgm: u16,
    pub fga: u16,
    pub tpm: u16,
    pub tpa: u16,
    pub ftm: u16,
    pub fta: u16,
    pub seconds_played: u32,
}

impl GameLine {
    pub fn rebounds(&self) -> u16 {
        self.off_rebounds + self.def_rebounds
    }

    pub fn record_field_goal(&mut self, three: bool, made: bool) {
        self.fga += 1;
        if three {
            self.tpa += 1;
        }
        if made {
            self.fgm += 1;
            if three {
                self.tpm += 1;
                self.points += 3;
            } else {
                self.points += 2;
            }
        }
    }

    pub fn record_free_throw(&mut self, made: bool) {
        self.fta += 1;
        if made {
            self.ftm += 1;
            self.points += 1;
        }
    }

    pub fn record_rebound(&mut self, offensive: bool) {
        if offensive {
            self.off_rebounds += 1;
        } else {
            self.def_rebounds += 1;
        }
    }

    /// Field-goal percentage in `[0, 1]`; `None` before the first attempt.
    pub fn fg_pct(&self) -> Option<f64> {
        (self.fga > 0).then(|| self.fgm as f64 / self.fga as f64)
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        if self.fgm > self.fga {
            return Err(format!("fgm {} > fga {}", self.fgm, self.fga));
        }
        if self.tpm > self.tpa {
            return Err(format!("3pm {} > 3pa {}", self.tpm, self.tpa));
        }
        if self.ftm > self.fta {
            return Err(format!("ftm {} > fta {}", self.ftm, self.fta));
        }
        if self.tpa > self.fga || self.tpm > self.fgm {
            return Err("three-point counters exceed field-goal counters".to_string());
        }
        let expected = 2 * (self.fgm - self.tpm) + 3 * self.tpm + self.ftm;
        if expected != self.points {
            return Err(format!("points {} != shot total {}", self.points, expected));
        }
        Ok(())
    }

    pub fn accumulate(&mut self, other: &GameLine) {
        self.points += other.points;
        self.off_rebounds += other.off_rebounds;
        self.def_rebounds += other.def_rebounds;
        self.assists += other.assists;
        self.steals += other.steals;
        self.blocks += other.blocks;
        self.turnovers += other.turnovers;
        self.fouls += other.fouls;
        self.flagrant_fouls += other.flagrant_fouls;
        self.fgm += other.fgm;
        self.fga += other.fga;
        self.tpm += other.tpm;
        self.tpa += other.tpa;
        self.ftm += other.ftm;
        self.fta += other.fta;
        self.seconds_played += other.seconds_played;
    }
}

/// Court bookkeeping used by the rotation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtStatus {
    pub on_court: bool,
    /// False after foul-out, ejection or injury. Never flips back within a game.
    pub eligible: bool,
    pub played: bool,
    pub injured: bool,
    pub fouled_out: bool,
    pub ejected: bool,
    /// Seconds since the player last checked in.
    pub stint_seconds: u32,
    /// Seconds since the player last checked out.
    pub bench_seconds: u32,
}

impl Default for CourtStatus {
    fn default() -> Self {
        Self {
            on_court: false,
            eligible: true,
            played: false,
            injured: false,
            fouled_out: false,
            ejected: false,
            stint_seconds: 0,
            bench_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub profile: PlayerProfile,
    pub line: GameLine,
    pub status: CourtStatus,
}

impl Player {
    pub fn new(profile: PlayerProfile) -> Self {
        Self {
            profile,
            line: GameLine::default(),
            status: CourtStatus::default(),
        }
    }

    #[inline]
    pub fn ratings(&self) -> &Ratings {
        &self.profile.ratings
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn is_available(&self) -> bool {
        self.status.eligible && !self.status.on_court
    }
}
