//! Possession outcome records
//!
//! One [`PossessionRecord`] is produced per resolved possession. It is the
//! only thing the commentary/formatting layer sees besides the counters, and
//! it is read-only for that layer.

use serde::{Deserialize, Serialize};

use super::team::TeamSide;

/// A player on either team: side + roster index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub side: TeamSide,
    pub idx: usize,
}

impl PlayerRef {
    pub const fn new(side: TeamSide, idx: usize) -> Self {
        Self { side, idx }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    Dunk,
    Layup,
    Jumper,
}

/// Distance band a shot falls in. Drives ratings, fouls and blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotZone {
    Rim,
    Paint,
    MidRange,
    Three,
}

impl ShotZone {
    pub const fn is_interior(self) -> bool {
        matches!(self, ShotZone::Rim | ShotZone::Paint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotInfo {
    pub distance: u8,
    pub zone: ShotZone,
    pub kind: ShotKind,
    /// Make percentage after all adjustments, in `[0, 100]`.
    pub make_pct: f64,
}

impl ShotInfo {
    pub fn is_three(&self) -> bool {
        self.zone == ShotZone::Three
    }

    pub fn points(&self) -> u8 {
        if self.is_three() {
            3
        } else {
            2
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebound {
    pub rebounder: PlayerRef,
    pub offensive: bool,
    /// The miss came from the last free throw of a trip, not a field goal.
    pub after_free_throw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripKind {
    AndOne,
    Shooting,
    Bonus,
    Flagrant,
}

/// What happened to a free-throw trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeThrowSummary {
    pub shooter: PlayerRef,
    pub kind: TripKind,
    pub attempts: u8,
    pub made: u8,
    /// Contested rebound after a missed final attempt.
    pub rebound: Option<Rebound>,
    /// Shooting team keeps the ball regardless of the last attempt (flagrant).
    pub retained: bool,
}

impl FreeThrowSummary {
    pub fn missed(&self) -> u8 {
        self.attempts - self.made
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    BadPass,
    Travel,
    OffensiveFoul,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockResult {
    OutOfBounds,
    Rebound(Rebound),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastBreak {
    pub finisher: PlayerRef,
    pub assist: Option<PlayerRef>,
}

/// Tagged result of one possession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PossessionOutcome {
    MadeShot {
        shooter: PlayerRef,
        defender: PlayerRef,
        assist: Option<PlayerRef>,
        shot: ShotInfo,
        /// Fouled on the make; the bonus shot lives here, not in a separate record.
        and_one: Option<FreeThrowSummary>,
    },
    MissedShot {
        shooter: PlayerRef,
        defender: PlayerRef,
        shot: ShotInfo,
        rebound: Rebound,
    },
    ShootingFoul {
        shooter: PlayerRef,
        fouler: PlayerRef,
        shot: ShotInfo,
        free_throws: FreeThrowSummary,
    },
    FlagrantFoul {
        shooter: PlayerRef,
        fouler: PlayerRef,
        free_throws: FreeThrowSummary,
    },
    /// Reach-in. Free throws only when the defense is in the bonus.
    NonShootingFoul {
        fouled: PlayerRef,
        fouler: PlayerRef,
        free_throws: Option<FreeThrowSummary>,
    },
    Turnover {
        player: PlayerRef,
        kind: TurnoverKind,
    },
    Steal {
        ball_handler: PlayerRef,
        stealer: PlayerRef,
        fast_break: Option<FastBreak>,
    },
    Block {
        shooter: PlayerRef,
        blocker: PlayerRef,
        shot: ShotInfo,
        result: BlockResult,
    },
    JumpBall {
        offense_player: PlayerRef,
        defense_player: PlayerRef,
        winner: TeamSide,
    },
}

impl PossessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PossessionOutcome::MadeShot { .. } => "made_shot",
            PossessionOutcome::MissedShot { .. } => "missed_shot",
            PossessionOutcome::ShootingFoul { .. } => "shooting_foul",
            PossessionOutcome::FlagrantFoul { .. } => "flagrant_foul",
            PossessionOutcome::NonShootingFoul { .. } => "non_shooting_foul",
            PossessionOutcome::Turnover { .. } => "turnover",
            PossessionOutcome::Steal { .. } => "steal",
            PossessionOutcome::Block { .. } => "block",
            PossessionOutcome::JumpBall { .. } => "jump_ball",
        }
    }

    /// Whether points were scored from the field (including fast breaks).
    /// Free-throw-only sequences return false so consumers don't announce
    /// a made basket twice.
    pub fn is_field_goal_make(&self) -> bool {
        matches!(
            self,
            PossessionOutcome::MadeShot { .. }
                | PossessionOutcome::Steal {
                    fast_break: Some(_),
                    ..
                }
        )
    }

    /// Player charged with a personal foul in this possession, if any.
    pub fn committed_foul(&self) -> Option<PlayerRef> {
        match self {
            PossessionOutcome::MadeShot {
                defender,
                and_one: Some(_),
                ..
            } => Some(*defender),
            PossessionOutcome::ShootingFoul { fouler, .. }
            | PossessionOutcome::FlagrantFoul { fouler, .. }
            | PossessionOutcome::NonShootingFoul { fouler, .. } => Some(*fouler),
            PossessionOutcome::Turnover {
                player,
                kind: TurnoverKind::OffensiveFoul,
            } => Some(*player),
            _ => None,
        }
    }

    /// Every player named by the outcome, rebounders and free-throw
    /// shooters included.
    pub fn participants(&self) -> Vec<PlayerRef> {
        fn trip(out: &mut Vec<PlayerRef>, ft: &FreeThrowSummary) {
            out.push(ft.shooter);
            if let Some(r) = ft.rebound {
                out.push(r.rebounder);
            }
        }

        let mut out = Vec::new();
        match self {
            PossessionOutcome::MadeShot {
                shooter,
                defender,
                assist,
                and_one,
                ..
            } => {
                out.extend([*shooter, *defender]);
                out.extend(*assist);
                if let Some(ft) = and_one {
                    trip(&mut out, ft);
                }
            }
            PossessionOutcome::MissedShot {
                shooter,
                defender,
                rebound,
                ..
            } => out.extend([*shooter, *defender, rebound.rebounder]),
            PossessionOutcome::ShootingFoul {
                shooter,
                fouler,
                free_throws,
                ..
            }
            | PossessionOutcome::FlagrantFoul {
                shooter,
                fouler,
                free_throws,
            } => {
                out.extend([*shooter, *fouler]);
                trip(&mut out, free_throws);
            }
            PossessionOutcome::NonShootingFoul {
                fouled,
                fouler,
                free_throws,
            } => {
                out.extend([*fouled, *fouler]);
                if let Some(ft) = free_throws {
                    trip(&mut out, ft);
                }
            }
            PossessionOutcome::Turnover { player, .. } => out.push(*player),
            PossessionOutcome::Steal {
                ball_handler,
                stealer,
                fast_break,
            } => {
                out.extend([*ball_handler, *stealer]);
                if let Some(fb) = fast_break {
                    out.push(fb.finisher);
                    out.extend(fb.assist);
                }
            }
            PossessionOutcome::Block {
                shooter,
                blocker,
                result,
                ..
            } => {
                out.extend([*shooter, *blocker]);
                if let BlockResult::Rebound(r) = result {
                    out.push(r.rebounder);
                }
            }
            PossessionOutcome::JumpBall {
                offense_player,
                defense_player,
                ..
            } => out.extend([*offense_player, *defense_player]),
        }
        out
    }
}

/// One possession as handed to the commentary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionRecord {
    pub period: u8,
    /// Seconds left in the period after this possession.
    pub clock: u32,
    pub offense: TeamSide,
    pub seconds: u32,
    pub outcome: PossessionOutcome,
    /// Who has the ball next.
    pub next_offense: TeamSide,
    pub score: [u16; 2],
}
