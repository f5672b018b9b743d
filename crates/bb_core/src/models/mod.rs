pub mod game_result;
pub mod outcome;
pub mod player;
pub mod team;

pub use game_result::{game_duration, BoxScore, GameKind, GameResult, GameSummary, PlayerBox, TeamBox};
pub use outcome::{
    BlockResult, FastBreak, FreeThrowSummary, PlayerRef, PossessionOutcome, PossessionRecord,
    Rebound, ShotInfo, ShotKind, ShotZone, TripKind, TurnoverKind,
};
pub use player::{
    CourtStatus, DunkClass, GameLine, Player, PlayerProfile, Position, Ratings, RotationTier,
    ShotArchetype,
};
pub use team::{Conference, DepthChart, TeamRoster, TeamSide, TeamState};
