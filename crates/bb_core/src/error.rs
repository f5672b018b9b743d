use thiserror::Error;

use crate::models::Position;

/// Roster/schedule problems detected before any possession is simulated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Team {team} has no starter at {position}")]
    MissingStarter { team: String, position: Position },

    #[error("Team {team} has more than one starter at {position}")]
    DuplicateStarter { team: String, position: Position },

    #[error("Team {team} has no {tier} player at {position}")]
    MissingDepth {
        team: String,
        position: Position,
        tier: &'static str,
    },

    #[error("Player {player} appears twice on {team}")]
    DuplicatePlayer { team: String, player: String },

    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Rating {field} for {player} out of range: {value}")]
    InvalidRating {
        player: String,
        field: &'static str,
        value: i64,
    },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid league: {0}")]
    InvalidLeague(String),

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Engine state that should be impossible with a valid roster and policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateViolation {
    #[error("{team} has no player on court")]
    EmptyLineup { team: String },

    #[error("{player} ({team}) assigned to two court slots")]
    DoubleAssignment { team: String, player: String },

    #[error("{player} ({team}) is on court but not eligible")]
    IneligibleOnCourt { team: String, player: String },

    #[error("Counter invariant broken for {player}: {detail}")]
    CounterInvariant { player: String, detail: String },

    #[error("No winner after {possessions} sudden-death possessions")]
    Stalemate { possessions: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State violation: {0}")]
    State(#[from] StateViolation),
}

impl SimError {
    /// Configuration errors abort a request before simulating anything.
    pub fn is_config(&self) -> bool {
        matches!(self, SimError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_descriptive() {
        let err: SimError = ConfigError::MissingStarter {
            team: "Hawks".into(),
            position: Position::C,
        }
        .into();
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: Team Hawks has no starter at C"
        );

        let err: SimError = StateViolation::EmptyLineup {
            team: "Nets".into(),
        }
        .into();
        assert!(!err.is_config());
        assert!(err.to_string().contains("Nets has no player on court"));
    }
}
