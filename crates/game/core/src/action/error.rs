//! Command errors.
//!
//! Parsing failures and legality failures are kept apart: a malformed
//! string is rejected outright, while an illegal command is also recorded in
//! the turn ledger so the decision engine does not propose it again.

use crate::error::{ErrorContext, ErrorSeverity, GameError, GridError};
use crate::grid::{CellKind, Impact, Position, RobotId};

/// Why a well-formed command cannot be played right now.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IllegalReason {
    #[error("{position} is outside the grid")]
    OutOfGrid { position: Position },

    #[error("cannot move onto {kind} at {position}")]
    Blocked { kind: CellKind, position: Position },

    #[error("a hunter cannot reach the exit while other robots are alive")]
    HunterOnExit,

    #[error("move of {distance} cells exceeds the {remaining} actions left")]
    TooFar { distance: u32, remaining: u32 },

    #[error("robot carries no grenade")]
    NoGrenade,

    #[error("grenade range {range} exceeds {max}")]
    OutOfRange { range: u32, max: u32 },

    #[error("power {power} exceeds {max}")]
    PowerTooHigh { power: Impact, max: Impact },

    #[error("grenade cannot land on {kind}")]
    LandingNotLegal { kind: CellKind },

    #[error("perimeter wall on the grenade line at {position}")]
    ShotBlocked { position: Position },

    #[error("no wall at {position}")]
    NotAWall { position: Position },

    #[error("cannot build on {kind}")]
    NotBuildable { kind: CellKind },

    #[error("cannot plant a mine on {kind}")]
    NotPlantable { kind: CellKind },

    #[error("robot carries no mine")]
    NoMine,

    #[error("no robot to kill at {position}")]
    NotARobot { position: Position },

    #[error("command already rejected this turn")]
    AlreadyInvalid,

    #[error("global commands are not robot actions")]
    NotAnAction,
}

/// Errors raised while parsing, checking or applying a command.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandError {
    /// Malformed command string.
    #[error("cannot parse {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },

    /// Syntactically valid, contextually impossible.
    #[error("illegal command {command:?}: {reason}")]
    Illegal {
        command: String,
        reason: IllegalReason,
        #[cfg_attr(feature = "serde", serde(skip))]
        context: ErrorContext,
    },

    #[error("robot {0} not found")]
    RobotNotFound(RobotId),

    #[error("robot {0} is dead")]
    RobotDead(RobotId),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl CommandError {
    pub fn parse(input: &str, reason: &'static str) -> Self {
        Self::Parse {
            input: input.to_owned(),
            reason,
        }
    }

    pub fn illegal(command: &str, reason: IllegalReason, context: ErrorContext) -> Self {
        Self::Illegal {
            command: command.to_owned(),
            reason,
            context,
        }
    }

    /// Reason of an illegal command.
    pub fn illegal_reason(&self) -> Option<&IllegalReason> {
        match self {
            Self::Illegal { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl GameError for CommandError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Parse { .. } => ErrorSeverity::Validation,
            Self::Illegal { .. } => ErrorSeverity::Recoverable,
            Self::RobotNotFound(_) => ErrorSeverity::Validation,
            Self::RobotDead(_) => ErrorSeverity::Recoverable,
            Self::Grid(err) => err.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Illegal { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "COMMAND_PARSE",
            Self::Illegal { .. } => "COMMAND_ILLEGAL",
            Self::RobotNotFound(_) => "COMMAND_ROBOT_NOT_FOUND",
            Self::RobotDead(_) => "COMMAND_ROBOT_DEAD",
            Self::Grid(err) => err.error_code(),
        }
    }
}
