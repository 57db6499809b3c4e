//! Common error infrastructure for maze-core.
//!
//! This module provides the shared severity classification and the
//! [`GameError`] trait implemented by every error type of the crate.
//! Domain-specific errors live next to the code that raises them; the grid
//! error is defined here because every layer touches the grid.

use crate::grid::{CellKind, Position, RobotId};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the caller may try another command
/// - **Validation**: malformed input, retrying the same input is pointless
/// - **Internal**: an invariant was broken, which indicates a bug
/// - **Fatal**: the state cannot be trusted any more
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Robot that triggered the error (if applicable).
    pub robot: Option<RobotId>,

    /// Position where the error occurred (if applicable).
    pub position: Option<Position>,

    /// Turn during which the error occurred.
    pub turn_id: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(turn_id: u64) -> Self {
        Self {
            robot: None,
            position: None,
            turn_id,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_robot(mut self, robot: RobotId) -> Self {
        self.robot = Some(robot);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all maze errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
/// - Keep error codes stable, they end up in logs
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns the error context if available.
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Errors raised by grid mutations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GridError {
    #[error("cell {kind} at {position} cannot be deleted")]
    Undeletable { kind: CellKind, position: Position },

    #[error("position {position} is outside the grid")]
    OutOfBounds { position: Position },

    #[error("no {kind} cell at {position}")]
    MissingCell { kind: CellKind, position: Position },

    #[error("robot {0} is not on the grid")]
    RobotNotOnGrid(RobotId),
}

impl GameError for GridError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Undeletable { .. } | Self::OutOfBounds { .. } => ErrorSeverity::Validation,
            Self::MissingCell { .. } | Self::RobotNotOnGrid(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Undeletable { .. } => "GRID_UNDELETABLE",
            Self::OutOfBounds { .. } => "GRID_OUT_OF_BOUNDS",
            Self::MissingCell { .. } => "GRID_MISSING_CELL",
            Self::RobotNotOnGrid(_) => "GRID_ROBOT_NOT_ON_GRID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_error_classification() {
        let err = GridError::Undeletable {
            kind: CellKind::Exit,
            position: Position::new(1, 1),
        };
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "GRID_UNDELETABLE");
        assert!(!err.severity().is_internal());
        assert!(
            GridError::RobotNotOnGrid(RobotId(3))
                .severity()
                .is_internal()
        );
    }
}
