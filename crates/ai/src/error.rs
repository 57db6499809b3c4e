//! Decision engine errors.
//!
//! Search failures never reach the caller of
//! [`crate::DecisionEngine::compute_command`]: every stage falls through to the
//! next strategy and, ultimately, to the last-resort emitter. They exist so
//! internal queries can report *why* they produced nothing.

use maze_core::{ErrorSeverity, GameError, RobotId};

/// Internal stage that came back empty-handed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SearchStage {
    Path,
    Grenade,
    Schedule,
    Extraction,
    DirectSearch,
    LastResort,
}

/// Errors raised by the decision engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("robot {0} not found")]
    RobotNotFound(RobotId),

    #[error("robot {0} is dead")]
    RobotDead(RobotId),

    #[error("{stage} search found nothing")]
    SearchFailure { stage: SearchStage },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RobotNotFound(_) | Self::RobotDead(_) => ErrorSeverity::Validation,
            Self::SearchFailure { .. } => ErrorSeverity::Recoverable,
            Self::Config(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RobotNotFound(_) => "ENGINE_ROBOT_NOT_FOUND",
            Self::RobotDead(_) => "ENGINE_ROBOT_DEAD",
            Self::SearchFailure { .. } => "ENGINE_SEARCH_FAILURE",
            Self::Config(_) => "ENGINE_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_failure_is_recoverable() {
        let err = EngineError::SearchFailure {
            stage: SearchStage::Grenade,
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "grenade search found nothing");
        assert_eq!(
            EngineError::RobotDead(RobotId(2)).error_code(),
            "ENGINE_ROBOT_DEAD"
        );
    }
}
