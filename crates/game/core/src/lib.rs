//! Spatial model, robots and command rules of the maze.
//!
//! `maze-core` defines the canonical board ([`grid::Grid`]), the robot roster,
//! the command grammar and the validator that turns a command string into
//! board mutations. It performs no I/O. All state mutation flows through
//! [`action::CommandValidator`]; the decision engine only reads the state.
pub mod action;
pub mod config;
pub mod error;
pub mod grid;
pub mod rng;
pub mod robot;
pub mod state;

pub use action::{
    Action, ActionKind, Analysis, Applied, Command, CommandAlphabet, CommandError,
    CommandValidator, Consequence, GlobalCommand, IllegalReason, StepReport, check_action,
};
pub use config::{GameConfig, SampleSize};
pub use error::{ErrorContext, ErrorSeverity, GameError, GridError};
pub use grid::{
    AttackProfile, Cell, CellContent, CellKind, ChangeLog, ChangeSet, Direction, Family, Footprint,
    Grid, GridDimensions, Impact, ImpactCascade, KindSet, Position, RobotId, SubGrid,
};
pub use rng::{PcgRng, compute_seed};
pub use robot::{
    ActionRecord, Behavior, BonusStrategy, DangerMatrix, Equipment, GamePhase, History,
    Personality, Robot, RobotBuilder, Roster, Target, TargetPath, may_attack,
};
pub use state::{GameState, TurnLedger};
