//! Decision engine for automated maze robots.
//!
//! `maze-ai` reads a [`maze_core::GameState`] and emits one command string
//! per atomic step for every non-human robot. It never mutates the board:
//! commands go through [`maze_core::CommandValidator`] like a human's.
//!
//! # Modules
//!
//! - [`engine`]: the [`DecisionEngine`] entry point and the stage pipeline
//! - [`context`]: the per-step blackboard shared by all stages
//! - [`gamble`]: the per-step scratchpad ([`GambleData`])
//! - [`memory`]: what a robot remembers across steps of a turn
//! - [`path`]: exhaustive and sampled path search
//! - [`grenade`]: grenade combination synthesis with chain reactions
//! - [`scheduler`]: multi-step planning for winners and hunters
//!
//! Recognition, target maintenance, direction sampling, adjacent
//! classification, extraction, the direct search and the last resort are
//! private stages implemented on [`AiContext`].
//!
//! # Features
//!
//! - `loaders` (default): TOML loading of [`maze_core::GameConfig`]

pub mod context;
pub mod engine;
pub mod error;
pub mod gamble;
pub mod grenade;
pub mod memory;
pub mod path;
pub mod sampling;
pub mod scheduler;
pub mod types;

mod adjacent;
mod direct;
mod extract;
mod fallback;
mod recognition;
mod selection;
mod targets;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use context::AiContext;
pub use engine::DecisionEngine;
pub use error::{EngineError, SearchStage};
pub use gamble::{Adjacents, GambleData, Recognition, Stage};
pub use grenade::{GrenadeChoice, GrenadeCombo, GrenadeFlags, ListChoice};
pub use memory::{RobotMemory, WorkArea};
pub use path::{PathResult, cell_cost, path_cost};
pub use scheduler::Possibilities;
pub use types::{DirectObjective, Objective, PseudoAction, PseudoActions, Relevance, SequenceName};

#[cfg(feature = "loaders")]
pub use loaders::ConfigLoader;
