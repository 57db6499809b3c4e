//! Blackboard of one atomic step.
//!
//! The [`AiContext`] gathers everything a decision stage reads or writes:
//!
//! - Read access to the game state, frozen for the duration of the step
//! - A working copy of the robot whose targets and phase the stages update
//! - The [`GambleData`] scratchpad rebuilt on every step
//! - The robot's [`RobotMemory`], carried from one step to the next
//! - The injected random source
//!
//! Each stage lives in its own module as an `impl` block on the context.

use maze_core::{
    Action, GameConfig, GameState, Grid, Personality, Position, Robot, RobotId, TargetPath,
    check_action,
};
use rand::Rng;
use tracing::trace;

use crate::gamble::GambleData;
use crate::memory::RobotMemory;

/// Context for the decisions of one robot on one atomic step.
///
/// # Lifetime
///
/// The `'a` lifetime ties the context to the [`GameState`] it reads. The
/// state is never mutated while a context is alive: the engine writes the
/// working robot back once the step is decided.
pub struct AiContext<'a, R: Rng + ?Sized> {
    pub state: &'a GameState,
    pub config: &'a GameConfig,
    /// Working copy of the deciding robot.
    pub robot: Robot,
    pub turn_id: u64,
    pub step_index: u32,
    pub step_count: u32,
    pub gd: GambleData,
    pub memory: &'a mut RobotMemory,
    pub rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> AiContext<'a, R> {
    pub fn new(
        state: &'a GameState,
        robot: Robot,
        turn_id: u64,
        step_index: u32,
        step_count: u32,
        memory: &'a mut RobotMemory,
        rng: &'a mut R,
    ) -> Self {
        Self {
            state,
            config: &state.config,
            robot,
            turn_id,
            step_index,
            step_count,
            gd: GambleData::new(turn_id, step_index),
            memory,
            rng,
        }
    }

    /// Releases the working robot and the scratchpad.
    pub fn finish(self) -> (Robot, GambleData) {
        (self.robot, self.gd)
    }

    pub fn grid(&self) -> &'a Grid {
        &self.state.grid
    }

    pub fn uid(&self) -> RobotId {
        self.robot.uid
    }

    pub fn position(&self) -> Position {
        self.robot.position
    }

    pub fn traits(&self) -> &Personality {
        &self.robot.personality
    }

    /// Atomic steps left in the turn, the current one included.
    pub fn max_actions(&self) -> u32 {
        (self.step_count + 1).saturating_sub(self.step_index.max(1)).max(1)
    }

    pub fn is_mid(&self, value: f64) -> bool {
        self.config.is_mid(value)
    }

    pub fn is_high(&self, value: f64) -> bool {
        self.config.is_high(value)
    }

    pub fn is_aggressive(&self) -> bool {
        self.is_mid(self.robot.personality.aggressivity)
    }

    /// Another robot of the roster, alive or not.
    pub fn other(&self, uid: RobotId) -> Option<&'a Robot> {
        self.state.robot(uid)
    }

    pub fn main_target_position(&self) -> Option<Position> {
        self.robot.main_target.as_ref().map(|target| target.position)
    }

    /// Path the robot currently follows: the temp target's, else the main target's.
    ///
    /// The path is cut so that it starts on the robot.
    pub fn current_path(&self) -> Option<TargetPath> {
        let position = self.robot.position;
        [&self.robot.temp_target, &self.robot.main_target]
            .into_iter()
            .flatten()
            .filter_map(|target| target.path.as_ref())
            .find_map(|path| path.from(position))
    }

    /// Formats `action` when it is legal and was not rejected earlier this turn.
    pub fn pre_check(&self, action: &Action) -> Option<String> {
        let command = self.state.alphabet.format_action(action);
        if self
            .state
            .ledger
            .is_invalid(self.turn_id, self.robot.uid, &command)
        {
            trace!(robot = %self.robot.uid, %command, "command already rejected this turn");
            return None;
        }
        match check_action(self.state, &self.robot, action) {
            Ok(_) => Some(command),
            Err(reason) => {
                trace!(robot = %self.robot.uid, %command, %reason, "pre-check refused command");
                None
            }
        }
    }

    /// Re-checks a stored command string.
    pub fn pre_check_command(&self, command: &str) -> Option<String> {
        let parsed = self.state.alphabet.parse(command).ok()?;
        let action = *parsed.action()?;
        self.pre_check(&action)
    }
}
