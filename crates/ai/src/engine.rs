//! Decision engine entry point.

use std::collections::BTreeMap;

use maze_core::{
    Behavior, CommandValidator, GameState, KindSet, Position, RobotId, StepReport, TargetPath,
};
use rand::Rng;
use tracing::{debug, warn};

use crate::context::AiContext;
use crate::error::EngineError;
use crate::gamble::{GambleData, Stage};
use crate::grenade::{GrenadeChoice, GrenadeFlags};
use crate::memory::RobotMemory;
use crate::path::PathResult;
use crate::types::PseudoActions;

/// Decides the commands of every automated robot.
///
/// The engine owns one [`RobotMemory`] per robot and the scratchpad of the
/// last step each robot played. It never mutates the board: the caller
/// hands the returned command to a [`CommandValidator`] and reports the
/// outcome through [`Self::finish_step`].
///
/// # Pipeline
///
/// 1. Refresh global sets and recognize the area
/// 2. Maintain targets, score direction samples, select a temp target
/// 3. Classify adjacents
/// 4. Schedule and extract a planned command (winners and hunters)
/// 5. Direct command search
/// 6. Last resort
#[derive(Debug)]
pub struct DecisionEngine<R: Rng> {
    rng: R,
    memories: BTreeMap<RobotId, RobotMemory>,
    contexts: BTreeMap<RobotId, GambleData>,
}

impl<R: Rng> DecisionEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            memories: BTreeMap::new(),
            contexts: BTreeMap::new(),
        }
    }

    /// Command of `uid` for atomic step `step_index` (from 1) of `step_count`.
    ///
    /// Human robots get `Ok(None)`. `Ok(None)` is also returned when even the
    /// last resort found nothing; the caller then skips the step.
    pub fn compute_command(
        &mut self,
        state: &mut GameState,
        uid: RobotId,
        step_index: u32,
        step_count: u32,
        turn_id: u64,
    ) -> Result<Option<String>, EngineError> {
        let robot = state.robot(uid).ok_or(EngineError::RobotNotFound(uid))?;
        if robot.behavior == Behavior::Human {
            return Ok(None);
        }
        if !robot.alive {
            return Err(EngineError::RobotDead(uid));
        }

        CommandValidator::new(state)
            .init_robot_before_step(uid, step_index, step_count)
            .map_err(|_| EngineError::RobotNotFound(uid))?;

        let memory = self.memories.entry(uid).or_default();
        if step_index <= 1 || memory.turn_id != Some(turn_id) {
            memory.begin_turn(turn_id);
        }
        let changes = state.grid.changes();
        if memory.memo.sync(changes.turn_key(KindSet::all()), changes.revision()) {
            debug!(robot = %uid, "board moved, memoized searches dropped");
        }

        let robot = state
            .robot(uid)
            .cloned()
            .ok_or(EngineError::RobotNotFound(uid))?;
        let snapshot: &GameState = state;
        let mut ctx = AiContext::new(
            snapshot,
            robot,
            turn_id,
            step_index,
            step_count,
            memory,
            &mut self.rng,
        );
        let command = ctx.decide();
        let (robot, gd) = ctx.finish();

        if let Some(stored) = state.robot_mut(uid) {
            stored.main_target = robot.main_target;
            stored.temp_target = robot.temp_target;
            stored.game_phase = robot.game_phase;
            stored.bonus_strategy = robot.bonus_strategy;
            stored.need_bonus = robot.need_bonus;
        }
        self.contexts.insert(uid, gd);
        Ok(command)
    }

    /// Records the outcome of the step the validator just played.
    ///
    /// The last step of a turn closes the robot's memory and drops its
    /// scratchpad.
    pub fn finish_step(&mut self, uid: RobotId, report: &StepReport) {
        if let Some(gd) = self.contexts.get_mut(&uid) {
            gd.stage = Stage::Post;
        }
        if report.turn_complete {
            if let Some(memory) = self.memories.get_mut(&uid) {
                memory.end_turn();
            }
            self.contexts.remove(&uid);
            debug!(robot = %uid, turn_id = report.turn_id, "turn closed");
        }
    }

    /// Scratchpad of the last step `uid` played in the current turn.
    pub fn context(&self, uid: RobotId) -> Option<&GambleData> {
        self.contexts.get(&uid)
    }

    pub fn memory(&self, uid: RobotId) -> Option<&RobotMemory> {
        self.memories.get(&uid)
    }

    /// Sequence `uid` still has to play this turn.
    pub fn pending_sequence(&self, uid: RobotId) -> Option<&PseudoActions> {
        self.memories.get(&uid).and_then(|memory| memory.pending.as_ref())
    }

    /// Path from `uid` to `target`, outside of any step.
    pub fn search_path(
        &mut self,
        state: &GameState,
        uid: RobotId,
        target: Position,
        eco: bool,
    ) -> Result<Option<TargetPath>, EngineError> {
        self.with_context(state, uid, |ctx| {
            let from = ctx.robot.position;
            let PathResult { path, .. } = ctx.search_path(from, target, eco);
            path
        })
    }

    /// Grenade combinations of `uid` against `target`, outside of any step.
    pub fn grenade_params(
        &mut self,
        state: &GameState,
        uid: RobotId,
        target: Position,
        flags: GrenadeFlags,
    ) -> Result<Option<GrenadeChoice>, EngineError> {
        self.with_context(state, uid, |ctx| ctx.grenade_params(target, flags))
    }

    fn with_context<T>(
        &mut self,
        state: &GameState,
        uid: RobotId,
        query: impl FnOnce(&mut AiContext<'_, R>) -> T,
    ) -> Result<T, EngineError> {
        let robot = state
            .robot(uid)
            .cloned()
            .ok_or(EngineError::RobotNotFound(uid))?;
        let memory = self.memories.entry(uid).or_default();
        let changes = state.grid.changes();
        memory
            .memo
            .sync(changes.turn_key(KindSet::all()), changes.revision());
        let turn_id = memory.turn_id.unwrap_or_default();
        let step_count = robot.speed;
        let mut ctx = AiContext::new(state, robot, turn_id, 1, step_count, memory, &mut self.rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        Ok(query(&mut ctx))
    }
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Runs the stages of one atomic step in contract order.
    pub(crate) fn decide(&mut self) -> Option<String> {
        self.gd.stage = Stage::RecognizeArea;
        self.refresh_global_sets();
        self.recognize_area();

        self.gd.stage = Stage::MaintainTargets;
        self.maintain_targets();

        self.gd.stage = Stage::ScoreSamples;
        self.score_samples();

        self.gd.stage = Stage::SelectTempTarget;
        self.select_temp_target();

        self.gd.stage = Stage::ClassifyAdjacents;
        self.classify_adjacents();

        self.gd.stage = Stage::Schedule;
        let planned = if self.schedule() {
            self.extract_command()
        } else {
            None
        };

        self.gd.stage = Stage::EmitCommand;
        let command = planned
            .or_else(|| self.direct_search())
            .or_else(|| self.last_resort());
        match &command {
            Some(command) => debug!(
                robot = %self.robot.uid,
                turn_id = self.turn_id,
                step = self.step_index,
                %command,
                phase = %self.robot.game_phase,
                "command decided"
            ),
            None => warn!(
                robot = %self.robot.uid,
                turn_id = self.turn_id,
                step = self.step_index,
                "no command found, step skipped"
            ),
        }
        self.gd.command = command.clone();
        self.gd.stage = Stage::Apply;
        command
    }
}
