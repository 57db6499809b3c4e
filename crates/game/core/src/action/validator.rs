//! Command legality and per-step bookkeeping.
//!
//! The [`CommandValidator`] is the only writer of [`GameState`] during a
//! turn. It parses and checks a command, applies its consequences to the
//! board, then records the robot's step transition.

use tracing::{debug, trace};

use super::command::{Action, ActionKind, Command};
use super::consequence::Consequence;
use super::error::{CommandError, IllegalReason};
use crate::error::ErrorContext;
use crate::grid::{Cell, CellContent, CellKind, Family, Grid, RobotId};
use crate::robot::{ActionRecord, Behavior, Robot};
use crate::state::GameState;

/// Outcome of [`CommandValidator::analyze`].
///
/// A rejected command yields `changed == false`, no consequences and no
/// target cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Analysis {
    pub changed: bool,
    pub parsed: Option<Command>,
    pub consequences: Vec<Consequence>,
    pub target: Option<Cell>,
}

impl Analysis {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn action(&self) -> Option<&Action> {
        self.parsed.as_ref().and_then(Command::action)
    }
}

/// Consequences of a legal action and the cell it aims at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checked {
    pub consequences: Vec<Consequence>,
    pub target: Cell,
}

/// Summary of one recorded step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    pub robot: RobotId,
    pub turn_id: u64,
    pub step_index: u32,
    /// True on the last step of the robot's turn.
    pub turn_complete: bool,
    pub kills: Vec<RobotId>,
}

/// Checks `action` for `robot` against the current board without mutating it.
pub fn check_action(
    state: &GameState,
    robot: &Robot,
    action: &Action,
) -> Result<Checked, IllegalReason> {
    let grid = &state.grid;
    let origin = robot.position;
    match action.kind {
        ActionKind::Move => check_move(state, robot, action),
        ActionKind::CreateDoor => {
            let top = adjacent_cell(grid, robot, action)?;
            if grid.layer_cell(CellKind::Wall, top.position).is_none() {
                return Err(IllegalReason::NotAWall {
                    position: top.position,
                });
            }
            if !matches!(top.kind(), CellKind::Wall | CellKind::Danger) {
                return Err(IllegalReason::NotBuildable { kind: top.kind() });
            }
            Ok(build(top, Cell::door(top.position)))
        }
        ActionKind::CreateWall => {
            let top = adjacent_cell(grid, robot, action)?;
            let base_ok = [CellKind::Empty, CellKind::Door]
                .into_iter()
                .any(|kind| grid.layer_cell(kind, top.position).is_some());
            if !(base_ok && matches!(top.kind(), CellKind::Empty | CellKind::Door | CellKind::Danger))
            {
                return Err(IllegalReason::NotBuildable { kind: top.kind() });
            }
            Ok(build(top, Cell::wall(top.position)))
        }
        ActionKind::Kill => {
            let top = adjacent_cell(grid, robot, action)?;
            let victim = top.robot_id().ok_or(IllegalReason::NotARobot {
                position: top.position,
            })?;
            Ok(Checked {
                consequences: vec![Consequence::RobotKilled { robot: victim }],
                target: top,
            })
        }
        ActionKind::Mine => {
            let equipment = &robot.equipment;
            if !equipment.has_mine {
                return Err(IllegalReason::NoMine);
            }
            if action.power > equipment.mine_power {
                return Err(IllegalReason::PowerTooHigh {
                    power: action.power,
                    max: equipment.mine_power,
                });
            }
            let top = adjacent_cell(grid, robot, action)?;
            if !Family::MinePlantable.contains(top.kind()) {
                return Err(IllegalReason::NotPlantable { kind: top.kind() });
            }
            let mine = Cell::new(
                top.position,
                CellContent::Danger {
                    impact: action.power,
                    owner: Some(robot.uid),
                },
            );
            Ok(Checked {
                consequences: vec![Consequence::CaseToAdd { cell: mine }],
                target: top,
            })
        }
        ActionKind::Grenade => {
            let equipment = &robot.equipment;
            if !equipment.has_grenade {
                return Err(IllegalReason::NoGrenade);
            }
            if action.distance > equipment.grenade_range {
                return Err(IllegalReason::OutOfRange {
                    range: action.distance,
                    max: equipment.grenade_range,
                });
            }
            if action.power > equipment.grenade_power {
                return Err(IllegalReason::PowerTooHigh {
                    power: action.power,
                    max: equipment.grenade_power,
                });
            }
            let landing = action.target_from(origin);
            let top = *grid
                .cell(landing)
                .ok_or(IllegalReason::OutOfGrid { position: landing })?;
            if !Family::GrenadeLanding.contains(top.kind()) {
                return Err(IllegalReason::LandingNotLegal { kind: top.kind() });
            }
            if let Some(position) = Grid::segment(origin, landing)
                .into_iter()
                .find(|p| grid.is_in(*p, CellKind::PerimeterWall))
            {
                return Err(IllegalReason::ShotBlocked { position });
            }
            Ok(Checked {
                consequences: vec![Consequence::LaunchGrenade {
                    grenade: Cell::grenade(landing, action.power, origin),
                    from: origin,
                    to: landing,
                    nb_cells: action.distance,
                }],
                target: top,
            })
        }
    }
}

fn adjacent_cell(grid: &Grid, robot: &Robot, action: &Action) -> Result<Cell, IllegalReason> {
    let position = robot.position.step(action.direction);
    grid.cell(position)
        .copied()
        .ok_or(IllegalReason::OutOfGrid { position })
}

/// Building over a hidden mine sets it off, with no robot to blame.
fn build(top: Cell, built: Cell) -> Checked {
    let mut consequences = vec![Consequence::CaseToAdd { cell: built }];
    if top.kind() == CellKind::Danger {
        consequences.push(Consequence::DangerActivated {
            robot: None,
            cell: top,
        });
    }
    Checked {
        consequences,
        target: top,
    }
}

fn check_move(state: &GameState, robot: &Robot, action: &Action) -> Result<Checked, IllegalReason> {
    let remaining = robot.current_speed.max(1);
    if action.distance > remaining {
        return Err(IllegalReason::TooFar {
            distance: action.distance,
            remaining,
        });
    }

    let grid = &state.grid;
    let mut current = robot.position;
    let mut bonuses = Vec::new();
    let mut danger = None;
    let mut target = None;
    for index in 1..=action.distance {
        let next = current.step(action.direction);
        let cell = *grid
            .cell(next)
            .ok_or(IllegalReason::OutOfGrid { position: next })?;
        let kind = cell.kind();
        let allowed = if index == action.distance {
            Family::PassableForMove
        } else {
            Family::Free
        };
        if !allowed.contains(kind) {
            return Err(IllegalReason::Blocked {
                kind,
                position: next,
            });
        }
        if kind == CellKind::Exit
            && robot.behavior == Behavior::Hunter
            && state
                .robots
                .alive()
                .any(|other| other.behavior != Behavior::Hunter)
        {
            return Err(IllegalReason::HunterOnExit);
        }
        match kind {
            CellKind::Bonus => bonuses.push(next),
            CellKind::Danger => danger = Some(cell),
            _ => {}
        }
        target = Some(cell);
        current = next;
    }

    let target = target.ok_or(IllegalReason::TooFar {
        distance: 0,
        remaining,
    })?;
    let mut consequences = vec![Consequence::BotMove {
        robot: robot.uid,
        from: robot.position,
        to: current,
        nb_cells: action.distance,
    }];
    consequences.extend(bonuses.into_iter().map(|position| Consequence::BonusWin {
        robot: robot.uid,
        position,
    }));
    if let Some(cell) = danger {
        consequences.push(Consequence::DangerActivated {
            robot: Some(robot.uid),
            cell,
        });
    }
    Ok(Checked {
        consequences,
        target,
    })
}

/// Writer of the game state for one command at a time.
pub struct CommandValidator<'a> {
    pub(super) state: &'a mut GameState,
}

impl<'a> CommandValidator<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    fn robot(&self, uid: RobotId) -> Result<&Robot, CommandError> {
        let robot = self
            .state
            .robots
            .get(uid)
            .ok_or(CommandError::RobotNotFound(uid))?;
        if !robot.alive {
            return Err(CommandError::RobotDead(uid));
        }
        Ok(robot)
    }

    /// Parses and checks `command` for robot `uid`.
    ///
    /// Illegal commands are recorded in the turn ledger under their canonical
    /// spelling before the error is returned.
    pub fn try_analyze(
        &mut self,
        uid: RobotId,
        command: &str,
        turn_id: u64,
    ) -> Result<Analysis, CommandError> {
        let parsed = self.state.alphabet.parse(command)?;
        let action = match parsed {
            Command::Global(_) => {
                return Ok(Analysis {
                    parsed: Some(parsed),
                    ..Analysis::default()
                });
            }
            Command::Action(action) => action,
        };
        let canonical = self.state.alphabet.format(&parsed);
        let robot = self.robot(uid)?;
        let context = ErrorContext::new(turn_id)
            .with_robot(uid)
            .with_position(robot.position);

        if self.state.ledger.is_invalid(turn_id, uid, &canonical) {
            return Err(CommandError::illegal(
                &canonical,
                IllegalReason::AlreadyInvalid,
                context,
            ));
        }

        match check_action(self.state, robot, &action) {
            Ok(checked) => {
                trace!(robot = %uid, command = %canonical, "command accepted");
                Ok(Analysis {
                    changed: true,
                    parsed: Some(parsed),
                    consequences: checked.consequences,
                    target: Some(checked.target),
                })
            }
            Err(reason) => {
                debug!(robot = %uid, command = %canonical, %reason, "command rejected");
                self.state.ledger.record_invalid(turn_id, uid, &canonical);
                Err(CommandError::illegal(&canonical, reason, context))
            }
        }
    }

    /// Infallible variant of [`Self::try_analyze`].
    pub fn analyze(&mut self, uid: RobotId, command: &str, turn_id: u64) -> Analysis {
        self.try_analyze(uid, command, turn_id)
            .unwrap_or_else(|_| Analysis::unchanged())
    }

    /// Prepares a robot for the atomic step `step_index` of `step_count`.
    ///
    /// Step indices start at 1. The first step opens the turn: the change log
    /// starts a new turn and the robot's starting cell is recorded.
    pub fn init_robot_before_step(
        &mut self,
        uid: RobotId,
        step_index: u32,
        step_count: u32,
    ) -> Result<(), CommandError> {
        self.robot(uid)?;
        if step_index <= 1 {
            self.state.grid.changes_mut().begin_turn();
        } else {
            self.state.grid.changes_mut().begin_step();
        }
        let grid = &self.state.grid;
        let robot = self
            .state
            .robots
            .get_mut(uid)
            .ok_or(CommandError::RobotNotFound(uid))?;
        robot.current_speed = (step_count + 1).saturating_sub(step_index.max(1));
        if step_index <= 1 {
            robot.history.start_sequence(robot.position);
        }
        robot.refresh_zones(grid);
        Ok(())
    }

    /// Records the step transition of a played action.
    ///
    /// The robot's action counter and trail grow, kills are tallied, and at
    /// the end of the turn the robot's speed and zones are restored.
    #[allow(clippy::too_many_arguments)]
    pub fn validate_action(
        &mut self,
        uid: RobotId,
        action: &Action,
        target: Option<&Cell>,
        killed: &[RobotId],
        turn_id: u64,
        step_index: u32,
        step_count: u32,
    ) -> Result<StepReport, CommandError> {
        let kills: Vec<RobotId> = killed.iter().copied().filter(|k| *k != uid).collect();
        let innocent = kills
            .iter()
            .filter(|k| self.state.dangers.factor(**k) <= 1)
            .count() as u32;

        let config = self.state.config.clone();
        let grid = &self.state.grid;
        let robot = self
            .state
            .robots
            .get_mut(uid)
            .ok_or(CommandError::RobotNotFound(uid))?;

        robot.actions_played += 1;
        robot.history.actions.push(ActionRecord {
            turn_id,
            step_index,
            action: *action,
        });
        let position = robot.position;
        robot.history.record_cell(position, config.max_passed_cells);
        robot.history.kills_total += kills.len() as u32;
        robot.history.kills_innocent += innocent;
        robot.current_speed = robot.current_speed.saturating_sub(1);

        let turn_complete = step_index >= step_count;
        if turn_complete {
            robot.current_speed = robot.speed;
            robot.turns_played += 1;
            robot.history.close_sequence(config.max_sequence_memory);
            if robot.alive {
                robot.refresh_zones(grid);
            }
        }
        debug!(
            robot = %uid,
            action = %action.kind,
            target = ?target.map(|cell| cell.position),
            kills = kills.len(),
            turn_complete,
            "action recorded"
        );

        if !kills.is_empty() {
            self.state.refresh_dangers();
        }
        Ok(StepReport {
            robot: uid,
            turn_id,
            step_index,
            turn_complete,
            kills,
        })
    }

    /// Parses, checks, applies and records `command` in one go.
    pub fn play(
        &mut self,
        uid: RobotId,
        command: &str,
        turn_id: u64,
        step_index: u32,
        step_count: u32,
    ) -> Result<StepReport, CommandError> {
        let analysis = self.try_analyze(uid, command, turn_id)?;
        let action = *analysis.action().ok_or_else(|| {
            CommandError::illegal(
                command,
                IllegalReason::NotAnAction,
                ErrorContext::new(turn_id).with_robot(uid),
            )
        })?;
        let applied = self.apply(uid, &analysis.consequences)?;
        self.validate_action(
            uid,
            &action,
            analysis.target.as_ref(),
            &applied.killed,
            turn_id,
            step_index,
            step_count,
        )
    }
}
