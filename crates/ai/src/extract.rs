//! Translation of the pending sequence head into a command.
//!
//! A head is popped only once the command that completes it is emitted.
//! Gotos blocked by a wall, a danger or a robot first emit the action that
//! clears the cell and stay at the head.

use maze_core::{Action, CellKind, Direction, Family, Position};
use rand::Rng;
use tracing::{debug, trace};

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;
use crate::types::PseudoAction;

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Next command of the pending sequence, if it still applies.
    pub(crate) fn extract_command(&mut self) -> Option<String> {
        let budget = self.memory.pending.as_ref().map_or(0, |p| p.len());
        for _ in 0..=budget {
            let head = self.memory.pending.as_ref()?.head()?.clone();
            trace!(robot = %self.robot.uid, ?head, "extracting");
            match head {
                PseudoAction::Grenade { command } | PseudoAction::Kill { command } => {
                    return match self.pre_check_command(&command) {
                        Some(command) => self.pop_with(command),
                        None => self.invalidate("stored command no longer legal"),
                    };
                }
                PseudoAction::Goto { position, .. } => {
                    if position == self.robot.position {
                        self.pop_head();
                        continue;
                    }
                    return self.goto_command(position);
                }
                PseudoAction::NoMove => {
                    self.pop_head();
                    return self
                        .safe_forward_move()
                        .or_else(|| self.anticipated_terraform())
                        .or_else(|| self.build_aside(false))
                        .or_else(|| self.door_ahead());
                }
                PseudoAction::Terraform => {
                    self.pop_head();
                    return self.anticipated_terraform();
                }
                PseudoAction::MineMax => {
                    self.pop_head();
                    return self.build_aside(true).or_else(|| self.build_aside(false));
                }
                PseudoAction::Wall => {
                    self.pop_head();
                    return self.build_aside(false);
                }
                PseudoAction::Door => {
                    self.pop_head();
                    return self.door_ahead();
                }
            }
        }
        None
    }

    fn goto_command(&mut self, position: Position) -> Option<String> {
        let Some(direction) = self.robot.position.direction_to(position) else {
            return self.invalidate("goto is not adjacent");
        };
        let grid = self.grid();
        let Some(cell) = grid.cell(position).copied() else {
            return self.invalidate("goto left the grid");
        };
        let wall = grid.layer_cell(CellKind::Wall, position).is_some();
        let danger = grid.layer_cell(CellKind::Danger, position).is_some();

        if wall || danger {
            if let Some(command) = self.terraform_at(position) {
                return Some(command);
            }
            if wall {
                if let Some(command) = self.pre_check(&Action::door(direction)) {
                    return Some(command);
                }
            }
            return self.invalidate("obstacle cannot be cleared");
        }

        if cell.kind() == CellKind::Robot {
            return match self.pre_check(&Action::kill(direction)) {
                Some(command) => Some(command),
                None => self.invalidate("robot in the way"),
            };
        }
        match self.pre_check(&Action::step(direction)) {
            Some(command) => self.pop_with(command),
            None => self.invalidate("move refused"),
        }
    }

    /// A grenade clearing `position`, looking further for bonus hunters.
    fn terraform_at(&mut self, position: Position) -> Option<String> {
        if !self.robot.equipment.has_grenade {
            return None;
        }
        let flags = GrenadeFlags::terraform(self.robot.need_bonus);
        let choice = self.grenade_params(position, flags)?;
        self.pre_check_command(&choice.default.command)
    }

    /// Clears the first obstacle left on the current path.
    fn anticipated_terraform(&mut self) -> Option<String> {
        let path = self.current_path()?;
        let grid = self.grid();
        let obstacle = path.cells.iter().skip(1).copied().find(|p| {
            grid.layer_cell(CellKind::Wall, *p).is_some()
                || grid.layer_cell(CellKind::Danger, *p).is_some()
        })?;
        self.terraform_at(obstacle)
    }

    /// A step onto a safe cell on the way.
    fn safe_forward_move(&self) -> Option<String> {
        let adjacents = &self.gd.adjacents;
        let grid = self.grid();
        adjacents
            .first
            .iter()
            .filter(|p| adjacents.safe.contains(p))
            .filter(|p| grid.kind_at(**p).is_some_and(|kind| Family::Free.contains(kind)))
            .filter_map(|p| self.robot.position.direction_to(*p))
            .find_map(|direction| self.pre_check(&Action::step(direction)))
    }

    /// A wall, or the strongest mine, on an adjacent cell off the way.
    pub(crate) fn build_aside(&self, mine: bool) -> Option<String> {
        let grid = self.grid();
        let position = self.robot.position;
        let directions: Vec<Direction> = self
            .gd
            .adjacents
            .other
            .iter()
            .filter(|p| grid.kind_at(**p) != Some(CellKind::Danger))
            .filter_map(|p| position.direction_to(*p))
            .collect();
        for direction in directions {
            if mine {
                let strongest = self
                    .robot
                    .equipment
                    .mine_powers()
                    .into_iter()
                    .rev()
                    .find_map(|power| self.pre_check(&Action::mine(direction, power)));
                if strongest.is_some() {
                    return strongest;
                }
            } else if let Some(command) = self.pre_check(&Action::wall(direction)) {
                return Some(command);
            }
        }
        None
    }

    /// A door through an adjacent wall on the way.
    fn door_ahead(&self) -> Option<String> {
        let position = self.robot.position;
        self.gd
            .adjacents
            .first
            .iter()
            .chain(&self.gd.adjacents.all)
            .filter_map(|p| position.direction_to(*p))
            .find_map(|direction| self.pre_check(&Action::door(direction)))
    }

    fn pop_head(&mut self) {
        if let Some(pending) = self.memory.pending.as_mut() {
            pending.pop();
        }
    }

    fn pop_with(&mut self, command: String) -> Option<String> {
        self.pop_head();
        Some(command)
    }

    fn invalidate(&mut self, reason: &str) -> Option<String> {
        debug!(robot = %self.robot.uid, reason, "pending sequence dropped");
        self.memory.pending = None;
        self.gd.chosen = None;
        None
    }
}
