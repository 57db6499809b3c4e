//! Last-resort emitter.

use maze_core::{Action, CellKind, Direction, Family, Position};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::context::AiContext;

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Any legal command, tried from the least to the most harmful.
    pub(crate) fn last_resort(&mut self) -> Option<String> {
        let command = self
            .shuffled_free_move()
            .or_else(|| self.any_door())
            .or_else(|| self.random_grenade())
            .or_else(|| self.survival_kill())
            .or_else(|| self.step_on_danger());
        debug!(robot = %self.robot.uid, command = ?command, "last resort");
        command
    }

    fn neighbours(&self) -> Vec<(Direction, CellKind)> {
        self.grid()
            .adjacent(self.robot.position)
            .into_iter()
            .map(|(direction, cell)| (direction, cell.kind()))
            .collect()
    }

    fn shuffled_free_move(&mut self) -> Option<String> {
        let mut directions: Vec<Direction> = self
            .neighbours()
            .into_iter()
            .filter(|(_, kind)| Family::Free.contains(*kind))
            .map(|(direction, _)| direction)
            .collect();
        directions.shuffle(&mut *self.rng);
        directions
            .into_iter()
            .find_map(|direction| self.pre_check(&Action::step(direction)))
    }

    fn any_door(&self) -> Option<String> {
        self.neighbours()
            .into_iter()
            .filter(|(_, kind)| *kind == CellKind::Wall)
            .find_map(|(direction, _)| self.pre_check(&Action::door(direction)))
    }

    fn random_grenade(&mut self) -> Option<String> {
        let equipment = self.robot.equipment;
        if !equipment.has_grenade {
            return None;
        }
        let mut throws: Vec<Action> = Vec::new();
        for direction in Direction::ALL {
            for range in 1..=equipment.grenade_range {
                for power in equipment.grenade_powers() {
                    throws.push(Action::grenade(direction, range, power));
                }
            }
        }
        throws.shuffle(&mut *self.rng);
        throws.iter().find_map(|action| self.pre_check(action))
    }

    fn survival_kill(&self) -> Option<String> {
        if !self.is_mid(self.robot.personality.survival) {
            return None;
        }
        self.neighbours()
            .into_iter()
            .filter(|(_, kind)| *kind == CellKind::Robot)
            .find_map(|(direction, _)| self.pre_check(&Action::kill(direction)))
    }

    fn step_on_danger(&self) -> Option<String> {
        let position: Position = self.robot.position;
        let grid = self.grid();
        Direction::ALL
            .into_iter()
            .filter(|direction| {
                grid.kind_at(position.step(*direction)) == Some(CellKind::Danger)
            })
            .find_map(|direction| self.pre_check(&Action::step(direction)))
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, Impact, PcgRng, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    fn ringed(grenade: bool) -> GameState {
        let mut state = GameState::new(Grid::open(7, 7));
        let mut builder = Robot::builder(1, Position::new(3, 3));
        if grenade {
            builder = builder.grenade(Impact::Point, 1);
        }
        state.add_robot(builder.build()).unwrap();
        for direction in Direction::ALL {
            let cell = Position::new(3, 3).step(direction);
            state.grid.set_cell(Cell::danger(cell, Impact::SmallSquare));
        }
        state
    }

    #[test]
    fn test_ringed_robot_without_grenade_steps_on_a_danger() {
        let state = ringed(false);
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(9);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        let command = ctx.last_resort().unwrap();
        assert_eq!(command, "n1");
    }

    #[test]
    fn test_ringed_robot_with_grenade_throws() {
        let state = ringed(true);
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(9);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        let command = ctx.last_resort().unwrap();
        assert!(command.starts_with('g'));
    }
}
