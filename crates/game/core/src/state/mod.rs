//! Authoritative game state.
//!
//! [`GameState`] bundles the grid, the roster, the danger factors and the
//! turn ledger. Orchestrators and tests own it; the validator mutates it and
//! the decision engine only reads it.

mod turn;

pub use turn::TurnLedger;

use crate::action::CommandAlphabet;
use crate::config::GameConfig;
use crate::error::GridError;
use crate::grid::{Cell, Grid, RobotId};
use crate::robot::{DangerMatrix, Robot, Roster};

/// Canonical snapshot of the board and its players.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub grid: Grid,
    pub robots: Roster,
    pub dangers: DangerMatrix,
    pub ledger: TurnLedger,
    pub config: GameConfig,
    pub alphabet: CommandAlphabet,
}

impl GameState {
    pub fn new(grid: Grid) -> Self {
        Self::with_config(grid, GameConfig::default())
    }

    pub fn with_config(grid: Grid, config: GameConfig) -> Self {
        Self {
            grid,
            robots: Roster::new(),
            dangers: DangerMatrix::default(),
            ledger: TurnLedger::new(),
            config,
            alphabet: CommandAlphabet::default(),
        }
    }

    pub fn with_alphabet(mut self, alphabet: CommandAlphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Places a robot on the board and registers it.
    pub fn add_robot(&mut self, mut robot: Robot) -> Result<RobotId, GridError> {
        if !self.grid.contains(robot.position) {
            return Err(GridError::OutOfBounds {
                position: robot.position,
            });
        }
        self.grid.set_cell(Cell::robot(robot.position, robot.uid));
        robot.refresh_zones(&self.grid);
        let uid = robot.uid;
        self.robots.insert(robot);
        self.refresh_dangers();
        Ok(uid)
    }

    pub fn robot(&self, uid: RobotId) -> Option<&Robot> {
        self.robots.get(uid)
    }

    pub fn robot_mut(&mut self, uid: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(uid)
    }

    /// Replaces a robot record, keeping the grid untouched.
    pub fn store_robot(&mut self, robot: Robot) {
        self.robots.insert(robot);
    }

    pub fn refresh_dangers(&mut self) {
        self.dangers.recompute(&self.robots, &self.config);
    }

    /// Recomputes the move and attack zones of every alive robot.
    pub fn refresh_zones(&mut self) {
        let grid = &self.grid;
        for robot in self.robots.iter_mut().filter(|robot| robot.alive) {
            robot.refresh_zones(grid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellKind, Position};

    #[test]
    fn test_add_robot_places_cell_and_zones() {
        let mut state = GameState::new(Grid::open(5, 5));
        let uid = state
            .add_robot(Robot::builder(1, Position::new(2, 2)).build())
            .unwrap();
        assert_eq!(state.grid.kind_at(Position::new(2, 2)), Some(CellKind::Robot));
        assert_eq!(state.grid.find_robot(uid), Some(Position::new(2, 2)));
        assert_eq!(state.robot(uid).unwrap().move_zone.len(), 5);
    }

    #[test]
    fn test_add_robot_outside_fails() {
        let mut state = GameState::new(Grid::open(5, 5));
        let err = state
            .add_robot(Robot::builder(1, Position::new(9, 2)).build())
            .unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { .. }));
    }
}
