//! Main and temporary targets.

use crate::grid::{CellKind, Direction, Position, RobotId};

/// Ordered cells from a robot to its target, the robot first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetPath {
    pub cells: Vec<Position>,
    /// Sum of the per-cell costs minus the robot's own cell.
    pub cost: i32,
}

impl TargetPath {
    pub fn new(cells: Vec<Position>, cost: i32) -> Self {
        Self { cells, cost }
    }

    pub fn first(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    pub fn last(&self) -> Option<Position> {
        self.cells.last().copied()
    }

    /// Number of moves: the robot's own cell is not a move.
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, position: Position) -> bool {
        self.cells.contains(&position)
    }

    pub fn index_of(&self, position: Position) -> Option<usize> {
        self.cells.iter().position(|p| *p == position)
    }

    /// Cell following `position` on the path.
    pub fn next_after(&self, position: Position) -> Option<Position> {
        self.index_of(position)
            .and_then(|index| self.cells.get(index + 1).copied())
    }

    /// Remainder of the path starting at `position`.
    pub fn from(&self, position: Position) -> Option<TargetPath> {
        let index = self.index_of(position)?;
        Some(Self::new(self.cells[index..].to_vec(), self.cost))
    }

    /// Returns true when consecutive cells are 4-adjacent.
    pub fn is_connected(&self) -> bool {
        self.cells.windows(2).all(|pair| pair[0].is_adjacent(pair[1]))
    }
}

/// A referenced cell, by coordinates, plus what the engine knows about it.
///
/// Targets never hold cell references: they are checked against the current
/// board each step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Target {
    pub position: Position,
    pub kind: CellKind,
    /// Robot aimed at, for hunting targets.
    pub robot: Option<RobotId>,
    /// Direction sample the temp target was selected from.
    pub direction: Option<Direction>,
    /// Last free cell along the sample axis.
    pub last_free: Option<Position>,
    /// Cells covered by the sample the target came from.
    pub covered: Vec<Position>,
    pub path: Option<TargetPath>,
}

impl Target {
    pub fn new(position: Position, kind: CellKind) -> Self {
        Self {
            position,
            kind,
            robot: None,
            direction: None,
            last_free: None,
            covered: Vec::new(),
            path: None,
        }
    }

    pub fn robot(position: Position, uid: RobotId) -> Self {
        Self {
            robot: Some(uid),
            ..Self::new(position, CellKind::Robot)
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_path(mut self, path: TargetPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn path_cost(&self) -> Option<i32> {
        self.path.as_ref().map(|path| path.cost)
    }
}
