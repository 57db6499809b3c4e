//! Per-cell traversal costs.

use maze_core::{CellKind, Grid, Position, Robot};

/// Cost of the robot's own cell, and of walls and robots in the way.
pub const OBSTACLE_COST: i32 = 2;

/// Cost of walking through `position` for `robot`.
///
/// Free cells cost 1, a danger costs its impact plus one, a bonus costs
/// nothing when the robot needs bonuses, anything else costs 2. The robot's
/// own cell costs 2 so that a path cost is the sum of its cells minus 2.
pub fn cell_cost(grid: &Grid, robot: &Robot, position: Position) -> i32 {
    if position == robot.position {
        return OBSTACLE_COST;
    }
    let Some(cell) = grid.cell(position) else {
        return OBSTACLE_COST;
    };
    match cell.kind() {
        CellKind::Empty | CellKind::Door | CellKind::Exit => 1,
        CellKind::Bonus => 1 - i32::from(robot.need_bonus),
        CellKind::Danger => cell.impact().map_or(1, |impact| impact.value() as i32) + 1,
        _ => OBSTACLE_COST,
    }
}

/// Cost of a path whose first cell is the start.
pub fn path_cost(grid: &Grid, robot: &Robot, cells: &[Position]) -> i32 {
    cells
        .iter()
        .skip(1)
        .map(|position| cell_cost(grid, robot, *position))
        .sum()
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, Impact};

    use super::*;

    #[test]
    fn test_cell_costs() {
        let mut grid = Grid::open(7, 7);
        grid.set_cell(Cell::danger(Position::new(3, 1), Impact::SmallSquare));
        grid.set_cell(Cell::wall(Position::new(4, 1)));
        grid.set_cell(Cell::bonus(Position::new(5, 1)));
        let mut robot = Robot::builder(1, Position::new(1, 1)).build();

        assert_eq!(cell_cost(&grid, &robot, Position::new(1, 1)), 2);
        assert_eq!(cell_cost(&grid, &robot, Position::new(2, 1)), 1);
        assert_eq!(cell_cost(&grid, &robot, Position::new(3, 1)), 10);
        assert_eq!(cell_cost(&grid, &robot, Position::new(4, 1)), 2);
        assert_eq!(cell_cost(&grid, &robot, Position::new(5, 1)), 1);
        robot.need_bonus = true;
        assert_eq!(cell_cost(&grid, &robot, Position::new(5, 1)), 0);
    }

    #[test]
    fn test_path_cost_is_sum_minus_start() {
        let grid = Grid::open(7, 7);
        let robot = Robot::builder(1, Position::new(1, 1)).build();
        let cells = [Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)];
        let sum: i32 = cells.iter().map(|p| cell_cost(&grid, &robot, *p)).sum();
        assert_eq!(path_cost(&grid, &robot, &cells), sum - 2);
        assert_eq!(path_cost(&grid, &robot, &cells), 2);
    }
}
