//! Branch-and-bound search for short distances.
//!
//! The search explores simple paths inside the bounding rectangle of both
//! ends, widened by one cell, using the dominant direction toward the
//! target and its two perpendiculars. A branch is cut once its cost plus
//! the cheapest possible remainder can no longer beat the best path found.

use std::collections::BTreeSet;

use maze_core::{CellKind, Direction, Position, TargetPath};
use rand::Rng;

use super::PathResult;
use super::cost::cell_cost;
use crate::context::AiContext;

struct Search {
    target: Position,
    eco: bool,
    directions: Vec<Direction>,
    min: Position,
    max: Position,
    step_floor: i32,
    trail: Vec<Position>,
    best: Option<(Vec<Position>, i32)>,
    blockers: BTreeSet<Position>,
}

impl Search {
    fn in_bounds(&self, position: Position) -> bool {
        (self.min.x..=self.max.x).contains(&position.x)
            && (self.min.y..=self.max.y).contains(&position.y)
    }

    fn beaten(&self, cost: i32, from: Position) -> bool {
        let floor = cost + self.step_floor * from.path_length(self.target) as i32;
        self.best.as_ref().is_some_and(|(_, best)| floor >= *best)
    }
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(super) fn exhaustive_path(&mut self, from: Position, to: Position, eco: bool) -> PathResult {
        let Some(dominant) = from.dominant_direction(to) else {
            return PathResult {
                path: Some(TargetPath::new(vec![from], 0)),
                blockers: BTreeSet::new(),
            };
        };
        let [left, right] = dominant.perpendiculars();
        let mut search = Search {
            target: to,
            eco,
            directions: vec![dominant, left, right],
            min: Position::new(from.x.min(to.x) - 1, from.y.min(to.y) - 1),
            max: Position::new(from.x.max(to.x) + 1, from.y.max(to.y) + 1),
            step_floor: if self.robot.need_bonus { 0 } else { 1 },
            trail: vec![from],
            best: None,
            blockers: BTreeSet::new(),
        };
        self.explore(&mut search, from, 0);

        PathResult {
            path: search
                .best
                .map(|(cells, cost)| TargetPath::new(cells, cost)),
            blockers: search.blockers,
        }
    }

    fn explore(&mut self, search: &mut Search, current: Position, cost: i32) {
        if current == search.target {
            let better = search.best.as_ref().is_none_or(|(_, best)| cost < *best);
            if better {
                search.best = Some((search.trail.clone(), cost));
            }
            return;
        }
        if search.beaten(cost, current) {
            return;
        }

        let directions = search.directions.clone();
        for direction in directions {
            let next = current.step(direction);
            if !search.in_bounds(next) || search.trail.contains(&next) {
                continue;
            }
            if !self.validate_step(next, search.eco) {
                if self.grid().kind_at(next) == Some(CellKind::Danger) {
                    search.blockers.insert(next);
                }
                continue;
            }
            let next_cost = cost + cell_cost(self.grid(), &self.robot, next);
            if search.beaten(next_cost, next) {
                continue;
            }
            search.trail.push(next);
            self.explore(search, next, next_cost);
            search.trail.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, Impact, PcgRng, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    #[test]
    fn test_unclearable_danger_forces_a_detour() {
        let mut state = GameState::new(Grid::open(8, 7));
        state
            .add_robot(Robot::builder(1, Position::new(1, 3)).build())
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 3), Impact::Point));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(1);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let result = ctx.exhaustive_path(Position::new(1, 3), Position::new(5, 3), false);
        assert!(result.blockers.contains(&Position::new(3, 3)));
        let path = result.path.unwrap();
        assert!(!path.contains(Position::new(3, 3)));
        assert_eq!(path.cost, 6);
        assert!(path.is_connected());
    }
}
