//! Chained sub-path search for long distances.
//!
//! From the current point the search looks at a ring of candidates at a
//! fixed Manhattan stride, keeps the best few per sector (along x, along y,
//! diagonal) and links the current point to each of them with a short
//! search. The candidate minimising `cost / 2 + remaining distance` becomes
//! the next point. Once the target is within the short limit it is linked
//! directly. A dead end pops the last leg and excludes its endpoint.

use std::collections::{BTreeMap, BTreeSet};

use maze_core::{Family, Position, TargetPath};
use rand::Rng;
use tracing::trace;

use super::PathResult;
use super::cost::{cell_cost, path_cost};
use crate::context::AiContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Sector {
    AlongX,
    AlongY,
    Diagonal,
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(super) fn sampled_path(&mut self, from: Position, to: Position, eco: bool) -> PathResult {
        let config = self.config;
        let mut legs: Vec<TargetPath> = Vec::new();
        let mut excluded = BTreeSet::new();
        let mut used = BTreeSet::from([from]);
        let mut blockers = BTreeSet::new();
        let mut current = from;

        for _ in 0..config.long_path_max_iterations {
            if current.path_length(to) <= config.short_path_limit {
                let result = self.exhaustive_path(current, to, eco);
                blockers.extend(result.blockers);
                if let Some(leg) = result.path {
                    legs.push(leg);
                    return PathResult {
                        path: Some(self.assemble(&legs)),
                        blockers,
                    };
                }
            } else {
                let mut best: Option<(f64, Position, TargetPath)> = None;
                for candidate in self.ring_candidates(current, to, &excluded, &used) {
                    let result = self.exhaustive_path(current, candidate, eco);
                    blockers.extend(result.blockers);
                    let Some(leg) = result.path else {
                        continue;
                    };
                    let score = f64::from(leg.cost) / 2.0 + f64::from(candidate.path_length(to));
                    if best.as_ref().is_none_or(|(current_best, _, _)| score < *current_best) {
                        best = Some((score, candidate, leg));
                    }
                }
                if let Some((_, candidate, leg)) = best {
                    used.insert(candidate);
                    legs.push(leg);
                    current = candidate;
                    continue;
                }
            }

            match legs.pop() {
                Some(leg) => {
                    if let Some(end) = leg.last() {
                        excluded.insert(end);
                    }
                    current = leg.first().unwrap_or(from);
                    trace!(robot = %self.robot.uid, %current, "path search backtracks");
                }
                None => break,
            }
        }

        PathResult {
            path: None,
            blockers,
        }
    }

    fn ring_candidates(
        &self,
        current: Position,
        to: Position,
        excluded: &BTreeSet<Position>,
        used: &BTreeSet<Position>,
    ) -> Vec<Position> {
        let grid = self.grid();
        let stride = self.config.long_path_stride as i32;
        let remaining = current.path_length(to);

        let mut sectors: BTreeMap<Sector, Vec<Position>> = BTreeMap::new();
        for dx in -stride..=stride {
            let rest = stride - dx.abs();
            let dys = if rest == 0 { vec![0] } else { vec![-rest, rest] };
            for dy in dys {
                let candidate = current.translate(dx, dy);
                if candidate.path_length(to) >= remaining
                    || excluded.contains(&candidate)
                    || used.contains(&candidate)
                    || !grid.is_in(candidate, Family::PathTargetable)
                {
                    continue;
                }
                let sector = match (dx, dy) {
                    (_, 0) => Sector::AlongX,
                    (0, _) => Sector::AlongY,
                    _ => Sector::Diagonal,
                };
                sectors.entry(sector).or_default().push(candidate);
            }
        }

        let keep = self.config.long_path_candidates;
        sectors
            .into_values()
            .flat_map(|mut cells| {
                cells.sort_by_key(|p| (cell_cost(grid, &self.robot, *p), p.path_length(to)));
                cells.truncate(keep);
                cells
            })
            .collect()
    }

    fn assemble(&self, legs: &[TargetPath]) -> TargetPath {
        let mut cells: Vec<Position> = Vec::new();
        for leg in legs {
            let skip = usize::from(!cells.is_empty());
            for position in leg.cells.iter().skip(skip) {
                match cells.iter().position(|p| p == position) {
                    Some(index) => cells.truncate(index + 1),
                    None => cells.push(*position),
                }
            }
        }
        let cost = path_cost(self.grid(), &self.robot, &cells);
        TargetPath::new(cells, cost)
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    #[test]
    fn test_long_path_crosses_the_board() {
        let mut state = GameState::new(Grid::open(20, 20));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        state.grid.set_cell(Cell::wall(Position::new(10, 10)));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(2);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let path = ctx
            .sampled_path(Position::new(1, 1), Position::new(18, 18), false)
            .path
            .unwrap();
        assert_eq!(path.first(), Some(Position::new(1, 1)));
        assert_eq!(path.last(), Some(Position::new(18, 18)));
        assert!(path.is_connected());
        assert!(path.cost >= 34);
        let sum: i32 = path
            .cells
            .iter()
            .map(|p| cell_cost(&state.grid, &ctx.robot, *p))
            .sum();
        assert_eq!(path.cost, sum - 2);
    }

    #[test]
    fn test_sealed_target_is_unreachable() {
        let mut state = GameState::new(Grid::open(14, 14));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        for p in [
            Position::new(11, 12),
            Position::new(12, 11),
            Position::new(10, 12),
            Position::new(12, 10),
        ] {
            state.grid.set_cell(Cell::perimeter(p));
        }
        state.grid.set_cell(Cell::perimeter(Position::new(11, 11)));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(2);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let result = ctx.sampled_path(Position::new(1, 1), Position::new(12, 12), false);
        assert!(result.path.is_none());
    }
}
