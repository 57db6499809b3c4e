//! Path search between two cells.
//!
//! # Module Structure
//!
//! - `cost`: per-cell traversal costs
//! - `exhaustive`: branch-and-bound search for short distances
//! - `sampled`: chained sub-path search for long distances
//!
//! Paths may cross walls (a door is built on the way), robots the deciding
//! robot is willing to kill, and dangers it can clear with one grenade.
//! Every search is memoized per `(from, to, eco)`.

mod cost;
mod exhaustive;
mod sampled;

use std::collections::BTreeSet;

use maze_core::{Behavior, CellKind, Family, Impact, Position, TargetPath};
use rand::Rng;
use tracing::trace;

pub use cost::{OBSTACLE_COST, cell_cost, path_cost};

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;

/// Outcome of a path query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathResult {
    pub path: Option<TargetPath>,
    /// Dangers that refused a step during the search.
    pub blockers: BTreeSet<Position>,
}

impl PathResult {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Cheapest path from `from` to `to`.
    ///
    /// In eco mode, dangers and robots on the way are only accepted when a
    /// direct grenade shot can clear them.
    pub fn search_path(&mut self, from: Position, to: Position, eco: bool) -> PathResult {
        let key = (from, to, eco);
        if let Some(cached) = self.memory.memo.paths.get(&key) {
            return cached.clone();
        }
        let result = if from == to {
            PathResult {
                path: Some(TargetPath::new(vec![from], 0)),
                blockers: BTreeSet::new(),
            }
        } else if from.path_length(to) <= self.config.short_path_limit {
            self.exhaustive_path(from, to, eco)
        } else {
            self.sampled_path(from, to, eco)
        };
        trace!(
            robot = %self.robot.uid,
            %from,
            %to,
            eco,
            cost = ?result.path.as_ref().map(|p| p.cost),
            blockers = result.blockers.len(),
            "path searched"
        );
        self.memory.memo.paths.insert(key, result.clone());
        result
    }

    /// Shorthand for the path of the robot itself.
    pub fn path_to(&mut self, to: Position, eco: bool) -> Option<TargetPath> {
        let from = self.robot.position;
        self.search_path(from, to, eco).path
    }

    /// Whether the robot may plan a step through `position`.
    pub fn validate_step(&mut self, position: Position, eco: bool) -> bool {
        let key = (self.robot.position, position, eco);
        if let Some(verdict) = self.memory.memo.steps.get(&key) {
            return *verdict;
        }
        let verdict = self.compute_step(position, eco);
        self.memory.memo.steps.insert(key, verdict);
        verdict
    }

    fn compute_step(&mut self, position: Position, eco: bool) -> bool {
        let state = self.state;
        let grid = &state.grid;
        let me = &self.robot;
        if position == me.position {
            return true;
        }
        let Some(cell) = grid.cell(position).copied() else {
            return false;
        };
        let kind = cell.kind();
        if Family::NeverTargeted.contains(kind) {
            return false;
        }
        if kind == CellKind::Exit
            && me.behavior == Behavior::Hunter
            && state
                .robots
                .alive()
                .any(|other| other.behavior != Behavior::Hunter)
        {
            return false;
        }

        match kind {
            CellKind::Robot => {
                let Some(uid) = cell.robot_id() else {
                    return false;
                };
                if !self.gd.recognition.kill_all.contains(&uid) {
                    return false;
                }
                position.is_adjacent(me.position)
                    || (me.equipment.has_grenade
                        && self
                            .grenade_params(position, GrenadeFlags::step(eco))
                            .is_some())
            }
            CellKind::Danger => {
                let impact = cell.impact().unwrap_or(Impact::Point);
                let has_grenade = me.equipment.has_grenade;
                if impact == Impact::Point && has_grenade {
                    true
                } else if f64::from(impact.radius()) >= me.position.distance(position) {
                    false
                } else {
                    has_grenade
                        && self
                            .grenade_params(position, GrenadeFlags::step(eco))
                            .is_some()
                }
            }
            kind => Family::PathTargetable.contains(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    fn with_context<T>(
        state: &GameState,
        f: impl FnOnce(&mut AiContext<'_, PcgRng>) -> T,
    ) -> T {
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(5);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        f(&mut ctx)
    }

    #[test]
    fn test_short_path_goes_around_nothing() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        let result = with_context(&state, |ctx| {
            ctx.search_path(Position::new(1, 1), Position::new(3, 2), false)
        });
        let path = result.path.unwrap();
        assert_eq!(path.first(), Some(Position::new(1, 1)));
        assert_eq!(path.last(), Some(Position::new(3, 2)));
        assert_eq!(path.len(), 3);
        assert_eq!(path.cost, 3);
        assert!(path.is_connected());
    }

    #[test]
    fn test_close_danger_blocks_without_grenade() {
        let mut state = GameState::new(Grid::open(7, 3));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 1), Impact::SmallDiamond));
        let result = with_context(&state, |ctx| {
            ctx.search_path(Position::new(1, 1), Position::new(4, 1), true)
        });
        assert!(result.path.is_none());
        assert!(result.blockers.contains(&Position::new(3, 1)));
    }

    #[test]
    fn test_wall_is_crossed_at_obstacle_cost() {
        let mut state = GameState::new(Grid::open(7, 3));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        state.grid.set_cell(Cell::wall(Position::new(2, 1)));
        let result = with_context(&state, |ctx| {
            ctx.search_path(Position::new(1, 1), Position::new(3, 1), true)
        });
        let path = result.path.unwrap();
        assert_eq!(path.cells, vec![Position::new(1, 1), Position::new(2, 1), Position::new(3, 1)]);
        assert_eq!(path.cost, 3);
    }

    #[test]
    fn test_hunter_avoids_exit_while_prey_lives() {
        let mut state = GameState::new(Grid::open(7, 7));
        state.grid.set_cell(Cell::exit(Position::new(2, 1)));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 1))
                    .behavior(Behavior::Hunter)
                    .build(),
            )
            .unwrap();
        state
            .add_robot(Robot::builder(2, Position::new(5, 5)).build())
            .unwrap();
        let verdict = with_context(&state, |ctx| ctx.validate_step(Position::new(2, 1), true));
        assert!(!verdict);
    }
}
