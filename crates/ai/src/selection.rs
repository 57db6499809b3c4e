//! Temp target selection.
//!
//! Directions toward the main target are tried before the others. Within
//! each group directions are ranked by score, ties broken by a bias of the
//! robot's behavior, and the samples of a direction by their own score. The
//! first sample reachable by an eco path becomes the temp target.

use std::cmp::Ordering;

use maze_core::{Behavior, CellKind, Direction, GamePhase, Target};
use rand::Rng;
use tracing::debug;

use crate::context::AiContext;
use crate::gamble::DirectionSample;

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(crate) fn select_temp_target(&mut self) {
        let closing = matches!(self.robot.behavior, Behavior::Winner | Behavior::Hunter)
            && self.robot.game_phase == GamePhase::Final;
        if closing {
            self.robot.temp_target = None;
            self.refresh_main_path();
            return;
        }
        if self.robot.temp_target.is_some() {
            return;
        }

        let position = self.robot.position;
        let toward: Vec<Direction> = self
            .main_target_position()
            .map(|main| position.directions_toward(main))
            .unwrap_or_default();
        let (mut main, mut other): (Vec<DirectionSample>, Vec<DirectionSample>) = self
            .gd
            .directions
            .iter()
            .cloned()
            .partition(|sample| toward.contains(&sample.direction));
        main.sort_by(|a, b| self.compare_directions(a, b));
        other.sort_by(|a, b| self.compare_directions(a, b));

        for direction in main.into_iter().chain(other) {
            let mut samples = direction.samples.clone();
            samples.sort_by(|a, b| b.score.total_cmp(&a.score));
            for sample in samples {
                if sample.position == position {
                    continue;
                }
                let Some(path) = self.search_path(position, sample.position, true).path else {
                    continue;
                };
                let kind = self
                    .grid()
                    .kind_at(sample.position)
                    .unwrap_or(CellKind::Empty);
                let target = Target {
                    direction: Some(sample.direction),
                    last_free: sample.last_free,
                    covered: sample.lane.clone(),
                    ..Target::new(sample.position, kind)
                }
                .with_path(path.clone());
                debug!(
                    robot = %self.robot.uid,
                    target = %sample.position,
                    direction = ?sample.direction,
                    cost = path.cost,
                    "temp target selected"
                );
                self.store_sample_path(&sample, path);
                self.robot.temp_target = Some(target);
                return;
            }
        }

        debug!(robot = %self.robot.uid, "no reachable sample");
        self.refresh_main_path();
    }

    /// Recomputes the main target path unless the robot is still on it.
    pub(crate) fn refresh_main_path(&mut self) {
        let Some(main) = self.robot.main_target.clone() else {
            return;
        };
        let position = self.robot.position;
        if main.path.as_ref().is_some_and(|path| path.contains(position)) {
            return;
        }
        let path = self
            .search_path(position, main.position, true)
            .path
            .or_else(|| self.search_path(position, main.position, false).path);
        if let Some(target) = self.robot.main_target.as_mut() {
            target.path = path;
        }
    }

    fn store_sample_path(&mut self, sample: &crate::gamble::Sample, path: maze_core::TargetPath) {
        let stored = self
            .gd
            .directions
            .iter_mut()
            .filter(|d| d.direction == sample.direction)
            .flat_map(|d| d.samples.iter_mut())
            .find(|s| s.origin == sample.origin);
        if let Some(stored) = stored {
            stored.path = Some(path);
        }
    }

    fn compare_directions(&self, a: &DirectionSample, b: &DirectionSample) -> Ordering {
        let by_score = b.score.total_cmp(&a.score);
        let (ca, cb) = (&a.counts, &b.counts);
        let bias = match self.robot.behavior {
            Behavior::Builder => ca.walls.cmp(&cb.walls),
            Behavior::Sapper => ca.dangers.cmp(&cb.dangers),
            _ if self.robot.need_bonus => cb.bonuses.cmp(&ca.bonuses),
            _ if self.is_high(self.robot.personality.survival) => {
                (ca.defense, ca.dangers).cmp(&(cb.defense, cb.dangers))
            }
            _ => Ordering::Equal,
        };
        by_score.then(bias)
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, Position, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    #[test]
    fn test_temp_target_is_picked_toward_exit() {
        let mut state = GameState::new(Grid::open(14, 5));
        state.grid.set_cell(Cell::exit(Position::new(12, 2)));
        state
            .add_robot(Robot::builder(1, Position::new(2, 2)).build())
            .unwrap();

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(9);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.maintain_targets();
        ctx.score_samples();
        ctx.select_temp_target();

        let temp = ctx.robot.temp_target.clone().unwrap();
        assert_eq!(temp.direction, Some(Direction::East));
        assert!(temp.position.x > 2);
        let path = temp.path.unwrap();
        assert_eq!(path.first(), Some(Position::new(2, 2)));
        assert_eq!(path.last(), Some(temp.position));
        let east = ctx.gd.direction(Direction::East).unwrap();
        assert!(east.samples.iter().any(|s| s.path.is_some()));
    }

    #[test]
    fn test_final_approach_skips_temp_target() {
        let mut state = GameState::new(Grid::open(7, 7));
        state.grid.set_cell(Cell::exit(Position::new(4, 4)));
        let mut robot = Robot::builder(1, Position::new(2, 2)).build();
        robot.actions_played = 10;
        state.add_robot(robot).unwrap();

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(9);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.maintain_targets();
        assert_eq!(ctx.robot.game_phase, GamePhase::Final);
        ctx.score_samples();
        ctx.select_temp_target();

        assert!(ctx.robot.temp_target.is_none());
        let main = ctx.robot.main_target.clone().unwrap();
        let path = main.path.unwrap();
        assert_eq!(path.last(), Some(Position::new(4, 4)));
        assert_eq!(path.len(), 4);
    }
}
