//! Classification of the four neighbours of the deciding robot.

use maze_core::{CellKind, Family};
use rand::Rng;
use tracing::trace;

use crate::context::AiContext;
use crate::gamble::Adjacents;

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Fills the adjacent families used by extraction and the direct search.
    pub(crate) fn classify_adjacents(&mut self) {
        let grid = self.grid();
        let position = self.robot.position;
        let neighbours: Vec<_> = grid
            .adjacent(position)
            .into_iter()
            .filter(|(_, cell)| !Family::NeverTargeted.contains(cell.kind()))
            .collect();

        let mut adjacents = Adjacents {
            all: neighbours.iter().map(|(_, cell)| cell.position).collect(),
            ..Adjacents::default()
        };

        adjacents.first = match self.current_path().and_then(|path| path.next_after(position)) {
            Some(next) => vec![next],
            None => self
                .main_target_position()
                .map(|main| {
                    position
                        .directions_toward(main)
                        .into_iter()
                        .map(|direction| position.step(direction))
                        .filter(|p| adjacents.all.contains(p))
                        .collect()
                })
                .unwrap_or_default(),
        };

        adjacents.bonus = neighbours
            .iter()
            .filter(|(_, cell)| cell.kind() == CellKind::Bonus)
            .map(|(_, cell)| cell.position)
            .collect();

        let mut other: Vec<_> = neighbours
            .iter()
            .filter(|(_, cell)| !adjacents.first.contains(&cell.position))
            .map(|(direction, cell)| (self.gd.direction_score(*direction), cell.position))
            .collect();
        other.sort_by(|a, b| b.0.total_cmp(&a.0));
        adjacents.other = other.into_iter().map(|(_, p)| p).collect();

        adjacents.safe = adjacents
            .all
            .iter()
            .filter(|p| self.gd.recognition.safezone.contains(p))
            .copied()
            .collect();

        trace!(
            robot = %self.robot.uid,
            first = ?adjacents.first,
            other = ?adjacents.other,
            safe = adjacents.safe.len(),
            "adjacents classified"
        );
        self.gd.adjacents = adjacents;
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, Position, Robot, RobotId, Target};

    use super::*;
    use crate::memory::RobotMemory;

    #[test]
    fn test_first_adjacent_follows_main_target_vector() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        state.grid.set_cell(Cell::bonus(Position::new(1, 2)));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(4);
        let mut robot = state.robot(RobotId(1)).unwrap().clone();
        robot.main_target = Some(Target::new(Position::new(5, 1), CellKind::Empty));
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.classify_adjacents();

        let adjacents = &ctx.gd.adjacents;
        assert_eq!(adjacents.all.len(), 2);
        assert_eq!(adjacents.first, vec![Position::new(2, 1)]);
        assert_eq!(adjacents.bonus, vec![Position::new(1, 2)]);
        assert_eq!(adjacents.other, vec![Position::new(1, 2)]);
        assert_eq!(adjacents.safe.len(), 2);
    }
}
