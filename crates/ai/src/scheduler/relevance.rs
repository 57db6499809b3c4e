//! Secure completion, relevance and score of a planned sequence.

use std::collections::BTreeSet;

use maze_core::Family;
use maze_core::grid::shape;
use rand::Rng;

use crate::context::AiContext;
use crate::types::{PseudoActions, Relevance, SequenceName};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Fills the metadata of `sequence` and grades it.
    pub(crate) fn evaluate(&self, sequence: &mut PseudoActions) {
        let grid = self.grid();
        let recognition = &self.gd.recognition;
        let global = &self.gd.global;
        let me = &self.robot;
        let extra = self.max_actions().saturating_sub(sequence.gamble_count);

        sequence.known_dangers = global.dangers.clone();
        sequence.bonuses = sequence
            .cells
            .iter()
            .filter(|p| global.bonuses.contains(p))
            .count() as u32;
        sequence.attack_kills = sequence
            .killed
            .iter()
            .filter(|uid| recognition.attack_all.contains(uid))
            .count() as u32;
        sequence.defense_kills = sequence
            .killed
            .iter()
            .filter(|uid| recognition.defense_all.contains(uid))
            .count() as u32;

        let unsafe_zone = recognition.extended_unsafe(&sequence.killed, &sequence.cleared);
        let end = sequence.end;
        sequence.secure_stop = !unsafe_zone.contains(&end);
        sequence.secure_issue = sequence.secure_stop
            || shape::diamond_radius(end, extra).into_iter().any(|cell| {
                !unsafe_zone.contains(&cell)
                    && grid
                        .kind_at(cell)
                        .is_some_and(|kind| Family::Free.contains(kind))
            });

        let mut relevance = if (sequence.secure_stop && extra == 0)
            || (sequence.secure_issue && extra >= 2)
        {
            Relevance::Full
        } else if (sequence.ends_with_nomove() && sequence.secure_stop) || extra == 1 {
            Relevance::Marginal
        } else {
            Relevance::Unsafe
        };

        let starts = me.history.turn_starts().filter(|p| *p == end).count();
        let previous: BTreeSet<_> = me
            .history
            .previous_sequence()
            .map(|cells| cells.iter().copied().collect())
            .unwrap_or_default();
        let overlap = sequence.cells.iter().filter(|p| previous.contains(p)).count();
        sequence.loop_factor = (starts + overlap) as u32;
        if sequence.loop_factor > 0
            && relevance == Relevance::Full
            && sequence.name != SequenceName::FreeExit
        {
            relevance = Relevance::Marginal;
        }
        sequence.relevance = relevance;

        let progress = match self.main_target_position() {
            Some(main) => f64::from(me.position.path_length(main)) - f64::from(end.path_length(main)),
            None => sequence.cells.len() as f64,
        };
        let traits = &me.personality;
        sequence.score = progress * traits.efficiency
            + f64::from(sequence.bonuses) * traits.ambition
            + f64::from(sequence.attack_kills) * traits.aggressivity
            + f64::from(sequence.defense_kills) * traits.survival
            - f64::from(sequence.loop_factor);
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{CellKind, GameState, Grid, PcgRng, Position, Robot, RobotId};

    use super::*;
    use crate::memory::RobotMemory;
    use crate::types::PseudoAction;

    fn graded(step_index: u32, step_count: u32, moves: &[Position]) -> PseudoActions {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(Robot::builder(1, Position::new(2, 2)).speed(3).build())
            .unwrap();
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(1);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, step_index, step_count, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let mut sequence = PseudoActions::new(SequenceName::SafeMove, Position::new(2, 2));
        for p in moves {
            sequence.push(PseudoAction::goto(*p, CellKind::Empty, None));
        }
        ctx.evaluate(&mut sequence);
        sequence
    }

    #[test]
    fn test_safe_sequence_using_every_action_is_fully_relevant() {
        let sequence = graded(1, 2, &[Position::new(3, 2), Position::new(4, 2)]);
        assert!(sequence.secure_stop);
        assert_eq!(sequence.relevance, Relevance::Full);
    }

    #[test]
    fn test_one_spare_action_is_marginal() {
        let sequence = graded(1, 2, &[Position::new(3, 2)]);
        assert_eq!(sequence.relevance, Relevance::Marginal);
    }

    #[test]
    fn test_two_spare_actions_with_safe_issue_are_full() {
        let sequence = graded(1, 3, &[Position::new(3, 2)]);
        assert!(sequence.secure_issue);
        assert_eq!(sequence.relevance, Relevance::Full);
        assert!(sequence.score > 0.0);
    }
}
