//! Attack sequences.

use maze_core::{Action, Family, Position, RobotId, TargetPath};
use rand::Rng;
use tracing::trace;

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;
use crate::types::{Objective, PseudoAction, PseudoActions, SequenceName};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// One attack sequence per reachable robot of `list`.
    pub(crate) fn scheduled_attacks(
        &mut self,
        list: &[RobotId],
        objective: Objective,
        name: SequenceName,
    ) -> Vec<PseudoActions> {
        list.iter()
            .filter_map(|uid| self.scheduled_attack(*uid, objective, name))
            .collect()
    }

    /// Kill `uid` this turn: in place, with a grenade, or after a short walk.
    pub(crate) fn scheduled_attack(
        &mut self,
        uid: RobotId,
        objective: Objective,
        name: SequenceName,
    ) -> Option<PseudoActions> {
        let prey = self.other(uid).filter(|prey| prey.alive)?;
        let position = self.robot.position;
        let mut sequence = PseudoActions::new(name, position).with_context(objective);

        if let Some(direction) = position.direction_to(prey.position) {
            let command = self.pre_check(&Action::kill(direction))?;
            sequence.push(PseudoAction::Kill { command });
            sequence.killed.push(uid);
        } else if let Some(choice) = self.grenade_params(prey.position, GrenadeFlags::attack()) {
            let combo = choice.default;
            sequence.push(PseudoAction::Grenade {
                command: combo.command,
            });
            sequence.cleared.extend(combo.cleared);
            sequence.killed = combo.kills;
        } else {
            let budget = self.max_actions().saturating_sub(1) as usize;
            if budget == 0 {
                return None;
            }
            let (path, spot) = self.approach(prey.position, budget)?;
            let direction = spot.direction_to(prey.position)?;
            self.push_gotos(&mut sequence, &path, budget);
            let command = self.state.alphabet.format_action(&Action::kill(direction));
            sequence.push(PseudoAction::Kill { command });
            sequence.killed.push(uid);
        }

        self.evaluate(&mut sequence);
        trace!(
            robot = %self.robot.uid,
            prey = %uid,
            relevance = %sequence.relevance,
            score = sequence.score,
            "attack scheduled"
        );
        Some(sequence)
    }

    /// Shortest walk of at most `budget` moves to a free cell next to `prey`.
    fn approach(&mut self, prey: Position, budget: usize) -> Option<(TargetPath, Position)> {
        let position = self.robot.position;
        let mut spots: Vec<Position> = self
            .grid()
            .adjacent(prey)
            .into_iter()
            .filter(|(_, cell)| Family::Free.contains(cell.kind()))
            .map(|(_, cell)| cell.position)
            .collect();
        spots.sort_by_key(|spot| spot.path_length(position));

        for spot in spots {
            if spot.path_length(position) as usize > budget {
                break;
            }
            if let Some(path) = self.search_path(position, spot, true).path {
                if path.len() <= budget {
                    return Some((path, spot));
                }
            }
        }
        None
    }

    /// Appends a goto per path cell after the start, at most `limit` of them.
    pub(crate) fn push_gotos(&self, sequence: &mut PseudoActions, path: &TargetPath, limit: usize) {
        let grid = self.grid();
        for cell in path.cells.iter().skip(1).take(limit) {
            let (kind, impact) = grid
                .cell(*cell)
                .map(|c| (c.kind(), c.impact()))
                .unwrap_or((maze_core::CellKind::Empty, None));
            sequence.push(PseudoAction::goto(*cell, kind, impact));
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Behavior, GameState, Grid, PcgRng, Robot};

    use super::*;
    use crate::memory::RobotMemory;

    #[test]
    fn test_walk_then_kill() {
        let mut state = GameState::new(Grid::open(9, 5));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 2))
                    .behavior(Behavior::Hunter)
                    .speed(3)
                    .build(),
            )
            .unwrap();
        state
            .add_robot(Robot::builder(2, Position::new(4, 2)).build())
            .unwrap();

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(1);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 3, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let sequence = ctx
            .scheduled_attack(RobotId(2), Objective::Attack, SequenceName::ScheduledAttack)
            .unwrap();
        assert_eq!(sequence.gamble_count, 3);
        assert_eq!(sequence.end, Position::new(3, 2));
        assert_eq!(
            sequence.actions.back(),
            Some(&PseudoAction::Kill {
                command: "ke".to_string()
            })
        );
        assert_eq!(sequence.killed, vec![RobotId(2)]);
        assert_eq!(sequence.attack_kills, 1);
    }

    #[test]
    fn test_adjacent_prey_is_killed_in_place() {
        let mut state = GameState::new(Grid::open(5, 5));
        state
            .add_robot(Robot::builder(1, Position::new(2, 2)).aggressivity(0.8).build())
            .unwrap();
        state
            .add_robot(
                Robot::builder(2, Position::new(2, 1))
                    .behavior(Behavior::Hunter)
                    .build(),
            )
            .unwrap();

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(1);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let sequence = ctx
            .scheduled_attack(RobotId(2), Objective::Defense, SequenceName::ScheduledAttack)
            .unwrap();
        assert_eq!(sequence.gamble_count, 1);
        assert_eq!(sequence.end, Position::new(2, 2));
        assert_eq!(sequence.defense_kills, 1);
    }
}
