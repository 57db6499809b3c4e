//! Direct command search.
//!
//! Runs when no planned sequence yields a command. Each behavior walks its
//! own objective order and stops at the first command that passes the
//! pre-check.

use maze_core::{Action, Behavior, CellKind, Family, Position, RobotId};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;
use crate::types::DirectObjective;

/// Objective order of the direct search.
pub(crate) fn direct_objectives(behavior: Behavior) -> &'static [DirectObjective] {
    use DirectObjective::*;
    match behavior {
        Behavior::Winner => &[Move, Attack, Defense, Random],
        Behavior::Hunter => &[Attack, Move, Random],
        Behavior::Builder | Behavior::Sapper => &[Work, Move, Random],
        Behavior::Tourist | Behavior::Random | Behavior::Human => &[Move, Random],
    }
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(crate) fn direct_search(&mut self) -> Option<String> {
        for objective in direct_objectives(self.robot.behavior) {
            let command = match objective {
                DirectObjective::Move => self.direct_move(),
                DirectObjective::Attack => {
                    let list = self.preferred(&self.gd.recognition.attack, &self.gd.recognition.attack_all);
                    self.direct_attack(&list)
                }
                DirectObjective::Defense => {
                    let list =
                        self.preferred(&self.gd.recognition.defense, &self.gd.recognition.defense_all);
                    self.direct_attack(&list)
                }
                DirectObjective::Work => {
                    self.build_aside(self.robot.behavior == Behavior::Sapper)
                }
                DirectObjective::Random => self.direct_random(),
            };
            if let Some(command) = command {
                trace!(robot = %self.robot.uid, %objective, %command, "direct command");
                return Some(command);
            }
        }
        None
    }

    fn preferred(&self, direct: &[RobotId], all: &[RobotId]) -> Vec<RobotId> {
        if direct.is_empty() && self.is_high(self.robot.personality.intelligence) {
            all.to_vec()
        } else {
            direct.to_vec()
        }
    }

    /// A step toward the target, a bonus, then anything free; a door when
    /// a wall stands on the way.
    fn direct_move(&self) -> Option<String> {
        let adjacents = &self.gd.adjacents;
        let position = self.robot.position;
        let grid = self.grid();
        let mut candidates: Vec<Position> = Vec::new();
        for cell in adjacents
            .first
            .iter()
            .chain(&adjacents.bonus)
            .chain(&adjacents.other)
        {
            if !candidates.contains(cell) {
                candidates.push(*cell);
            }
        }

        for cell in candidates {
            let Some(direction) = position.direction_to(cell) else {
                continue;
            };
            let Some(kind) = grid.kind_at(cell) else {
                continue;
            };
            if Family::Free.contains(kind) || kind == CellKind::Bonus || kind == CellKind::Exit {
                if let Some(command) = self.pre_check(&Action::step(direction)) {
                    return Some(command);
                }
            } else if kind == CellKind::Wall && adjacents.first.contains(&cell) {
                if let Some(command) = self.pre_check(&Action::door(direction)) {
                    return Some(command);
                }
            }
        }
        None
    }

    /// A kill on an adjacent robot of `list`, else a grenade on any of them.
    fn direct_attack(&mut self, list: &[RobotId]) -> Option<String> {
        let position = self.robot.position;
        let preys: Vec<Position> = list
            .iter()
            .filter_map(|uid| self.other(*uid))
            .filter(|robot| robot.alive)
            .map(|robot| robot.position)
            .collect();

        let kill = preys.iter().find_map(|prey| {
            position
                .direction_to(*prey)
                .and_then(|direction| self.pre_check(&Action::kill(direction)))
        });
        if kill.is_some() {
            return kill;
        }
        for prey in preys {
            let Some(choice) = self.grenade_params(prey, GrenadeFlags::attack()) else {
                continue;
            };
            if let Some(command) = self.pre_check_command(&choice.default.command) {
                return Some(command);
            }
        }
        None
    }

    fn direct_random(&mut self) -> Option<String> {
        let grid = self.grid();
        let position = self.robot.position;
        let mut free: Vec<Position> = self
            .gd
            .adjacents
            .all
            .iter()
            .filter(|p| grid.kind_at(**p).is_some_and(|kind| Family::Free.contains(kind)))
            .copied()
            .collect();
        free.shuffle(&mut *self.rng);
        free.into_iter()
            .filter_map(|p| position.direction_to(p))
            .find_map(|direction| self.pre_check(&Action::step(direction)))
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, Impact, PcgRng, Robot, Target};

    use super::*;
    use crate::memory::RobotMemory;

    fn prepared<'a>(
        state: &'a GameState,
        memory: &'a mut RobotMemory,
        rng: &'a mut PcgRng,
        main: Option<Target>,
    ) -> AiContext<'a, PcgRng> {
        let mut robot = state.robot(RobotId(1)).unwrap().clone();
        robot.main_target = main;
        let mut ctx = AiContext::new(state, robot, 1, 1, 1, memory, rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.classify_adjacents();
        ctx
    }

    #[test]
    fn test_objective_orders() {
        assert_eq!(
            direct_objectives(Behavior::Hunter).first(),
            Some(&DirectObjective::Attack)
        );
        assert_eq!(
            direct_objectives(Behavior::Sapper).first(),
            Some(&DirectObjective::Work)
        );
        assert_eq!(
            direct_objectives(Behavior::Winner).last(),
            Some(&DirectObjective::Random)
        );
    }

    #[test]
    fn test_winner_steps_toward_target() {
        let mut state = GameState::new(Grid::open(7, 5));
        state
            .add_robot(Robot::builder(1, Position::new(1, 2)).build())
            .unwrap();
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(2);
        let main = Target::new(Position::new(5, 2), CellKind::Empty);
        let mut ctx = prepared(&state, &mut memory, &mut rng, Some(main));
        assert_eq!(ctx.direct_search().as_deref(), Some("e1"));
    }

    #[test]
    fn test_wall_on_the_way_gets_a_door() {
        let mut state = GameState::new(Grid::open(7, 3));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        state.grid.set_cell(Cell::wall(Position::new(2, 1)));
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(2);
        let main = Target::new(Position::new(5, 1), CellKind::Empty);
        let mut ctx = prepared(&state, &mut memory, &mut rng, Some(main));
        assert_eq!(ctx.direct_search().as_deref(), Some("pe"));
    }

    #[test]
    fn test_sapper_plants_its_strongest_mine() {
        let mut state = GameState::new(Grid::open(5, 5));
        state
            .add_robot(
                Robot::builder(1, Position::new(2, 2))
                    .behavior(Behavior::Sapper)
                    .mine(Impact::SmallDiamond)
                    .build(),
            )
            .unwrap();
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(2);
        let mut ctx = prepared(&state, &mut memory, &mut rng, None);
        let command = ctx.direct_search().unwrap();
        assert!(command.starts_with('b'));
        assert!(command.ends_with(&Impact::SmallDiamond.value().to_string()));
    }
}
