//! Objective ordering and planning possibilities.

use maze_core::{Behavior, RobotId};
use rand::Rng;
use tracing::debug;

use crate::context::AiContext;
use crate::types::Objective;

/// What the robot can plan for on this step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Possibilities {
    pub safe_move: bool,
    pub defense_needed: bool,
    pub attack_possible: bool,
    pub attack_list: Vec<RobotId>,
    pub defense_list: Vec<RobotId>,
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Objectives of the turn, most important first.
    pub(crate) fn order_objectives(&self) -> Vec<Objective> {
        use Objective::{Attack, Defense, Move};

        let traits = &self.robot.personality;
        let objectives = if !self.is_mid(traits.aggressivity) {
            if self.is_high(traits.survival) {
                vec![Defense, Move]
            } else if self.is_mid(traits.survival) {
                vec![Move, Defense]
            } else {
                vec![Move]
            }
        } else if self.is_high(traits.aggressivity) {
            if self.is_mid(traits.survival) {
                vec![Attack, Defense, Move]
            } else {
                vec![Attack, Move]
            }
        } else if self.attack_has_priority()
            || traits.aggressivity + traits.ambition > traits.intelligence + traits.survival
        {
            vec![Attack, Move, Defense]
        } else {
            vec![Move, Defense, Attack]
        };
        debug!(robot = %self.robot.uid, ?objectives, "objectives ordered");
        objectives
    }

    /// A winner whose opponent closes in, or a hunter whose prey is in range.
    fn attack_has_priority(&self) -> bool {
        let recognition = &self.gd.recognition;
        match self.robot.behavior {
            Behavior::Winner => recognition
                .attack_all
                .iter()
                .filter_map(|uid| self.other(*uid))
                .any(|other| other.behavior.is_potential_winner() && other.game_phase.is_closing_in()),
            Behavior::Hunter => self
                .robot
                .main_target
                .as_ref()
                .and_then(|target| target.robot)
                .is_some_and(|prey| recognition.attack.contains(&prey)),
            _ => false,
        }
    }

    pub(crate) fn possibilities(&self) -> Possibilities {
        let recognition = &self.gd.recognition;
        let indirect = self.is_high(self.robot.personality.intelligence);

        let mut attack_list = recognition.attack.clone();
        if attack_list.is_empty() && indirect {
            attack_list = recognition.attack_all.clone();
        }
        let mut defense_list = recognition.defense.clone();
        if defense_list.is_empty() && indirect {
            defense_list = recognition.defense_all.clone();
        }

        Possibilities {
            safe_move: !recognition.trusted_safezone().is_empty(),
            defense_needed: !recognition.defense.is_empty(),
            attack_possible: !attack_list.is_empty(),
            attack_list,
            defense_list,
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{GameState, Grid, PcgRng, Position, Robot};

    use super::*;
    use crate::memory::RobotMemory;

    fn objectives_of(robot: Robot) -> Vec<Objective> {
        let mut state = GameState::new(Grid::open(7, 7));
        state.add_robot(robot).unwrap();
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(1);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(&state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.order_objectives()
    }

    #[test]
    fn test_timid_survivor_defends_first() {
        let robot = Robot::builder(1, Position::new(1, 1))
            .aggressivity(0.2)
            .survival(0.9)
            .build();
        assert_eq!(objectives_of(robot), vec![Objective::Defense, Objective::Move]);
    }

    #[test]
    fn test_fierce_robot_attacks_first() {
        let robot = Robot::builder(1, Position::new(1, 1))
            .aggressivity(0.9)
            .survival(0.2)
            .build();
        assert_eq!(objectives_of(robot), vec![Objective::Attack, Objective::Move]);
    }

    #[test]
    fn test_balanced_robot_compares_traits() {
        let cautious = Robot::builder(1, Position::new(1, 1))
            .aggressivity(0.5)
            .ambition(0.2)
            .intelligence(0.6)
            .survival(0.6)
            .build();
        assert_eq!(
            objectives_of(cautious),
            vec![Objective::Move, Objective::Defense, Objective::Attack]
        );
        let bold = Robot::builder(1, Position::new(1, 1))
            .aggressivity(0.6)
            .ambition(0.6)
            .intelligence(0.5)
            .survival(0.5)
            .build();
        assert_eq!(
            objectives_of(bold),
            vec![Objective::Attack, Objective::Move, Objective::Defense]
        );
    }
}
