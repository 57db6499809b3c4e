//! Danger factors between robots.
//!
//! The factor of a robot is an integer in `0..=4`:
//!
//! | factor | meaning |
//! |--------|---------|
//! | 0 | harmless |
//! | 1 | may defend itself |
//! | 2 | opportunist |
//! | 3 | aggressive, attacks on sight |
//! | 4 | certain attack (hunters) |

use std::collections::BTreeMap;

use super::{Behavior, Robot, Roster};
use crate::config::GameConfig;
use crate::grid::RobotId;

/// Danger factor of every robot, recomputed when traits or kill tallies change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DangerMatrix {
    factors: BTreeMap<RobotId, u8>,
}

impl DangerMatrix {
    pub fn new(roster: &Roster, config: &GameConfig) -> Self {
        let mut matrix = Self::default();
        matrix.recompute(roster, config);
        matrix
    }

    pub fn recompute(&mut self, roster: &Roster, config: &GameConfig) {
        self.factors = roster
            .iter()
            .map(|robot| (robot.uid, Self::factor_of(robot, config)))
            .collect();
    }

    /// Factor of one robot, 0 for unknown uids.
    pub fn factor(&self, uid: RobotId) -> u8 {
        self.factors.get(&uid).copied().unwrap_or(0)
    }

    pub fn factor_of(robot: &Robot, config: &GameConfig) -> u8 {
        let traits = &robot.personality;
        let base = match robot.behavior {
            Behavior::Hunter => return 4,
            Behavior::Human => 3,
            Behavior::Winner => {
                if config.is_high(traits.aggressivity) && config.is_mid(traits.ambition) {
                    3
                } else if config.is_mid(traits.aggressivity) {
                    2
                } else {
                    1
                }
            }
            Behavior::Random | Behavior::Tourist | Behavior::Builder | Behavior::Sapper => {
                u8::from(config.is_mid(traits.aggressivity))
            }
        };

        let terraformer = config.is_high(traits.aggressivity)
            && robot.equipment.has_grenade
            && config.is_mid(traits.efficiency);
        if terraformer || robot.history.kills_innocent > 0 {
            base.max(3)
        } else {
            base
        }
    }
}

/// Returns true when `attacker` is willing to attack `defender`.
///
/// Decided from the danger factors only, never from reach.
pub fn may_attack(
    matrix: &DangerMatrix,
    attacker: &Robot,
    defender: &Robot,
    config: &GameConfig,
) -> bool {
    if attacker.uid == defender.uid {
        return false;
    }
    let own = matrix.factor(attacker.uid);
    let other = matrix.factor(defender.uid);
    let survival = attacker.personality.survival;

    own >= 3
        || (config.is_mid(survival) && other == 4)
        || (config.is_high(survival) && other == 3)
        || (other >= 3 && own >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    fn roster(robots: Vec<Robot>) -> Roster {
        let mut roster = Roster::new();
        for robot in robots {
            roster.insert(robot);
        }
        roster
    }

    #[test]
    fn test_hunter_always_attacks() {
        let config = GameConfig::default();
        let hunter = Robot::builder(1, Position::new(1, 1))
            .behavior(Behavior::Hunter)
            .build();
        let tourist = Robot::builder(2, Position::new(2, 1))
            .behavior(Behavior::Tourist)
            .aggressivity(0.1)
            .survival(0.1)
            .build();
        let matrix = DangerMatrix::new(&roster(vec![hunter.clone(), tourist.clone()]), &config);

        assert_eq!(matrix.factor(hunter.uid), 4);
        assert_eq!(matrix.factor(tourist.uid), 0);
        assert!(may_attack(&matrix, &hunter, &tourist, &config));
        assert!(!may_attack(&matrix, &tourist, &hunter, &config));
    }

    #[test]
    fn test_survival_turns_into_defense() {
        let config = GameConfig::default();
        let hunter = Robot::builder(1, Position::new(1, 1))
            .behavior(Behavior::Hunter)
            .build();
        let winner = Robot::builder(2, Position::new(2, 1))
            .aggressivity(0.1)
            .survival(0.6)
            .build();
        let matrix = DangerMatrix::new(&roster(vec![hunter.clone(), winner.clone()]), &config);
        assert!(may_attack(&matrix, &winner, &hunter, &config));
    }

    #[test]
    fn test_aggressive_winner_is_factor_three() {
        let config = GameConfig::default();
        let winner = Robot::builder(1, Position::new(1, 1))
            .aggressivity(0.8)
            .build();
        assert_eq!(DangerMatrix::factor_of(&winner, &config), 3);

        let mut calm = Robot::builder(2, Position::new(1, 1))
            .behavior(Behavior::Builder)
            .aggressivity(0.2)
            .build();
        assert_eq!(DangerMatrix::factor_of(&calm, &config), 0);
        calm.history.kills_innocent = 1;
        assert_eq!(DangerMatrix::factor_of(&calm, &config), 3);
    }
}
