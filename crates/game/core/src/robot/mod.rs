//! Robot records and the roster.
//!
//! A [`Robot`] carries everything the validator and the decision engine need
//! to know about one player: position, behavior, equipment, personality,
//! targets and history. The grid only stores a robot cell holding the uid;
//! the roster is the authority for everything else.

mod danger;
mod history;
mod roster;
mod target;

use std::collections::BTreeSet;

pub use danger::{DangerMatrix, may_attack};
pub use history::{ActionRecord, History};
pub use roster::Roster;
pub use target::{Target, TargetPath};

use crate::config::GameConfig;
use crate::grid::{AttackProfile, Grid, Impact, Position, RobotId};

/// Behavior class of a robot.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Behavior {
    /// Races to the exit.
    #[default]
    Winner,
    /// Hunts the other robots, mainly winners and humans.
    Hunter,
    /// Wanders toward random cells.
    Random,
    /// Visits random cells of the inner board.
    Tourist,
    /// Builds walls where walls are scarce.
    Builder,
    /// Plants mines where mines are scarce.
    Sapper,
    /// Driven by a human player, never automated.
    Human,
}

impl Behavior {
    /// Behaviors that play for the exit.
    pub const fn is_potential_winner(self) -> bool {
        matches!(self, Behavior::Winner | Behavior::Human)
    }

    pub const fn is_automated(self) -> bool {
        !matches!(self, Behavior::Human)
    }
}

/// Stage of the match as seen by one robot.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    #[default]
    Start,
    InProgress,
    Approach,
    Final,
    Hunt,
}

impl GamePhase {
    /// Close to the exit.
    pub const fn is_closing_in(self) -> bool {
        matches!(self, GamePhase::Approach | GamePhase::Final)
    }
}

/// How a robot treats the bonuses of the board.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BonusStrategy {
    #[default]
    Ignore,
    /// Only bonuses that do not deviate from the current target.
    BonusTarget,
    BonusAll,
}

/// Personality scalars, all in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Personality {
    pub intelligence: f64,
    pub ambition: f64,
    pub survival: f64,
    pub curiosity: f64,
    pub aggressivity: f64,
    pub efficiency: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            intelligence: 0.5,
            ambition: 0.5,
            survival: 0.5,
            curiosity: 0.5,
            aggressivity: 0.5,
            efficiency: 0.5,
        }
    }
}

/// Offensive and building equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub has_mine: bool,
    pub has_grenade: bool,
    pub mine_power: Impact,
    pub grenade_power: Impact,
    pub grenade_range: u32,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            has_mine: false,
            has_grenade: false,
            mine_power: Impact::Point,
            grenade_power: Impact::Point,
            grenade_range: 1,
        }
    }
}

impl Equipment {
    /// Grenade powers the robot may throw, weakest first.
    pub fn grenade_powers(&self) -> Vec<Impact> {
        if self.has_grenade {
            self.grenade_power.up_to().collect()
        } else {
            Vec::new()
        }
    }

    /// Mine powers the robot may plant, weakest first.
    pub fn mine_powers(&self) -> Vec<Impact> {
        if self.has_mine {
            self.mine_power.up_to().collect()
        } else {
            Vec::new()
        }
    }
}

/// Complete robot record.
///
/// # Invariants
///
/// - `current_speed <= speed` outside of a turn in progress
/// - `move_zone` and `attack_zone` describe the last refresh, not the live board
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Robot {
    pub uid: RobotId,
    pub position: Position,
    pub alive: bool,
    pub behavior: Behavior,
    /// Actions per turn.
    pub speed: u32,
    /// Actions left in the current turn.
    pub current_speed: u32,
    pub turns_played: u32,
    pub actions_played: u32,
    pub equipment: Equipment,
    pub personality: Personality,
    pub main_target: Option<Target>,
    pub temp_target: Option<Target>,
    pub game_phase: GamePhase,
    pub bonus_strategy: BonusStrategy,
    pub need_bonus: bool,
    pub history: History,
    pub move_zone: BTreeSet<Position>,
    pub attack_zone: BTreeSet<Position>,
}

impl Robot {
    pub fn builder(uid: u32, position: Position) -> RobotBuilder {
        RobotBuilder::new(RobotId(uid), position)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Offensive profile at the current position with the remaining speed.
    pub fn attack_profile(&self) -> AttackProfile {
        self.profile_with_speed(self.current_speed)
    }

    /// Offensive profile for a full turn.
    pub fn turn_profile(&self) -> AttackProfile {
        self.profile_with_speed(self.speed)
    }

    fn profile_with_speed(&self, speed: u32) -> AttackProfile {
        let profile = AttackProfile::new(self.position, speed);
        if self.equipment.has_grenade {
            profile.with_grenade(self.equipment.grenade_power, self.equipment.grenade_range)
        } else {
            profile
        }
    }

    /// Recomputes the move and attack zones against `grid`.
    pub fn refresh_zones(&mut self, grid: &Grid) {
        self.move_zone = grid.move_zone(self.position, self.current_speed);
        self.attack_zone = grid.attack_zone(&self.attack_profile());
    }

    /// Grants a bonus: a grenade if none, else range, else power, else a mine.
    pub fn claim_bonus(&mut self, config: &GameConfig) {
        let equipment = &mut self.equipment;
        if !equipment.has_grenade {
            equipment.has_grenade = true;
        } else if equipment.grenade_range < config.max_grenade_range {
            equipment.grenade_range += 1;
        } else if let Some(stronger) = equipment.grenade_power.stronger() {
            equipment.grenade_power = stronger;
        } else if !equipment.has_mine {
            equipment.has_mine = true;
        } else if let Some(stronger) = equipment.mine_power.stronger() {
            equipment.mine_power = stronger;
        }
    }
}

/// Builder for robot records.
///
/// Defaults: a Winner with speed 1, no equipment and every trait at 0.5.
#[derive(Clone, Debug)]
pub struct RobotBuilder {
    robot: Robot,
}

impl RobotBuilder {
    fn new(uid: RobotId, position: Position) -> Self {
        Self {
            robot: Robot {
                uid,
                position,
                alive: true,
                behavior: Behavior::default(),
                speed: 1,
                current_speed: 1,
                turns_played: 0,
                actions_played: 0,
                equipment: Equipment::default(),
                personality: Personality::default(),
                main_target: None,
                temp_target: None,
                game_phase: GamePhase::default(),
                bonus_strategy: BonusStrategy::default(),
                need_bonus: false,
                history: History::default(),
                move_zone: BTreeSet::new(),
                attack_zone: BTreeSet::new(),
            },
        }
    }

    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.robot.behavior = behavior;
        self
    }

    pub fn speed(mut self, speed: u32) -> Self {
        self.robot.speed = speed;
        self.robot.current_speed = speed;
        self
    }

    pub fn grenade(mut self, power: Impact, range: u32) -> Self {
        self.robot.equipment.has_grenade = true;
        self.robot.equipment.grenade_power = power;
        self.robot.equipment.grenade_range = range;
        self
    }

    pub fn mine(mut self, power: Impact) -> Self {
        self.robot.equipment.has_mine = true;
        self.robot.equipment.mine_power = power;
        self
    }

    pub fn personality(mut self, personality: Personality) -> Self {
        self.robot.personality = personality;
        self
    }

    pub fn intelligence(mut self, value: f64) -> Self {
        self.robot.personality.intelligence = value;
        self
    }

    pub fn ambition(mut self, value: f64) -> Self {
        self.robot.personality.ambition = value;
        self
    }

    pub fn survival(mut self, value: f64) -> Self {
        self.robot.personality.survival = value;
        self
    }

    pub fn curiosity(mut self, value: f64) -> Self {
        self.robot.personality.curiosity = value;
        self
    }

    pub fn aggressivity(mut self, value: f64) -> Self {
        self.robot.personality.aggressivity = value;
        self
    }

    pub fn efficiency(mut self, value: f64) -> Self {
        self.robot.personality.efficiency = value;
        self
    }

    pub fn build(self) -> Robot {
        self.robot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let robot = Robot::builder(1, Position::new(2, 2)).build();
        assert_eq!(robot.behavior, Behavior::Winner);
        assert_eq!(robot.speed, 1);
        assert!(robot.equipment.grenade_powers().is_empty());
        assert_eq!(robot.personality.survival, 0.5);
    }

    #[test]
    fn test_claim_bonus_upgrade_order() {
        let config = GameConfig::default();
        let mut robot = Robot::builder(1, Position::new(1, 1)).build();
        robot.claim_bonus(&config);
        assert!(robot.equipment.has_grenade);
        assert_eq!(robot.equipment.grenade_range, 1);
        robot.claim_bonus(&config);
        assert_eq!(robot.equipment.grenade_range, 2);

        robot.equipment.grenade_range = config.max_grenade_range;
        robot.claim_bonus(&config);
        assert_eq!(robot.equipment.grenade_power, Impact::SmallDiamond);
    }

    #[test]
    fn test_behavior_parses_case_insensitively() {
        assert_eq!("HUNTER".parse::<Behavior>().unwrap(), Behavior::Hunter);
        assert_eq!(Behavior::Sapper.as_ref(), "sapper");
    }
}
