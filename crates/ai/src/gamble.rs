//! The gamble data set: scratchpad of one atomic step.
//!
//! Everything here is rebuilt at the start of each call to
//! [`crate::DecisionEngine::compute_command`]. Data that must survive from
//! one step to the next lives in [`crate::memory::RobotMemory`].

use std::collections::{BTreeMap, BTreeSet};

use maze_core::{Cell, Direction, Position, RobotId, TargetPath};

use crate::types::PseudoActions;

/// Phases of one atomic step, in contract order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    #[default]
    InitTurn,
    RecognizeArea,
    MaintainTargets,
    ScoreSamples,
    SelectTempTarget,
    ClassifyAdjacents,
    Schedule,
    EmitCommand,
    Apply,
    Post,
}

/// Board-wide sets refreshed once per atomic step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalSets {
    pub alive: Vec<RobotId>,
    pub human_alive: bool,
    pub winner_alive: bool,
    pub hunter_alive: bool,
    pub winner_human_alive: bool,
    pub winner_human_hunter_alive: bool,
    pub dangers: BTreeSet<Position>,
    /// Dangers of impact 1.
    pub dangers_point: BTreeSet<Position>,
    /// Dangers of impact above 1.
    pub dangers_large: BTreeSet<Position>,
    pub bonuses: BTreeSet<Position>,
    pub play_set: BTreeSet<Position>,
}

/// What the robot knows about its surroundings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recognition {
    /// Robots the robot is willing to attack and can reach this turn.
    pub attack: Vec<RobotId>,
    pub attack_all: Vec<RobotId>,
    /// Robots willing to attack the robot and able to reach its move zone.
    pub defense: Vec<RobotId>,
    pub defense_all: Vec<RobotId>,
    pub kill_all: BTreeSet<RobotId>,
    pub safezone: BTreeSet<Position>,
    pub real_safezone: BTreeSet<Position>,
    /// Full-turn attack zone of every robot of `defense_all`.
    pub threats: BTreeMap<RobotId, BTreeSet<Position>>,
    /// Blast footprint, center included, of every danger near the move zone.
    pub danger_zones: BTreeMap<Position, BTreeSet<Position>>,
    /// Dangers whose direct detonation would hit the robot.
    pub dangers: Vec<Cell>,
    pub bonuses: Vec<Position>,
}

impl Recognition {
    /// Cells still hit once the `spared` robots are dead and the `cleared`
    /// dangers are gone.
    pub fn extended_unsafe(
        &self,
        spared: &[RobotId],
        cleared: &BTreeSet<Position>,
    ) -> BTreeSet<Position> {
        let mut zone: BTreeSet<Position> = self
            .threats
            .iter()
            .filter(|(uid, _)| !spared.contains(uid))
            .flat_map(|(_, cells)| cells.iter().copied())
            .collect();
        for (danger, footprint) in &self.danger_zones {
            if !cleared.contains(danger) {
                zone.extend(footprint.iter().copied());
            }
        }
        zone
    }

    /// The safezone the robot actually trusts.
    pub fn trusted_safezone(&self) -> &BTreeSet<Position> {
        &self.real_safezone
    }

    pub fn enemies(&self) -> impl Iterator<Item = RobotId> + '_ {
        self.kill_all.iter().copied()
    }
}

/// Cell counts per family over a lane or a whole sampling rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FamilyCounts {
    pub free: u32,
    pub dangers: u32,
    pub enemies: u32,
    pub attack: u32,
    pub defense: u32,
    pub bonuses: u32,
    pub walls: u32,
    pub no_action: u32,
}

impl FamilyCounts {
    pub fn merge(&mut self, other: &FamilyCounts) {
        self.free += other.free;
        self.dangers += other.dangers;
        self.enemies += other.enemies;
        self.attack += other.attack;
        self.defense += other.defense;
        self.bonuses += other.bonuses;
        self.walls += other.walls;
        self.no_action += other.no_action;
    }
}

/// Distance-weighted sums, `weight(c) / distance(robot, c)` per family.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cumulants {
    pub dangers: f64,
    pub enemies: f64,
    pub bonuses: f64,
    pub walls: f64,
}

/// One sampling point of one direction.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub direction: Direction,
    /// Point on the inner face of the sampling rectangle.
    pub origin: Position,
    /// Candidate temp target: the last free cell of the lane, or the origin.
    pub position: Position,
    pub lane: Vec<Position>,
    pub counts: FamilyCounts,
    pub cumulants: Cumulants,
    pub distance: f64,
    pub first_impact: u32,
    pub cumulated_impact: u32,
    /// Consecutive free cells from the origin along the axis.
    pub free_run: u32,
    pub last_free: Option<Position>,
    pub delta_main: i32,
    pub avance: f64,
    pub score: f64,
    pub path: Option<TargetPath>,
}

/// The samples of one direction and their aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionSample {
    pub direction: Direction,
    pub samples: Vec<Sample>,
    pub counts: FamilyCounts,
    pub score: f64,
}

/// Named adjacent-cell lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Adjacents {
    pub all: Vec<Position>,
    /// Next cell toward the target.
    pub first: Vec<Position>,
    pub bonus: Vec<Position>,
    /// Remaining adjacents, best direction first.
    pub other: Vec<Position>,
    pub safe: Vec<Position>,
}

/// Scratchpad of one atomic step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GambleData {
    pub turn_id: u64,
    pub step_index: u32,
    pub stage: Stage,
    pub global: GlobalSets,
    pub recognition: Recognition,
    pub directions: Vec<DirectionSample>,
    pub adjacents: Adjacents,
    /// Sequence committed on this step, if the planner ran.
    pub chosen: Option<PseudoActions>,
    /// Command emitted on this step.
    pub command: Option<String>,
}

impl GambleData {
    pub fn new(turn_id: u64, step_index: u32) -> Self {
        Self {
            turn_id,
            step_index,
            ..Self::default()
        }
    }

    pub fn direction(&self, direction: Direction) -> Option<&DirectionSample> {
        self.directions.iter().find(|d| d.direction == direction)
    }

    /// Score of the direction leading to an adjacent cell.
    pub fn direction_score(&self, direction: Direction) -> f64 {
        self.direction(direction).map_or(0.0, |d| d.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_unsafe_skips_spared_robots() {
        let mut recognition = Recognition::default();
        recognition
            .threats
            .insert(RobotId(2), [Position::new(1, 1)].into_iter().collect());
        recognition
            .threats
            .insert(RobotId(3), [Position::new(2, 2)].into_iter().collect());
        recognition.danger_zones.insert(
            Position::new(4, 4),
            [Position::new(4, 4), Position::new(4, 5)].into_iter().collect(),
        );

        let zone = recognition.extended_unsafe(&[RobotId(2)], &BTreeSet::new());
        assert!(!zone.contains(&Position::new(1, 1)));
        assert!(zone.contains(&Position::new(2, 2)));
        assert!(zone.contains(&Position::new(4, 5)));

        let cleared: BTreeSet<Position> = [Position::new(4, 4)].into_iter().collect();
        let zone = recognition.extended_unsafe(&[], &cleared);
        assert!(!zone.contains(&Position::new(4, 5)));
        assert!(zone.contains(&Position::new(1, 1)));
    }

    #[test]
    fn test_stage_order_is_contract_order() {
        assert!(Stage::InitTurn < Stage::RecognizeArea);
        assert!(Stage::ClassifyAdjacents < Stage::Schedule);
        assert!(Stage::EmitCommand < Stage::Post);
    }
}
