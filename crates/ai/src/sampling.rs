//! Directional sampling and scoring.
//!
//! For each of the four directions the robot looks at a rectangle that
//! starts one cell away and extends `depth` cells along the direction and
//! `width` cells across it. Every cell of the rectangle's inner face is the
//! origin of a lane running along the direction; a lane yields one
//! [`Sample`], the candidate temp target being the last free cell of the
//! lane.
//!
//! # Scoring profiles
//!
//! Two linear profiles turn the counts into a score:
//!
//! - **Default**: balances progress (`avance`) against dangers and threats
//!   according to every personality trait.
//! - **Bonus hunt**: used while the robot needs bonuses; bonuses dominate,
//!   quadratically.

use maze_core::{CellKind, Direction, Family, Personality, Position};
use rand::Rng;
use tracing::trace;

use crate::context::AiContext;
use crate::gamble::{Cumulants, DirectionSample, FamilyCounts, Sample};

/// Which linear profile scores the samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScoringProfile {
    Default,
    BonusHunt,
}

/// Inputs of a scoring profile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Features {
    pub counts: FamilyCounts,
    pub avance: f64,
    pub first_impact: u32,
    pub cumulated_impact: u32,
}

impl ScoringProfile {
    pub fn score(self, features: &Features, traits: &Personality) -> f64 {
        let counts = &features.counts;
        let bonuses = f64::from(counts.bonuses);
        let defense = f64::from(counts.defense);
        let first = f64::from(features.first_impact);
        let cumulated = f64::from(features.cumulated_impact);
        match self {
            ScoringProfile::Default => {
                traits.efficiency * features.avance
                    - traits.survival * (first + cumulated.sqrt())
                    - traits.survival * defense
                    + traits.aggressivity * f64::from(counts.attack)
                    + traits.ambition * (features.avance + bonuses)
                    + traits.curiosity * (bonuses + f64::from(counts.enemies))
                    + traits.intelligence * (bonuses + f64::from(counts.free) - defense)
            }
            ScoringProfile::BonusHunt => {
                (traits.ambition + traits.efficiency + traits.intelligence)
                    * (1.0 + bonuses).powi(2)
                    + traits.efficiency * features.avance
                    - traits.survival * (first.sqrt() + cumulated)
            }
        }
    }
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub fn scoring_profile(&self) -> ScoringProfile {
        if self.robot.need_bonus {
            ScoringProfile::BonusHunt
        } else {
            ScoringProfile::Default
        }
    }

    /// Samples and scores the four directions.
    pub(crate) fn score_samples(&mut self) {
        let profile = self.scoring_profile();
        let directions: Vec<DirectionSample> = Direction::ALL
            .into_iter()
            .map(|direction| self.sample_direction(direction, profile))
            .collect();
        for sample in &directions {
            trace!(
                robot = %self.robot.uid,
                direction = ?sample.direction,
                samples = sample.samples.len(),
                score = sample.score,
                "direction scored"
            );
        }
        self.gd.directions = directions;
    }

    fn sample_direction(&self, direction: Direction, profile: ScoringProfile) -> DirectionSample {
        let size = self.config.sample_size(self.robot.personality.intelligence);
        let position = self.robot.position;
        let face = position.step(direction);
        let half = (size.width / 2) as i32;
        let across = direction.perpendiculars()[0];

        let mut samples = Vec::new();
        for offset in -half..=half {
            let origin = face.offset(across, offset);
            if !self.gd.global.play_set.contains(&origin) {
                continue;
            }
            let lane: Vec<Position> = (0..size.depth as i32)
                .map(|k| origin.offset(direction, k))
                .filter(|p| self.grid().contains(*p))
                .collect();
            samples.push(self.sample_lane(direction, origin, lane, profile));
        }

        let mut counts = FamilyCounts::default();
        let mut features = Features::default();
        for sample in &samples {
            counts.merge(&sample.counts);
            features.avance += sample.avance;
            features.first_impact = features.first_impact.max(sample.first_impact);
            features.cumulated_impact += sample.cumulated_impact;
        }
        let score = if samples.is_empty() {
            f64::MIN
        } else {
            features.counts = counts;
            features.avance /= samples.len() as f64;
            profile.score(&features, &self.robot.personality)
        };

        DirectionSample {
            direction,
            samples,
            counts,
            score,
        }
    }

    fn sample_lane(
        &self,
        direction: Direction,
        origin: Position,
        lane: Vec<Position>,
        profile: ScoringProfile,
    ) -> Sample {
        let grid = self.grid();
        let recognition = &self.gd.recognition;
        let me = self.robot.position;

        let mut counts = FamilyCounts::default();
        let mut cumulants = Cumulants::default();
        let mut first_impact = 0;
        let mut cumulated_impact = 0;
        let mut free_run = 0;
        let mut last_free = None;
        let mut running = true;

        for cell in lane.iter().filter_map(|p| grid.cell(*p)) {
            let kind = cell.kind();
            let distance = me.distance(cell.position).max(1.0);
            let free = Family::Free.contains(kind);
            if running && free {
                free_run += 1;
                last_free = Some(cell.position);
            } else {
                running = false;
            }

            match kind {
                CellKind::Danger => {
                    counts.dangers += 1;
                    let impact = cell.impact().map_or(1, |impact| impact.value());
                    if first_impact == 0 {
                        first_impact = impact;
                    }
                    cumulated_impact += impact;
                    cumulants.dangers += f64::from(impact).sqrt() / distance;
                }
                CellKind::Robot => {
                    if let Some(uid) = cell.robot_id() {
                        if recognition.kill_all.contains(&uid) {
                            counts.enemies += 1;
                            cumulants.enemies += 1.0 / distance;
                        }
                        if recognition.attack_all.contains(&uid) {
                            counts.attack += 1;
                        }
                        if recognition.defense_all.contains(&uid) {
                            counts.defense += 1;
                        }
                    }
                }
                CellKind::Bonus => {
                    counts.bonuses += 1;
                    counts.free += 1;
                    cumulants.bonuses += 1.0 / distance;
                }
                CellKind::Wall => {
                    counts.walls += 1;
                    cumulants.walls += 1.0 / distance;
                }
                CellKind::PerimeterWall => counts.no_action += 1,
                _ if free => counts.free += 1,
                _ => counts.no_action += 1,
            }
        }

        let candidate = last_free.unwrap_or(origin);
        let delta_main = match self.main_target_position() {
            Some(main) => {
                let toward = me.directions_toward(main).contains(&direction);
                let sign = if toward { -1 } else { 1 };
                sign + candidate.path_length(main) as i32 - me.path_length(main) as i32
            }
            None => 0,
        };
        let avance = f64::from(free_run) - f64::from(delta_main);
        let features = Features {
            counts,
            avance,
            first_impact,
            cumulated_impact,
        };
        let score = profile.score(&features, &self.robot.personality);

        Sample {
            direction,
            origin,
            position: candidate,
            lane,
            counts,
            cumulants,
            distance: me.distance(candidate),
            first_impact,
            cumulated_impact,
            free_run,
            last_free,
            delta_main,
            avance,
            score,
            path: None,
        }
    }
}
