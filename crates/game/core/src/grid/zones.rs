//! Per-robot reachability: move zone, attack zone and grenade reach.

use std::collections::{BTreeMap, BTreeSet};

use super::{CellKind, Direction, Grid, Impact, Position, shape};

/// Offensive capacity of a robot, detached from the robot record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackProfile {
    pub position: Position,
    /// Actions per turn.
    pub speed: u32,
    /// Strongest grenade the robot can throw, if it carries one.
    pub grenade: Option<(Impact, u32)>,
}

impl AttackProfile {
    pub fn new(position: Position, speed: u32) -> Self {
        Self {
            position,
            speed,
            grenade: None,
        }
    }

    pub fn with_grenade(mut self, power: Impact, range: u32) -> Self {
        self.grenade = Some((power, range));
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

impl Grid {
    fn playable(&self, position: Position) -> bool {
        self.cell(position)
            .is_some_and(|cell| cell.kind() != CellKind::PerimeterWall)
    }

    /// Diamond of radius `speed` around `position`, perimeter excluded.
    pub fn move_zone(&self, position: Position, speed: u32) -> BTreeSet<Position> {
        shape::diamond_radius(position, speed)
            .into_iter()
            .filter(|p| self.playable(*p))
            .collect()
    }

    /// Cells a robot could hit from its current spot this turn.
    ///
    /// The zone is the walk-then-kill diamond of radius `speed`, plus the
    /// central band of grenade landings along each axis with the blast
    /// supplement of the strongest grenade around every landing point.
    pub fn attack_zone(&self, profile: &AttackProfile) -> BTreeSet<Position> {
        let mut zone: BTreeSet<Position> = shape::diamond_radius(profile.position, profile.speed.max(1))
            .into_iter()
            .filter(|p| *p != profile.position)
            .collect();
        for direction in Direction::ALL {
            zone.extend(self.reachable_by_grenade_in_dir(profile, direction));
        }
        zone.retain(|p| self.playable(*p));
        zone
    }

    /// Cells touched, directly or by blast, by a grenade thrown along `direction`.
    pub fn reachable_by_grenade_in_dir(
        &self,
        profile: &AttackProfile,
        direction: Direction,
    ) -> BTreeSet<Position> {
        let mut reach = BTreeSet::new();
        let Some((power, range)) = profile.grenade else {
            return reach;
        };
        for distance in 1..=range as i32 {
            let landing = profile.position.offset(direction, distance);
            if !self.contains(landing) {
                break;
            }
            reach.extend(
                shape::footprint(landing, power)
                    .into_iter()
                    .filter(|p| self.contains(*p)),
            );
        }
        reach
    }

    /// Pseudo-probability that `other` attacks each cell of `move_zone` this turn.
    ///
    /// For every cell, the value is the share of `other`'s own move zone from
    /// which it could still hit the cell with its remaining actions. An
    /// attacker needs a single such origin to strike, so the value under-
    /// estimates the real threat; it is only meant as a last-ditch ranking.
    pub fn attack_probability_over_move_zone(
        &self,
        move_zone: &BTreeSet<Position>,
        other: &AttackProfile,
    ) -> BTreeMap<Position, f64> {
        let origins: Vec<Position> = self
            .move_zone(other.position, other.speed.saturating_sub(1))
            .into_iter()
            .filter(|origin| {
                *origin == other.position
                    || self
                        .cell(*origin)
                        .is_some_and(|cell| cell.kind() != CellKind::Wall)
            })
            .collect();
        let total = origins.len().max(1) as f64;

        let threats: Vec<BTreeSet<Position>> = origins
            .iter()
            .map(|origin| {
                let mut reach: BTreeSet<Position> = shape::diamond_radius(*origin, 1)
                    .into_iter()
                    .collect();
                let from_origin = other.at(*origin);
                for direction in Direction::ALL {
                    reach.extend(self.reachable_by_grenade_in_dir(&from_origin, direction));
                }
                reach
            })
            .collect();

        move_zone
            .iter()
            .map(|cell| {
                let hits = threats.iter().filter(|reach| reach.contains(cell)).count();
                (*cell, hits as f64 / total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_zone_excludes_perimeter() {
        let grid = Grid::open(5, 5);
        let zone = grid.move_zone(Position::new(1, 1), 2);
        assert!(zone.contains(&Position::new(3, 1)));
        assert!(!zone.contains(&Position::new(0, 1)));
        assert_eq!(zone.len(), 6);
    }

    #[test]
    fn test_attack_zone_without_grenade_is_walk_reach() {
        let grid = Grid::open(7, 7);
        let profile = AttackProfile::new(Position::new(3, 3), 1);
        let zone = grid.attack_zone(&profile);
        assert_eq!(zone.len(), 4);
    }

    #[test]
    fn test_grenade_reach_follows_axis() {
        let grid = Grid::open(9, 9);
        let profile =
            AttackProfile::new(Position::new(4, 4), 1).with_grenade(Impact::SmallDiamond, 2);
        let reach = grid.reachable_by_grenade_in_dir(&profile, Direction::East);
        assert!(reach.contains(&Position::new(6, 4)));
        assert!(reach.contains(&Position::new(7, 4)));
        assert!(reach.contains(&Position::new(5, 3)));
        assert!(!reach.contains(&Position::new(3, 4)));
    }

    #[test]
    fn test_attack_probability_is_bounded() {
        let grid = Grid::open(9, 9);
        let zone = grid.move_zone(Position::new(2, 2), 1);
        let other = AttackProfile::new(Position::new(4, 2), 2);
        let proba = grid.attack_probability_over_move_zone(&zone, &other);
        assert_eq!(proba.len(), zone.len());
        assert!(proba.values().all(|p| (0.0..=1.0).contains(p)));
        assert!(proba[&Position::new(3, 2)] > 0.0);
        assert_eq!(proba[&Position::new(1, 2)], 0.0);
    }
}
