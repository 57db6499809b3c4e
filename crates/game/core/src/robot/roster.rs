use std::collections::BTreeMap;

use super::{Behavior, Robot};
use crate::grid::RobotId;

/// Every robot of the match, keyed by uid.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    robots: BTreeMap<RobotId, Robot>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a robot record.
    pub fn insert(&mut self, robot: Robot) -> Option<Robot> {
        self.robots.insert(robot.uid, robot)
    }

    pub fn get(&self, uid: RobotId) -> Option<&Robot> {
        self.robots.get(&uid)
    }

    pub fn get_mut(&mut self, uid: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(&uid)
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Robot> {
        self.robots.values_mut()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values().filter(|robot| robot.alive)
    }

    /// Alive robots other than `uid`.
    pub fn others(&self, uid: RobotId) -> impl Iterator<Item = &Robot> {
        self.alive().filter(move |robot| robot.uid != uid)
    }

    pub fn any_alive(&self, behavior: Behavior) -> bool {
        self.alive().any(|robot| robot.behavior == behavior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    #[test]
    fn test_alive_filters_dead_robots() {
        let mut roster = Roster::new();
        roster.insert(Robot::builder(1, Position::new(1, 1)).build());
        let mut dead = Robot::builder(2, Position::new(2, 1))
            .behavior(Behavior::Hunter)
            .build();
        dead.alive = false;
        roster.insert(dead);

        assert_eq!(roster.alive().count(), 1);
        assert_eq!(roster.others(RobotId(1)).count(), 0);
        assert!(!roster.any_alive(Behavior::Hunter));
    }
}
