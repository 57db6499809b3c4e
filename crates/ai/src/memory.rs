//! Per-robot memory carried across atomic steps.
//!
//! [`RobotMemory`] holds the pending pseudo-action sequence, the objective
//! ordering of the turn and the memoized search results. Memoized results
//! are keyed against the board: they are dropped at the first step of every
//! turn and whenever the turn-level change-log key moves.

use std::collections::BTreeMap;

use maze_core::Position;
use tracing::trace;

use crate::grenade::{GrenadeChoice, GrenadeFlags, ListChoice};
use crate::path::PathResult;
use crate::types::{Objective, PseudoActions};

/// Rectangle a builder or a sapper works in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkArea {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl WorkArea {
    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.x
            && position.y >= self.y
            && position.x < self.x + self.w as i32
            && position.y < self.y + self.h as i32
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.w as i32 / 2, self.y + self.h as i32 / 2)
    }

    pub fn area(&self) -> u32 {
        self.w * self.h
    }
}

/// Memoized query results, valid for one board key.
#[derive(Clone, Debug, Default)]
pub struct Memo {
    key: Option<([u8; 32], u64)>,
    pub(crate) paths: BTreeMap<(Position, Position, bool), PathResult>,
    /// `(robot, cell, eco)` to the verdict of the step validation.
    pub(crate) steps: BTreeMap<(Position, Position, bool), bool>,
    pub(crate) grenades: BTreeMap<(Position, Position, GrenadeFlags), Option<GrenadeChoice>>,
    pub(crate) lists: BTreeMap<(Position, Vec<Position>, GrenadeFlags), Option<ListChoice>>,
}

impl Memo {
    /// Drops every result computed against another board key or revision.
    ///
    /// Returns true when something was dropped.
    pub fn sync(&mut self, key: [u8; 32], revision: u64) -> bool {
        if self.key == Some((key, revision)) {
            return false;
        }
        let stale = !self.is_empty();
        self.clear();
        self.key = Some((key, revision));
        stale
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.paths.clear();
        self.steps.clear();
        self.grenades.clear();
        self.lists.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.steps.is_empty()
            && self.grenades.is_empty()
            && self.lists.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len() + self.steps.len() + self.grenades.len() + self.lists.len()
    }
}

/// What one robot remembers between atomic steps.
#[derive(Clone, Debug, Default)]
pub struct RobotMemory {
    /// Turn the memory was last opened for.
    pub turn_id: Option<u64>,
    pub pending: Option<PseudoActions>,
    pub objectives: Vec<Objective>,
    /// Consecutive committed sequences without a move.
    pub no_move_count: u32,
    /// Highest attack probability per move-zone cell, filled by risky moves.
    pub attack_probability: BTreeMap<Position, f64>,
    pub work_area: Option<WorkArea>,
    /// Times the robot reached its work area.
    pub work_area_visits: u32,
    pub(crate) memo: Memo,
}

impl RobotMemory {
    /// Opens a turn: every turn-scoped cache is dropped.
    pub fn begin_turn(&mut self, turn_id: u64) {
        trace!(turn_id, cached = self.memo.len(), "memory opened for new turn");
        self.turn_id = Some(turn_id);
        self.pending = None;
        self.objectives.clear();
        self.attack_probability.clear();
        self.memo.clear();
    }

    /// Closes a turn once its last step was recorded.
    pub fn end_turn(&mut self) {
        self.pending = None;
        self.objectives.clear();
        self.attack_probability.clear();
        self.memo.clear();
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_sync_drops_stale_results() {
        let mut memo = Memo::default();
        assert!(!memo.sync([1; 32], 4));
        memo.steps
            .insert((Position::new(1, 1), Position::new(2, 1), true), true);
        assert!(!memo.sync([1; 32], 4));
        assert_eq!(memo.len(), 1);
        assert!(memo.sync([1; 32], 5));
        assert!(memo.is_empty());
    }

    #[test]
    fn test_work_area_bounds() {
        let area = WorkArea {
            x: 1,
            y: 1,
            w: 4,
            h: 2,
        };
        assert!(area.contains(Position::new(4, 2)));
        assert!(!area.contains(Position::new(5, 2)));
        assert_eq!(area.center(), Position::new(3, 2));
        assert_eq!(area.area(), 8);
    }
}
