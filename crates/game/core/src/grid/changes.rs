//! Mutation log kept by the grid so dependent caches stay coherent.
//!
//! Every mutation is appended twice: to the per-step [`ChangeSet`] (reset by
//! the orchestrator before each atomic step) and to the accumulating per-turn
//! set. Consumers compare [`ChangeLog::turn_key`] values to detect whether
//! the board they cached results against has changed.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use super::{Cell, CellKind, KindSet, Position};

/// Mutations recorded over one step or one turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeSet {
    pub added: BTreeMap<CellKind, BTreeSet<Position>>,
    pub moved: BTreeMap<CellKind, Vec<(Position, Position)>>,
    pub deleted: BTreeMap<CellKind, BTreeSet<Position>>,
    pub cleared: BTreeSet<CellKind>,
    /// Every modified cell, in mutation order.
    pub modified: Vec<Cell>,
    /// Lowest z-level touched since the set was reset.
    pub lowest_level: Option<CellKind>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.moved.is_empty()
            && self.deleted.is_empty()
            && self.cleared.is_empty()
    }

    fn touch(&mut self, kind: CellKind) {
        self.lowest_level = Some(match self.lowest_level {
            Some(level) => level.min(kind),
            None => kind,
        });
    }

    fn record_add(&mut self, cell: Cell) {
        self.touch(cell.kind());
        self.added
            .entry(cell.kind())
            .or_default()
            .insert(cell.position);
        self.modified.push(cell);
    }

    fn record_move(&mut self, cell: Cell, from: Position) {
        self.touch(cell.kind());
        self.moved
            .entry(cell.kind())
            .or_default()
            .push((from, cell.position));
        self.modified.push(cell);
    }

    fn record_delete(&mut self, cell: Cell) {
        self.touch(cell.kind());
        self.deleted
            .entry(cell.kind())
            .or_default()
            .insert(cell.position);
        self.modified.push(cell);
    }

    fn record_clear(&mut self, kind: CellKind) {
        self.touch(kind);
        self.cleared.insert(kind);
    }

    /// Sorted `(x, y)` coordinates touched at the given z-levels.
    pub fn coords(&self, levels: KindSet) -> BTreeSet<Position> {
        let mut coords = BTreeSet::new();
        for (kind, set) in self.added.iter().chain(self.deleted.iter()) {
            if levels.has(*kind) {
                coords.extend(set.iter().copied());
            }
        }
        for (kind, moves) in &self.moved {
            if levels.has(*kind) {
                for (from, to) in moves {
                    coords.insert(*from);
                    coords.insert(*to);
                }
            }
        }
        coords
    }
}

/// Step-scoped and turn-scoped mutation records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeLog {
    step: ChangeSet,
    turn: ChangeSet,
    /// Monotonic counter of recorded mutations.
    revision: u64,
}

impl ChangeLog {
    pub fn step(&self) -> &ChangeSet {
        &self.step
    }

    pub fn turn(&self) -> &ChangeSet {
        &self.turn
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Resets the per-step set.
    pub fn begin_step(&mut self) {
        self.step = ChangeSet::default();
    }

    /// Resets both sets.
    pub fn begin_turn(&mut self) {
        self.step = ChangeSet::default();
        self.turn = ChangeSet::default();
    }

    pub(crate) fn added(&mut self, cell: Cell) {
        self.revision += 1;
        self.step.record_add(cell);
        self.turn.record_add(cell);
    }

    pub(crate) fn moved(&mut self, cell: Cell, from: Position) {
        self.revision += 1;
        self.step.record_move(cell, from);
        self.turn.record_move(cell, from);
    }

    pub(crate) fn deleted(&mut self, cell: Cell) {
        self.revision += 1;
        self.step.record_delete(cell);
        self.turn.record_delete(cell);
    }

    pub(crate) fn cleared(&mut self, kind: CellKind) {
        self.revision += 1;
        self.step.record_clear(kind);
        self.turn.record_clear(kind);
    }

    /// Deterministic key of the turn-level log restricted to `levels`.
    ///
    /// The key is the SHA-256 of the sorted coordinates (and cleared kinds)
    /// recorded this turn. Two logs with equal keys describe the same set of
    /// touched coordinates at those levels.
    pub fn turn_key(&self, levels: KindSet) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for position in self.turn.coords(levels) {
            hasher.update(position.x.to_le_bytes());
            hasher.update(position.y.to_le_bytes());
        }
        for kind in &self.turn.cleared {
            if levels.has(*kind) {
                hasher.update([0xff, kind.z()]);
            }
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_key_ignores_other_levels() {
        let mut a = ChangeLog::default();
        let mut b = ChangeLog::default();
        a.added(Cell::wall(Position::new(1, 1)));
        b.added(Cell::wall(Position::new(1, 1)));
        b.added(Cell::bonus(Position::new(2, 2)));

        assert_eq!(a.turn_key(KindSet::WALL), b.turn_key(KindSet::WALL));
        assert_ne!(
            a.turn_key(KindSet::WALL | KindSet::BONUS),
            b.turn_key(KindSet::WALL | KindSet::BONUS)
        );
    }

    #[test]
    fn test_empty_log_key_is_sha256_of_nothing() {
        let log = ChangeLog::default();
        assert_eq!(
            hex::encode(log.turn_key(KindSet::all())),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_step_reset_keeps_turn() {
        let mut log = ChangeLog::default();
        log.added(Cell::door(Position::new(3, 1)));
        log.begin_step();
        assert!(log.step().is_empty());
        assert!(!log.turn().is_empty());
        assert_eq!(log.turn().lowest_level, Some(CellKind::Door));
        log.begin_turn();
        assert!(log.turn().is_empty());
    }
}
