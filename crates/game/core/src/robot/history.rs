//! Per-robot memory of past cells, turns and actions.

use std::collections::VecDeque;

use crate::action::Action;
use crate::grid::Position;

/// One played action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionRecord {
    pub turn_id: u64,
    pub step_index: u32,
    pub action: Action,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct History {
    /// Most recent visited cells, newest last.
    pub passed_cells: VecDeque<Position>,
    /// Coordinates of the last finished turns, newest last.
    pub sequences: VecDeque<Vec<Position>>,
    /// Coordinates of the turn in progress, starting cell first.
    pub current_sequence: Vec<Position>,
    pub actions: Vec<ActionRecord>,
    pub kills_total: u32,
    pub kills_innocent: u32,
}

impl History {
    pub fn record_cell(&mut self, position: Position, max_passed_cells: usize) {
        if self.passed_cells.back() != Some(&position) {
            self.passed_cells.push_back(position);
        }
        while self.passed_cells.len() > max_passed_cells {
            self.passed_cells.pop_front();
        }
        if self.current_sequence.last() != Some(&position) {
            self.current_sequence.push(position);
        }
    }

    /// Opens the record of a new turn at `start`.
    pub fn start_sequence(&mut self, start: Position) {
        self.current_sequence.clear();
        self.current_sequence.push(start);
    }

    /// Archives the turn in progress.
    pub fn close_sequence(&mut self, max_sequence_memory: usize) {
        let sequence = std::mem::take(&mut self.current_sequence);
        if !sequence.is_empty() {
            self.sequences.push_back(sequence);
        }
        while self.sequences.len() > max_sequence_memory {
            self.sequences.pop_front();
        }
    }

    pub fn last_action(&self) -> Option<&ActionRecord> {
        self.actions.last()
    }

    /// Starting cells of the remembered turns.
    pub fn turn_starts(&self) -> impl Iterator<Item = Position> + '_ {
        self.sequences.iter().filter_map(|sequence| sequence.first().copied())
    }

    pub fn previous_sequence(&self) -> Option<&[Position]> {
        self.sequences.back().map(Vec::as_slice)
    }
}
