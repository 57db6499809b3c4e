//! Multi-step scheduling.
//!
//! Winners and hunters with at least mid intelligence plan the rest of
//! their turn as a [`PseudoActions`] sequence. The plan is committed on one
//! atomic step and consumed by command extraction on the next ones, until
//! it is played out or a new danger covers one of its cells.
//!
//! # Module Structure
//!
//! - `objectives`: ordering of move, defense and attack, and possibilities
//! - `attack`: kill sequences against a list of robots
//! - `moves`: path following, exit freeing, safe moves, bonus tours
//! - `desperate`: rebalance, risky move and flight
//! - `relevance`: secure completion, relevance and score
//!
//! # Search order
//!
//! optimal attack, optimal move, by-objective search, bonus collection,
//! review of the pool, then the desperate measures.

mod attack;
mod desperate;
mod moves;
mod objectives;
mod relevance;

use maze_core::{Behavior, grid::shape};
use rand::Rng;
use tracing::debug;

pub use objectives::Possibilities;

use crate::context::AiContext;
use crate::types::{Objective, PseudoActions, Relevance, SequenceName};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(crate) fn is_scheduling(&self) -> bool {
        matches!(self.robot.behavior, Behavior::Winner | Behavior::Hunter)
            && self.is_mid(self.robot.personality.intelligence)
    }

    /// Plans the turn unless a valid plan is pending.
    ///
    /// Returns true when a sequence is available for extraction.
    pub(crate) fn schedule(&mut self) -> bool {
        if !self.is_scheduling() {
            return false;
        }
        if let Some(pending) = self.memory.pending.take() {
            if self.pending_is_valid(&pending) {
                self.gd.chosen = Some(pending.clone());
                self.memory.pending = Some(pending);
                return true;
            }
            debug!(robot = %self.robot.uid, name = %pending.name, "pending sequence invalidated");
        }

        if self.step_index <= 1 || self.memory.objectives.is_empty() {
            self.memory.objectives = self.order_objectives();
        }
        let objectives = self.memory.objectives.clone();
        let possibilities = self.possibilities();
        let mut pool: Vec<PseudoActions> = Vec::new();
        let full = |pool: &[PseudoActions]| pool.iter().any(PseudoActions::is_fully_relevant);

        if objectives.first() == Some(&Objective::Attack) && possibilities.attack_possible {
            pool.extend(
                self.scheduled_attacks(
                    &possibilities.attack_list,
                    Objective::Attack,
                    SequenceName::OptimalAttack,
                )
                .into_iter()
                .filter(PseudoActions::is_fully_relevant),
            );
        }
        if !full(&pool) && possibilities.safe_move {
            pool.extend(self.optimal_move());
        }
        if !full(&pool) {
            for objective in &objectives {
                let found: Vec<PseudoActions> = match objective {
                    Objective::Move => self.safe_move(Objective::Move).into_iter().collect(),
                    Objective::Defense if self.is_aggressive() => self.scheduled_attacks(
                        &possibilities.defense_list,
                        Objective::Defense,
                        SequenceName::ScheduledAttack,
                    ),
                    Objective::Defense => self.safe_move(Objective::Defense).into_iter().collect(),
                    Objective::Attack => self.scheduled_attacks(
                        &possibilities.attack_list,
                        Objective::Attack,
                        SequenceName::ScheduledAttack,
                    ),
                };
                pool.extend(found);
                if full(&pool) {
                    break;
                }
            }
        }
        if !full(&pool) {
            pool.extend(self.bonus_collection());
        }

        let chosen = review(pool).or_else(|| self.desperate());
        self.commit(chosen)
    }

    /// A plan stays valid until a danger it did not know covers a cell
    /// still to be walked.
    fn pending_is_valid(&self, pending: &PseudoActions) -> bool {
        if pending.is_empty() {
            return false;
        }
        let grid = self.grid();
        let fresh: Vec<_> = self
            .gd
            .global
            .dangers
            .iter()
            .filter(|p| !pending.known_dangers.contains(p))
            .filter_map(|p| grid.cell(*p).and_then(|cell| cell.impact().map(|i| (*p, i))))
            .collect();
        !pending.remaining_cells().any(|cell| {
            fresh
                .iter()
                .any(|(danger, impact)| shape::footprint_contains(*danger, *impact, cell))
        })
    }

    fn commit(&mut self, chosen: Option<PseudoActions>) -> bool {
        let Some(sequence) = chosen else {
            debug!(robot = %self.robot.uid, "no sequence scheduled");
            return false;
        };
        if sequence.cells.is_empty() {
            self.memory.no_move_count += 1;
        } else {
            self.memory.no_move_count = 0;
        }
        debug!(
            robot = %self.robot.uid,
            name = %sequence.name,
            actions = sequence.gamble_count,
            relevance = %sequence.relevance,
            score = sequence.score,
            "sequence committed"
        );
        self.memory.pending = Some(sequence.clone());
        self.gd.chosen = Some(sequence);
        true
    }
}

/// Highest-scoring sequence of the pool among those that are not unsafe.
///
/// Ties keep the earliest candidate.
fn review(pool: Vec<PseudoActions>) -> Option<PseudoActions> {
    let mut best: Option<PseudoActions> = None;
    for candidate in pool {
        if candidate.relevance == Relevance::Unsafe {
            continue;
        }
        let better = best
            .as_ref()
            .is_none_or(|current| candidate.score > current.score);
        if better {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use maze_core::Position;

    use super::*;

    fn candidate(name: SequenceName, relevance: Relevance, score: f64) -> PseudoActions {
        let mut sequence = PseudoActions::new(name, Position::new(1, 1));
        sequence.relevance = relevance;
        sequence.score = score;
        sequence
    }

    #[test]
    fn test_review_picks_highest_score_among_relevant() {
        let pool = vec![
            candidate(SequenceName::FollowPath, Relevance::Full, 1.0),
            candidate(SequenceName::BonusCollection, Relevance::Full, 2.0),
            candidate(SequenceName::SafeMove, Relevance::Marginal, 9.0),
            candidate(SequenceName::Flee, Relevance::Unsafe, 50.0),
        ];
        let best = review(pool).unwrap();
        assert_eq!(best.name, SequenceName::SafeMove);
    }

    #[test]
    fn test_review_tie_keeps_first_candidate() {
        let pool = vec![
            candidate(SequenceName::KeepPosition, Relevance::Marginal, 3.0),
            candidate(SequenceName::FollowPath, Relevance::Full, 3.0),
        ];
        let best = review(pool).unwrap();
        assert_eq!(best.name, SequenceName::KeepPosition);
    }

    #[test]
    fn test_review_ignores_unsafe_pool() {
        let pool = vec![candidate(SequenceName::Flee, Relevance::Unsafe, 3.0)];
        assert!(review(pool).is_none());
    }
}
