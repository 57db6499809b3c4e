//! Movement sequences: follow the target path, free the exit, keep
//! position, reach a safe cell, collect bonuses.

use std::collections::BTreeSet;

use maze_core::{Behavior, CellKind, GamePhase, Position};
use rand::Rng;
use tracing::{debug, trace};

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;
use crate::types::{Objective, PseudoAction, PseudoActions, SequenceName};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Best move when the robot is free to move safely.
    pub(crate) fn optimal_move(&mut self) -> Option<PseudoActions> {
        let closing = matches!(self.robot.behavior, Behavior::Winner | Behavior::Hunter)
            && self.robot.game_phase == GamePhase::Final
            && self
                .robot
                .main_target
                .as_ref()
                .is_some_and(|target| target.kind == CellKind::Exit);
        if closing {
            if let Some(sequence) = self.free_exit() {
                return Some(sequence);
            }
        }
        if let Some(sequence) = self.follow_path() {
            return Some(sequence);
        }
        self.keep_position()
    }

    /// A grenade that clears the dangers barring the way to the exit.
    pub(crate) fn free_exit(&mut self) -> Option<PseudoActions> {
        if !self.robot.equipment.has_grenade {
            return None;
        }
        let exit = self.main_target_position()?;
        let position = self.robot.position;
        let grid = self.grid();

        let found = self.search_path(position, exit, true);
        let blockers: Vec<Position> = match &found.path {
            Some(path) => path
                .cells
                .iter()
                .skip(1)
                .filter(|p| grid.layer_cell(CellKind::Danger, **p).is_some())
                .copied()
                .collect(),
            None => {
                let wide = self.search_path(position, exit, false);
                found
                    .blockers
                    .union(&wide.blockers)
                    .copied()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            }
        };
        if blockers.is_empty() {
            return None;
        }

        let choice = self.grenade_params_for_list(&blockers, GrenadeFlags::terraform(true))?;
        let combo = choice.best_containing_first.unwrap_or(choice.best_overall);
        debug!(
            robot = %self.robot.uid,
            %exit,
            blockers = ?blockers,
            command = %combo.command,
            "freeing the exit"
        );
        let mut sequence = PseudoActions::new(SequenceName::FreeExit, position).with_context(Objective::Move);
        sequence.push(PseudoAction::Grenade {
            command: combo.command,
        });
        sequence.cleared.extend(combo.cleared);
        sequence.killed = combo.kills;
        self.evaluate(&mut sequence);
        Some(sequence)
    }

    /// The current path cut to the actions left, with a terraforming head
    /// when one throw clears every obstacle on it.
    pub(crate) fn follow_path(&mut self) -> Option<PseudoActions> {
        let path = self.current_path()?;
        let position = self.robot.position;
        let mut limit = self.max_actions() as usize;
        let ahead: Vec<Position> = path.cells.iter().skip(1).take(limit).copied().collect();
        if ahead.is_empty() {
            return None;
        }

        let mut sequence = PseudoActions::new(SequenceName::FollowPath, position).with_context(Objective::Move);
        let grid = self.grid();
        let obstacles: Vec<Position> = ahead
            .iter()
            .filter(|p| {
                grid.layer_cell(CellKind::Wall, **p).is_some()
                    || grid.layer_cell(CellKind::Danger, **p).is_some()
            })
            .copied()
            .collect();
        if !obstacles.is_empty() && self.robot.equipment.has_grenade {
            let flags = GrenadeFlags::terraform(self.robot.need_bonus);
            if let Some(choice) = self.grenade_params_for_list(&obstacles, flags) {
                let combo = choice.best_overall;
                if obstacles.iter().all(|p| combo.cells.contains(p)) {
                    sequence.push(PseudoAction::Grenade {
                        command: combo.command,
                    });
                    sequence.cleared.extend(combo.cleared);
                    sequence.killed = combo.kills;
                    limit = limit.saturating_sub(1);
                }
            }
        }
        self.push_gotos(&mut sequence, &path, limit);
        if sequence.cells.is_empty() {
            return None;
        }
        self.evaluate(&mut sequence);
        Some(sequence)
    }

    /// Stay put when the robot already stands somewhere safe.
    pub(crate) fn keep_position(&mut self) -> Option<PseudoActions> {
        let position = self.robot.position;
        if !self.gd.recognition.trusted_safezone().contains(&position) {
            return None;
        }
        let mut sequence =
            PseudoActions::new(SequenceName::KeepPosition, position).with_context(Objective::Move);
        sequence.push(PseudoAction::NoMove);
        self.evaluate(&mut sequence);
        Some(sequence)
    }

    /// Walk to the safe cell that brings the robot closest to its goal.
    pub(crate) fn safe_move(&mut self, objective: Objective) -> Option<PseudoActions> {
        let position = self.robot.position;
        let main = self.main_target_position();
        let budget = self.max_actions() as usize;
        let mut cells: Vec<Position> = self
            .gd
            .recognition
            .trusted_safezone()
            .iter()
            .filter(|p| **p != position)
            .copied()
            .collect();
        cells.sort_by_key(|p| {
            let progress = main.map_or(0, |main| p.path_length(main));
            (progress, p.path_length(position))
        });

        for cell in cells {
            let Some(path) = self.search_path(position, cell, true).path else {
                continue;
            };
            if path.is_empty() || path.len() > budget {
                continue;
            }
            let mut sequence =
                PseudoActions::new(SequenceName::SafeMove, position).with_context(objective);
            self.push_gotos(&mut sequence, &path, budget);
            self.evaluate(&mut sequence);
            trace!(robot = %self.robot.uid, %cell, relevance = %sequence.relevance, "safe move");
            return Some(sequence);
        }
        None
    }

    /// Greedy tour of the bonuses within reach this turn.
    pub(crate) fn bonus_collection(&mut self) -> Option<PseudoActions> {
        let position = self.robot.position;
        let mut remaining = self.max_actions() as usize;
        let mut current = position;
        let mut pending: BTreeSet<Position> = self.gd.global.bonuses.clone();
        let mut sequence = PseudoActions::new(SequenceName::BonusCollection, position);

        while remaining > 0 {
            let mut reachable: Vec<Position> = pending
                .iter()
                .filter(|b| b.path_length(current) as usize <= remaining)
                .copied()
                .collect();
            if reachable.is_empty() {
                break;
            }
            reachable.sort_by_key(|b| b.path_length(current));

            let mut advanced = false;
            for bonus in reachable {
                pending.remove(&bonus);
                let Some(path) = self.search_path(current, bonus, true).path else {
                    continue;
                };
                if path.len() > remaining {
                    continue;
                }
                self.push_gotos(&mut sequence, &path, remaining);
                remaining -= path.len();
                current = bonus;
                advanced = true;
                break;
            }
            if !advanced {
                break;
            }
        }

        if sequence.is_empty() {
            return None;
        }
        self.evaluate(&mut sequence);
        Some(sequence)
    }
}
