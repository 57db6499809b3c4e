//! Desperate measures when no regular sequence is relevant.
//!
//! Tried in order: blow up the heavy dangers within reach, walk to the
//! least threatened cell, or flee the main threat.

use std::collections::BTreeMap;

use maze_core::{CellKind, Family, Impact, Position};
use rand::Rng;
use tracing::debug;

use crate::context::AiContext;
use crate::grenade::GrenadeFlags;
use crate::types::{PseudoAction, PseudoActions, SequenceName};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    pub(crate) fn desperate(&mut self) -> Option<PseudoActions> {
        let sequence = self
            .rebalance()
            .or_else(|| self.risky_move())
            .or_else(|| self.flee());
        if let Some(sequence) = &sequence {
            debug!(robot = %self.robot.uid, name = %sequence.name, "desperate sequence");
        }
        sequence
    }

    /// Throw at a heavy danger of the attack zone.
    fn rebalance(&mut self) -> Option<PseudoActions> {
        if !self.robot.equipment.has_grenade {
            return None;
        }
        let grid = self.grid();
        let heavy: Vec<Position> = self
            .gd
            .global
            .dangers_large
            .iter()
            .filter(|p| self.robot.attack_zone.contains(p))
            .filter(|p| {
                grid.layer_cell(CellKind::Danger, **p)
                    .and_then(|cell| cell.impact())
                    .is_some_and(|impact| impact.value() >= Impact::SmallSquare.value())
            })
            .copied()
            .collect();

        for danger in heavy {
            let Some(choice) = self.grenade_params(danger, GrenadeFlags::terraform(true)) else {
                continue;
            };
            let combo = choice.default;
            let mut sequence = PseudoActions::new(SequenceName::Rebalance, self.robot.position);
            sequence.push(PseudoAction::Grenade {
                command: combo.command,
            });
            sequence.cleared.extend(combo.cleared);
            sequence.killed = combo.kills;
            self.evaluate(&mut sequence);
            return Some(sequence);
        }
        None
    }

    /// Walk to a cell whose estimated attack probability stays low.
    fn risky_move(&mut self) -> Option<PseudoActions> {
        let grid = self.grid();
        let position = self.robot.position;
        let move_zone = self.robot.move_zone.clone();

        let mut probability: BTreeMap<Position, f64> = BTreeMap::new();
        for uid in &self.gd.recognition.defense_all {
            let Some(other) = self.other(*uid) else {
                continue;
            };
            for (cell, value) in grid.attack_probability_over_move_zone(&move_zone, &other.turn_profile()) {
                let entry = probability.entry(cell).or_insert(0.0);
                *entry = entry.max(value);
            }
        }
        for (cell, value) in &probability {
            let entry = self.memory.attack_probability.entry(*cell).or_insert(0.0);
            *entry = entry.max(*value);
        }

        let ceiling = self.config.risky_move_ceiling;
        let mined = |cell: &Position| {
            self.gd
                .recognition
                .danger_zones
                .values()
                .any(|zone| zone.contains(cell))
        };
        let mut candidates: Vec<(f64, Position)> = move_zone
            .iter()
            .filter(|p| **p != position)
            .filter(|p| grid.kind_at(**p).is_some_and(|kind| Family::Free.contains(kind)))
            .filter(|p| !mined(p))
            .map(|p| (probability.get(p).copied().unwrap_or(0.0), *p))
            .filter(|(value, _)| *value <= ceiling)
            .collect();
        let main = self.main_target_position();
        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0).then_with(|| {
                let progress = |p: Position| main.map_or(0, |main| p.path_length(main));
                progress(a.1).cmp(&progress(b.1))
            })
        });

        let budget = self.max_actions() as usize;
        for (_, cell) in candidates {
            let Some(path) = self.search_path(position, cell, true).path else {
                continue;
            };
            if path.len() > budget {
                continue;
            }
            let mut sequence = PseudoActions::new(SequenceName::RiskyMove, position);
            self.push_gotos(&mut sequence, &path, budget);
            self.evaluate(&mut sequence);
            return Some(sequence);
        }
        None
    }

    /// Run as far as possible from the main threat.
    fn flee(&mut self) -> Option<PseudoActions> {
        let recognition = &self.gd.recognition;
        let threat = recognition
            .defense
            .first()
            .or_else(|| recognition.defense_all.first())
            .and_then(|uid| self.other(*uid))?
            .position;
        let grid = self.grid();
        let position = self.robot.position;
        let budget = self.max_actions() as usize;

        let mut cells: Vec<Position> = self
            .robot
            .move_zone
            .iter()
            .filter(|p| **p != position)
            .filter(|p| grid.kind_at(**p).is_some_and(|kind| Family::Free.contains(kind)))
            .copied()
            .collect();
        cells.sort_by(|a, b| threat.distance(*b).total_cmp(&threat.distance(*a)));

        for cell in cells {
            if threat.distance(cell) <= threat.distance(position) {
                break;
            }
            let Some(path) = self.search_path(position, cell, true).path else {
                continue;
            };
            if path.len() > budget {
                continue;
            }
            let mut sequence = PseudoActions::new(SequenceName::Flee, position);
            self.push_gotos(&mut sequence, &path, budget);
            if !self.is_mid(self.robot.personality.intelligence)
                && (sequence.gamble_count as usize) < budget
            {
                let cover = if self.robot.equipment.has_mine {
                    PseudoAction::MineMax
                } else {
                    PseudoAction::Wall
                };
                sequence.push(cover);
            }
            self.evaluate(&mut sequence);
            return Some(sequence);
        }
        None
    }
}
