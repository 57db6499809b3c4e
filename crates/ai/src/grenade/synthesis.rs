//! Candidate throws and their validation.

use std::collections::BTreeSet;

use maze_core::grid::shape;
use maze_core::{Action, CellKind, Direction, Family, Grid, Impact, Position};
use rand::Rng;

use super::GrenadeCombo;
use super::GrenadeFlags;
use super::patterns::candidate_ranges;
use crate::context::AiContext;

/// Throw axes toward a target offset by `(dx, dy)`.
///
/// The axis with the larger offset wins; both when they are equal.
fn throw_axes(dx: i32, dy: i32) -> Vec<(Direction, u32, u32)> {
    let horizontal = if dx >= 0 { Direction::East } else { Direction::West };
    let vertical = if dy >= 0 { Direction::South } else { Direction::North };
    let (ax, ay) = (dx.unsigned_abs(), dy.unsigned_abs());
    let mut axes = Vec::with_capacity(2);
    if ax >= ay && ax > 0 {
        axes.push((horizontal, ay, ax));
    }
    if ay >= ax && ay > 0 {
        axes.push((vertical, ax, ay));
    }
    axes
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Every validated combination hitting `target`, in discovery order.
    pub(super) fn synthesize(&mut self, target: Position, flags: GrenadeFlags) -> Vec<GrenadeCombo> {
        let mut combos = Vec::new();
        let mut seen = BTreeSet::new();

        for (action, command) in self.direct_throws(target, flags) {
            if !seen.insert(command.clone()) {
                continue;
            }
            if let Some(combo) = self.validate_throw(action, command, target, None, flags) {
                combos.push(combo);
                if !flags.full_search {
                    return combos;
                }
            }
        }
        if flags.direct_only {
            return combos;
        }

        for via in self.intermediaries(target) {
            for (action, command) in self.direct_throws(via, flags) {
                if !seen.insert(command.clone()) {
                    continue;
                }
                if let Some(combo) = self.validate_throw(action, command, target, Some(via), flags) {
                    combos.push(combo);
                    if !flags.full_search {
                        return combos;
                    }
                }
            }
        }
        combos
    }

    /// Legal straight throws whose footprint covers `target`, strongest first.
    fn direct_throws(&self, target: Position, flags: GrenadeFlags) -> Vec<(Action, String)> {
        let grid = self.grid();
        let origin = self.robot.position;
        let (dx, dy) = origin.vector(target);
        let max_range = self.robot.equipment.grenade_range;

        let mut throws = Vec::new();
        for power in self.robot.equipment.grenade_powers().into_iter().rev() {
            for (direction, d, big) in throw_axes(dx, dy) {
                for range in candidate_ranges(power, d, big) {
                    if range > max_range {
                        continue;
                    }
                    if flags.safe_mode && range as i32 - power.radius() <= 0 {
                        continue;
                    }
                    let landing = origin.offset(direction, range as i32);
                    if !shape::footprint_contains(landing, power, target)
                        || !grid.is_in(landing, Family::GrenadeLanding)
                        || Grid::segment(origin, landing)
                            .iter()
                            .any(|p| grid.is_in(*p, CellKind::PerimeterWall))
                    {
                        continue;
                    }
                    let action = Action::grenade(direction, range, power);
                    if let Some(command) = self.pre_check(&action) {
                        throws.push((action, command));
                    }
                }
            }
        }
        throws
    }

    /// Large dangers reachable by a throw that could relay the blast.
    fn intermediaries(&self, target: Position) -> BTreeSet<Position> {
        let grid = self.grid();
        let origin = self.robot.position;
        let Some(dominant) = origin.dominant_direction(target) else {
            return BTreeSet::new();
        };
        let profile = self.robot.attack_profile();
        let [left, right] = dominant.perpendiculars();
        [dominant, left, right]
            .into_iter()
            .flat_map(|direction| grid.reachable_by_grenade_in_dir(&profile, direction))
            .filter(|p| *p != target && self.gd.global.dangers_large.contains(p))
            .collect()
    }

    fn validate_throw(
        &self,
        action: Action,
        command: String,
        target: Position,
        via: Option<Position>,
        flags: GrenadeFlags,
    ) -> Option<GrenadeCombo> {
        let grid = self.grid();
        let me = &self.robot;
        let landing = action.target_from(me.position);

        let (cells, cleared): (BTreeSet<Position>, BTreeSet<Position>) = if flags.recursive {
            let cascade = grid.impact_cascade_from(landing, action.power);
            let cleared = cascade.detonated.iter().copied().collect();
            (cascade.flat_list, cleared)
        } else {
            let cells: BTreeSet<Position> = shape::footprint(landing, action.power)
                .into_iter()
                .filter(|p| grid.contains(*p))
                .collect();
            let cleared = cells
                .iter()
                .filter(|p| grid.layer_cell(CellKind::Danger, **p).is_some())
                .copied()
                .collect();
            (cells, cleared)
        };

        if !cells.contains(&target) {
            return None;
        }
        if flags.safe_mode && cells.contains(&me.position) {
            return None;
        }

        let mut destruction = 0;
        let mut bonuses = 0;
        let mut kills = Vec::new();
        for position in &cells {
            if let Some(danger) = grid.layer_cell(CellKind::Danger, *position) {
                destruction += danger.impact().map_or(1, Impact::value);
            }
            if grid.layer_cell(CellKind::Wall, *position).is_some() {
                destruction += 1;
            }
            if grid.layer_cell(CellKind::Bonus, *position).is_some() {
                bonuses += 1;
                if !me.need_bonus {
                    destruction += 1;
                }
            }
            if let Some(uid) = grid
                .layer_cell(CellKind::Robot, *position)
                .and_then(|cell| cell.robot_id())
            {
                if self.gd.recognition.kill_all.contains(&uid) {
                    kills.push(uid);
                } else if !flags.allow_collateral {
                    return None;
                }
                destruction += 1;
            }
        }
        if destruction == 0 {
            return None;
        }

        Some(GrenadeCombo {
            action,
            command,
            landing,
            cells,
            cleared,
            destruction,
            bonuses,
            kills,
            via,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throw_axes() {
        assert_eq!(throw_axes(4, 0), vec![(Direction::East, 0, 4)]);
        assert_eq!(throw_axes(-1, 2), vec![(Direction::South, 1, 2)]);
        assert_eq!(
            throw_axes(-2, -2),
            vec![(Direction::West, 2, 2), (Direction::North, 2, 2)]
        );
        assert!(throw_axes(0, 0).is_empty());
    }
}
