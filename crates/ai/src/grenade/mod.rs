//! Grenade parameter synthesis.
//!
//! # Module Structure
//!
//! - `patterns`: landing ranges per power and target offset
//! - `synthesis`: direct and indirect combinations and their validation
//!
//! A query answers "which throw hits this cell" for the deciding robot.
//! Direct throws land close enough for the blast to cover the target;
//! indirect throws detonate an intermediary danger whose chained
//! explosion reaches it. Every validated combination is ranked, and the
//! result is memoized per origin, target and the full flag set.

mod patterns;
mod synthesis;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use maze_core::{Action, Behavior, Position, RobotId};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

pub use patterns::candidate_ranges;

use crate::context::AiContext;

/// Search flags of a grenade query.
///
/// The whole set is part of the memo key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GrenadeFlags {
    /// Follow chained explosions instead of the bare footprint.
    pub recursive: bool,
    /// Refuse throws whose blast reaches the thrower.
    pub safe_mode: bool,
    /// Validate every candidate instead of stopping at the first one.
    pub full_search: bool,
    /// Accept hitting robots the thrower has no reason to kill.
    pub allow_collateral: bool,
    /// Skip indirect throws.
    pub direct_only: bool,
}

impl GrenadeFlags {
    /// Flags used when validating a path step.
    pub fn step(eco: bool) -> Self {
        Self {
            recursive: true,
            safe_mode: true,
            full_search: false,
            allow_collateral: false,
            direct_only: eco,
        }
    }

    /// Flags used when attacking a robot.
    pub fn attack() -> Self {
        Self {
            recursive: true,
            safe_mode: true,
            full_search: true,
            allow_collateral: false,
            direct_only: false,
        }
    }

    /// Flags used when clearing the way.
    pub fn terraform(full_search: bool) -> Self {
        Self {
            recursive: true,
            safe_mode: true,
            full_search,
            allow_collateral: false,
            direct_only: false,
        }
    }
}

/// A validated throw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrenadeCombo {
    pub action: Action,
    pub command: String,
    pub landing: Position,
    /// Cells hit by the blast.
    pub cells: BTreeSet<Position>,
    /// Dangers that go off.
    pub cleared: BTreeSet<Position>,
    pub destruction: u32,
    /// Bonuses lost in the blast.
    pub bonuses: u32,
    pub kills: Vec<RobotId>,
    /// Intermediary danger of an indirect throw.
    pub via: Option<Position>,
}

/// Ranked combinations for one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrenadeChoice {
    pub default: GrenadeCombo,
    pub all: Vec<GrenadeCombo>,
}

/// Best combinations for a list of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListChoice {
    pub best_overall: GrenadeCombo,
    /// Best combination among those hitting the first cell of the list.
    pub best_containing_first: Option<GrenadeCombo>,
}

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Throws that hit `target` from the robot's position.
    pub fn grenade_params(&mut self, target: Position, flags: GrenadeFlags) -> Option<GrenadeChoice> {
        if !self.robot.equipment.has_grenade || target == self.robot.position {
            return None;
        }
        let key = (self.robot.position, target, flags);
        if let Some(cached) = self.memory.memo.grenades.get(&key) {
            return cached.clone();
        }

        let mut combos = self.synthesize(target, flags);
        self.rank(&mut combos);
        let choice = combos.first().cloned().map(|default| GrenadeChoice {
            default,
            all: combos,
        });
        trace!(
            robot = %self.robot.uid,
            %target,
            ?flags,
            command = choice.as_ref().map(|c| c.default.command.as_str()),
            "grenade params"
        );
        self.memory.memo.grenades.insert(key, choice.clone());
        choice
    }

    /// The single throw that overlaps `cells` the most.
    pub fn grenade_params_for_list(
        &mut self,
        cells: &[Position],
        flags: GrenadeFlags,
    ) -> Option<ListChoice> {
        let first = *cells.first()?;
        let key = (self.robot.position, cells.to_vec(), flags);
        if let Some(cached) = self.memory.memo.lists.get(&key) {
            return cached.clone();
        }

        let wanted: BTreeSet<Position> = cells.iter().copied().collect();
        let mut seen = BTreeSet::new();
        let mut best_overall: Option<(usize, GrenadeCombo)> = None;
        let mut best_first: Option<(usize, GrenadeCombo)> = None;
        let flags_all = GrenadeFlags {
            full_search: true,
            ..flags
        };
        for cell in cells {
            let Some(choice) = self.grenade_params(*cell, flags_all) else {
                continue;
            };
            for combo in choice.all {
                if !seen.insert(combo.command.clone()) {
                    continue;
                }
                let overlap = combo.cells.intersection(&wanted).count();
                if best_overall.as_ref().is_none_or(|(best, _)| overlap > *best) {
                    best_overall = Some((overlap, combo.clone()));
                }
                if combo.cells.contains(&first)
                    && best_first.as_ref().is_none_or(|(best, _)| overlap > *best)
                {
                    best_first = Some((overlap, combo));
                }
            }
        }

        let choice = best_overall.map(|(_, best_overall)| ListChoice {
            best_overall,
            best_containing_first: best_first.map(|(_, combo)| combo),
        });
        self.memory.memo.lists.insert(key, choice.clone());
        choice
    }

    fn rank(&mut self, combos: &mut [GrenadeCombo]) {
        if self.robot.behavior == Behavior::Random {
            combos.shuffle(&mut *self.rng);
            return;
        }
        let need_bonus = self.robot.need_bonus;
        let destructive = self.is_aggressive() || self.is_mid(self.robot.personality.efficiency);
        combos.sort_by(|a, b| {
            let bonuses = if need_bonus {
                a.bonuses.cmp(&b.bonuses)
            } else {
                Ordering::Equal
            };
            bonuses.then_with(|| {
                if destructive {
                    b.destruction.cmp(&a.destruction)
                } else {
                    a.destruction.cmp(&b.destruction)
                }
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, Impact, PcgRng, Robot};

    use super::*;
    use crate::memory::RobotMemory;

    fn query(
        state: &GameState,
        target: Position,
        flags: GrenadeFlags,
    ) -> Option<GrenadeChoice> {
        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(11);
        let robot = state.robot(RobotId(1)).unwrap().clone();
        let mut ctx = AiContext::new(state, robot, 1, 1, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.grenade_params(target, flags)
    }

    #[test]
    fn test_chain_reaches_robot_out_of_direct_range() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 3))
                    .behavior(Behavior::Hunter)
                    .grenade(Impact::SmallDiamond, 2)
                    .intelligence(0.8)
                    .aggressivity(0.9)
                    .build(),
            )
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 3), Impact::SmallDiamond));
        state
            .grid
            .set_cell(Cell::danger(Position::new(4, 3), Impact::SmallSquare));
        state
            .add_robot(Robot::builder(2, Position::new(5, 3)).build())
            .unwrap();

        let choice = query(&state, Position::new(5, 3), GrenadeFlags::attack()).unwrap();
        assert_eq!(choice.default.command, "ge2-5");
        assert_eq!(choice.default.landing, Position::new(3, 3));
        assert_eq!(choice.default.kills, vec![RobotId(2)]);
        let cascade = state
            .grid
            .impact_cascade_from(choice.default.landing, Impact::SmallDiamond);
        assert_eq!(cascade.step_of(Position::new(5, 3)), Some(2));
    }

    #[test]
    fn test_safe_mode_refuses_self_hit() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 3))
                    .grenade(Impact::SmallSquare, 1)
                    .build(),
            )
            .unwrap();
        state.grid.set_cell(Cell::wall(Position::new(2, 3)));

        let safe = query(&state, Position::new(2, 3), GrenadeFlags::terraform(true)).unwrap();
        assert_eq!(safe.all.len(), 1);
        assert_eq!(safe.default.command, "ge1-1");

        let unsafe_flags = GrenadeFlags {
            safe_mode: false,
            allow_collateral: true,
            ..GrenadeFlags::terraform(true)
        };
        let choice = query(&state, Position::new(2, 3), unsafe_flags).unwrap();
        assert!(choice.all.len() > 1);
        assert!(
            choice
                .all
                .iter()
                .any(|combo| combo.cells.contains(&Position::new(1, 3)))
        );
    }

    #[test]
    fn test_nothing_to_destroy_is_no_combination() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 3))
                    .grenade(Impact::Point, 3)
                    .build(),
            )
            .unwrap();
        assert!(query(&state, Position::new(3, 3), GrenadeFlags::attack()).is_none());
    }

    #[test]
    fn test_without_grenade_nothing_is_found() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(Robot::builder(1, Position::new(1, 3)).build())
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 3), Impact::Point));
        assert!(query(&state, Position::new(3, 3), GrenadeFlags::attack()).is_none());
    }
}
