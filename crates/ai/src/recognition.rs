//! Board-wide sets and area recognition.
//!
//! Both stages only read the state. Global sets are rebuilt on every atomic
//! step; recognition partitions the other robots into attack and defense
//! lists and derives the safezones of the deciding robot.

use std::collections::BTreeSet;

use maze_core::grid::shape;
use maze_core::{Behavior, CellKind, Impact, Position, Robot, RobotId, may_attack};
use rand::Rng;
use tracing::debug;

use crate::context::AiContext;
use crate::gamble::{GlobalSets, Recognition};

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Refreshes alive robots and typed cell sets.
    pub(crate) fn refresh_global_sets(&mut self) {
        let state = self.state;
        let grid = &state.grid;
        let robots = &state.robots;

        let mut global = GlobalSets {
            alive: robots.alive().map(|robot| robot.uid).collect(),
            human_alive: robots.any_alive(Behavior::Human),
            winner_alive: robots.any_alive(Behavior::Winner),
            hunter_alive: robots.any_alive(Behavior::Hunter),
            ..GlobalSets::default()
        };
        global.winner_human_alive = global.winner_alive || global.human_alive;
        global.winner_human_hunter_alive = global.winner_human_alive || global.hunter_alive;

        for cell in grid.typed_cells(CellKind::Danger) {
            global.dangers.insert(cell.position);
            if cell.impact() == Some(Impact::Point) {
                global.dangers_point.insert(cell.position);
            } else {
                global.dangers_large.insert(cell.position);
            }
        }
        global.bonuses = grid.typed_set(CellKind::Bonus);
        global.play_set = grid.play_set();
        self.gd.global = global;
    }

    /// Partitions the other robots and computes the safezones.
    pub(crate) fn recognize_area(&mut self) {
        let state = self.state;
        let config = self.config;
        let grid = &state.grid;
        let me = &self.robot;

        let mut recognition = Recognition::default();
        let others: Vec<&Robot> = state
            .robots
            .others(me.uid)
            .filter(|other| other.alive)
            .collect();

        for other in &others {
            if may_attack(&state.dangers, me, other, config) {
                recognition.attack_all.push(other.uid);
                if me.attack_zone.contains(&other.position) {
                    recognition.attack.push(other.uid);
                }
            }
            if may_attack(&state.dangers, other, me, config) {
                recognition.defense_all.push(other.uid);
                let threat = grid.attack_zone(&other.turn_profile());
                if !threat.is_disjoint(&me.move_zone) {
                    recognition.defense.push(other.uid);
                }
                recognition.threats.insert(other.uid, threat);
            }
        }

        let aggressive = config.is_mid(me.personality.aggressivity);
        let order = |uid: &RobotId| -> f64 {
            let Some(other) = state.robot(*uid) else {
                return f64::MAX;
            };
            if aggressive {
                -other.personality.aggressivity
            } else {
                me.position.distance(other.position)
            }
        };
        for list in [
            &mut recognition.attack,
            &mut recognition.attack_all,
            &mut recognition.defense,
            &mut recognition.defense_all,
        ] {
            list.sort_by(|a, b| order(a).total_cmp(&order(b)));
        }
        recognition.kill_all = recognition
            .attack_all
            .iter()
            .chain(&recognition.defense_all)
            .copied()
            .collect();

        let threatened: BTreeSet<Position> = recognition
            .threats
            .values()
            .flat_map(|cells| cells.iter().copied())
            .collect();
        recognition.safezone = me.move_zone.difference(&threatened).copied().collect();

        for danger in &self.gd.global.dangers {
            let Some(impact) = grid.cell(*danger).and_then(|cell| cell.impact()) else {
                continue;
            };
            let footprint: BTreeSet<Position> = shape::footprint(*danger, impact)
                .into_iter()
                .filter(|p| grid.contains(*p))
                .collect();
            if !footprint.is_disjoint(&me.move_zone) {
                recognition.danger_zones.insert(*danger, footprint);
            }
        }

        let careful =
            config.is_high(me.personality.survival) || config.is_high(me.personality.intelligence);
        recognition.real_safezone = if careful {
            let mined: BTreeSet<Position> = recognition
                .danger_zones
                .values()
                .flat_map(|cells| cells.iter().copied())
                .collect();
            recognition.safezone.difference(&mined).copied().collect()
        } else {
            recognition.safezone.clone()
        };

        recognition.dangers = grid
            .cells_around_point_5x5(me.position)
            .into_iter()
            .filter(|cell| {
                cell.impact()
                    .is_some_and(|impact| shape::footprint_contains(cell.position, impact, me.position))
            })
            .collect();
        recognition.bonuses = me
            .move_zone
            .iter()
            .filter(|p| self.gd.global.bonuses.contains(p))
            .copied()
            .collect();

        debug!(
            robot = %me.uid,
            attack = recognition.attack.len(),
            attack_all = recognition.attack_all.len(),
            defense = recognition.defense.len(),
            defense_all = recognition.defense_all.len(),
            safezone = recognition.safezone.len(),
            real_safezone = recognition.real_safezone.len(),
            dangers = recognition.dangers.len(),
            "area recognized"
        );
        self.gd.recognition = recognition;
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, Position, Robot};

    use super::*;
    use crate::memory::RobotMemory;

    fn context_for<'a>(
        state: &'a GameState,
        uid: u32,
        memory: &'a mut RobotMemory,
        rng: &'a mut PcgRng,
    ) -> AiContext<'a, PcgRng> {
        let robot = state.robot(RobotId(uid)).unwrap().clone();
        AiContext::new(state, robot, 1, 1, 1, memory, rng)
    }

    #[test]
    fn test_hunter_is_a_threat_to_a_careful_winner() {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(Robot::builder(1, Position::new(2, 2)).survival(0.6).build())
            .unwrap();
        state
            .add_robot(
                Robot::builder(2, Position::new(4, 2))
                    .behavior(Behavior::Hunter)
                    .build(),
            )
            .unwrap();

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(7);
        let mut ctx = context_for(&state, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let recognition = &ctx.gd.recognition;
        assert_eq!(recognition.defense_all, vec![RobotId(2)]);
        assert_eq!(recognition.attack_all, vec![RobotId(2)]);
        assert!(recognition.kill_all.contains(&RobotId(2)));
        assert!(!recognition.safezone.contains(&Position::new(3, 2)));
        assert!(recognition.safezone.contains(&Position::new(1, 2)));
    }

    #[test]
    fn test_real_safezone_excludes_mine_blasts() {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(
                Robot::builder(1, Position::new(2, 2))
                    .intelligence(0.9)
                    .build(),
            )
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(4, 2), Impact::SmallDiamond));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(7);
        let mut ctx = context_for(&state, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();

        let recognition = &ctx.gd.recognition;
        assert!(recognition.safezone.contains(&Position::new(3, 2)));
        assert!(!recognition.real_safezone.contains(&Position::new(3, 2)));
        assert!(recognition.danger_zones.contains_key(&Position::new(4, 2)));
        assert!(recognition.dangers.is_empty());
        assert_eq!(ctx.gd.global.dangers_large.len(), 1);
    }

    #[test]
    fn test_adjacent_danger_is_listed() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(Robot::builder(1, Position::new(3, 3)).build())
            .unwrap();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 4), Impact::SmallSquare));

        let mut memory = RobotMemory::default();
        let mut rng = PcgRng::new(7);
        let mut ctx = context_for(&state, 1, &mut memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        assert_eq!(ctx.gd.recognition.dangers.len(), 1);
    }
}
