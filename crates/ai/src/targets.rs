//! Main target, temp target, phase of play and bonus need.

use maze_core::{
    ActionKind, Behavior, BonusStrategy, CellKind, Family, GamePhase, Position, Robot, Target,
};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, trace};

use crate::context::AiContext;
use crate::memory::WorkArea;

impl<R: Rng + ?Sized> AiContext<'_, R> {
    /// Runs the target maintenance stage in order.
    pub(crate) fn maintain_targets(&mut self) {
        self.update_main_target();
        self.evaluate_temp_target();
        self.update_phase();
        self.update_bonus_need();
    }

    pub(crate) fn update_main_target(&mut self) {
        let state = self.state;

        // A robot target follows its robot and is dropped once it died.
        let followed = self.robot.main_target.as_ref().and_then(|target| target.robot);
        if let Some(uid) = followed {
            match state.robot(uid).filter(|other| other.alive) {
                Some(other) => {
                    if let Some(target) = self.robot.main_target.as_mut() {
                        target.position = other.position;
                    }
                }
                None => {
                    debug!(robot = %self.robot.uid, target = %uid, "main target died");
                    self.robot.main_target = None;
                }
            }
        }

        let target = match self.robot.behavior {
            Behavior::Winner => self.exit_target(),
            Behavior::Hunter => self.hunter_target(),
            Behavior::Builder | Behavior::Sapper => self.work_target(),
            Behavior::Tourist | Behavior::Random => self.wander_target(),
            Behavior::Human => return,
        };

        let changed = match (&self.robot.main_target, &target) {
            (Some(old), Some(new)) => match (old.robot, new.robot) {
                (Some(a), Some(b)) => a != b,
                _ => old.position != new.position || old.robot != new.robot,
            },
            (None, None) => false,
            _ => true,
        };
        if changed {
            debug!(
                robot = %self.robot.uid,
                target = ?target.as_ref().map(|t| t.position),
                "main target updated"
            );
            self.robot.main_target = target;
            self.robot.temp_target = None;
        }
    }

    fn exit_target(&self) -> Option<Target> {
        self.grid()
            .exit()
            .map(|exit| Target::new(exit, CellKind::Exit))
    }

    /// Best adversary: potential winners first, closest to the exit, then closest to us.
    fn hunter_target(&self) -> Option<Target> {
        let state = self.state;
        let me = &self.robot;
        let exit = self.grid().exit();
        let others: Vec<&Robot> = state
            .robots
            .others(me.uid)
            .filter(|other| other.alive && other.behavior != Behavior::Hunter)
            .collect();
        let preferred: Vec<&Robot> = others
            .iter()
            .copied()
            .filter(|other| other.behavior.is_potential_winner())
            .collect();
        let pool = if preferred.is_empty() { others } else { preferred };

        pool.into_iter()
            .min_by_key(|other| {
                (
                    exit.map_or(0, |exit| other.position.path_length(exit)),
                    other.position.path_length(me.position),
                )
            })
            .map(|other| Target::robot(other.position, other.uid))
            .or_else(|| self.exit_target())
    }

    /// Barycenter of the half board where the worked kind is scarcest.
    ///
    /// Reaching the work area counts a visit and moves the robot to another half.
    fn work_target(&mut self) -> Option<Target> {
        let position = self.robot.position;
        let reached = self
            .memory
            .work_area
            .is_some_and(|area| area.contains(position));
        if reached {
            self.memory.work_area_visits += 1;
            trace!(robot = %self.robot.uid, visits = self.memory.work_area_visits, "work area reached");
        }
        if self.memory.work_area.is_none() || reached {
            let previous = self.memory.work_area;
            self.memory.work_area = self.scarcest_half(previous);
        }
        let area = self.memory.work_area?;
        let center = self.nearest_targetable(area, area.center())?;
        let kind = self.grid().kind_at(center)?;
        Some(Target::new(center, kind))
    }

    fn scarcest_half(&self, excluded: Option<WorkArea>) -> Option<WorkArea> {
        let grid = self.grid();
        let worked = if self.robot.behavior == Behavior::Sapper {
            CellKind::Danger
        } else {
            CellKind::Wall
        };
        let (x, y, w, h) = grid.inner_rect();
        if w == 0 || h == 0 {
            return None;
        }
        let (hw, hh) = (w.div_ceil(2), h.div_ceil(2));
        let halves = [
            WorkArea { x, y, w: hw, h },
            WorkArea { x: x + (w - hw) as i32, y, w: hw, h },
            WorkArea { x, y, w, h: hh },
            WorkArea { x, y: y + (h - hh) as i32, w, h: hh },
        ];

        halves
            .into_iter()
            .filter(|half| Some(*half) != excluded)
            .map(|half| {
                let count = grid.sub_rect(half.x, half.y, half.w, half.h).count(worked);
                (half, count as f64 / f64::from(half.area().max(1)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(half, _)| half)
    }

    fn nearest_targetable(&self, area: WorkArea, center: Position) -> Option<Position> {
        let grid = self.grid();
        grid.sub_rect(area.x, area.y, area.w, area.h)
            .typed_set(Family::PathTargetable)
            .into_iter()
            .filter(|p| *p != self.robot.position)
            .min_by_key(|p| (p.path_length(center), *p))
    }

    /// Random free cell of the inner board, redrawn once reached.
    fn wander_target(&mut self) -> Option<Target> {
        let position = self.robot.position;
        if let Some(target) = &self.robot.main_target {
            if target.position != position && self.grid().is_in(target.position, Family::Free) {
                return Some(target.clone());
            }
        }
        let grid = self.grid();
        let (x, y, w, h) = grid.inner_rect();
        let candidates: Vec<Position> = grid
            .sub_rect(x, y, w, h)
            .typed_set(Family::Free)
            .into_iter()
            .filter(|p| *p != position)
            .collect();
        let chosen = *candidates.choose(&mut *self.rng)?;
        let kind = grid.kind_at(chosen)?;
        Some(Target::new(chosen, kind))
    }

    /// Drops the temp target once reached or no longer worth following.
    pub(crate) fn evaluate_temp_target(&mut self) {
        let Some(temp) = self.robot.temp_target.clone() else {
            return;
        };
        let grid = self.grid();
        let position = self.robot.position;

        let reason = if temp.position == position {
            Some("reached")
        } else if !grid
            .kind_at(temp.position)
            .is_some_and(|kind| Family::PathTargetable.contains(kind))
        {
            Some("kind left the targetable family")
        } else if self
            .robot
            .history
            .last_action()
            .is_some_and(|record| record.action.kind == ActionKind::Grenade)
        {
            Some("grenade thrown")
        } else if temp.path.as_ref().is_some_and(|path| !path.contains(position)) {
            Some("robot left the path")
        } else {
            None
        };
        if let Some(reason) = reason {
            debug!(robot = %self.robot.uid, target = %temp.position, reason, "temp target dropped");
            self.robot.temp_target = None;
            return;
        }

        let Some(previous) = temp.path_cost() else {
            return;
        };
        match self.search_path(position, temp.position, true).path {
            Some(path) if path.cost <= previous => {
                if let Some(target) = self.robot.temp_target.as_mut() {
                    target.path = Some(path);
                }
            }
            _ => {
                debug!(robot = %self.robot.uid, target = %temp.position, "temp target path got worse");
                self.robot.temp_target = None;
            }
        }
    }

    pub(crate) fn update_phase(&mut self) {
        let grid = self.grid();
        let near = self.config.dist_approach;
        let position = self.robot.position;
        let main = self.robot.main_target.as_ref();

        let phase = match self.robot.behavior {
            Behavior::Winner => {
                let start_limit = (grid.dimensions().diagonal() * 2.0 / 6.0).ceil() as u32;
                if self.robot.actions_played < start_limit {
                    GamePhase::Start
                } else {
                    match main.map(|target| position.path_length(target.position)) {
                        Some(distance) if distance <= near => GamePhase::Final,
                        Some(distance) if distance <= 2 * near => GamePhase::Approach,
                        _ => GamePhase::InProgress,
                    }
                }
            }
            Behavior::Hunter => match main {
                Some(target) if target.robot.is_some() => {
                    let prey_closing_in = target
                        .robot
                        .and_then(|uid| self.state.robot(uid))
                        .is_some_and(|prey| prey.alive && prey.game_phase.is_closing_in());
                    if prey_closing_in {
                        GamePhase::Hunt
                    } else {
                        GamePhase::InProgress
                    }
                }
                Some(target)
                    if target.kind == CellKind::Exit
                        && position.path_length(target.position) <= near =>
                {
                    GamePhase::Final
                }
                _ => GamePhase::InProgress,
            },
            _ => GamePhase::InProgress,
        };
        if phase != self.robot.game_phase {
            debug!(robot = %self.robot.uid, from = %self.robot.game_phase, to = %phase, "phase of play changed");
        }
        self.robot.game_phase = phase;
    }

    pub(crate) fn update_bonus_need(&mut self) {
        let state = self.state;
        let config = self.config;
        let me = &self.robot;
        if !matches!(me.behavior, Behavior::Winner | Behavior::Hunter) {
            self.robot.need_bonus = false;
            self.robot.bonus_strategy = BonusStrategy::Ignore;
            return;
        }

        let opponents: Vec<&Robot> = state
            .robots
            .others(me.uid)
            .filter(|other| other.alive && other.behavior.is_potential_winner())
            .collect();
        let traits = &me.personality;
        let need = !opponents.is_empty()
            && me.game_phase != GamePhase::Final
            && (traits.intelligence > config.high
                || config.is_mid(traits.efficiency + traits.ambition));

        let strategy = if !need {
            BonusStrategy::Ignore
        } else if me.behavior == Behavior::Winner {
            let retard = self.retard(&opponents);
            let someone_closing_in = opponents.iter().any(|o| o.game_phase.is_closing_in());
            if someone_closing_in && retard > 0 {
                BonusStrategy::BonusTarget
            } else {
                BonusStrategy::BonusAll
            }
        } else {
            BonusStrategy::BonusAll
        };

        trace!(robot = %me.uid, need, strategy = %strategy, "bonus need evaluated");
        self.robot.need_bonus = need;
        self.robot.bonus_strategy = strategy;
    }

    /// How far behind the best opponent the robot is: −1 ahead, 0 tied, 1 to 3 behind.
    fn retard(&self, opponents: &[&Robot]) -> i32 {
        let Some(exit) = self.grid().exit() else {
            return 0;
        };
        let near = self.config.dist_approach as i32;
        let own = self.robot.position.path_length(exit) as i32;
        let Some(best) = opponents
            .iter()
            .map(|other| other.position.path_length(exit) as i32)
            .min()
        else {
            return -1;
        };
        match own - best {
            d if d < 0 => -1,
            0 => 0,
            d if d < near => 1,
            d if d < 2 * near => 2,
            _ => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use maze_core::{Cell, GameState, Grid, PcgRng, RobotId};

    use super::*;
    use crate::memory::RobotMemory;

    fn run_targets(state: &GameState, uid: u32, memory: &mut RobotMemory) -> Robot {
        let mut rng = PcgRng::new(11);
        let robot = state.robot(RobotId(uid)).unwrap().clone();
        let mut ctx = AiContext::new(state, robot, 1, 1, 1, memory, &mut rng);
        ctx.refresh_global_sets();
        ctx.recognize_area();
        ctx.maintain_targets();
        ctx.finish().0
    }

    #[test]
    fn test_winner_targets_exit_and_reaches_final() {
        let mut state = GameState::new(Grid::open(9, 9));
        state.grid.set_cell(Cell::exit(Position::new(6, 6)));
        let mut winner = Robot::builder(1, Position::new(4, 5)).build();
        winner.actions_played = 20;
        state.add_robot(winner).unwrap();

        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        let target = robot.main_target.unwrap();
        assert_eq!(target.position, Position::new(6, 6));
        assert_eq!(target.kind, CellKind::Exit);
        assert_eq!(robot.game_phase, GamePhase::Final);
    }

    #[test]
    fn test_winner_starts_in_start_phase() {
        let mut state = GameState::new(Grid::open(9, 9));
        state.grid.set_cell(Cell::exit(Position::new(7, 7)));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).build())
            .unwrap();
        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        assert_eq!(robot.game_phase, GamePhase::Start);
    }

    #[test]
    fn test_hunter_prefers_potential_winners() {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 1))
                    .behavior(Behavior::Hunter)
                    .build(),
            )
            .unwrap();
        state
            .add_robot(
                Robot::builder(2, Position::new(2, 1))
                    .behavior(Behavior::Tourist)
                    .build(),
            )
            .unwrap();
        state
            .add_robot(Robot::builder(3, Position::new(7, 7)).build())
            .unwrap();

        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        assert_eq!(robot.main_target.unwrap().robot, Some(RobotId(3)));
    }

    #[test]
    fn test_dead_robot_target_is_dropped() {
        let mut state = GameState::new(Grid::open(9, 9));
        let mut hunter = Robot::builder(1, Position::new(1, 1))
            .behavior(Behavior::Hunter)
            .build();
        hunter.main_target = Some(Target::robot(Position::new(5, 5), RobotId(9)));
        state.add_robot(hunter).unwrap();
        state
            .add_robot(Robot::builder(2, Position::new(3, 3)).build())
            .unwrap();

        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        assert_eq!(robot.main_target.unwrap().robot, Some(RobotId(2)));
    }

    #[test]
    fn test_sapper_moves_on_after_reaching_work_area() {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(
                Robot::builder(1, Position::new(2, 2))
                    .behavior(Behavior::Sapper)
                    .build(),
            )
            .unwrap();
        let mut memory = RobotMemory::default();
        memory.work_area = Some(WorkArea {
            x: 1,
            y: 1,
            w: 4,
            h: 7,
        });

        let robot = run_targets(&state, 1, &mut memory);
        assert_eq!(memory.work_area_visits, 1);
        let area = memory.work_area.unwrap();
        assert_ne!(
            area,
            WorkArea {
                x: 1,
                y: 1,
                w: 4,
                h: 7
            }
        );
        assert!(area.contains(robot.main_target.unwrap().position));
    }

    #[test]
    fn test_tourist_picks_a_free_inner_cell() {
        let mut state = GameState::new(Grid::open(7, 7));
        state
            .add_robot(
                Robot::builder(1, Position::new(3, 3))
                    .behavior(Behavior::Tourist)
                    .build(),
            )
            .unwrap();
        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        let target = robot.main_target.unwrap();
        assert_ne!(target.position, Position::new(3, 3));
        assert!(state.grid.is_in(target.position, Family::Free));
    }

    #[test]
    fn test_bonus_need_requires_an_opponent() {
        let mut state = GameState::new(Grid::open(9, 9));
        state
            .add_robot(Robot::builder(1, Position::new(1, 1)).intelligence(0.9).build())
            .unwrap();
        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        assert!(!robot.need_bonus);
        assert_eq!(robot.bonus_strategy, BonusStrategy::Ignore);

        state
            .add_robot(Robot::builder(2, Position::new(7, 7)).build())
            .unwrap();
        let robot = run_targets(&state, 1, &mut RobotMemory::default());
        assert!(robot.need_bonus);
        assert_eq!(robot.bonus_strategy, BonusStrategy::BonusAll);
    }
}
