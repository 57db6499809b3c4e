//! Application of consequence lists to the board.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::consequence::Consequence;
use super::error::CommandError;
use super::validator::CommandValidator;
use crate::grid::{Cell, CellContent, CellKind, Impact, Position, RobotId};

/// What an applied consequence list did to the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Applied {
    /// Robots killed, in order, possibly including the actor.
    pub killed: Vec<RobotId>,
    /// Danger cells that went off.
    pub detonated: Vec<Position>,
    pub bonuses: u32,
}

impl CommandValidator<'_> {
    /// Performs the grid mutations of `consequences` for the acting robot `uid`.
    ///
    /// Explosions follow the chained cascade of the grid: robots in the blast
    /// die, dangers go off, walls and bonuses are destroyed. Doors, the exit
    /// and the perimeter survive.
    pub fn apply(
        &mut self,
        uid: RobotId,
        consequences: &[Consequence],
    ) -> Result<Applied, CommandError> {
        let mut applied = Applied::default();
        for consequence in consequences {
            match consequence {
                Consequence::BotMove { robot, from, to, .. } => {
                    self.state.grid.move_cell(CellKind::Robot, *from, *to)?;
                    let record = self
                        .state
                        .robots
                        .get_mut(*robot)
                        .ok_or(CommandError::RobotNotFound(*robot))?;
                    record.position = *to;
                }
                Consequence::BonusWin { robot, position } => {
                    if self
                        .state
                        .grid
                        .layer_cell(CellKind::Bonus, *position)
                        .is_some()
                    {
                        self.state.grid.delete_cell(CellKind::Bonus, *position)?;
                    }
                    let config = self.state.config.clone();
                    let record = self
                        .state
                        .robots
                        .get_mut(*robot)
                        .ok_or(CommandError::RobotNotFound(*robot))?;
                    record.claim_bonus(&config);
                    applied.bonuses += 1;
                }
                Consequence::DangerActivated { cell, .. } => {
                    let impact = cell.impact().unwrap_or(Impact::Point);
                    self.explode(cell.position, impact, &mut applied)?;
                }
                Consequence::LaunchGrenade { grenade, to, .. } => {
                    self.state.grid.set_cell(*grenade);
                    let impact = grenade.impact().unwrap_or(Impact::Point);
                    self.explode(*to, impact, &mut applied)?;
                    self.state.grid.delete_cell(CellKind::Grenade, *to)?;
                }
                Consequence::CaseToAdd { cell } => {
                    self.state.grid.set_cell(*cell);
                    if let CellContent::Danger { owner: Some(owner), .. } = cell.content {
                        if let Some(record) = self.state.robots.get_mut(owner) {
                            record.equipment.has_mine = false;
                        }
                    }
                }
                Consequence::RobotKilled { robot } => {
                    self.kill(*robot, &mut applied)?;
                }
            }
        }
        debug!(
            robot = %uid,
            killed = applied.killed.len(),
            detonated = applied.detonated.len(),
            "consequences applied"
        );
        Ok(applied)
    }

    fn explode(
        &mut self,
        origin: Position,
        impact: Impact,
        applied: &mut Applied,
    ) -> Result<(), CommandError> {
        let cascade = self.state.grid.impact_cascade_from(origin, impact);
        let hit: BTreeSet<Position> = cascade.flat_list.clone();
        applied.detonated.extend(cascade.detonated.iter().copied());
        if !cascade.detonated.contains(&origin) {
            applied.detonated.push(origin);
        }

        for position in hit {
            if let Some(uid) = self
                .state
                .grid
                .layer_cell(CellKind::Robot, position)
                .and_then(Cell::robot_id)
            {
                self.kill(uid, applied)?;
            }
            for kind in [CellKind::Danger, CellKind::Bonus] {
                if self.state.grid.layer_cell(kind, position).is_some() {
                    self.state.grid.delete_cell(kind, position)?;
                }
            }
            if self.state.grid.layer_cell(CellKind::Wall, position).is_some() {
                self.state.grid.set_cell(Cell::empty(position));
            }
        }
        Ok(())
    }

    fn kill(&mut self, uid: RobotId, applied: &mut Applied) -> Result<(), CommandError> {
        let Some(record) = self.state.robots.get_mut(uid) else {
            warn!(robot = %uid, "robot cell without roster entry");
            return Err(CommandError::RobotNotFound(uid));
        };
        if !record.alive {
            return Ok(());
        }
        record.alive = false;
        record.move_zone.clear();
        record.attack_zone.clear();
        let position = record.position;
        self.state.grid.remove_robot(position)?;
        applied.killed.push(uid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Family, Grid};
    use crate::robot::Robot;
    use crate::state::GameState;

    fn state() -> GameState {
        let mut state = GameState::new(Grid::open(9, 7));
        state
            .add_robot(
                Robot::builder(1, Position::new(1, 3))
                    .grenade(Impact::SmallDiamond, 2)
                    .build(),
            )
            .unwrap();
        state
    }

    #[test]
    fn test_grenade_chain_kills_and_clears() {
        let mut state = state();
        state
            .grid
            .set_cell(Cell::danger(Position::new(3, 3), Impact::SmallDiamond));
        state
            .grid
            .set_cell(Cell::danger(Position::new(4, 3), Impact::SmallSquare));
        state.grid.set_cell(Cell::wall(Position::new(3, 2)));
        state
            .add_robot(Robot::builder(2, Position::new(5, 3)).build())
            .unwrap();

        let report = CommandValidator::new(&mut state)
            .play(RobotId(1), "ge2-5", 1, 1, 1)
            .unwrap();
        assert_eq!(report.kills, vec![RobotId(2)]);
        assert!(!state.robot(RobotId(2)).unwrap().alive);
        assert!(state.grid.typed_set(CellKind::Danger).is_empty());
        assert_eq!(state.grid.kind_at(Position::new(3, 2)), Some(CellKind::Empty));
        assert!(state.grid.typed_set(CellKind::Grenade).is_empty());
        assert!(state.robot(RobotId(1)).unwrap().alive);
    }

    #[test]
    fn test_kill_removes_robot_cell() {
        let mut state = state();
        state
            .add_robot(Robot::builder(2, Position::new(2, 3)).build())
            .unwrap();
        let report = CommandValidator::new(&mut state)
            .play(RobotId(1), "ke", 1, 1, 1)
            .unwrap();
        assert_eq!(report.kills, vec![RobotId(2)]);
        assert_eq!(state.grid.kind_at(Position::new(2, 3)), Some(CellKind::Empty));
        assert_eq!(state.robot(RobotId(1)).unwrap().history.kills_total, 1);
    }

    #[test]
    fn test_bonus_and_mine_bookkeeping() {
        let mut state = state();
        state.grid.set_cell(Cell::bonus(Position::new(2, 3)));
        CommandValidator::new(&mut state)
            .play(RobotId(1), "e", 1, 1, 1)
            .unwrap();
        let robot = state.robot(RobotId(1)).unwrap();
        assert_eq!(robot.position, Position::new(2, 3));
        assert_eq!(robot.equipment.grenade_range, 3);
        assert!(state.grid.typed_set(CellKind::Bonus).is_empty());

        state.robot_mut(RobotId(1)).unwrap().equipment.has_mine = true;
        CommandValidator::new(&mut state)
            .play(RobotId(1), "bs", 2, 1, 1)
            .unwrap();
        assert!(!state.robot(RobotId(1)).unwrap().equipment.has_mine);
        assert_eq!(state.grid.kind_at(Position::new(2, 4)), Some(CellKind::Danger));
    }

    #[test]
    fn test_linked_family_stays_exclusive() {
        let mut state = state();
        state.grid.set_cell(Cell::wall(Position::new(1, 2)));
        CommandValidator::new(&mut state)
            .play(RobotId(1), "pn", 1, 1, 1)
            .unwrap();
        let linked = Family::Linked.members();
        for position in state.grid.play_set() {
            let count = linked
                .kinds()
                .filter(|kind| state.grid.layer_cell(*kind, position).is_some())
                .count();
            assert!(count <= 1, "{position} holds {count} linked cells");
        }
        assert_eq!(state.grid.kind_at(Position::new(1, 2)), Some(CellKind::Door));
    }
}
