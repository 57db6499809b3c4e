use crate::grid::{Cell, Position, RobotId};

/// One effect of an accepted command, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Consequence {
    BotMove {
        robot: RobotId,
        from: Position,
        to: Position,
        nb_cells: u32,
    },
    BonusWin {
        robot: RobotId,
        position: Position,
    },
    /// A danger goes off. `robot` is the robot that stepped on it, if any.
    DangerActivated {
        robot: Option<RobotId>,
        cell: Cell,
    },
    LaunchGrenade {
        grenade: Cell,
        from: Position,
        to: Position,
        nb_cells: u32,
    },
    /// A new wall, door or mine.
    CaseToAdd {
        cell: Cell,
    },
    RobotKilled {
        robot: RobotId,
    },
}

impl Consequence {
    pub fn killed(&self) -> Option<RobotId> {
        match self {
            Consequence::RobotKilled { robot } => Some(*robot),
            _ => None,
        }
    }
}
