//! Parsed command types.

use crate::grid::{Direction, Impact, Position};

/// Kind of a robot action.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Move,
    CreateDoor,
    CreateWall,
    Kill,
    Mine,
    Grenade,
}

/// One atomic robot action.
///
/// `distance` is the number of cells for a move, the range for a grenade and
/// 1 otherwise. `power` is meaningful for mines and grenades only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub kind: ActionKind,
    pub direction: Direction,
    pub distance: u32,
    pub power: Impact,
}

impl Action {
    pub const fn new(kind: ActionKind, direction: Direction, distance: u32, power: Impact) -> Self {
        Self {
            kind,
            direction,
            distance,
            power,
        }
    }

    pub const fn step(direction: Direction) -> Self {
        Self::new(ActionKind::Move, direction, 1, Impact::Point)
    }

    pub const fn moves(direction: Direction, distance: u32) -> Self {
        Self::new(ActionKind::Move, direction, distance, Impact::Point)
    }

    pub const fn door(direction: Direction) -> Self {
        Self::new(ActionKind::CreateDoor, direction, 1, Impact::Point)
    }

    pub const fn wall(direction: Direction) -> Self {
        Self::new(ActionKind::CreateWall, direction, 1, Impact::Point)
    }

    pub const fn kill(direction: Direction) -> Self {
        Self::new(ActionKind::Kill, direction, 1, Impact::Point)
    }

    pub const fn mine(direction: Direction, power: Impact) -> Self {
        Self::new(ActionKind::Mine, direction, 1, power)
    }

    pub const fn grenade(direction: Direction, range: u32, power: Impact) -> Self {
        Self::new(ActionKind::Grenade, direction, range, power)
    }

    /// Cell the action is aimed at from `origin`.
    pub fn target_from(&self, origin: Position) -> Position {
        origin.offset(self.direction, self.distance as i32)
    }
}

/// Commands that drive the game itself rather than a robot.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum GlobalCommand {
    Help,
    Menu,
    Quit,
    Start,
    Reset,
}

/// Any parsed command string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    Action(Action),
    Global(GlobalCommand),
}

impl Command {
    pub fn action(&self) -> Option<&Action> {
        match self {
            Command::Action(action) => Some(action),
            Command::Global(_) => None,
        }
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Command::Action(action)
    }
}
