//! Cell kinds, cell payloads and blast impacts.

use std::fmt;

use super::Position;

/// Unique identifier of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotId(pub u32);

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Blast strength of a danger or a grenade.
///
/// Only six values exist on the board; each one maps to a fixed footprint
/// (see [`Impact::footprint`]).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Impact {
    /// Landing cell only.
    Point = 1,
    /// 3×3 diamond (center + four neighbours).
    SmallDiamond = 5,
    /// 3×3 square.
    SmallSquare = 9,
    /// 5×5 diamond.
    LargeDiamond = 13,
    /// 17-cell crenellated 5×5.
    Crenellated = 17,
    /// 5×5 square.
    LargeSquare = 25,
}

/// Footprint shapes addressed by impact values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Footprint {
    Point,
    Diamond { dim: u32 },
    Square { dim: u32 },
    Crenellated,
}

impl Impact {
    pub const ALL: [Impact; 6] = [
        Impact::Point,
        Impact::SmallDiamond,
        Impact::SmallSquare,
        Impact::LargeDiamond,
        Impact::Crenellated,
        Impact::LargeSquare,
    ];

    pub const fn value(self) -> u32 {
        self as u32
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|impact| impact.value() == value)
    }

    /// Outer blast radius (Chebyshev): 0, 1 or 2.
    pub const fn radius(self) -> i32 {
        match self {
            Impact::Point => 0,
            Impact::SmallDiamond | Impact::SmallSquare => 1,
            Impact::LargeDiamond | Impact::Crenellated | Impact::LargeSquare => 2,
        }
    }

    pub const fn footprint(self) -> Footprint {
        match self {
            Impact::Point => Footprint::Point,
            Impact::SmallDiamond => Footprint::Diamond { dim: 3 },
            Impact::SmallSquare => Footprint::Square { dim: 3 },
            Impact::LargeDiamond => Footprint::Diamond { dim: 5 },
            Impact::Crenellated => Footprint::Crenellated,
            Impact::LargeSquare => Footprint::Square { dim: 5 },
        }
    }

    /// Next stronger impact, if any.
    pub fn stronger(self) -> Option<Self> {
        Self::ALL.into_iter().find(|impact| *impact > self)
    }

    /// All impacts up to and including `self`.
    pub fn up_to(self) -> impl Iterator<Item = Impact> {
        Self::ALL.into_iter().filter(move |impact| *impact <= self)
    }

    /// Square root of the impact value, used as a danger weight.
    pub fn weight(self) -> f64 {
        f64::from(self.value()).sqrt()
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Cell kinds in z-order (lowest first).
///
/// The derived ordering is the stacking order of the flat projection: a kind
/// declared later hides an earlier kind at the same coordinates.
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
pub enum CellKind {
    PerimeterWall,
    Exit,
    Empty,
    Door,
    Wall,
    Danger,
    Bonus,
    Robot,
    Grenade,
    AnimationMarker,
}

impl CellKind {
    pub const ALL: [CellKind; 10] = [
        CellKind::PerimeterWall,
        CellKind::Exit,
        CellKind::Empty,
        CellKind::Door,
        CellKind::Wall,
        CellKind::Danger,
        CellKind::Bonus,
        CellKind::Robot,
        CellKind::Grenade,
        CellKind::AnimationMarker,
    ];

    /// Z-level of the kind in the flat projection.
    pub const fn z(self) -> u8 {
        self as u8
    }
}

/// Typed payload of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellContent {
    Empty,
    Wall,
    PerimeterWall,
    Door,
    Exit,
    Robot {
        uid: RobotId,
    },
    Bonus,
    /// A mine. `owner` is the robot that planted it, `None` for map mines.
    Danger {
        impact: Impact,
        owner: Option<RobotId>,
    },
    /// A grenade in flight or about to explode, thrown from `origin`.
    Grenade {
        impact: Impact,
        origin: Position,
    },
    AnimationMarker,
}

impl CellContent {
    pub const fn kind(&self) -> CellKind {
        match self {
            CellContent::Empty => CellKind::Empty,
            CellContent::Wall => CellKind::Wall,
            CellContent::PerimeterWall => CellKind::PerimeterWall,
            CellContent::Door => CellKind::Door,
            CellContent::Exit => CellKind::Exit,
            CellContent::Robot { .. } => CellKind::Robot,
            CellContent::Bonus => CellKind::Bonus,
            CellContent::Danger { .. } => CellKind::Danger,
            CellContent::Grenade { .. } => CellKind::Grenade,
            CellContent::AnimationMarker => CellKind::AnimationMarker,
        }
    }
}

/// One cell of one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub position: Position,
    pub content: CellContent,
}

impl Cell {
    pub const fn new(position: Position, content: CellContent) -> Self {
        Self { position, content }
    }

    pub const fn empty(position: Position) -> Self {
        Self::new(position, CellContent::Empty)
    }

    pub const fn wall(position: Position) -> Self {
        Self::new(position, CellContent::Wall)
    }

    pub const fn door(position: Position) -> Self {
        Self::new(position, CellContent::Door)
    }

    pub const fn exit(position: Position) -> Self {
        Self::new(position, CellContent::Exit)
    }

    pub const fn bonus(position: Position) -> Self {
        Self::new(position, CellContent::Bonus)
    }

    pub const fn perimeter(position: Position) -> Self {
        Self::new(position, CellContent::PerimeterWall)
    }

    pub const fn danger(position: Position, impact: Impact) -> Self {
        Self::new(
            position,
            CellContent::Danger {
                impact,
                owner: None,
            },
        )
    }

    pub const fn robot(position: Position, uid: RobotId) -> Self {
        Self::new(position, CellContent::Robot { uid })
    }

    pub const fn grenade(position: Position, impact: Impact, origin: Position) -> Self {
        Self::new(position, CellContent::Grenade { impact, origin })
    }

    #[inline]
    pub const fn kind(&self) -> CellKind {
        self.content.kind()
    }

    #[inline]
    pub const fn x(&self) -> i32 {
        self.position.x
    }

    #[inline]
    pub const fn y(&self) -> i32 {
        self.position.y
    }

    /// Blast impact carried by dangers and grenades.
    pub const fn impact(&self) -> Option<Impact> {
        match self.content {
            CellContent::Danger { impact, .. } | CellContent::Grenade { impact, .. } => {
                Some(impact)
            }
            _ => None,
        }
    }

    /// Robot uid for robot cells.
    pub const fn robot_id(&self) -> Option<RobotId> {
        match self.content {
            CellContent::Robot { uid } => Some(uid),
            _ => None,
        }
    }

    pub fn is(&self, kind: CellKind) -> bool {
        self.kind() == kind
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_values_round_trip() {
        for impact in Impact::ALL {
            assert_eq!(Impact::from_value(impact.value()), Some(impact));
        }
        assert_eq!(Impact::from_value(7), None);
    }

    #[test]
    fn test_impact_radius() {
        assert_eq!(Impact::Point.radius(), 0);
        assert_eq!(Impact::SmallSquare.radius(), 1);
        assert_eq!(Impact::Crenellated.radius(), 2);
    }

    #[test]
    fn test_z_order() {
        assert!(CellKind::PerimeterWall < CellKind::Exit);
        assert!(CellKind::Wall < CellKind::Danger);
        assert!(CellKind::Robot < CellKind::Grenade);
        assert_eq!(CellKind::AnimationMarker.z(), 9);
    }
}
