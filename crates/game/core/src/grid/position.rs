use std::fmt;

/// Discrete grid position expressed in cell coordinates.
///
/// `x` grows to the east, `y` grows to the south (screen orientation), so
/// north is `y - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position one cell away in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        self.offset(direction, 1)
    }

    /// Returns the position `distance` cells away in `direction`.
    #[inline]
    pub fn offset(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }

    #[inline]
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan distance (the number of atomic moves on an open board).
    #[inline]
    pub fn path_length(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Integer vector from `self` to `other`.
    #[inline]
    pub fn vector(self, other: Self) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Returns true when both cells share an edge.
    #[inline]
    pub fn is_adjacent(self, other: Self) -> bool {
        self.path_length(other) == 1
    }

    /// Direction of an adjacent cell, if `other` is 4-adjacent.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        match self.vector(other) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// Direction along the dominant axis of the vector to `other`.
    ///
    /// Ties favour the horizontal axis. Returns `None` when both positions
    /// coincide.
    pub fn dominant_direction(self, other: Self) -> Option<Direction> {
        let (dx, dy) = self.vector(other);
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0 { Direction::South } else { Direction::North })
        }
    }

    /// Directions that strictly reduce the Manhattan distance to `other`,
    /// dominant axis first.
    pub fn directions_toward(self, other: Self) -> Vec<Direction> {
        let (dx, dy) = self.vector(other);
        let horizontal = match dx.signum() {
            1 => Some(Direction::East),
            -1 => Some(Direction::West),
            _ => None,
        };
        let vertical = match dy.signum() {
            1 => Some(Direction::South),
            -1 => Some(Direction::North),
            _ => None,
        };
        if dx.abs() >= dy.abs() {
            horizontal.into_iter().chain(vertical).collect()
        } else {
            vertical.into_iter().chain(horizontal).collect()
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The four board directions.
///
/// Declaration order is the canonical iteration order used by every
/// deterministic search (north, south, west, east).
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
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Direction::West | Direction::East)
    }

    /// The two directions orthogonal to `self`.
    pub const fn perpendiculars(self) -> [Direction; 2] {
        if self.is_horizontal() {
            [Direction::North, Direction::South]
        } else {
            [Direction::West, Direction::East]
        }
    }

    /// Axis sign of the direction (+1 toward growing coordinates).
    pub const fn sign(self) -> i32 {
        match self {
            Direction::North | Direction::West => -1,
            Direction::South | Direction::East => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, 5);
        assert_eq!(a.path_length(b), 7);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
        assert_eq!(a.vector(b), (3, 4));
    }

    #[test]
    fn test_dominant_direction_prefers_horizontal_on_tie() {
        let a = Position::new(2, 2);
        assert_eq!(a.dominant_direction(Position::new(4, 4)), Some(Direction::East));
        assert_eq!(a.dominant_direction(Position::new(2, 0)), Some(Direction::North));
        assert_eq!(a.dominant_direction(a), None);
    }

    #[test]
    fn test_directions_toward() {
        let a = Position::new(2, 2);
        assert_eq!(
            a.directions_toward(Position::new(3, 6)),
            vec![Direction::South, Direction::East]
        );
        assert_eq!(a.directions_toward(Position::new(0, 2)), vec![Direction::West]);
    }

    #[test]
    fn test_direction_to_adjacent_only() {
        let a = Position::new(2, 2);
        assert_eq!(a.direction_to(Position::new(2, 1)), Some(Direction::North));
        assert_eq!(a.direction_to(Position::new(3, 3)), None);
    }
}
