//! Coordinate generators for rectangles, diamonds and the crenellated 5×5.
//!
//! Generators are pure: they return every coordinate of the shape, whether
//! or not it lies inside a grid. [`super::Grid`] filters them against its
//! bounds when building sub-grids.

use super::{Footprint, Impact, Position};

/// Coordinates of the `w × h` rectangle whose top-left corner is `(x, y)`.
pub fn rect(x: i32, y: i32, w: u32, h: u32) -> Vec<Position> {
    let mut coords = Vec::with_capacity((w * h) as usize);
    for cy in y..y + h as i32 {
        for cx in x..x + w as i32 {
            coords.push(Position::new(cx, cy));
        }
    }
    coords
}

/// Coordinates of the `dim × dim` square centered on `center` (`dim` odd).
pub fn square(center: Position, dim: u32) -> Vec<Position> {
    let half = (dim / 2) as i32;
    rect(center.x - half, center.y - half, dim, dim)
}

/// Coordinates of the diamond of width `dim` centered on `center` (`dim` odd).
///
/// A diamond of width `dim` holds every cell at Manhattan distance
/// `<= dim / 2` from the center.
pub fn diamond(center: Position, dim: u32) -> Vec<Position> {
    let half = (dim / 2) as i32;
    let mut coords = Vec::new();
    for dy in -half..=half {
        let span = half - dy.abs();
        for dx in -span..=span {
            coords.push(center.translate(dx, dy));
        }
    }
    coords
}

/// Coordinates of the diamond of Manhattan radius `radius`.
pub fn diamond_radius(center: Position, radius: u32) -> Vec<Position> {
    diamond(center, radius * 2 + 1)
}

/// The 17-cell crenellated 5×5: the 5×5 diamond plus the four corners.
///
/// ```text
/// X.X.X
/// .XXX.
/// XXXXX
/// .XXX.
/// X.X.X
/// ```
pub fn crenellated(center: Position) -> Vec<Position> {
    let mut coords = diamond(center, 5);
    for (dx, dy) in [(-2, -2), (2, -2), (-2, 2), (2, 2)] {
        coords.push(center.translate(dx, dy));
    }
    coords.sort();
    coords
}

/// Every coordinate covered by a blast of `impact` centered on `center`,
/// center included.
pub fn footprint(center: Position, impact: Impact) -> Vec<Position> {
    match impact.footprint() {
        Footprint::Point => vec![center],
        Footprint::Diamond { dim } => diamond(center, dim),
        Footprint::Square { dim } => square(center, dim),
        Footprint::Crenellated => crenellated(center),
    }
}

/// Returns true when `cell` lies inside the blast of `impact` at `center`.
pub fn footprint_contains(center: Position, impact: Impact, cell: Position) -> bool {
    let dx = (cell.x - center.x).abs();
    let dy = (cell.y - center.y).abs();
    match impact.footprint() {
        Footprint::Point => dx == 0 && dy == 0,
        Footprint::Diamond { dim } => dx + dy <= (dim / 2) as i32,
        Footprint::Square { dim } => dx.max(dy) <= (dim / 2) as i32,
        Footprint::Crenellated => dx + dy <= 2 || (dx == 2 && dy == 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_sizes() {
        let c = Position::new(10, 10);
        assert_eq!(footprint(c, Impact::Point).len(), 1);
        assert_eq!(footprint(c, Impact::SmallDiamond).len(), 5);
        assert_eq!(footprint(c, Impact::SmallSquare).len(), 9);
        assert_eq!(footprint(c, Impact::LargeDiamond).len(), 13);
        assert_eq!(footprint(c, Impact::Crenellated).len(), 17);
        assert_eq!(footprint(c, Impact::LargeSquare).len(), 25);
    }

    #[test]
    fn test_footprint_contains_matches_generator() {
        let c = Position::new(0, 0);
        for impact in Impact::ALL {
            let cells = footprint(c, impact);
            for cell in square(c, 7) {
                assert_eq!(
                    footprint_contains(c, impact, cell),
                    cells.contains(&cell),
                    "{impact:?} at {cell}"
                );
            }
        }
    }

    #[test]
    fn test_crenellated_is_symmetric() {
        let c = Position::new(0, 0);
        let cells = crenellated(c);
        for cell in &cells {
            assert!(cells.contains(&Position::new(-cell.x, cell.y)));
            assert!(cells.contains(&Position::new(cell.x, -cell.y)));
            assert!(cells.contains(&Position::new(cell.y, cell.x)));
        }
        assert!(!cells.contains(&Position::new(2, 1)));
    }
}
