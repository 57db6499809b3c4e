//! Landing ranges that put a target inside a blast footprint.
//!
//! A straight throw along an axis is described by `(d, D)`: `D` is the
//! offset of the target along the throw axis, `d` its offset across it.
//! Each power admits a fixed set of ranges around `D`.

use maze_core::Impact;

/// Candidate ranges for a throw of `power` at a target offset by `(d, big)`.
///
/// Ranges below 1 are dropped. The caller still checks the robot's range
/// and the footprint itself.
pub fn candidate_ranges(power: Impact, d: u32, big: u32) -> Vec<u32> {
    let big = big as i64;
    let around = |spread: i64| (big - spread..=big + spread).collect::<Vec<i64>>();
    let ranges = match (power, d) {
        (Impact::Point, 0) => vec![big],
        (Impact::SmallDiamond, 0) => around(1),
        (Impact::SmallDiamond, 1) => vec![big],
        (Impact::SmallSquare, 0 | 1) => around(1),
        (Impact::LargeDiamond, 0) => around(2),
        (Impact::LargeDiamond, 1) => around(1),
        (Impact::LargeDiamond, 2) => vec![big],
        (Impact::Crenellated, 1 | 2) => around(2)
            .into_iter()
            .filter(|range| (big - range + 1).rem_euclid(2) == 1)
            .collect(),
        (Impact::LargeSquare, 0..=2) => around(2),
        _ => Vec::new(),
    };
    ranges
        .into_iter()
        .filter(|range| *range >= 1)
        .map(|range| range as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use maze_core::Position;
    use maze_core::grid::shape;

    use super::*;

    #[test]
    fn test_point_needs_exact_alignment() {
        assert_eq!(candidate_ranges(Impact::Point, 0, 3), vec![3]);
        assert!(candidate_ranges(Impact::Point, 1, 3).is_empty());
    }

    #[test]
    fn test_small_diamond_patterns() {
        assert_eq!(candidate_ranges(Impact::SmallDiamond, 0, 2), vec![1, 2, 3]);
        assert_eq!(candidate_ranges(Impact::SmallDiamond, 1, 2), vec![2]);
        assert_eq!(candidate_ranges(Impact::SmallDiamond, 0, 1), vec![1, 2]);
    }

    #[test]
    fn test_crenellated_keeps_even_offsets() {
        assert_eq!(candidate_ranges(Impact::Crenellated, 2, 4), vec![2, 4, 6]);
        assert_eq!(candidate_ranges(Impact::Crenellated, 1, 3), vec![1, 3, 5]);
    }

    #[test]
    fn test_crenellated_needs_an_offset_target() {
        assert!(candidate_ranges(Impact::Crenellated, 0, 3).is_empty());
        assert!(candidate_ranges(Impact::Crenellated, 3, 3).is_empty());
    }

    #[test]
    fn test_patterns_stay_inside_footprints() {
        let origin = Position::new(0, 0);
        for (d, big) in [(0u32, 3u32), (1, 3), (2, 4)] {
            let target = Position::new(big as i32, d as i32);
            for power in Impact::ALL {
                for range in candidate_ranges(power, d, big) {
                    let landing = Position::new(origin.x + range as i32, origin.y);
                    if power == Impact::Crenellated {
                        let offset = big as i64 - range as i64 + 1;
                        assert_eq!(offset.rem_euclid(2), 1, "d={d} D={big} r={range}");
                    } else {
                        let inside = shape::footprint_contains(landing, power, target);
                        assert!(inside, "{power:?} d={d} D={big} r={range}");
                    }
                }
            }
        }
    }
}
