//! Blast footprints and chained explosions.

use std::collections::{BTreeMap, BTreeSet};

use super::{Cell, CellKind, Grid, Impact, Position, shape};

/// Outcome of a chained explosion, grouped by time step.
///
/// Step 0 holds the initial blast center. Every other entry records the
/// impact of the explosion that reached the cell at that step, not the
/// cell's own danger value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImpactCascade {
    pub steps: BTreeMap<u32, BTreeSet<(Position, Impact)>>,
    /// Union of every cell of every step.
    pub flat_list: BTreeSet<Position>,
    /// Danger cells that detonated, in expansion order.
    pub detonated: Vec<Position>,
}

impl ImpactCascade {
    pub fn reaches(&self, position: Position) -> bool {
        self.flat_list.contains(&position)
    }

    /// First step at which `position` is hit.
    pub fn step_of(&self, position: Position) -> Option<u32> {
        self.steps
            .iter()
            .find(|(_, cells)| cells.iter().any(|(p, _)| *p == position))
            .map(|(step, _)| *step)
    }

    pub fn last_step(&self) -> u32 {
        self.steps.keys().next_back().copied().unwrap_or(0)
    }

    fn record(&mut self, step: u32, position: Position, impact: Impact) {
        self.steps.entry(step).or_default().insert((position, impact));
        self.flat_list.insert(position);
    }
}

impl Grid {
    /// Cells inside the blast footprint of a danger, the danger itself excluded.
    ///
    /// Non-dangers have an empty footprint.
    pub fn cells_adj_impacted_by_danger(&self, danger: &Cell) -> Vec<Cell> {
        match danger.impact() {
            Some(impact) => self.cells_impacted_by(danger.position, impact),
            None => Vec::new(),
        }
    }

    /// Cells inside the footprint of `impact` centered on `center`, center excluded.
    pub fn cells_impacted_by(&self, center: Position, impact: Impact) -> Vec<Cell> {
        shape::footprint(center, impact)
            .into_iter()
            .filter(|p| *p != center)
            .filter_map(|p| self.cell(p).copied())
            .collect()
    }

    /// Chained explosion triggered by the danger cell `danger`.
    pub fn impact_cascade(&self, danger: &Cell) -> ImpactCascade {
        match danger.impact() {
            Some(impact) => self.impact_cascade_from(danger.position, impact),
            None => ImpactCascade::default(),
        }
    }

    /// Chained explosion of a blast of `impact` centered on `origin`.
    ///
    /// A danger lying at `origin` detonates at step 0 with its own impact.
    /// Every danger reached at step `k` by a blast centered on `c` expands at
    /// step `k`, and each cell of its footprint is reached at
    /// `k + ceil(distance)`. Each danger expands at most once.
    pub fn impact_cascade_from(&self, origin: Position, impact: Impact) -> ImpactCascade {
        let mut cascade = ImpactCascade::default();
        let mut visited: BTreeSet<Position> = BTreeSet::new();
        let mut queue: BTreeSet<(u32, Position, Impact)> = BTreeSet::new();

        cascade.record(0, origin, impact);
        queue.insert((0, origin, impact));
        if let Some(own) = self.danger_impact_at(origin) {
            visited.insert(origin);
            cascade.detonated.push(origin);
            queue.insert((0, origin, own));
        }

        while let Some((step, center, blast)) = queue.pop_first() {
            for cell in shape::footprint(center, blast) {
                if cell == center || !self.contains(cell) {
                    continue;
                }
                let reached = step + center.distance(cell).ceil() as u32;
                cascade.record(reached, cell, blast);

                if visited.contains(&cell) {
                    continue;
                }
                if let Some(own) = self.danger_impact_at(cell) {
                    visited.insert(cell);
                    cascade.detonated.push(cell);
                    queue.insert((reached, cell, own));
                }
            }
        }
        cascade
    }

    fn danger_impact_at(&self, position: Position) -> Option<Impact> {
        self.layer_cell(CellKind::Danger, position)
            .and_then(Cell::impact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_25_in_open_area_hits_24_cells() {
        let mut grid = Grid::open(9, 9);
        let d = Cell::danger(Position::new(4, 4), Impact::LargeSquare);
        grid.set_cell(d);
        assert_eq!(grid.cells_adj_impacted_by_danger(&d).len(), 24);
    }

    #[test]
    fn test_point_impact_hits_only_itself() {
        let grid = Grid::open(5, 5);
        let cascade = grid.impact_cascade_from(Position::new(2, 2), Impact::Point);
        assert_eq!(cascade.flat_list.len(), 1);
        assert!(cascade.reaches(Position::new(2, 2)));
    }

    #[test]
    fn test_chain_reaction_timing() {
        let mut grid = Grid::open(9, 7);
        grid.set_cell(Cell::danger(Position::new(3, 3), Impact::SmallDiamond));
        grid.set_cell(Cell::danger(Position::new(4, 3), Impact::SmallSquare));

        let cascade = grid.impact_cascade_from(Position::new(3, 3), Impact::SmallDiamond);
        assert_eq!(cascade.step_of(Position::new(4, 3)), Some(1));
        assert_eq!(cascade.step_of(Position::new(5, 3)), Some(2));
        assert_eq!(cascade.step_of(Position::new(5, 4)), Some(3));
        assert_eq!(
            cascade.detonated,
            vec![Position::new(3, 3), Position::new(4, 3)]
        );
    }

    #[test]
    fn test_flat_list_is_union_of_steps() {
        let mut grid = Grid::open(9, 9);
        grid.set_cell(Cell::danger(Position::new(4, 4), Impact::Crenellated));
        grid.set_cell(Cell::danger(Position::new(6, 6), Impact::SmallSquare));
        let cascade = grid.impact_cascade(grid.cell(Position::new(4, 4)).unwrap());

        let union: BTreeSet<Position> = cascade
            .steps
            .values()
            .flat_map(|cells| cells.iter().map(|(p, _)| *p))
            .collect();
        assert_eq!(union, cascade.flat_list);
        assert!(cascade.steps[&0].contains(&(Position::new(4, 4), Impact::Crenellated)));
        assert!(cascade.reaches(Position::new(7, 7)));
    }
}
