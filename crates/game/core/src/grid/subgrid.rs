use std::collections::BTreeSet;

use super::{Cell, CellKind, Grid, KindSet, Position};

/// Filtered view over a shape of the flat projection.
///
/// Coordinates outside the parent grid are dropped when the view is built.
/// The view snapshots the cells it covers, so it keeps its own typed caches.
#[derive(Clone, Debug)]
pub struct SubGrid<'g> {
    grid: &'g Grid,
    cells: Vec<Cell>,
}

impl<'g> SubGrid<'g> {
    pub(crate) fn new(grid: &'g Grid, coords: Vec<Position>) -> Self {
        let cells = coords
            .into_iter()
            .filter_map(|position| grid.cell(position).copied())
            .collect();
        Self { grid, cells }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, position: Position) -> bool {
        self.cells.iter().any(|cell| cell.position == position)
    }

    pub fn coords(&self) -> BTreeSet<Position> {
        self.cells.iter().map(|cell| cell.position).collect()
    }

    /// Cells of the view whose kind belongs to `set`.
    pub fn typed_cells(&self, set: impl Into<KindSet>) -> Vec<Cell> {
        let set = set.into();
        self.cells
            .iter()
            .filter(|cell| set.has(cell.kind()))
            .copied()
            .collect()
    }

    pub fn typed_set(&self, set: impl Into<KindSet>) -> BTreeSet<Position> {
        self.typed_cells(set)
            .into_iter()
            .map(|cell| cell.position)
            .collect()
    }

    pub fn count(&self, set: impl Into<KindSet>) -> usize {
        let set = set.into();
        self.cells.iter().filter(|cell| set.has(cell.kind())).count()
    }

    /// Cells of the view without the perimeter.
    pub fn playable(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .filter(|cell| cell.kind() != CellKind::PerimeterWall)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_rect_is_clipped() {
        let grid = Grid::open(5, 5);
        let sub = grid.sub_rect(3, 3, 4, 4);
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.count(CellKind::Empty), 1);
    }

    #[test]
    fn test_sub_diamond_and_crenellated() {
        let grid = Grid::open(9, 9);
        assert_eq!(grid.sub_diamond(4, 4, 5).len(), 13);
        assert_eq!(grid.sub_crenellated(4, 4).len(), 17);
        assert_eq!(grid.sub_diamond(0, 0, 3).len(), 3);
    }
}
