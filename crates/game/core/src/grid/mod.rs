//! Layered spatial model of the maze.
//!
//! The [`Grid`] keeps one sparse layer per [`CellKind`] and a flat projection
//! that composes the layers in z-order. The projection is the single
//! coordinate authority used by every query: a caller asking "what is at
//! `(x, y)`" always receives the top-most cell. The projection is refreshed
//! coordinate by coordinate as mutations land, and every mutation is recorded
//! in the [`ChangeLog`].
//!
//! Queries outside the grid return `None` or empty collections; nothing in
//! this module panics on bad coordinates.

mod cell;
mod changes;
mod family;
mod impact;
mod position;
pub mod shape;
mod subgrid;
mod zones;

use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;
use tracing::trace;

pub use cell::{Cell, CellContent, CellKind, Footprint, Impact, RobotId};
pub use changes::{ChangeLog, ChangeSet};
pub use family::{Family, KindSet};
pub use impact::ImpactCascade;
pub use position::{Direction, Position};
pub use subgrid::SubGrid;
pub use zones::AttackProfile;

use crate::error::GridError;

/// Width and height of a grid, perimeter included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDimensions {
    pub width: u32,
    pub height: u32,
}

impl GridDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    /// Length of the board diagonal.
    pub fn diagonal(&self) -> f64 {
        let w = f64::from(self.width);
        let h = f64::from(self.height);
        (w * w + h * h).sqrt()
    }
}

/// Adjacent cells of a coordinate, keyed by direction.
pub type Adjacent = ArrayVec<(Direction, Cell), 4>;

/// Stacked typed layers over a rectangular coordinate space.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    dimensions: GridDimensions,
    layers: BTreeMap<CellKind, BTreeMap<Position, Cell>>,
    /// Top-most cell per coordinate.
    flat: BTreeMap<Position, Cell>,
    /// Coordinates of the flat projection, grouped by kind.
    index: BTreeMap<CellKind, BTreeSet<Position>>,
    changes: ChangeLog,
}

impl Grid {
    /// Creates a grid with no cells at all.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: GridDimensions::new(width, height),
            layers: BTreeMap::new(),
            flat: BTreeMap::new(),
            index: BTreeMap::new(),
            changes: ChangeLog::default(),
        }
    }

    /// Creates a grid whose border is perimeter wall and whose inside is empty.
    pub fn open(width: u32, height: u32) -> Self {
        let mut grid = Self::new(width, height);
        for position in shape::rect(0, 0, width, height) {
            let on_border = position.x == 0
                || position.y == 0
                || position.x == width as i32 - 1
                || position.y == height as i32 - 1;
            if on_border {
                grid.set_cell(Cell::perimeter(position));
            } else {
                grid.set_cell(Cell::empty(position));
            }
        }
        grid.changes.begin_turn();
        grid
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut ChangeLog {
        &mut self.changes
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Top-most cell at `position`.
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.flat.get(&position)
    }

    /// Kind of the top-most cell at `position`.
    pub fn kind_at(&self, position: Position) -> Option<CellKind> {
        self.cell(position).map(Cell::kind)
    }

    /// Returns true when the top-most cell at `position` belongs to `set`.
    pub fn is_in(&self, position: Position, set: impl Into<KindSet>) -> bool {
        let set = set.into();
        self.kind_at(position).is_some_and(|kind| set.has(kind))
    }

    /// Cell stored on a specific layer, hidden or not.
    pub fn layer_cell(&self, kind: CellKind, position: Position) -> Option<&Cell> {
        self.layers.get(&kind).and_then(|layer| layer.get(&position))
    }

    /// All cells of a layer, in coordinate order.
    pub fn layer(&self, kind: CellKind) -> impl Iterator<Item = &Cell> {
        self.layers.get(&kind).into_iter().flat_map(|layer| layer.values())
    }

    /// Coordinates of the flat projection whose kind belongs to `set`.
    pub fn typed_set(&self, set: impl Into<KindSet>) -> BTreeSet<Position> {
        let set = set.into();
        let mut coords = BTreeSet::new();
        for kind in set.kinds() {
            if let Some(index) = self.index.get(&kind) {
                coords.extend(index.iter().copied());
            }
        }
        coords
    }

    /// Cells of the flat projection whose kind belongs to `set`.
    pub fn typed_cells(&self, set: impl Into<KindSet>) -> Vec<Cell> {
        let set = set.into();
        set.kinds()
            .filter_map(|kind| self.index.get(&kind))
            .flat_map(|index| index.iter().filter_map(|p| self.flat.get(p).copied()))
            .collect()
    }

    /// Every non-perimeter coordinate of the board.
    pub fn play_set(&self) -> BTreeSet<Position> {
        self.flat
            .iter()
            .filter(|(_, cell)| cell.kind() != CellKind::PerimeterWall)
            .map(|(position, _)| *position)
            .collect()
    }

    /// Four-connected neighbours that exist on the board.
    pub fn adjacent(&self, position: Position) -> Adjacent {
        let mut adjacent = Adjacent::new();
        for direction in Direction::ALL {
            if let Some(cell) = self.cell(position.step(direction)) {
                adjacent.push((direction, *cell));
            }
        }
        adjacent
    }

    /// Neighbour in one direction.
    pub fn neighbour(&self, position: Position, direction: Direction) -> Option<&Cell> {
        self.cell(position.step(direction))
    }

    /// Position of the robot `uid`, scanning the robot layer.
    pub fn find_robot(&self, uid: RobotId) -> Option<Position> {
        self.layer(CellKind::Robot)
            .find(|cell| cell.robot_id() == Some(uid))
            .map(|cell| cell.position)
    }

    /// Position of the first exit cell.
    pub fn exit(&self) -> Option<Position> {
        self.layer(CellKind::Exit).next().map(|cell| cell.position)
    }

    /// Inner rectangle `(x, y, w, h)`: the board minus its one-cell border.
    pub fn inner_rect(&self) -> (i32, i32, u32, u32) {
        (
            1,
            1,
            self.width().saturating_sub(2),
            self.height().saturating_sub(2),
        )
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Euclidean distance.
    pub fn distance(a: Position, b: Position) -> f64 {
        a.distance(b)
    }

    /// Manhattan distance.
    pub fn path_length(a: Position, b: Position) -> u32 {
        a.path_length(b)
    }

    /// Integer vector from `a` to `b`.
    pub fn vector(a: Position, b: Position) -> (i32, i32) {
        a.vector(b)
    }

    /// Cells crossed by the segment from `a` to `b`, both ends excluded.
    pub fn segment(a: Position, b: Position) -> Vec<Position> {
        let (dx, dy) = a.vector(b);
        let steps = dx.abs().max(dy.abs());
        (1..steps)
            .map(|i| {
                let fx = f64::from(a.x) + f64::from(dx) * f64::from(i) / f64::from(steps);
                let fy = f64::from(a.y) + f64::from(dy) * f64::from(i) / f64::from(steps);
                Position::new(fx.round() as i32, fy.round() as i32)
            })
            .collect()
    }

    /// Returns true when no wall, door or perimeter lies strictly between `a` and `b`.
    pub fn line_of_sight(&self, a: Position, b: Position) -> bool {
        let blocking = KindSet::WALL | KindSet::PERIMETER_WALL | KindSet::DOOR;
        Self::segment(a, b)
            .into_iter()
            .all(|p| !self.is_in(p, blocking))
    }

    // ========================================================================
    // Sub-grids
    // ========================================================================

    /// Rectangle with top-left corner `(x, y)`, clipped to the board.
    pub fn sub_rect(&self, x: i32, y: i32, w: u32, h: u32) -> SubGrid<'_> {
        SubGrid::new(self, shape::rect(x, y, w, h))
    }

    /// Diamond of width `dim` (odd) centered on `(cx, cy)`.
    pub fn sub_diamond(&self, cx: i32, cy: i32, dim: u32) -> SubGrid<'_> {
        SubGrid::new(self, shape::diamond(Position::new(cx, cy), dim))
    }

    /// Crenellated 17-cell 5×5 centered on `(cx, cy)`.
    pub fn sub_crenellated(&self, cx: i32, cy: i32) -> SubGrid<'_> {
        SubGrid::new(self, shape::crenellated(Position::new(cx, cy)))
    }

    /// Danger cells of the 5×5 square centered on `center`.
    pub fn cells_around_point_5x5(&self, center: Position) -> Vec<Cell> {
        SubGrid::new(self, shape::square(center, 5)).typed_cells(CellKind::Danger)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Upserts `cell` on the layer of its kind.
    ///
    /// A linked-family cell evicts the other linked-family cells at the same
    /// coordinates; a robot evicts the bonus or danger it lands on.
    pub fn set_cell(&mut self, cell: Cell) {
        let kind = cell.kind();
        let position = cell.position;

        if Family::Linked.contains(kind) {
            for other in Family::Linked.members().kinds().filter(|k| *k != kind) {
                self.evict(other, position);
            }
        }
        if kind == CellKind::Robot {
            self.evict(CellKind::Bonus, position);
            self.evict(CellKind::Danger, position);
        }

        self.layers.entry(kind).or_default().insert(position, cell);
        self.changes.added(cell);
        self.refresh(position);
        trace!(%position, ?kind, "set cell");
    }

    /// Relocates the cell of `kind` at `from` to `to` within its layer.
    pub fn move_cell(
        &mut self,
        kind: CellKind,
        from: Position,
        to: Position,
    ) -> Result<Cell, GridError> {
        if !self.contains(to) {
            return Err(GridError::OutOfBounds { position: to });
        }
        let layer = self.layers.entry(kind).or_default();
        let cell = layer
            .remove(&from)
            .ok_or(GridError::MissingCell { kind, position: from })?;
        let moved = cell.with_position(to);
        layer.insert(to, moved);

        if kind == CellKind::Robot {
            self.evict(CellKind::Bonus, to);
            self.evict(CellKind::Danger, to);
        }

        self.changes.moved(moved, from);
        self.refresh(from);
        self.refresh(to);
        trace!(%from, %to, ?kind, "move cell");
        Ok(moved)
    }

    /// Removes the cell of `kind` at `position`.
    ///
    /// Cells of the undeletable family are refused.
    pub fn delete_cell(&mut self, kind: CellKind, position: Position) -> Result<Cell, GridError> {
        if Family::Undeletable.contains(kind) {
            return Err(GridError::Undeletable { kind, position });
        }
        self.evict(kind, position)
            .ok_or(GridError::MissingCell { kind, position })
    }

    /// Takes a robot off the board (death). Robots are otherwise undeletable.
    pub fn remove_robot(&mut self, position: Position) -> Result<Cell, GridError> {
        self.evict(CellKind::Robot, position)
            .ok_or(GridError::MissingCell {
                kind: CellKind::Robot,
                position,
            })
    }

    /// Clears one layer, or every layer when `kind` is `None`.
    pub fn clear(&mut self, kind: Option<CellKind>) {
        let kinds: Vec<CellKind> = match kind {
            Some(kind) => vec![kind],
            None => self.layers.keys().copied().collect(),
        };
        for kind in kinds {
            if let Some(layer) = self.layers.remove(&kind) {
                self.changes.cleared(kind);
                for position in layer.keys() {
                    self.refresh(*position);
                }
            }
        }
    }

    /// Removes a cell without the undeletable guard and records it.
    fn evict(&mut self, kind: CellKind, position: Position) -> Option<Cell> {
        let removed = self
            .layers
            .get_mut(&kind)
            .and_then(|layer| layer.remove(&position));
        if let Some(cell) = removed {
            self.changes.deleted(cell);
            self.refresh(position);
        }
        removed
    }

    /// Recomputes the flat projection at one coordinate.
    fn refresh(&mut self, position: Position) {
        if let Some(previous) = self.flat.remove(&position) {
            if let Some(index) = self.index.get_mut(&previous.kind()) {
                index.remove(&position);
            }
        }
        let top = self
            .layers
            .iter()
            .rev()
            .find_map(|(_, layer)| layer.get(&position))
            .copied();
        if let Some(cell) = top {
            self.flat.insert(position, cell);
            self.index.entry(cell.kind()).or_default().insert(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_layout() {
        let grid = Grid::open(5, 5);
        assert_eq!(grid.typed_set(CellKind::PerimeterWall).len(), 16);
        assert_eq!(grid.typed_set(CellKind::Empty).len(), 9);
        assert_eq!(grid.play_set().len(), 9);
        assert!(grid.changes().turn().is_empty());
    }

    #[test]
    fn test_linked_family_evicts_previous_cell() {
        let mut grid = Grid::open(5, 5);
        let p = Position::new(2, 2);
        grid.set_cell(Cell::wall(p));
        assert_eq!(grid.kind_at(p), Some(CellKind::Wall));
        assert!(grid.layer_cell(CellKind::Empty, p).is_none());

        grid.set_cell(Cell::door(p));
        assert_eq!(grid.kind_at(p), Some(CellKind::Door));
        assert!(grid.layer_cell(CellKind::Wall, p).is_none());
    }

    #[test]
    fn test_danger_sits_above_wall() {
        let mut grid = Grid::open(5, 5);
        let p = Position::new(1, 1);
        grid.set_cell(Cell::wall(p));
        grid.set_cell(Cell::danger(p, Impact::SmallSquare));
        assert_eq!(grid.kind_at(p), Some(CellKind::Danger));
        assert!(grid.layer_cell(CellKind::Wall, p).is_some());
    }

    #[test]
    fn test_robot_consumes_bonus() {
        let mut grid = Grid::open(5, 5);
        grid.set_cell(Cell::bonus(Position::new(2, 1)));
        grid.set_cell(Cell::robot(Position::new(1, 1), RobotId(1)));
        grid.move_cell(CellKind::Robot, Position::new(1, 1), Position::new(2, 1))
            .unwrap();
        assert!(grid.layer_cell(CellKind::Bonus, Position::new(2, 1)).is_none());
        assert_eq!(grid.find_robot(RobotId(1)), Some(Position::new(2, 1)));
        assert_eq!(grid.kind_at(Position::new(1, 1)), Some(CellKind::Empty));
    }

    #[test]
    fn test_delete_refuses_undeletable() {
        let mut grid = Grid::open(5, 5);
        let err = grid
            .delete_cell(CellKind::Empty, Position::new(1, 1))
            .unwrap_err();
        assert!(matches!(err, GridError::Undeletable { .. }));
    }

    #[test]
    fn test_queries_outside_are_absent() {
        let grid = Grid::open(5, 5);
        assert!(grid.cell(Position::new(-1, 3)).is_none());
        assert_eq!(grid.adjacent(Position::new(0, 0)).len(), 2);
    }

    #[test]
    fn test_clear_layer_restores_projection() {
        let mut grid = Grid::open(5, 5);
        grid.set_cell(Cell::bonus(Position::new(3, 3)));
        grid.clear(Some(CellKind::Bonus));
        assert_eq!(grid.kind_at(Position::new(3, 3)), Some(CellKind::Empty));
        assert!(grid.changes().turn().cleared.contains(&CellKind::Bonus));
    }

    #[test]
    fn test_cells_around_point_5x5() {
        let mut grid = Grid::open(9, 9);
        grid.set_cell(Cell::danger(Position::new(2, 2), Impact::SmallSquare));
        grid.set_cell(Cell::danger(Position::new(6, 6), Impact::SmallSquare));
        let found = grid.cells_around_point_5x5(Position::new(4, 4));
        assert_eq!(found.len(), 2);
        let found = grid.cells_around_point_5x5(Position::new(2, 4));
        assert_eq!(found.len(), 1);
    }
}
