#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Life engine.
//!
//! This crate defines the vocabulary every other crate speaks: the binary
//! [`CellState`] together with the classic B3/S23 rule, [`CellCoord`] values
//! produced by loaders, [`RowRange`] partitions handed to the scheduler, and
//! [`GridView`], a borrowed read-only window over a generation that performs
//! toroidal addressing. The world owns the buffers, the scheduler owns the
//! threads, and adapters only ever see views.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum number of live neighbours an alive cell needs to survive.
pub const SURVIVAL_MIN: u8 = 2;

/// Maximum number of live neighbours an alive cell tolerates to survive.
pub const SURVIVAL_MAX: u8 = 3;

/// Exact number of live neighbours that brings a dead cell to life.
pub const BIRTH: u8 = 3;

/// Relative offsets of the Moore neighbourhood, excluding the centre cell.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// State of a single cell in a generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// The cell is populated.
    Alive,
    /// The cell is empty.
    #[default]
    Dead,
}

impl CellState {
    /// Reports whether the cell is populated.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }

    /// Computes the state this cell takes in the following generation.
    ///
    /// Alive cells survive with [`SURVIVAL_MIN`]..=[`SURVIVAL_MAX`] live
    /// neighbours and die otherwise. Dead cells are born with exactly
    /// [`BIRTH`] live neighbours.
    #[must_use]
    pub const fn next(self, live_neighbors: u8) -> Self {
        match self {
            Self::Alive if live_neighbors >= SURVIVAL_MIN && live_neighbors <= SURVIVAL_MAX => {
                Self::Alive
            }
            Self::Dead if live_neighbors == BIRTH => Self::Alive,
            _ => Self::Dead,
        }
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: usize,
    column: usize,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

/// Half-open range of rows `[start, end)` assigned to one execution unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    start: usize,
    end: usize,
}

impl RowRange {
    /// Creates a new row range. Panics when `start > end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "row range start must not exceed its end");
        Self { start, end }
    }

    /// First row covered by the range.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Row immediately after the last row covered by the range.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of rows covered by the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Reports whether the range covers no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Reports whether the provided row lies within the range.
    #[must_use]
    pub const fn contains(&self, row: usize) -> bool {
        row >= self.start && row < self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Read-only view over one generation stored as a flat row-major buffer.
///
/// Cells are addressed as `row * width + column`. Every accessor taking
/// signed coordinates wraps them around both axes, so the view behaves as a
/// torus and never reads out of bounds.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [CellState],
    height: usize,
    width: usize,
}

impl<'a> GridView<'a> {
    /// Creates a view over `cells` interpreted as `height` rows of `width` cells.
    ///
    /// Panics when either dimension is zero or the buffer does not hold
    /// exactly `height * width` cells.
    #[must_use]
    pub fn new(cells: &'a [CellState], height: usize, width: usize) -> Self {
        assert!(height > 0 && width > 0, "grid dimensions must be positive");
        assert_eq!(
            cells.len(),
            height * width,
            "cell buffer does not match a {height}x{width} grid"
        );
        Self {
            cells,
            height,
            width,
        }
    }

    /// Number of rows in the view.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns in the view.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Reads the cell at the toroidally wrapped coordinate.
    #[must_use]
    pub fn cell_at(&self, row: isize, column: isize) -> CellState {
        let row = wrap(row, self.height);
        let column = wrap(column, self.width);
        self.cells[row * self.width + column]
    }

    /// Counts the live cells among the eight toroidal neighbours.
    ///
    /// Coordinates are wrapped before the offsets are applied, so every
    /// `isize` input is valid.
    #[must_use]
    pub fn live_neighbor_count(&self, row: isize, column: isize) -> u8 {
        let row = wrap(row, self.height);
        let column = wrap(column, self.width);
        let mut count = 0;
        for (d_row, d_column) in NEIGHBOR_OFFSETS {
            let neighbor_row = step(row, d_row, self.height);
            let neighbor_column = step(column, d_column, self.width);
            if self.cells[neighbor_row * self.width + neighbor_column].is_alive() {
                count += 1;
            }
        }
        count
    }

    /// Computes the state the cell at the coordinate takes in the next generation.
    #[must_use]
    pub fn next_state(&self, row: isize, column: isize) -> CellState {
        self.cell_at(row, column)
            .next(self.live_neighbor_count(row, column))
    }

    /// Iterator over the rows of the view, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [CellState]> + 'a {
        self.cells.chunks_exact(self.width)
    }

    /// Iterator over the coordinates of every live cell in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_alive())
            .map(move |(index, _)| CellCoord::new(index / width, index % width))
    }

    /// Number of live cells in the view.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Underlying row-major cell buffer.
    #[must_use]
    pub const fn cells(&self) -> &'a [CellState] {
        self.cells
    }
}

fn wrap(index: isize, len: usize) -> usize {
    // Grid dimensions fit in isize because the buffer was allocated.
    index.rem_euclid(len as isize) as usize
}

fn step(index: usize, delta: isize, len: usize) -> usize {
    // `index < len <= isize::MAX`, so `index + len` cannot overflow.
    (index + len).wrapping_add_signed(delta) % len
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellState, GridView, RowRange};

    fn view_with(height: usize, width: usize, alive: &[(usize, usize)]) -> Vec<CellState> {
        let mut cells = vec![CellState::Dead; height * width];
        for &(row, column) in alive {
            cells[row * width + column] = CellState::Alive;
        }
        cells
    }

    #[test]
    fn alive_cell_survives_with_two_or_three_neighbors() {
        assert_eq!(CellState::Alive.next(2), CellState::Alive);
        assert_eq!(CellState::Alive.next(3), CellState::Alive);
    }

    #[test]
    fn alive_cell_dies_from_isolation_or_overcrowding() {
        for neighbors in [0, 1, 4, 5, 6, 7, 8] {
            assert_eq!(
                CellState::Alive.next(neighbors),
                CellState::Dead,
                "alive cell with {neighbors} neighbours should die"
            );
        }
    }

    #[test]
    fn dead_cell_is_born_only_with_three_neighbors() {
        for neighbors in 0..=8 {
            let expected = if neighbors == 3 {
                CellState::Alive
            } else {
                CellState::Dead
            };
            assert_eq!(CellState::Dead.next(neighbors), expected);
        }
    }

    #[test]
    fn cell_at_wraps_negative_and_overflowing_coordinates() {
        let cells = view_with(4, 5, &[(3, 0), (0, 4), (2, 2)]);
        let view = GridView::new(&cells, 4, 5);

        assert_eq!(view.cell_at(-1, 0), view.cell_at(3, 0));
        assert_eq!(view.cell_at(0, -1), view.cell_at(0, 4));
        assert_eq!(view.cell_at(-1, 0), CellState::Alive);
        assert_eq!(view.cell_at(0, -1), CellState::Alive);
        assert_eq!(view.cell_at(6, 7), CellState::Alive);
    }

    #[test]
    fn neighbor_count_wraps_across_corners() {
        let cells = view_with(3, 3, &[(2, 2)]);
        let view = GridView::new(&cells, 3, 3);

        assert_eq!(view.live_neighbor_count(0, 0), 1);
        assert_eq!(view.live_neighbor_count(2, 2), 0);
    }

    #[test]
    fn neighbor_count_accepts_extreme_coordinates() {
        let cells = view_with(5, 4, &[(0, 0), (1, 3), (2, 1), (3, 2), (4, 0)]);
        let view = GridView::new(&cells, 5, 4);

        let row = isize::MAX.rem_euclid(5);
        let column = isize::MIN.rem_euclid(4);
        assert_eq!(
            view.live_neighbor_count(isize::MAX, isize::MIN),
            view.live_neighbor_count(row, column)
        );
        assert_eq!(
            view.live_neighbor_count(isize::MIN, isize::MAX),
            view.live_neighbor_count(isize::MIN.rem_euclid(5), isize::MAX.rem_euclid(4))
        );
        assert_eq!(
            view.next_state(isize::MAX, isize::MIN),
            view.next_state(row, column)
        );
    }

    #[test]
    fn neighbor_count_stays_within_moore_bounds() {
        let full = vec![CellState::Alive; 16];
        let view = GridView::new(&full, 4, 4);
        for row in 0..4 {
            for column in 0..4 {
                assert_eq!(view.live_neighbor_count(row, column), 8);
            }
        }

        let empty = vec![CellState::Dead; 16];
        let view = GridView::new(&empty, 4, 4);
        assert_eq!(view.live_neighbor_count(1, 1), 0);
    }

    #[test]
    fn live_cells_reports_coordinates_in_row_major_order() {
        let cells = view_with(3, 4, &[(2, 1), (0, 3)]);
        let view = GridView::new(&cells, 3, 4);

        let live: Vec<_> = view.live_cells().collect();
        assert_eq!(live, vec![CellCoord::new(0, 3), CellCoord::new(2, 1)]);
        assert_eq!(view.population(), 2);
        assert_eq!(view.rows().count(), 3);
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn view_rejects_mismatched_buffer() {
        let cells = vec![CellState::Dead; 5];
        let _ = GridView::new(&cells, 2, 3);
    }

    #[test]
    fn row_range_displays_half_open_interval() {
        let range = RowRange::new(2, 5);
        assert_eq!(range.to_string(), "[2, 5)");
        assert_eq!(range.len(), 3);
        assert!(range.contains(4));
        assert!(!range.contains(5));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        let coord = CellCoord::new(5, 7);
        let bytes = bincode::serialize(&coord).expect("serialize");
        let restored: CellCoord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, coord);
    }
}
