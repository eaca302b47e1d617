#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the Life engine.
//!
//! The [`Grid`] owns two same-shaped flat buffers. Advancing computes every
//! row of the next generation in parallel from the current buffer only, then
//! swaps the buffers once every row range has finished. A failed round leaves
//! the current generation untouched.

use std::{collections::TryReserveError, convert::Infallible};

use life_core::{CellCoord, CellState, GridView, RowRange};
use life_system_scheduler::{RowScheduler, ScheduleError, WorkerError};
use log::debug;
use thiserror::Error;

/// Errors reported by grid construction and generation steps.
#[derive(Debug, Error)]
pub enum GridError {
    /// Height or width was zero, or the cell count overflows the address space.
    #[error("grid dimensions must be positive and addressable (received {height}x{width})")]
    InvalidDimension {
        /// Requested number of rows.
        height: usize,
        /// Requested number of columns.
        width: usize,
    },
    /// The cell buffers for the requested dimensions could not be allocated.
    #[error("could not allocate cell buffers for a {height}x{width} grid")]
    Allocation {
        /// Requested number of rows.
        height: usize,
        /// Requested number of columns.
        width: usize,
        /// Error reported by the allocator.
        #[source]
        source: TryReserveError,
    },
    /// A row range failed while computing a generation; nothing was committed.
    #[error("generation {generation} could not be computed")]
    Generation {
        /// Generation that was being computed.
        generation: u64,
        /// Failure reported by the scheduler.
        #[source]
        source: ScheduleError,
    },
}

/// Toroidal Life grid advancing through discrete generations.
///
/// The grid must not be observed or mutated by other threads while
/// [`Grid::advance`] is running; `&mut self` enforces this for safe callers.
#[derive(Debug)]
pub struct Grid {
    height: usize,
    width: usize,
    current: Vec<CellState>,
    next: Vec<CellState>,
    scheduler: RowScheduler,
    generation: u64,
}

impl Grid {
    /// Creates an all-dead grid sized to the platform's available parallelism.
    pub fn new(height: usize, width: usize) -> Result<Self, GridError> {
        Self::with_scheduler(height, width, RowScheduler::new())
    }

    /// Creates an all-dead grid that runs at most `parallelism` units per step.
    pub fn with_parallelism(
        height: usize,
        width: usize,
        parallelism: usize,
    ) -> Result<Self, GridError> {
        Self::with_scheduler(height, width, RowScheduler::with_parallelism(parallelism))
    }

    /// Creates an all-dead grid driven by the provided scheduler.
    ///
    /// Each step spawns `min(height, scheduler.parallelism())` units.
    pub fn with_scheduler(
        height: usize,
        width: usize,
        scheduler: RowScheduler,
    ) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimension { height, width };
        if height == 0 || width == 0 {
            return Err(invalid);
        }
        let len = match height.checked_mul(width) {
            Some(len) if isize::try_from(len).is_ok() => len,
            _ => return Err(invalid),
        };

        let allocation = |source| GridError::Allocation {
            height,
            width,
            source,
        };
        let current = dead_cells(len).map_err(allocation)?;
        let next = dead_cells(len).map_err(allocation)?;

        Ok(Self {
            height,
            width,
            current,
            next,
            scheduler,
            generation: 0,
        })
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of generations committed since construction.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of units each step spawns.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.scheduler.workers_for(self.height)
    }

    /// Marks every listed coordinate alive in the current generation.
    ///
    /// Coordinates must lie inside the grid; loaders validate them first, so
    /// an out-of-bounds coordinate here is a bug and panics.
    pub fn seed<I>(&mut self, live_cells: I)
    where
        I: IntoIterator<Item = CellCoord>,
    {
        for cell in live_cells {
            assert!(
                cell.row() < self.height && cell.column() < self.width,
                "seed coordinate ({}, {}) lies outside the {}x{} grid",
                cell.row(),
                cell.column(),
                self.height,
                self.width
            );
            self.current[cell.row() * self.width + cell.column()] = CellState::Alive;
        }
    }

    /// Reads the current state at the toroidally wrapped coordinate.
    #[must_use]
    pub fn cell_at(&self, row: isize, column: isize) -> CellState {
        self.snapshot().cell_at(row, column)
    }

    /// Counts the live cells among the eight toroidal neighbours.
    #[must_use]
    pub fn live_neighbor_count(&self, row: isize, column: isize) -> u8 {
        self.snapshot().live_neighbor_count(row, column)
    }

    /// Number of live cells in the current generation.
    #[must_use]
    pub fn population(&self) -> usize {
        self.snapshot().population()
    }

    /// Read-only view of the current generation.
    #[must_use]
    pub fn snapshot(&self) -> GridView<'_> {
        GridView::new(&self.current, self.height, self.width)
    }

    /// Computes the next generation in parallel and commits it.
    ///
    /// On failure the current generation and the generation counter are left
    /// as they were.
    pub fn advance(&mut self) -> Result<(), GridError> {
        self.advance_with(compute_rows)
    }

    fn advance_with<F, E>(&mut self, compute: F) -> Result<(), GridError>
    where
        F: Fn(GridView<'_>, RowRange, &mut [CellState]) -> Result<(), E> + Sync,
        E: Into<WorkerError>,
    {
        let generation = self.generation + 1;
        let current = GridView::new(&self.current, self.height, self.width);

        self.scheduler
            .run_rows_mut(&mut self.next, self.width, |range, rows: &mut [CellState]| {
                compute(current, range, rows)
            })
            .map_err(|source| GridError::Generation { generation, source })?;

        std::mem::swap(&mut self.current, &mut self.next);
        self.generation = generation;
        debug!("generation {generation} committed");
        Ok(())
    }
}

fn dead_cells(len: usize) -> Result<Vec<CellState>, TryReserveError> {
    let mut cells = Vec::new();
    cells.try_reserve_exact(len)?;
    cells.resize(len, CellState::Dead);
    Ok(cells)
}

fn compute_rows(
    current: GridView<'_>,
    range: RowRange,
    rows: &mut [CellState],
) -> Result<(), Infallible> {
    let width = current.width();
    for (offset, cells) in rows.chunks_exact_mut(width).enumerate() {
        let row = (range.start() + offset) as isize;
        for (column, cell) in cells.iter_mut().enumerate() {
            *cell = current.next_state(row, column as isize);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Grid, GridError};
    use life_core::{CellCoord, CellState};
    use life_system_scheduler::ScheduleError;

    #[test]
    fn new_grid_is_entirely_dead() {
        let grid = Grid::with_parallelism(4, 6, 2).expect("valid grid");
        assert_eq!(grid.population(), 0);
        assert_eq!(grid.snapshot().cells().len(), 24);
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Grid::new(0, 5),
            Err(GridError::InvalidDimension {
                height: 0,
                width: 5
            })
        ));
        assert!(matches!(
            Grid::new(5, 0),
            Err(GridError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(matches!(
            Grid::new(usize::MAX, 2),
            Err(GridError::InvalidDimension { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn unallocatable_dimensions_are_rejected() {
        assert!(matches!(
            Grid::with_parallelism(1 << 31, 1 << 31, 1),
            Err(GridError::Allocation {
                height: 2_147_483_648,
                width: 2_147_483_648,
                ..
            })
        ));
    }

    #[test]
    fn workers_are_capped_by_height() {
        assert_eq!(Grid::with_parallelism(3, 10, 8).expect("grid").workers(), 3);
        assert_eq!(Grid::with_parallelism(30, 10, 8).expect("grid").workers(), 8);
    }

    #[test]
    fn seed_marks_only_listed_cells() {
        let mut grid = Grid::with_parallelism(3, 3, 1).expect("valid grid");
        grid.seed([CellCoord::new(0, 1), CellCoord::new(2, 2)]);

        assert_eq!(grid.cell_at(0, 1), CellState::Alive);
        assert_eq!(grid.cell_at(2, 2), CellState::Alive);
        assert_eq!(grid.population(), 2);
    }

    #[test]
    #[should_panic(expected = "lies outside")]
    fn seed_panics_on_out_of_bounds_coordinate() {
        let mut grid = Grid::with_parallelism(3, 3, 1).expect("valid grid");
        grid.seed([CellCoord::new(3, 0)]);
    }

    #[test]
    fn failed_round_commits_nothing() {
        let mut grid = Grid::with_parallelism(6, 6, 3).expect("valid grid");
        grid.seed([CellCoord::new(2, 1), CellCoord::new(2, 2), CellCoord::new(2, 3)]);
        let before = grid.snapshot().cells().to_vec();

        let error = grid
            .advance_with(|_, range, rows| {
                rows.fill(CellState::Alive);
                if range.start() == 2 {
                    Err("injected failure")
                } else {
                    Ok(())
                }
            })
            .expect_err("injected failure must surface");

        match error {
            GridError::Generation { generation, source } => {
                assert_eq!(generation, 1);
                assert!(matches!(source, ScheduleError::Worker { .. }));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(grid.snapshot().cells(), before.as_slice());
        assert_eq!(grid.generation(), 0);

        grid.advance().expect("regular step succeeds");
        assert_eq!(grid.generation(), 1);
        assert_eq!(grid.cell_at(1, 2), CellState::Alive);
        assert_eq!(grid.cell_at(3, 2), CellState::Alive);
        assert_eq!(grid.cell_at(2, 1), CellState::Dead);
    }
}
