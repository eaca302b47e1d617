use life_core::{CellCoord, CellState};
use life_world::Grid;

fn grid_with(height: usize, width: usize, alive: &[(usize, usize)]) -> Grid {
    let mut grid = Grid::with_parallelism(height, width, 4).expect("valid grid");
    grid.seed(
        alive
            .iter()
            .map(|&(row, column)| CellCoord::new(row, column)),
    );
    grid
}

fn live_cells(grid: &Grid) -> Vec<(usize, usize)> {
    grid.snapshot()
        .live_cells()
        .map(|cell| (cell.row(), cell.column()))
        .collect()
}

#[test]
fn toroidal_reads_wrap_to_opposite_edges() {
    let grid = grid_with(5, 7, &[(4, 0), (0, 6)]);

    assert_eq!(grid.cell_at(-1, 0), grid.cell_at(4, 0));
    assert_eq!(grid.cell_at(0, -1), grid.cell_at(0, 6));
    assert_eq!(grid.cell_at(-1, 0), CellState::Alive);
    assert_eq!(grid.cell_at(0, -1), CellState::Alive);
}

#[test]
fn isolated_cell_dies() {
    let mut grid = grid_with(5, 5, &[(2, 2)]);
    assert_eq!(grid.live_neighbor_count(2, 2), 0);

    grid.advance().expect("step succeeds");

    assert_eq!(grid.population(), 0);
}

#[test]
fn corner_of_three_gives_birth_and_survives() {
    let mut grid = grid_with(6, 6, &[(1, 1), (1, 2), (2, 1)]);
    assert_eq!(grid.live_neighbor_count(2, 2), 3);
    assert_eq!(grid.live_neighbor_count(1, 1), 2);

    grid.advance().expect("step succeeds");

    assert_eq!(live_cells(&grid), vec![(1, 1), (1, 2), (2, 1), (2, 2)]);
}

#[test]
fn block_is_still_life() {
    let block = [(1, 1), (1, 2), (2, 1), (2, 2)];
    let mut grid = grid_with(6, 6, &block);

    grid.advance().expect("step succeeds");

    assert_eq!(live_cells(&grid), block.to_vec());
    assert_eq!(grid.generation(), 1);
}

#[test]
fn blinker_oscillates_with_period_two() {
    let horizontal = vec![(2, 1), (2, 2), (2, 3)];
    let vertical = vec![(1, 2), (2, 2), (3, 2)];
    let mut grid = grid_with(5, 5, &horizontal);

    grid.advance().expect("first step succeeds");
    assert_eq!(live_cells(&grid), vertical);

    grid.advance().expect("second step succeeds");
    assert_eq!(live_cells(&grid), horizontal);
}

#[test]
fn blinker_across_the_seam_wraps() {
    let mut grid = grid_with(5, 5, &[(0, 4), (0, 0), (0, 1)]);

    grid.advance().expect("step succeeds");

    assert_eq!(live_cells(&grid), vec![(0, 0), (1, 0), (4, 0)]);
}

#[test]
fn glider_returns_home_after_circling_the_torus() {
    let glider = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
    let mut grid = grid_with(8, 8, &glider);

    for _ in 0..32 {
        grid.advance().expect("step succeeds");
        assert_eq!(grid.population(), 5, "glider lost cells");
    }

    assert_eq!(live_cells(&grid), glider.to_vec());
}

#[test]
fn neighbor_counts_stay_within_moore_bounds() {
    let mut grid = grid_with(4, 4, &[]);
    grid.seed((0..4).flat_map(|row| (0..4).map(move |column| CellCoord::new(row, column))));

    for row in -1..5 {
        for column in -1..5 {
            let count = grid.live_neighbor_count(row, column);
            assert!(count <= 8);
            assert_eq!(count, 8);
        }
    }
}
