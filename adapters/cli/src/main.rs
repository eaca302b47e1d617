#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Life boards loaded from text files.

mod board_file;

use std::{
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use life_rendering::{Glyphs, TextRenderer, DEFAULT_ALIVE_GLYPH, DEFAULT_DEAD_GLYPH};
use life_system_scheduler::RowScheduler;
use life_world::Grid;
use log::info;

use crate::board_file::BoardFile;

/// Runs Conway's Game of Life on a toroidal board loaded from a text file.
#[derive(Debug, Parser)]
#[command(name = "life", version, about)]
struct Cli {
    /// Board file: height, width, iterations and live cell count on their own
    /// lines, followed by one `row col` line per live cell.
    board: PathBuf,

    /// Number of generations to run instead of the count in the board file.
    #[arg(long)]
    iterations: Option<u64>,

    /// Maximum number of worker threads per generation.
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Print only the last generation.
    #[arg(long)]
    final_only: bool,

    /// Glyph drawn for alive cells.
    #[arg(long, default_value_t = DEFAULT_ALIVE_GLYPH)]
    alive: char,

    /// Glyph drawn for dead cells.
    #[arg(long, default_value_t = DEFAULT_DEAD_GLYPH)]
    dead: char,
}

/// Entry point for the Life command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let glyphs = Glyphs::new(cli.alive, cli.dead).context("invalid glyph configuration")?;
    let board = BoardFile::load(&cli.board)
        .with_context(|| format!("failed to load board {}", cli.board.display()))?;

    let scheduler = cli
        .threads
        .map_or_else(RowScheduler::new, |threads| {
            RowScheduler::with_parallelism(threads.get())
        });
    let mut grid = board.build_grid(scheduler).context("failed to build grid")?;
    let iterations = cli.iterations.unwrap_or(board.iterations());

    info!(
        "loaded {}x{} board with {} live cells; running {iterations} generations on {} workers",
        board.height(),
        board.width(),
        board.live_cells().len(),
        grid.workers()
    );

    let renderer = TextRenderer::new(glyphs);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    loop {
        let generation = grid.generation();
        if !cli.final_only || generation == iterations {
            print_generation(&mut out, &renderer, &grid)?;
        }
        if generation >= iterations {
            break;
        }
        grid.advance()
            .with_context(|| format!("failed to advance past generation {generation}"))?;
    }
    out.flush().context("failed to flush output")?;

    info!(
        "finished after {} generations with {} live cells",
        grid.generation(),
        grid.population()
    );
    Ok(())
}

fn print_generation<W>(out: &mut W, renderer: &TextRenderer, grid: &Grid) -> Result<()>
where
    W: Write,
{
    writeln!(out, "Generation {}:", grid.generation())?;
    out.write_all(renderer.render(grid.snapshot()).as_bytes())?;
    writeln!(out)?;
    Ok(())
}
