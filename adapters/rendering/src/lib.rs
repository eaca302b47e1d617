#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering for Life generations.
//!
//! Each row becomes one line, cells are separated by single spaces, and every
//! cell is drawn with one of two glyphs. The output is meant for people to
//! read, not for reloading.

use std::fmt;

use life_core::{CellState, GridView};
use thiserror::Error;

/// Glyph drawn for alive cells by default.
pub const DEFAULT_ALIVE_GLYPH: char = '■';

/// Glyph drawn for dead cells by default.
pub const DEFAULT_DEAD_GLYPH: char = '□';

/// Errors that can occur when configuring a renderer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// Alive and dead cells would be indistinguishable.
    #[error("alive and dead glyphs must differ (both were '{glyph}')")]
    IdenticalGlyphs {
        /// Glyph supplied for both states.
        glyph: char,
    },
    /// A glyph would blend into the column separator.
    #[error("glyph {glyph:?} is whitespace")]
    WhitespaceGlyph {
        /// Offending glyph.
        glyph: char,
    },
}

/// Pair of glyphs used to draw cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    alive: char,
    dead: char,
}

impl Glyphs {
    /// Creates a glyph pair, rejecting whitespace or identical glyphs.
    pub fn new(alive: char, dead: char) -> Result<Self, RenderingError> {
        for glyph in [alive, dead] {
            if glyph.is_whitespace() {
                return Err(RenderingError::WhitespaceGlyph { glyph });
            }
        }
        if alive == dead {
            return Err(RenderingError::IdenticalGlyphs { glyph: alive });
        }
        Ok(Self { alive, dead })
    }

    /// Glyph drawn for alive cells.
    #[must_use]
    pub const fn alive(&self) -> char {
        self.alive
    }

    /// Glyph drawn for dead cells.
    #[must_use]
    pub const fn dead(&self) -> char {
        self.dead
    }

    /// Glyph drawn for a cell in the provided state.
    #[must_use]
    pub const fn for_state(&self, state: CellState) -> char {
        match state {
            CellState::Alive => self.alive,
            CellState::Dead => self.dead,
        }
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            alive: DEFAULT_ALIVE_GLYPH,
            dead: DEFAULT_DEAD_GLYPH,
        }
    }
}

/// Renders grid snapshots as lines of glyphs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer {
    glyphs: Glyphs,
}

impl TextRenderer {
    /// Creates a renderer drawing with the provided glyphs.
    #[must_use]
    pub const fn new(glyphs: Glyphs) -> Self {
        Self { glyphs }
    }

    /// Glyphs used by the renderer.
    #[must_use]
    pub const fn glyphs(&self) -> Glyphs {
        self.glyphs
    }

    /// Renders the snapshot into a newly allocated string.
    #[must_use]
    pub fn render(&self, view: GridView<'_>) -> String {
        let mut out = String::with_capacity(view.height() * view.width() * 4);
        // Writing into a String cannot fail.
        let _ = self.write_to(view, &mut out);
        out
    }

    /// Writes the snapshot, one newline-terminated line per row.
    pub fn write_to<W>(&self, view: GridView<'_>, out: &mut W) -> fmt::Result
    where
        W: fmt::Write,
    {
        for row in view.rows() {
            for (column, cell) in row.iter().enumerate() {
                if column > 0 {
                    out.write_char(' ')?;
                }
                out.write_char(self.glyphs.for_state(*cell))?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}
