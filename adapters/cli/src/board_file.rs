#![allow(clippy::missing_errors_doc)]

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use life_core::CellCoord;
use life_system_scheduler::RowScheduler;
use life_world::{Grid, GridError};
use thiserror::Error;

/// Header values expected at the top of a board file, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HeaderField {
    /// Number of grid rows.
    Height,
    /// Number of grid columns.
    Width,
    /// Number of generations to simulate.
    Iterations,
    /// Number of coordinate lines that follow the header.
    LiveCellCount,
}

impl HeaderField {
    /// 1-based line on which the header value is expected.
    const fn line(self) -> usize {
        match self {
            Self::Height => 1,
            Self::Width => 2,
            Self::Iterations => 3,
            Self::LiveCellCount => 4,
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Height => "height",
            Self::Width => "width",
            Self::Iterations => "iteration count",
            Self::LiveCellCount => "live cell count",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while loading a board file.
#[derive(Debug, Error)]
pub(crate) enum LoadError {
    /// The file could not be read.
    #[error("could not read board file {}", path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Error reported by the filesystem.
        #[source]
        source: io::Error,
    },
    /// The file ended before the named header line.
    #[error("line {line}: missing {field}")]
    MissingHeader {
        /// 1-based line on which the header was expected.
        line: usize,
        /// Header that was not present.
        field: HeaderField,
    },
    /// A header value or coordinate token was not an integer.
    #[error("line {line}: '{value}' is not an integer")]
    InvalidInteger {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        value: String,
    },
    /// Height or width was zero or negative.
    #[error("line {line}: {field} must be positive (found {value})")]
    NonPositiveDimension {
        /// 1-based line number.
        line: usize,
        /// Header that failed validation.
        field: HeaderField,
        /// Value supplied in the file.
        value: i64,
    },
    /// Iteration or live cell count was negative.
    #[error("line {line}: {field} must not be negative (found {value})")]
    NegativeCount {
        /// 1-based line number.
        line: usize,
        /// Header that failed validation.
        field: HeaderField,
        /// Value supplied in the file.
        value: i64,
    },
    /// A coordinate line did not hold exactly two tokens, or was blank
    /// before the last coordinate.
    #[error("line {line}: expected 'row col', found '{content}'")]
    MalformedCoordinate {
        /// 1-based line number.
        line: usize,
        /// Trimmed line content.
        content: String,
    },
    /// A coordinate lies outside the declared grid.
    #[error("line {line}: coordinate ({row}, {column}) lies outside the {height}x{width} grid")]
    CoordinateOutOfRange {
        /// 1-based line number.
        line: usize,
        /// Row supplied in the file.
        row: i64,
        /// Column supplied in the file.
        column: i64,
        /// Declared grid height.
        height: usize,
        /// Declared grid width.
        width: usize,
    },
    /// The number of coordinate lines differs from the declared count.
    #[error("declared {declared} live cells but found {actual} coordinate lines")]
    CountMismatch {
        /// Count from the header.
        declared: usize,
        /// Coordinate lines actually present.
        actual: usize,
    },
}

/// Validated contents of a board file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoardFile {
    height: usize,
    width: usize,
    iterations: u64,
    live_cells: Vec<CellCoord>,
}

impl BoardFile {
    /// Reads and validates the board file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Parses and validates board file contents.
    ///
    /// The first four lines hold height, width, iteration count, and live
    /// cell count. Every following line holds one `row col` pair; only
    /// trailing blank lines are tolerated.
    pub(crate) fn parse(source: &str) -> Result<Self, LoadError> {
        let mut lines = source.lines().enumerate().map(|(index, line)| (index + 1, line));

        let height = parse_dimension(&mut lines, HeaderField::Height)?;
        let width = parse_dimension(&mut lines, HeaderField::Width)?;
        let iterations = parse_count(&mut lines, HeaderField::Iterations)?;
        let declared = parse_count(&mut lines, HeaderField::LiveCellCount)?;

        let mut live_cells = Vec::new();
        let mut first_blank = None;
        for (line, content) in lines {
            let content = content.trim();
            if content.is_empty() {
                first_blank = first_blank.or(Some(line));
                continue;
            }
            if let Some(line) = first_blank {
                return Err(LoadError::MalformedCoordinate {
                    line,
                    content: String::new(),
                });
            }

            let mut tokens = content.split_whitespace();
            let (Some(row), Some(column), None) = (tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(LoadError::MalformedCoordinate {
                    line,
                    content: content.to_owned(),
                });
            };
            let row = parse_integer(line, row)?;
            let column = parse_integer(line, column)?;
            live_cells.push(checked_coord(line, row, column, height, width)?);
        }

        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        if live_cells.len() != declared {
            return Err(LoadError::CountMismatch {
                declared,
                actual: live_cells.len(),
            });
        }

        Ok(Self {
            height,
            width,
            iterations,
            live_cells,
        })
    }

    /// Declared number of grid rows.
    pub(crate) const fn height(&self) -> usize {
        self.height
    }

    /// Declared number of grid columns.
    pub(crate) const fn width(&self) -> usize {
        self.width
    }

    /// Declared number of generations to simulate.
    pub(crate) const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Coordinates of the initially live cells, in file order.
    pub(crate) fn live_cells(&self) -> &[CellCoord] {
        &self.live_cells
    }

    /// Builds a grid seeded with the board's live cells.
    pub(crate) fn build_grid(&self, scheduler: RowScheduler) -> Result<Grid, GridError> {
        let mut grid = Grid::with_scheduler(self.height, self.width, scheduler)?;
        grid.seed(self.live_cells.iter().copied());
        Ok(grid)
    }
}

fn next_header<'a, I>(lines: &mut I, field: HeaderField) -> Result<(usize, i64), LoadError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line, content) = lines.next().ok_or(LoadError::MissingHeader {
        line: field.line(),
        field,
    })?;
    Ok((line, parse_integer(line, content.trim())?))
}

fn parse_dimension<'a, I>(lines: &mut I, field: HeaderField) -> Result<usize, LoadError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line, value) = next_header(lines, field)?;
    match usize::try_from(value) {
        Ok(dimension) if dimension > 0 => Ok(dimension),
        _ => Err(LoadError::NonPositiveDimension { line, field, value }),
    }
}

fn parse_count<'a, I>(lines: &mut I, field: HeaderField) -> Result<u64, LoadError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let (line, value) = next_header(lines, field)?;
    u64::try_from(value).map_err(|_| LoadError::NegativeCount { line, field, value })
}

fn parse_integer(line: usize, token: &str) -> Result<i64, LoadError> {
    token.parse().map_err(|_| LoadError::InvalidInteger {
        line,
        value: token.to_owned(),
    })
}

fn checked_coord(
    line: usize,
    row: i64,
    column: i64,
    height: usize,
    width: usize,
) -> Result<CellCoord, LoadError> {
    match (usize::try_from(row), usize::try_from(column)) {
        (Ok(r), Ok(c)) if r < height && c < width => Ok(CellCoord::new(r, c)),
        _ => Err(LoadError::CoordinateOutOfRange {
            line,
            row,
            column,
            height,
            width,
        }),
    }
}
