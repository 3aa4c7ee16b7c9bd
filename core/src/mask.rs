//! Traversability masks handed to the world by grid ingestion collaborators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, GridView};

/// Symbol marking an open cell in ASCII map drawings.
pub const OPEN_SYMBOL: char = '.';
/// Symbol marking a blocked cell in ASCII map drawings.
pub const BLOCKED_SYMBOL: char = '#';

/// Dense row-major matrix of traversability flags, `true` meaning open.
///
/// Holds exactly `columns * rows` flags; deserialized masks are checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMask")]
pub struct TraversabilityMask {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

#[derive(Deserialize)]
struct RawMask {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl TryFrom<RawMask> for TraversabilityMask {
    type Error = MaskError;

    fn try_from(raw: RawMask) -> Result<Self, Self::Error> {
        let expected = cell_count(raw.columns, raw.rows);
        if expected != Some(raw.cells.len()) {
            return Err(MaskError::LengthMismatch {
                columns: raw.columns,
                rows: raw.rows,
                actual: raw.cells.len(),
            });
        }
        Ok(Self {
            columns: raw.columns,
            rows: raw.rows,
            cells: raw.cells,
        })
    }
}

impl TraversabilityMask {
    /// Creates a mask where every cell is open.
    #[must_use]
    pub fn open(columns: u32, rows: u32) -> Self {
        Self::from_fn(columns, rows, |_| true)
    }

    /// Creates a mask where every cell is blocked.
    #[must_use]
    pub fn blocked(columns: u32, rows: u32) -> Self {
        Self::from_fn(columns, rows, |_| false)
    }

    /// Builds a mask by evaluating `is_open` for every cell in row-major order.
    #[must_use]
    pub fn from_fn<F>(columns: u32, rows: u32, mut is_open: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let capacity = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(is_open(CellCoord::new(column, row)));
            }
        }
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Builds a mask from nested rows. Every row must share the first row's width.
    pub fn from_rows(rows: &[Vec<bool>]) -> Result<Self, MaskError> {
        let Some(first) = rows.first() else {
            return Err(MaskError::Empty);
        };
        let width = first.len();
        if width == 0 {
            return Err(MaskError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MaskError::RaggedRow {
                    row: index,
                    expected: width,
                    actual: row.len(),
                });
            }
            cells.extend_from_slice(row);
        }

        Ok(Self {
            columns: dimension(width)?,
            rows: dimension(rows.len())?,
            cells,
        })
    }

    /// Parses an ASCII drawing where [`OPEN_SYMBOL`] marks open cells and
    /// [`BLOCKED_SYMBOL`] marks blocked ones. Blank lines are skipped and
    /// surrounding whitespace on each line is ignored.
    pub fn from_ascii(drawing: &str) -> Result<Self, MaskError> {
        let mut rows = Vec::new();
        for line in drawing.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let row_index = rows.len();
            let mut row = Vec::with_capacity(line.len());
            for (column, symbol) in line.chars().enumerate() {
                match symbol {
                    OPEN_SYMBOL => row.push(true),
                    BLOCKED_SYMBOL => row.push(false),
                    other => {
                        return Err(MaskError::UnknownSymbol {
                            symbol: other,
                            row: row_index,
                            column,
                        })
                    }
                }
            }
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// Number of columns covered by the mask.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows covered by the mask.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Provides the `(columns, rows)` pair of the mask.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the provided cell is open. Cells outside the mask are closed.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.view().is_traversable(cell)
    }

    /// Number of open cells in the mask.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|open| **open).count()
    }

    /// Row-major flags backing the mask.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Borrows the mask as a read-only grid view.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows)
    }

    /// Reports whether the flag count matches the declared dimensions.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        cell_count(self.columns, self.rows) == Some(self.cells.len())
    }

    /// Consumes the mask, yielding the row-major flags.
    #[must_use]
    pub fn into_cells(self) -> Vec<bool> {
        self.cells
    }
}

fn cell_count(columns: u32, rows: u32) -> Option<usize> {
    usize::try_from(u64::from(columns) * u64::from(rows)).ok()
}

fn dimension(length: usize) -> Result<u32, MaskError> {
    u32::try_from(length).map_err(|_| MaskError::TooLarge { length })
}

/// Reasons a traversability mask could not be built or installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MaskError {
    /// The source contained no cells.
    #[error("map contains no cells")]
    Empty,
    /// A row differed in width from the first row.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// An ASCII drawing contained a symbol other than the open or blocked markers.
    #[error("unknown map symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Zero-based row of the symbol.
        row: usize,
        /// Zero-based column of the symbol.
        column: usize,
    },
    /// A dimension exceeded the addressable cell range.
    #[error("map dimension {length} exceeds the addressable range")]
    TooLarge {
        /// Offending dimension length.
        length: usize,
    },
    /// The number of flags does not match the declared dimensions.
    #[error("map declares {columns}x{rows} but carries {actual} cells")]
    LengthMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Number of flags actually present.
        actual: usize,
    },
    /// The mask dimensions differ from the grid they were meant to replace.
    #[error("map is {actual_columns}x{actual_rows}, grid is {expected_columns}x{expected_rows}")]
    DimensionMismatch {
        /// Column count of the receiving grid.
        expected_columns: u32,
        /// Row count of the receiving grid.
        expected_rows: u32,
        /// Column count of the rejected mask.
        actual_columns: u32,
        /// Row count of the rejected mask.
        actual_rows: u32,
    },
}
