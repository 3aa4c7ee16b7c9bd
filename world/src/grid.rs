//! Traversability storage owned by the world.

use courier_chase_core::{CellCoord, GridView, MaskError, TraversabilityMask};
use rand::Rng;

/// Fixed-size matrix of traversability flags.
///
/// Dimensions are set at construction. The flags are only ever replaced as a
/// whole, so readers never observe a partially loaded map.
#[derive(Clone, Debug)]
pub struct GridMap {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl GridMap {
    /// Creates a fully blocked grid with the provided dimensions.
    #[must_use]
    pub fn blocked(columns: u32, rows: u32) -> Self {
        Self::from_mask(TraversabilityMask::blocked(columns, rows))
    }

    /// Creates a grid whose dimensions and flags are taken from the mask.
    #[must_use]
    pub fn from_mask(mask: TraversabilityMask) -> Self {
        let (columns, rows) = mask.dimensions();
        Self {
            columns,
            rows,
            cells: mask.into_cells(),
        }
    }

    /// Provides the `(columns, rows)` pair fixed at construction.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the cell is inside the grid and open.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.view().is_traversable(cell)
    }

    /// Replaces every flag with the mask's, returning the new open cell count.
    ///
    /// A mask with different dimensions is refused and the grid is left as is.
    pub fn set_from_mask(&mut self, mask: TraversabilityMask) -> Result<usize, MaskError> {
        let (columns, rows) = mask.dimensions();
        if (columns, rows) != (self.columns, self.rows) {
            return Err(MaskError::DimensionMismatch {
                expected_columns: self.columns,
                expected_rows: self.rows,
                actual_columns: columns,
                actual_rows: rows,
            });
        }

        if !mask.is_consistent() {
            return Err(MaskError::LengthMismatch {
                columns,
                rows,
                actual: mask.cells().len(),
            });
        }

        self.cells = mask.into_cells();
        Ok(self.view().open_count())
    }

    /// Draws a cell uniformly from the currently traversable cells.
    ///
    /// Returns `None` when the grid is fully blocked.
    pub fn random_traversable_cell<R: Rng>(&self, rng: &mut R) -> Option<CellCoord> {
        let view = self.view();
        let open = view.open_count();
        if open == 0 {
            return None;
        }
        view.open_cells().nth(rng.gen_range(0..open))
    }

    /// Borrows the grid as a read-only view.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.columns, self.rows)
    }
}
