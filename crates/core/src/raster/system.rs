//! Regular coordinate system for square-celled grids

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Uniform 2D grid definition.
///
/// `x_min`/`y_min` are the coordinates of the centre of the lower-left cell,
/// so the grid spans `x_range() = (cols - 1) * cell_size` between the outermost
/// cell centres:
///
/// ```text
/// x = x_min + col * cell_size
/// y = y_min + (rows - 1 - row) * cell_size
/// ```
///
/// Row 0 is the northern (top) row, matching the row-major layout of [`Raster`](super::Raster).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSystem {
    /// X coordinate of the lower-left cell centre
    pub x_min: f64,
    /// Y coordinate of the lower-left cell centre
    pub y_min: f64,
    /// Cell size (square cells)
    pub cell_size: f64,
    /// Number of columns
    pub cols: usize,
    /// Number of rows
    pub rows: usize,
}

impl GridSystem {
    /// Create a grid system, checking `cell_size > 0` and non-empty dimensions
    pub fn new(x_min: f64, y_min: f64, cell_size: f64, cols: usize, rows: usize) -> Result<Self> {
        let system = Self {
            x_min,
            y_min,
            cell_size,
            cols,
            rows,
        };
        system.validate()?;
        Ok(system)
    }

    /// Smallest grid of the given cell size whose cell centres cover the
    /// extent `[x_min, x_max] × [y_min, y_max]`.
    pub fn from_extent(x_min: f64, y_min: f64, x_max: f64, y_max: f64, cell_size: f64) -> Result<Self> {
        if !(cell_size > 0.0 && cell_size.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: "must be positive and finite".into(),
            });
        }
        if !(x_max >= x_min && y_max >= y_min) {
            return Err(Error::DegenerateExtent {
                width: x_max - x_min,
                height: y_max - y_min,
            });
        }

        match (cell_count(x_max - x_min, cell_size), cell_count(y_max - y_min, cell_size)) {
            (Some(cols), Some(rows)) => Self::new(x_min, y_min, cell_size, cols, rows),
            _ => Err(Error::InvalidParameter {
                name: "cell_size",
                value: cell_size.to_string(),
                reason: format!(
                    "too small for a {} x {} extent",
                    x_max - x_min,
                    y_max - y_min
                ),
            }),
        }
    }

    /// Check the invariants of the coordinate system
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0 && self.cell_size.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "cell_size",
                value: self.cell_size.to_string(),
                reason: "must be positive and finite".into(),
            });
        }
        let bytes = self
            .cols
            .checked_mul(self.rows)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f64>()));
        if self.cols == 0 || self.rows == 0 || !bytes.is_some_and(|b| b <= isize::MAX as usize) {
            return Err(Error::InvalidDimensions {
                width: self.cols,
                height: self.rows,
            });
        }
        if !(self.x_min.is_finite() && self.y_min.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "origin",
                value: format!("({}, {})", self.x_min, self.y_min),
                reason: "must be finite".into(),
            });
        }
        Ok(())
    }

    /// X coordinate of the right-most cell centre
    pub fn x_max(&self) -> f64 {
        self.x_min + self.x_range()
    }

    /// Y coordinate of the top-most cell centre
    pub fn y_max(&self) -> f64 {
        self.y_min + self.y_range()
    }

    /// Distance between the outermost cell centres along X
    pub fn x_range(&self) -> f64 {
        (self.cols.saturating_sub(1)) as f64 * self.cell_size
    }

    /// Distance between the outermost cell centres along Y
    pub fn y_range(&self) -> f64 {
        (self.rows.saturating_sub(1)) as f64 * self.cell_size
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Whether the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// World coordinates of the centre of cell (col, row)
    #[inline]
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        let flipped = self.rows - 1 - row;
        (
            self.x_min + col as f64 * self.cell_size,
            self.y_min + flipped as f64 * self.cell_size,
        )
    }

    /// Whether (x, y) lies in the rectangle spanned by the outermost cell centres
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max() && y >= self.y_min && y <= self.y_max()
    }
}

/// Cell centres needed to cover `span`, or `None` if the count does not fit a `usize`
fn cell_count(span: f64, cell_size: f64) -> Option<usize> {
    let steps = (span / cell_size).ceil();
    if !(steps.is_finite() && steps < usize::MAX as f64) {
        return None;
    }
    (steps as usize).checked_add(1)
}
