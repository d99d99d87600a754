//! Main Raster type

use crate::error::{Error, Result};
use crate::raster::{GridSystem, RasterElement};
use ndarray::Array2;

/// A 2D grid of values attached to a [`GridSystem`].
///
/// Data is stored row-major as `(row, col)` with row 0 at the top (largest y).
///
/// # Example
///
/// ```ignore
/// use splinegrid_core::{GridSystem, Raster};
///
/// let system = GridSystem::new(0.0, 0.0, 1.0, 100, 100)?;
/// let mut raster: Raster<f64> = Raster::new(system);
/// raster.set(10, 20, 42.0)?;
/// raster.add(10, 20, 1.0)?;
/// assert_eq!(raster.get(10, 20)?, 43.0);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Cell values, shape (rows, cols)
    data: Array2<T>,
    /// Coordinate system
    system: GridSystem,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(system: GridSystem) -> Self {
        Self {
            data: Array2::zeros((system.rows, system.cols)),
            system,
            nodata: None,
        }
    }

    /// Create a new raster filled with a specific value
    pub fn filled(system: GridSystem, value: T) -> Self {
        Self {
            data: Array2::from_elem((system.rows, system.cols), value),
            system,
            nodata: None,
        }
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, system: GridSystem) -> Result<Self> {
        if data.len() != system.len() {
            return Err(Error::InvalidDimensions {
                width: system.cols,
                height: system.rows,
            });
        }

        let array = Array2::from_shape_vec((system.rows, system.cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            system,
            nodata: None,
        })
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        *cell = value;
        Ok(())
    }

    /// Add to the value at (row, col)
    pub fn add(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let cell = self.cell_mut(row, col)?;
        *cell = *cell + value;
        Ok(())
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> Result<&mut T> {
        let (rows, cols) = self.shape();
        self.data.get_mut((row, col)).ok_or(Error::IndexOutOfBounds {
            row,
            col,
            rows,
            cols,
        })
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    /// Get the coordinate system
    pub fn system(&self) -> &GridSystem {
        &self.system
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// World coordinates of the centre of cell (col, row)
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.system.cell_center(col, row)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }
}
