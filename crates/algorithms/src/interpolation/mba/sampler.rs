//! Sampling a control lattice onto a regular grid

use splinegrid_core::Raster;

use super::lattice::Lattice;
use crate::maybe_rayon::*;

/// How sampled lattice values are written into the target grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridWrite {
    /// Replace the cell value
    Overwrite,
    /// Add to the cell value
    Add,
}

/// Evaluate `lattice` at every cell centre of `target` and write the values.
///
/// Rows are evaluated in parallel when the `parallel` feature is enabled; the
/// write-back is sequential, so results do not depend on scheduling.
pub fn accumulate_into_grid(lattice: &Lattice, target: &mut Raster<f64>, mode: GridWrite) {
    let system = *target.system();
    let rows = system.rows;
    let cols = system.cols;

    let values: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];
            for (col, value) in row_data.iter_mut().enumerate() {
                let (x, y) = system.cell_center(col, row);
                *value = lattice.value_at(x, y);
            }
            row_data
        })
        .collect();

    let cells = target.data_mut().iter_mut().zip(values);
    match mode {
        GridWrite::Overwrite => cells.for_each(|(cell, v)| *cell = v),
        GridWrite::Add => cells.for_each(|(cell, v)| *cell += v),
    }
}

/// Sample `lattice` into a fresh grid
pub fn sample_grid(lattice: &Lattice, target: &mut Raster<f64>) {
    accumulate_into_grid(lattice, target, GridWrite::Overwrite);
}
