//! Multilevel B-spline approximation (MBA)
//!
//! Converts scattered samples into a smooth surface on a regular grid by
//! fitting a hierarchy of bicubic B-spline control lattices of doubling
//! resolution. Each level fits the residuals the previous levels left behind:
//!
//! ```text
//! level 1:  1×1 cells, cell size = max(grid width, grid height)
//! level L:  2^(L-1) cells, cell size halved
//! surface = Σ level surfaces   (or one refined lattice, see AccumulationMode)
//! ```
//!
//! The loop stops once every residual is within the error threshold, at the
//! level limit, when the progress callback cancels, or when the next level's
//! lattices exceed the memory budget. Every stop returns the surface of the
//! last completed level.
//!
//! Reference:
//! Lee, S., Wolberg, G., Shin, S.Y. (1997). Scattered data interpolation with
//! multilevel B-splines. IEEE Transactions on Visualization and Computer
//! Graphics, 3(3), 228–244.

mod accumulator;
pub mod basis;
mod driver;
mod fit;
mod lattice;
mod params;
mod refine;
mod residual;
mod sampler;
mod source;

use splinegrid_core::{GridSystem, Raster, RasterElement, Result};

use super::SamplePoint;

pub use accumulator::{Accumulator, RefineAccumulator, SumAccumulator};
pub use driver::{LevelProgress, LevelReport, MbaResult, MbaStatus, MultilevelBSpline};
pub use fit::{fit_lattice, FitStats};
pub use lattice::{Lattice, Support};
pub use params::{AccumulationMode, MbaParams, MAX_LEVEL_LIMIT};
pub use refine::refine;
pub use residual::{keep_refining, update_residuals, Correction, ResidualPolicy, ResidualStats};
pub use sampler::{accumulate_into_grid, sample_grid, GridWrite};
pub use source::{SampleSource, ScatteredPoints};

/// Working-set entry of one sample during a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Observed value
    pub value: f64,
    /// Value minus the surface merged so far
    pub residual: f64,
    /// Still above the error threshold
    pub active: bool,
}

impl Sample {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self {
            x,
            y,
            value,
            residual: value,
            active: true,
        }
    }
}

impl From<SamplePoint> for Sample {
    fn from(p: SamplePoint) -> Self {
        Self::new(p.x, p.y, p.value)
    }
}

/// Interpolate scattered points onto `system`.
pub fn mba(points: &[SamplePoint], system: GridSystem, params: MbaParams) -> Result<MbaResult> {
    let source = ScatteredPoints::new(points.to_vec(), system);
    MultilevelBSpline::new(params).run(&source)
}

/// Interpolate a surface through every valid cell of `grid`, filling no-data cells.
pub fn mba_grid<T: RasterElement>(grid: &Raster<T>, params: MbaParams) -> Result<MbaResult> {
    MultilevelBSpline::new(params).run(grid)
}
