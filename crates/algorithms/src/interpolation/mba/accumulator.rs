//! Strategies for folding each level's lattice into the final surface

use splinegrid_core::{GridSystem, Raster, Result};
use tracing::debug;

use super::lattice::Lattice;
use super::refine::refine;
use super::residual::Correction;
use super::sampler::{accumulate_into_grid, sample_grid, GridWrite};

/// Collects per-level lattices into one surface.
pub trait Accumulator {
    /// Fold a freshly fitted lattice into the surface.
    ///
    /// On error the previously merged surface is left untouched.
    fn merge(&mut self, fitted: Lattice) -> Result<()>;

    /// Lattice against which sample residuals are refreshed after a merge
    fn correction(&self) -> Option<Correction<'_>>;

    /// Current surface on the output grid
    fn preview(&mut self) -> &Raster<f64>;

    /// Final surface on the output grid
    fn finalize(self) -> Raster<f64>;
}

/// Plain sum of the level surfaces, kept directly on the output grid.
#[derive(Debug)]
pub struct SumAccumulator {
    surface: Raster<f64>,
    last: Option<Lattice>,
}

impl SumAccumulator {
    pub fn new(system: GridSystem) -> Self {
        Self {
            surface: Raster::new(system),
            last: None,
        }
    }
}

impl Accumulator for SumAccumulator {
    fn merge(&mut self, fitted: Lattice) -> Result<()> {
        let mode = if self.last.is_none() {
            GridWrite::Overwrite
        } else {
            GridWrite::Add
        };
        debug!("merging {} lattice cells ({:?})", fitted.cells(), mode);
        accumulate_into_grid(&fitted, &mut self.surface, mode);
        self.last = Some(fitted);
        Ok(())
    }

    fn correction(&self) -> Option<Correction<'_>> {
        self.last.as_ref().map(Correction::Subtract)
    }

    fn preview(&mut self) -> &Raster<f64> {
        &self.surface
    }

    fn finalize(self) -> Raster<f64> {
        self.surface
    }
}

/// One ever-finer lattice: each level refines the accumulated lattice to the
/// new resolution and adds the fitted lattice to it.
#[derive(Debug)]
pub struct RefineAccumulator {
    psi: Option<Lattice>,
    surface: Raster<f64>,
    sampled: bool,
}

impl RefineAccumulator {
    pub fn new(system: GridSystem) -> Self {
        Self {
            psi: None,
            surface: Raster::new(system),
            sampled: false,
        }
    }

    /// Accumulated lattice, if any level has been merged
    pub fn lattice(&self) -> Option<&Lattice> {
        self.psi.as_ref()
    }

    fn sample(&mut self) {
        if self.sampled {
            return;
        }
        if let Some(psi) = &self.psi {
            sample_grid(psi, &mut self.surface);
        }
        self.sampled = true;
    }
}

impl Accumulator for RefineAccumulator {
    fn merge(&mut self, fitted: Lattice) -> Result<()> {
        let next = match &self.psi {
            None => fitted,
            Some(psi) => {
                let mut refined = refine(psi)?;
                refined.add_lattice(&fitted)?;
                refined
            }
        };
        debug!("accumulated lattice refined to {} cells", next.cells());
        self.psi = Some(next);
        self.sampled = false;
        Ok(())
    }

    fn correction(&self) -> Option<Correction<'_>> {
        self.psi.as_ref().map(Correction::Replace)
    }

    fn preview(&mut self) -> &Raster<f64> {
        self.sample();
        &self.surface
    }

    fn finalize(mut self) -> Raster<f64> {
        self.sample();
        self.surface
    }
}
