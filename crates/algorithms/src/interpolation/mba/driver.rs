//! Coarse-to-fine hierarchy loop

use std::fmt;

use serde::Serialize;
use splinegrid_core::{Algorithm, Error, GridSystem, Raster, Result};
use tracing::{info, warn};

use super::accumulator::{Accumulator, RefineAccumulator, SumAccumulator};
use super::fit::fit_lattice;
use super::params::{AccumulationMode, MbaParams};
use super::residual::{keep_refining, update_residuals, ResidualStats};
use super::source::{SampleSource, ScatteredPoints};
use super::Sample;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MbaStatus {
    /// Every residual is within the error threshold
    Converged,
    /// The level limit was reached first
    MaxLevelReached,
    /// The progress callback asked to stop
    Cancelled,
    /// The next level did not fit into memory; the surface is from the last completed level
    ResourceExhausted,
}

/// Diagnostics of one hierarchy level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelReport {
    pub level: usize,
    /// Lattice cells per axis
    pub cells: usize,
    /// Lattice cell size in world units
    pub cell_size: f64,
    /// Samples that contributed to the fitted lattice
    pub fitted: usize,
    /// Samples still above the error threshold after the level
    pub active: usize,
    pub max_residual: f64,
    pub mean_residual: f64,
}

impl fmt::Display for LevelReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "level {:>2}: {}x{} cells ({:.6}), fitted {}, active {}, max residual {:.6e}, mean {:.6e}",
            self.level,
            self.cells,
            self.cells,
            self.cell_size,
            self.fitted,
            self.active,
            self.max_residual,
            self.mean_residual
        )
    }
}

/// State handed to the progress callback once per level, after the merge
#[derive(Debug, Clone, Copy)]
pub struct LevelProgress<'a> {
    pub level: usize,
    pub max_level: usize,
    pub cells: usize,
    pub cell_size: f64,
    /// Surface so far, when `update_preview` is enabled
    pub preview: Option<&'a Raster<f64>>,
}

/// Result of a multilevel B-spline run
#[derive(Debug, Clone)]
pub struct MbaResult {
    /// Interpolated surface on the target grid
    pub surface: Raster<f64>,
    pub status: MbaStatus,
    /// One entry per completed level
    pub levels: Vec<LevelReport>,
    /// Samples dropped for lying outside the target grid extent
    pub excluded: usize,
}

impl MbaResult {
    /// Level-by-level text log
    pub fn log(&self) -> String {
        let mut out = String::new();
        for report in &self.levels {
            out.push_str(&report.to_string());
            out.push('\n');
        }
        out.push_str(&format!("status: {:?}\n", self.status));
        out
    }

    /// Largest residual after the final level
    pub fn max_residual(&self) -> f64 {
        self.levels.last().map_or(0.0, |r| r.max_residual)
    }
}

/// Multilevel B-spline approximation (Lee, Wolberg & Shin 1997).
///
/// Level 1 fits a single-cell lattice spanning the whole target extent; each
/// following level doubles the lattice resolution and fits the residuals left
/// by the levels before it.
#[derive(Debug, Clone, Default)]
pub struct MultilevelBSpline {
    params: MbaParams,
}

impl MultilevelBSpline {
    pub fn new(params: MbaParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MbaParams {
        &self.params
    }

    /// Interpolate the samples of `source` onto its target grid
    pub fn run<S: SampleSource + ?Sized>(&self, source: &S) -> Result<MbaResult> {
        self.run_with_progress(source, |_| true)
    }

    /// Like [`run`](Self::run), calling `progress` once per level after the
    /// merge. Returning `false` stops the run with the surface merged so far.
    pub fn run_with_progress<S, F>(&self, source: &S, progress: F) -> Result<MbaResult>
    where
        S: SampleSource + ?Sized,
        F: FnMut(&LevelProgress<'_>) -> bool,
    {
        self.params.validate()?;

        let system = source.target_system()?;
        system.validate()?;
        let (width, height) = (system.x_range(), system.y_range());
        if !(width > 0.0 && height > 0.0) {
            return Err(Error::DegenerateExtent { width, height });
        }

        // Lattice supports shrink towards the extent as levels refine, so a
        // sample outside it could never converge.
        let (samples, outside): (Vec<Sample>, Vec<Sample>) = source
            .samples()
            .into_iter()
            .map(Sample::from)
            .partition(|s| system.contains(s.x, s.y));
        let excluded = outside.len();
        if excluded > 0 {
            warn!("{} samples outside the target grid extent ignored", excluded);
        }
        if samples.is_empty() {
            return Err(Error::NoSamples);
        }

        info!(
            "MBA: {} samples onto {} x {} grid, max level {}, {:?} mode",
            samples.len(),
            system.cols,
            system.rows,
            self.params.max_level,
            self.params.mode
        );

        let mut result = match self.params.mode {
            AccumulationMode::Sum => {
                self.hierarchy(SumAccumulator::new(system), &system, samples, progress)
            }
            AccumulationMode::Refinement => {
                self.hierarchy(RefineAccumulator::new(system), &system, samples, progress)
            }
        }?;
        result.excluded = excluded;
        Ok(result)
    }

    fn hierarchy<A, F>(
        &self,
        mut acc: A,
        system: &GridSystem,
        mut samples: Vec<Sample>,
        mut progress: F,
    ) -> Result<MbaResult>
    where
        A: Accumulator,
        F: FnMut(&LevelProgress<'_>) -> bool,
    {
        let params = &self.params;
        let threshold = params.error_threshold;

        let mut level = 0;
        let mut cells = 1usize;
        let mut cell_size = system.x_range().max(system.y_range());
        let mut levels: Vec<LevelReport> = Vec::new();

        let status = loop {
            level += 1;

            if let Some(limit) = params.memory_limit {
                let needed = params.level_footprint(level);
                if needed > limit {
                    if level == 1 {
                        return Err(Error::Allocation { bytes: needed });
                    }
                    warn!("level {} needs {} bytes, limit is {}; stopping", level, needed, limit);
                    break MbaStatus::ResourceExhausted;
                }
            }

            let (lattice, fit) =
                match fit_lattice(&samples, cells, system.x_min, system.y_min, cell_size) {
                    Ok(fitted) => fitted,
                    Err(e) if e.is_resource() && level > 1 => {
                        warn!("level {}: {}; keeping level {} surface", level, e, level - 1);
                        break MbaStatus::ResourceExhausted;
                    }
                    Err(e) => return Err(e),
                };
            if level == 1 && fit.used == 0 {
                return Err(Error::NoSamples);
            }

            match acc.merge(lattice) {
                Ok(()) => {}
                Err(e) if e.is_resource() && level > 1 => {
                    warn!("level {}: {}; keeping level {} surface", level, e, level - 1);
                    break MbaStatus::ResourceExhausted;
                }
                Err(e) => return Err(e),
            }

            let cancelled = {
                let preview = if params.update_preview {
                    Some(acc.preview())
                } else {
                    None
                };
                !progress(&LevelProgress {
                    level,
                    max_level: params.max_level,
                    cells,
                    cell_size,
                    preview,
                })
            };

            let correction = acc
                .correction()
                .ok_or_else(|| Error::Algorithm("no level merged".into()))?;
            let stats = update_residuals(&mut samples, correction, threshold, params.residuals);

            let report = LevelReport {
                level,
                cells,
                cell_size,
                fitted: fit.used,
                active: stats.active,
                max_residual: stats.max,
                mean_residual: stats.mean,
            };
            info!("{}", report);
            levels.push(report);

            let more = keep_refining(&stats, threshold, level, params.max_level, cancelled);
            cells *= 2;
            cell_size /= 2.0;

            if !more {
                break stop_status(&stats, threshold, cancelled);
            }
        };

        if status == MbaStatus::Cancelled {
            warn!("MBA cancelled after level {}", level);
        }

        Ok(MbaResult {
            surface: acc.finalize(),
            status,
            levels,
            excluded: 0,
        })
    }
}

fn stop_status(stats: &ResidualStats, threshold: f64, cancelled: bool) -> MbaStatus {
    if stats.converged(threshold) {
        MbaStatus::Converged
    } else if cancelled {
        MbaStatus::Cancelled
    } else {
        MbaStatus::MaxLevelReached
    }
}

impl Algorithm for MultilevelBSpline {
    type Input = ScatteredPoints;
    type Output = MbaResult;
    type Params = MbaParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Multilevel B-Spline"
    }

    fn description(&self) -> &'static str {
        "Coarse-to-fine bicubic B-spline approximation of scattered data onto a regular grid"
    }

    fn execute(&self, input: ScatteredPoints, params: MbaParams) -> Result<MbaResult> {
        MultilevelBSpline::new(params).run(&input)
    }
}
