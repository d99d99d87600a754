//! Configuration of a multilevel B-spline run

use serde::{Deserialize, Serialize};
use splinegrid_core::{Error, Result};

use super::lattice::Lattice;
use super::residual::ResidualPolicy;

/// Highest level accepted by [`MbaParams::validate`]. Lattice memory grows as
/// 4^level, so anything near this is far beyond available memory anyway.
pub const MAX_LEVEL_LIMIT: usize = 30;

/// How level lattices are combined into the final surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationMode {
    /// Sample every level onto the output grid and sum the results
    #[default]
    Sum,
    /// Keep one lattice; refine it to each new level and add the fitted lattice
    Refinement,
}

/// Parameters for multilevel B-spline approximation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MbaParams {
    /// Stop once the largest absolute residual falls below this value.
    /// Zero disables the error criterion so the run ends at `max_level`.
    pub error_threshold: f64,
    /// Maximum number of levels (level L has 2^(L-1) lattice cells per axis)
    pub max_level: usize,
    /// Plain sum of levels or refine-and-replace
    pub mode: AccumulationMode,
    /// Treatment of converged samples during residual updates
    pub residuals: ResidualPolicy,
    /// Hand the current surface to the progress callback after every level
    pub update_preview: bool,
    /// Byte budget for the lattices of one level; exceeding it ends the run
    /// with [`MbaStatus::ResourceExhausted`](super::MbaStatus::ResourceExhausted)
    pub memory_limit: Option<usize>,
}

impl Default for MbaParams {
    fn default() -> Self {
        Self {
            error_threshold: 0.0001,
            max_level: 11,
            mode: AccumulationMode::Sum,
            residuals: ResidualPolicy::Recompute,
            update_preview: false,
            memory_limit: None,
        }
    }
}

impl MbaParams {
    /// Reject configurations before any work starts
    pub fn validate(&self) -> Result<()> {
        if !(self.error_threshold >= 0.0 && self.error_threshold.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "error_threshold",
                value: self.error_threshold.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        if self.max_level < 1 || self.max_level > MAX_LEVEL_LIMIT {
            return Err(Error::InvalidParameter {
                name: "max_level",
                value: self.max_level.to_string(),
                reason: format!("must be in 1..={}", MAX_LEVEL_LIMIT),
            });
        }
        Ok(())
    }

    /// Lattice cells per axis at `level` (1-based), saturating for huge levels
    pub(crate) fn cells_at(level: usize) -> usize {
        u32::try_from(level.saturating_sub(1))
            .ok()
            .and_then(|shift| 1usize.checked_shl(shift))
            .unwrap_or(usize::MAX)
    }

    /// Estimated bytes of lattice memory alive while `level` is processed:
    /// numerator and denominator of the fit, the lattice kept from the previous
    /// level, and in refinement mode the refined accumulated lattice.
    /// Level 0 does not exist and needs nothing.
    pub fn level_footprint(&self, level: usize) -> usize {
        if level == 0 {
            return 0;
        }
        let current = Lattice::byte_size(Self::cells_at(level));
        let previous = if level > 1 {
            Lattice::byte_size(Self::cells_at(level - 1))
        } else {
            0
        };
        let lattices = match self.mode {
            AccumulationMode::Sum => 2,
            AccumulationMode::Refinement => 3,
        };
        current.saturating_mul(lattices).saturating_add(previous)
    }
}
