//! Residual update after each hierarchy level

use serde::{Deserialize, Serialize};

use super::lattice::Lattice;
use super::Sample;
use crate::maybe_rayon::*;

/// Which samples take part in residual updates once they have converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualPolicy {
    /// Update every sample at every level and re-derive its active flag.
    /// Converged samples only skip lattice fitting.
    #[default]
    Recompute,
    /// A converged sample is frozen: excluded from all later fitting and
    /// residual passes, so later levels may move the surface away from it.
    Freeze,
}

/// Lattice against which residuals are refreshed
#[derive(Debug, Clone, Copy)]
pub enum Correction<'a> {
    /// `residual -= lattice(x, y)`: the lattice is one level's contribution
    Subtract(&'a Lattice),
    /// `residual = value - lattice(x, y)`: the lattice is the whole surface
    Replace(&'a Lattice),
}

/// Residual summary over unconverged samples
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResidualStats {
    /// Samples whose absolute residual still exceeds the threshold
    pub active: usize,
    /// Maximum absolute residual among them (0 when none are left)
    pub max: f64,
    /// Mean absolute residual among them (0 when none are left)
    pub mean: f64,
}

impl ResidualStats {
    /// Whether the threshold has been reached
    pub fn converged(&self, threshold: f64) -> bool {
        self.active == 0 || self.max < threshold
    }
}

/// Refresh the residual of every participating sample and mark the ones at or
/// below `threshold` as converged.
pub fn update_residuals(
    samples: &mut [Sample],
    correction: Correction<'_>,
    threshold: f64,
    policy: ResidualPolicy,
) -> ResidualStats {
    samples.par_iter_mut().for_each(|sample| {
        if policy == ResidualPolicy::Freeze && !sample.active {
            return;
        }
        sample.residual = match correction {
            Correction::Subtract(lattice) => sample.residual - lattice.value_at(sample.x, sample.y),
            Correction::Replace(lattice) => sample.value - lattice.value_at(sample.x, sample.y),
        };
        sample.active = sample.residual.abs() > threshold;
    });

    // Fixed-order reduction keeps statistics independent of thread count
    let mut stats = ResidualStats::default();
    let mut sum = 0.0;
    for sample in samples.iter().filter(|s| s.active) {
        let r = sample.residual.abs();
        stats.active += 1;
        stats.max = stats.max.max(r);
        sum += r;
    }
    if stats.active > 0 {
        stats.mean = sum / stats.active as f64;
    }
    stats
}

/// Continuation predicate of the hierarchy loop
pub fn keep_refining(
    stats: &ResidualStats,
    threshold: f64,
    level: usize,
    max_level: usize,
    cancelled: bool,
) -> bool {
    stats.active > 0 && stats.max >= threshold && level < max_level && !cancelled
}
