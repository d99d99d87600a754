//! Control-point estimation for one lattice level (BA)
//!
//! Each sample proposes a local coefficient for every control point in its
//! 4×4 neighbourhood,
//!
//! ```text
//! φ_c = w_c · z / Σ_ab w_ab²
//! ```
//!
//! and each control point blends the proposals it received weighted by `w_c²`:
//!
//! ```text
//! φ_kl = Σ w_c² · φ_c / Σ w_c²
//! ```
//!
//! This is the local quasi-interpolation of Lee, Wolberg & Shin (1997), not a
//! global least-squares solve: cost is O(samples) and every coefficient only
//! depends on nearby data.

use splinegrid_core::Result;
use tracing::debug;

use super::lattice::Lattice;
use super::Sample;

/// Sample counts of one fitting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitStats {
    /// Active samples that contributed to the lattice
    pub used: usize,
    /// Active samples outside the lattice support
    pub rejected: usize,
}

/// Fit a lattice with `cells` interior cells to the residuals of the active samples.
///
/// Control points that no sample influences keep a zero coefficient. The
/// accumulation runs sequentially in sample order, so the result is
/// deterministic regardless of thread count.
pub fn fit_lattice(
    samples: &[Sample],
    cells: usize,
    x_min: f64,
    y_min: f64,
    cell_size: f64,
) -> Result<(Lattice, FitStats)> {
    let mut numerator = Lattice::zeros(cells, x_min, y_min, cell_size)?;
    let mut denominator = numerator.zeros_like()?;
    let mut stats = FitStats::default();

    for sample in samples.iter().filter(|s| s.active) {
        let (fx, fy) = numerator.to_lattice_coords(sample.x, sample.y);
        let Some(support) = numerator.support(fx, fy) else {
            stats.rejected += 1;
            continue;
        };

        let w = support.weights();
        let sw2: f64 = w.iter().flatten().map(|w| w * w).sum();
        if sw2 <= 0.0 {
            stats.rejected += 1;
            continue;
        }

        let z = sample.residual;
        for k in 0..4 {
            for l in 0..4 {
                let wkl = w[k][l];
                let w2 = wkl * wkl;
                numerator.add(support.ix + k, support.iy + l, w2 * (wkl * z / sw2));
                denominator.add(support.ix + k, support.iy + l, w2);
            }
        }
        stats.used += 1;
    }

    // The numerator becomes Phi in place
    ndarray::Zip::from(numerator.coefficients_mut())
        .and(denominator.coefficients())
        .for_each(|phi, &den| {
            *phi = if den != 0.0 { *phi / den } else { 0.0 };
        });

    debug!(
        "fitted {}x{} lattice: {} samples used, {} outside support",
        cells, cells, stats.used, stats.rejected
    );

    Ok((numerator, stats))
}
