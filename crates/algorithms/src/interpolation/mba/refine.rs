//! Dyadic refinement of a cubic B-spline control lattice
//!
//! Re-expresses the surface of a lattice with cell size `h` on a lattice with
//! cell size `h / 2` and the same origin, without changing the represented
//! function. In one dimension a coarse coefficient `c_i` lands on fine index
//! `2i − 1` with weights (1, 6, 1) / 8 over `c_{i−1}, c_i, c_{i+1}`, and the fine
//! index `2i` between two coarse coefficients gets (c_i + c_{i+1}) / 2. The 2D
//! stencils are the tensor products of these rules.

use splinegrid_core::Result;

use super::lattice::Lattice;

/// Refine `coarse` to double resolution.
///
/// Coarse neighbours outside the array count as zero and fine coefficients
/// beyond the fine array are dropped. The refined lattice evaluates identically
/// to `coarse` over the coarse lattice's nominal extent `[0, cells]²` (lattice
/// coordinates).
pub fn refine(coarse: &Lattice) -> Result<Lattice> {
    let (x_min, y_min) = coarse.origin();
    let mut fine = Lattice::zeros(2 * coarse.cells(), x_min, y_min, coarse.cell_size() / 2.0)?;
    debug_assert_eq!(fine.dim(), Lattice::refined_dim(coarse.dim()));

    let n = coarse.dim() as isize;
    let m = fine.dim() as isize;
    let at = |ix: isize, iy: isize| -> f64 {
        if ix < 0 || iy < 0 || ix >= n || iy >= n {
            0.0
        } else {
            coarse.get(ix as usize, iy as usize)
        }
    };
    let mut put = |fx: isize, fy: isize, value: f64| {
        if fx >= 0 && fy >= 0 && fx < m && fy < m {
            fine.set(fx as usize, fy as usize, value);
        }
    };

    for ax in 0..n {
        for ay in 0..n {
            let a = |i: isize, j: isize| at(ax - 1 + i, ay - 1 + j);
            let (a00, a01, a02) = (a(0, 0), a(0, 1), a(0, 2));
            let (a10, a11, a12) = (a(1, 0), a(1, 1), a(1, 2));
            let (a20, a21, a22) = (a(2, 0), a(2, 1), a(2, 2));

            put(
                2 * ax - 1,
                2 * ay - 1,
                (a00 + a02 + a20 + a22 + 6.0 * (a01 + a10 + a12 + a21) + 36.0 * a11) / 64.0,
            );
            put(
                2 * ax - 1,
                2 * ay,
                (a01 + a02 + a21 + a22 + 6.0 * (a11 + a12)) / 16.0,
            );
            put(
                2 * ax,
                2 * ay - 1,
                (a10 + a12 + a20 + a22 + 6.0 * (a11 + a21)) / 16.0,
            );
            put(2 * ax, 2 * ay, (a11 + a12 + a21 + a22) / 4.0);
        }
    }

    Ok(fine)
}
