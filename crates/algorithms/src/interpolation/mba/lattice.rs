//! Control lattice of bicubic B-spline coefficients
//!
//! A lattice at a hierarchy level with `cells` interior cells per axis stores
//! `(cells + 4) × (cells + 4)` coefficients. A point with lattice coordinates
//! `(fx, fy)` is influenced by the 4×4 block starting at
//! `(floor(fx), floor(fy))`, so the point is inside the lattice's support when
//! that block lies fully inside the array.

use ndarray::Array2;
use splinegrid_core::{Error, Result};

use super::basis::weights;

/// Integer cell and local offset of a supported lattice coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    pub ix: usize,
    pub iy: usize,
    pub dx: f64,
    pub dy: f64,
}

impl Support {
    /// Tensor-product basis weights `w[k][l] = B_l(dy) · B_k(dx)` of the 4×4 block
    #[inline]
    pub fn weights(&self) -> [[f64; 4]; 4] {
        let wx = weights(self.dx);
        let wy = weights(self.dy);
        let mut w = [[0.0; 4]; 4];
        for k in 0..4 {
            for l in 0..4 {
                w[k][l] = wy[l] * wx[k];
            }
        }
        w
    }
}

/// Control lattice ("Phi") of one hierarchy level.
#[derive(Debug, Clone)]
pub struct Lattice {
    /// Coefficients indexed `[ix, iy]`
    coeffs: Array2<f64>,
    cells: usize,
    x_min: f64,
    y_min: f64,
    cell_size: f64,
}

impl Lattice {
    /// Zero-initialised lattice with `cells` interior cells per axis.
    ///
    /// Fails with [`Error::Allocation`] when the coefficient buffer cannot be reserved.
    pub fn zeros(cells: usize, x_min: f64, y_min: f64, cell_size: f64) -> Result<Self> {
        let dim = cells + 4;
        let len = dim.checked_mul(dim).ok_or(Error::Allocation { bytes: usize::MAX })?;

        let mut buf: Vec<f64> = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| Error::Allocation {
            bytes: Self::byte_size(cells),
        })?;
        buf.resize(len, 0.0);

        let coeffs = Array2::from_shape_vec((dim, dim), buf)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            coeffs,
            cells,
            x_min,
            y_min,
            cell_size,
        })
    }

    /// Lattice with the same geometry as `self`, all coefficients zero
    pub fn zeros_like(&self) -> Result<Self> {
        Self::zeros(self.cells, self.x_min, self.y_min, self.cell_size)
    }

    /// Bytes needed for the coefficients of a lattice with `cells` interior cells
    pub fn byte_size(cells: usize) -> usize {
        let dim = cells.saturating_add(4);
        dim.saturating_mul(dim)
            .saturating_mul(std::mem::size_of::<f64>())
    }

    /// Array dimension of the lattice obtained by refining one of dimension `dim`
    pub(crate) fn refined_dim(dim: usize) -> usize {
        dim.saturating_sub(4).saturating_mul(2).saturating_add(4)
    }

    /// Array dimension per axis (`cells + 4`)
    pub fn dim(&self) -> usize {
        self.cells + 4
    }

    /// Interior cells per axis
    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// World coordinates of lattice index (0, 0)
    pub fn origin(&self) -> (f64, f64) {
        (self.x_min, self.y_min)
    }

    #[inline]
    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.coeffs[(ix, iy)]
    }

    #[inline]
    pub fn set(&mut self, ix: usize, iy: usize, value: f64) {
        self.coeffs[(ix, iy)] = value;
    }

    #[inline]
    pub fn add(&mut self, ix: usize, iy: usize, value: f64) {
        self.coeffs[(ix, iy)] += value;
    }

    /// Add another lattice of identical shape coefficient-wise
    pub fn add_lattice(&mut self, other: &Lattice) -> Result<()> {
        if self.coeffs.dim() != other.coeffs.dim() {
            let (er, ec) = self.coeffs.dim();
            let (ar, ac) = other.coeffs.dim();
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        self.coeffs += &other.coeffs;
        Ok(())
    }

    /// Coefficient array, indexed `[ix, iy]`
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coeffs
    }

    pub fn coefficients_mut(&mut self) -> &mut Array2<f64> {
        &mut self.coeffs
    }

    /// Fractional lattice coordinates of a world position
    #[inline]
    pub fn to_lattice_coords(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.x_min) / self.cell_size,
            (y - self.y_min) / self.cell_size,
        )
    }

    /// Locate the 4×4 block influencing `(fx, fy)`, or `None` outside the support
    #[inline]
    pub fn support(&self, fx: f64, fy: f64) -> Option<Support> {
        let ix = fx.floor();
        let iy = fy.floor();
        // Also rejects NaN
        if !(ix >= 0.0 && iy >= 0.0) {
            return None;
        }
        let last = (self.dim() - 4) as f64;
        if ix > last || iy > last {
            return None;
        }
        Some(Support {
            ix: ix as usize,
            iy: iy as usize,
            dx: fx - ix,
            dy: fy - iy,
        })
    }

    /// Whether `(fx, fy)` has all 16 influencing coefficients inside the array
    pub fn support_contains(&self, fx: f64, fy: f64) -> bool {
        self.support(fx, fy).is_some()
    }

    /// Bicubic surface value at lattice coordinates; 0 outside the support
    #[inline]
    pub fn evaluate(&self, fx: f64, fy: f64) -> f64 {
        match self.support(fx, fy) {
            Some(s) => self.evaluate_at(&s),
            None => 0.0,
        }
    }

    /// Surface value at a world position
    #[inline]
    pub fn value_at(&self, x: f64, y: f64) -> f64 {
        let (fx, fy) = self.to_lattice_coords(x, y);
        self.evaluate(fx, fy)
    }

    #[inline]
    fn evaluate_at(&self, s: &Support) -> f64 {
        let w = s.weights();
        let mut value = 0.0;
        for k in 0..4 {
            for l in 0..4 {
                value += w[k][l] * self.coeffs[(s.ix + k, s.iy + l)];
            }
        }
        value
    }
}
