//! Uniform cubic B-spline basis functions
//!
//! For a local parameter `d ∈ [0, 1)` inside one lattice cell, the four
//! basis functions overlapping that cell are:
//!
//! ```text
//! B₀(d) = (1 − d)³ / 6
//! B₁(d) = (3d³ − 6d² + 4) / 6
//! B₂(d) = (−3d³ + 3d² + 3d + 1) / 6
//! B₃(d) = d³ / 6
//! ```
//!
//! They sum to one for every `d` (partition of unity).

/// Cubic B-spline basis weight `Bᵢ(d)` for `i ∈ {0, 1, 2, 3}`.
#[inline]
pub fn basis(i: usize, d: f64) -> f64 {
    debug_assert!(i < 4, "cubic B-spline basis index {} out of range", i);
    match i {
        0 => {
            let t = 1.0 - d;
            t * t * t / 6.0
        }
        1 => (3.0 * d * d * d - 6.0 * d * d + 4.0) / 6.0,
        2 => (-3.0 * d * d * d + 3.0 * d * d + 3.0 * d + 1.0) / 6.0,
        3 => d * d * d / 6.0,
        _ => unreachable!("cubic B-spline basis index {} out of range", i),
    }
}

/// All four basis weights at `d`.
#[inline]
pub fn weights(d: f64) -> [f64; 4] {
    [basis(0, d), basis(1, d), basis(2, d), basis(3, d)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_partition_of_unity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let d: f64 = rng.random_range(0.0..1.0);
            let sum: f64 = weights(d).iter().sum();
            assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(weights(0.0).iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_values() {
        // At d = 0 the cell start coincides with the knot: (1/6, 4/6, 1/6, 0)
        let w = weights(0.0);
        assert_abs_diff_eq!(w[0], 1.0 / 6.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[1], 4.0 / 6.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[2], 1.0 / 6.0, epsilon = 1e-15);
        assert_eq!(w[3], 0.0);

        // Symmetric at d = 0.5
        let w = weights(0.5);
        assert_abs_diff_eq!(w[0], w[3], epsilon = 1e-15);
        assert_abs_diff_eq!(w[1], w[2], epsilon = 1e-15);
        assert_abs_diff_eq!(w[0], 1.0 / 48.0, epsilon = 1e-15);
    }

    #[test]
    fn test_weights_non_negative() {
        for k in 0..100 {
            let d = k as f64 / 100.0;
            assert!(weights(d).iter().all(|&w| w >= 0.0));
        }
    }
}
