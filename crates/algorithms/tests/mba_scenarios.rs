//! End-to-end scenarios for multilevel B-spline gridding.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splinegrid_algorithms::interpolation::mba::{
    mba, mba_grid, AccumulationMode, MbaParams, MbaResult, MbaStatus, MultilevelBSpline,
    ResidualPolicy,
};
use splinegrid_algorithms::interpolation::SamplePoint;
use splinegrid_core::{GridSystem, Raster};

fn grid_from_fn(n: usize, cell_size: f64, f: impl Fn(f64, f64) -> f64) -> Raster<f64> {
    let system = GridSystem::new(0.0, 0.0, cell_size, n, n).unwrap();
    let mut raster = Raster::new(system);
    for row in 0..n {
        for col in 0..n {
            let (x, y) = system.cell_center(col, row);
            raster.set(row, col, f(x, y)).unwrap();
        }
    }
    raster
}

fn sin_cos_grid() -> Raster<f64> {
    grid_from_fn(24, 0.3, |x, y| x.sin() * y.cos())
}

fn max_abs_diff(a: &Raster<f64>, b: &Raster<f64>) -> f64 {
    a.data()
        .iter()
        .zip(b.data().iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn assert_non_increasing(result: &MbaResult) {
    for pair in result.levels.windows(2) {
        assert!(
            pair[1].max_residual <= pair[0].max_residual,
            "max residual grew from {} to {} at level {}",
            pair[0].max_residual,
            pair[1].max_residual,
            pair[1].level
        );
    }
}

// ---------------------------------------------------------------------------
// Exact reproduction of a small grid
// ---------------------------------------------------------------------------

#[test]
fn four_by_four_grid_is_reproduced() {
    let system = GridSystem::new(0.0, 0.0, 1.0, 4, 4).unwrap();
    let input = Raster::from_vec((1..=16).map(f64::from).collect(), system).unwrap();

    for mode in [AccumulationMode::Sum, AccumulationMode::Refinement] {
        let params = MbaParams {
            error_threshold: 0.01,
            max_level: 4,
            mode,
            ..Default::default()
        };
        let result = mba_grid(&input, params).unwrap();

        assert_eq!(result.status, MbaStatus::Converged, "{:?}", mode);
        assert_eq!(result.surface.shape(), (4, 4));
        for row in 0..4 {
            for col in 0..4 {
                let expected = input.get(row, col).unwrap();
                let got = result.surface.get(row, col).unwrap();
                assert!(
                    (got - expected).abs() <= 0.01 + 1e-9,
                    "{:?}: cell ({}, {}) = {}, expected {}",
                    mode,
                    row,
                    col,
                    got,
                    expected
                );
            }
        }
    }
}

#[test]
fn constant_input_is_reproduced() {
    let input = grid_from_fn(8, 1.0, |_, _| 5.0);
    let params = MbaParams {
        error_threshold: 1e-6,
        max_level: 8,
        ..Default::default()
    };
    let result = mba_grid(&input, params).unwrap();

    assert_eq!(result.status, MbaStatus::Converged);
    for &v in result.surface.data().iter() {
        assert_abs_diff_eq!(v, 5.0, epsilon = 1e-6);
    }
}

// ---------------------------------------------------------------------------
// Hierarchy behaviour
// ---------------------------------------------------------------------------

#[test]
fn residual_decreases_on_smooth_surface() {
    let input = sin_cos_grid();
    for mode in [AccumulationMode::Sum, AccumulationMode::Refinement] {
        let params = MbaParams {
            error_threshold: 1e-6,
            max_level: 9,
            mode,
            ..Default::default()
        };
        let result = mba_grid(&input, params).unwrap();
        assert!(result.levels.len() >= 5);
        assert_non_increasing(&result);
        assert!(result.max_residual() < result.levels[0].max_residual);
    }
}

#[test]
fn zero_threshold_terminates_at_max_level() {
    let input = sin_cos_grid();
    for max_level in [1, 3, 6] {
        let params = MbaParams {
            error_threshold: 0.0,
            max_level,
            ..Default::default()
        };
        let result = mba_grid(&input, params).unwrap();
        assert_eq!(result.levels.len(), max_level);
        assert_eq!(result.status, MbaStatus::MaxLevelReached);
        assert_eq!(result.levels.last().unwrap().cells, 1 << (max_level - 1));
    }
}

#[test]
fn lattice_resolution_doubles_each_level() {
    let input = sin_cos_grid();
    let params = MbaParams {
        error_threshold: 0.0,
        max_level: 5,
        ..Default::default()
    };
    let result = mba_grid(&input, params).unwrap();

    let first = result.levels[0];
    assert_eq!(first.cells, 1);
    assert_abs_diff_eq!(first.cell_size, 23.0 * 0.3, epsilon = 1e-12);
    for pair in result.levels.windows(2) {
        assert_eq!(pair[1].cells, 2 * pair[0].cells);
        assert_abs_diff_eq!(pair[1].cell_size, pair[0].cell_size / 2.0, epsilon = 1e-12);
    }
}

#[test]
fn sum_and_refinement_modes_agree() {
    let input = sin_cos_grid();
    let base = MbaParams {
        error_threshold: 1e-4,
        max_level: 7,
        ..Default::default()
    };
    let sum = mba_grid(&input, base.clone()).unwrap();
    let refined = mba_grid(
        &input,
        MbaParams {
            mode: AccumulationMode::Refinement,
            ..base
        },
    )
    .unwrap();

    assert_eq!(sum.levels.len(), refined.levels.len());
    assert!(max_abs_diff(&sum.surface, &refined.surface) < 1e-9);
}

#[test]
fn frozen_samples_never_return() {
    let input = sin_cos_grid();
    let params = MbaParams {
        error_threshold: 1e-3,
        max_level: 9,
        residuals: ResidualPolicy::Freeze,
        ..Default::default()
    };
    let result = mba_grid(&input, params).unwrap();
    for pair in result.levels.windows(2) {
        assert!(pair[1].active <= pair[0].active);
        assert!(pair[1].fitted <= pair[0].active);
    }
}

#[test]
fn unreachable_sample_does_not_block_convergence() {
    let grid = sin_cos_grid();
    let system = *grid.system();
    let mut points = Vec::new();
    for row in 0..system.rows {
        for col in 0..system.cols {
            let (x, y) = system.cell_center(col, row);
            points.push(SamplePoint::new(x, y, grid.get(row, col).unwrap()));
        }
    }
    points.push(SamplePoint::new(-0.3, 3.0, 5.0));

    let params = MbaParams {
        error_threshold: 1e-3,
        max_level: 12,
        ..Default::default()
    };
    let with_extra = mba(&points, system, params.clone()).unwrap();
    let without = mba_grid(&grid, params).unwrap();

    assert_eq!(with_extra.status, MbaStatus::Converged);
    assert_eq!(with_extra.levels.len(), without.levels.len());
    assert!(with_extra.levels.len() < 12);
}

#[test]
fn runs_are_deterministic() {
    let input = sin_cos_grid();
    let params = MbaParams {
        error_threshold: 1e-5,
        max_level: 8,
        ..Default::default()
    };
    let a = mba_grid(&input, params.clone()).unwrap();
    let b = mba_grid(&input, params).unwrap();
    assert_eq!(a.surface.data(), b.surface.data());
    assert_eq!(a.levels, b.levels);
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[test]
fn nodata_cells_are_filled() {
    let n = 8;
    let system = GridSystem::new(0.0, 0.0, 1.0, n, n).unwrap();
    let mut input = Raster::new(system);
    for row in 0..n {
        for col in 0..n {
            input.set(row, col, (row + col) as f64).unwrap();
        }
    }
    let hole = [(3, 3), (3, 4), (4, 3), (4, 4)];
    for &(row, col) in &hole {
        input.set(row, col, -9999.0).unwrap();
    }
    input.set_nodata(Some(-9999.0));

    let params = MbaParams {
        error_threshold: 1e-4,
        ..Default::default()
    };
    let result = mba_grid(&input, params).unwrap();
    assert_eq!(result.levels[0].fitted, n * n - hole.len());

    for &(row, col) in &hole {
        let v = result.surface.get(row, col).unwrap();
        assert!(
            (v - (row + col) as f64).abs() < 0.5,
            "gap cell ({}, {}) = {}",
            row,
            col,
            v
        );
    }
}

#[test]
fn scattered_points_in_projected_coordinates() {
    let mut rng = StdRng::seed_from_u64(2024);
    let (x0, y0) = (350_000.0, 6_300_000.0);
    let f = |x: f64, y: f64| 100.0 + 0.01 * (x - x0) - 0.02 * (y - y0);

    let mut points: Vec<SamplePoint> = (0..300)
        .map(|_| {
            let x = x0 + rng.random_range(0.0..1000.0);
            let y = y0 + rng.random_range(0.0..1000.0);
            SamplePoint::new(x, y, f(x, y))
        })
        .collect();
    // Outside the target grid
    points.push(SamplePoint::new(x0 - 5000.0, y0 - 5000.0, 1e6));

    let system = GridSystem::new(x0, y0, 50.0, 21, 21).unwrap();
    let params = MbaParams {
        error_threshold: 0.01,
        max_level: 7,
        ..Default::default()
    };
    let result = mba(&points, system, params).unwrap();

    assert_eq!(result.excluded, 1);
    assert_eq!(result.levels[0].fitted, 300);
    assert!(result.surface.data().iter().all(|v| v.is_finite()));

    // Interior cells follow the plane closely
    for row in 5..16 {
        for col in 5..16 {
            let (x, y) = system.cell_center(col, row);
            let v = result.surface.get(row, col).unwrap();
            assert!((v - f(x, y)).abs() < 1.0, "({}, {}): {} vs {}", row, col, v, f(x, y));
        }
    }
}

#[test]
fn progress_reports_every_level() {
    let input = sin_cos_grid();
    let params = MbaParams {
        error_threshold: 0.0,
        max_level: 4,
        update_preview: true,
        mode: AccumulationMode::Refinement,
        ..Default::default()
    };
    let mut cells = Vec::new();
    let result = MultilevelBSpline::new(params)
        .run_with_progress(&input, |p| {
            assert_eq!(p.max_level, 4);
            assert!(p.preview.is_some());
            cells.push(p.cells);
            true
        })
        .unwrap();
    assert_eq!(cells, vec![1, 2, 4, 8]);
    assert_eq!(result.levels.len(), 4);
}
