//! Spatial interpolation algorithms
//!
//! Interpolate scattered point data onto regular grids:
//! - MBA: Multilevel B-spline approximation (coarse-to-fine bicubic lattices)

pub mod mba;

pub use mba::{
    mba, mba_grid, AccumulationMode, LevelProgress, LevelReport, MbaParams, MbaResult,
    MbaStatus, MultilevelBSpline, ResidualPolicy, SampleSource, ScatteredPoints,
};

/// A sample point with x, y coordinates and a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }
}
