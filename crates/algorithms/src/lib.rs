//! # SplineGrid Algorithms
//!
//! Scattered-data gridding for SplineGrid.
//!
//! ## Available Algorithms
//!
//! - **interpolation**: multilevel B-spline approximation (MBA) of scattered
//!   points or grid cells onto a regular grid

pub mod interpolation;
mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        mba, mba_grid, AccumulationMode, MbaParams, MbaResult, MbaStatus, MultilevelBSpline,
        ResidualPolicy, SamplePoint, SampleSource, ScatteredPoints,
    };
    pub use splinegrid_core::prelude::*;
}
