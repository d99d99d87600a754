//! # SplineGrid Core
//!
//! Core types and traits shared by the SplineGrid gridding algorithms.
//!
//! This crate provides:
//! - `GridSystem`: regular coordinate system (origin, cell size, dimensions)
//! - `Raster<T>`: generic grid used both as sample source and as output sink
//! - `Error`/`Result`: the error taxonomy used across the workspace
//! - Algorithm traits for a consistent API

pub mod error;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{GridSystem, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GridSystem, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in SplineGrid.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
