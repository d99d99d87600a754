//! Error types for SplineGrid

use thiserror::Error;

/// Main error type for SplineGrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in grid of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Grid size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Degenerate extent: width {width}, height {height}")]
    DegenerateExtent { width: f64, height: f64 },

    #[error("No usable sample points")]
    NoSamples,

    #[error("Allocation of {bytes} bytes failed")]
    Allocation { bytes: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error stems from memory exhaustion rather than bad input
    pub fn is_resource(&self) -> bool {
        matches!(self, Error::Allocation { .. })
    }
}

/// Result type alias for SplineGrid operations
pub type Result<T> = std::result::Result<T, Error>;
