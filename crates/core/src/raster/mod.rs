//! Grid data structures and coordinate systems

mod element;
mod grid;
mod system;

pub use element::RasterElement;
pub use grid::Raster;
pub use system::GridSystem;
