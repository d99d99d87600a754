//! Sample providers for the gridding engine

use splinegrid_core::{Error, GridSystem, Raster, RasterElement, Result};

use crate::interpolation::SamplePoint;

/// Supplies scattered samples and the grid they are interpolated onto.
pub trait SampleSource {
    /// Output grid definition
    fn target_system(&self) -> Result<GridSystem>;

    /// All valid samples in world coordinates
    fn samples(&self) -> Vec<SamplePoint>;
}

/// Every valid cell of a grid is a sample at its cell centre; no-data cells
/// are filled by the interpolated surface.
impl<T: RasterElement> SampleSource for Raster<T> {
    fn target_system(&self) -> Result<GridSystem> {
        Ok(*self.system())
    }

    fn samples(&self) -> Vec<SamplePoint> {
        let mut points = Vec::new();
        for ((row, col), &v) in self.data().indexed_iter() {
            if self.is_nodata(v) {
                continue;
            }
            let Some(value) = v.to_f64().filter(|z| z.is_finite()) else {
                continue;
            };
            let (x, y) = self.cell_center(col, row);
            points.push(SamplePoint::new(x, y, value));
        }
        points
    }
}

/// Scattered points with an explicit output grid
#[derive(Debug, Clone)]
pub struct ScatteredPoints {
    pub points: Vec<SamplePoint>,
    pub system: GridSystem,
}

impl ScatteredPoints {
    pub fn new(points: Vec<SamplePoint>, system: GridSystem) -> Self {
        Self { points, system }
    }

    /// Output grid of the given cell size covering the bounding box of the points
    pub fn with_cell_size(points: Vec<SamplePoint>, cell_size: f64) -> Result<Self> {
        let mut finite = points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite());
        let first = finite.next().ok_or(Error::NoSamples)?;

        let (mut x_min, mut y_min, mut x_max, mut y_max) = (first.x, first.y, first.x, first.y);
        for p in finite {
            x_min = x_min.min(p.x);
            y_min = y_min.min(p.y);
            x_max = x_max.max(p.x);
            y_max = y_max.max(p.y);
        }

        let system = GridSystem::from_extent(x_min, y_min, x_max, y_max, cell_size)?;
        Ok(Self { points, system })
    }
}

impl SampleSource for ScatteredPoints {
    fn target_system(&self) -> Result<GridSystem> {
        Ok(self.system)
    }

    fn samples(&self) -> Vec<SamplePoint> {
        self.points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite() && p.value.is_finite())
            .copied()
            .collect()
    }
}
