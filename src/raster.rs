use gdal::Dataset;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::ElevationGrid;

/// Sentinel many DEM producers write when the band declares no nodata value.
pub const FALLBACK_NODATA: f64 = -9999.0;

const IDENTITY_TRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// How invalid elevation pixels are recognised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodataRule {
    /// The band's declared nodata value.
    Equal(f64),
    /// No declared value; anything at or below the threshold is void.
    AtOrBelow(f64),
}

impl NodataRule {
    pub fn from_nodata(nodata: Option<f64>) -> Self {
        match nodata {
            Some(value) => NodataRule::Equal(value),
            None => NodataRule::AtOrBelow(FALLBACK_NODATA),
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        if value.is_nan() {
            return true;
        }
        match *self {
            NodataRule::Equal(nodata) => value == nodata,
            NodataRule::AtOrBelow(threshold) => value <= threshold,
        }
    }
}

/// Reads band 1 of `path` as `f64` along with its georeferencing.
pub fn read_elevation(path: &Path) -> Result<ElevationGrid> {
    let dataset = Dataset::open(path)?;
    let (cols, rows) = dataset.raster_size();

    let geo_transform = match dataset.geo_transform() {
        Ok(gt) => gt,
        Err(e) => {
            warn!("No geo transform in {:?} ({}), using pixel coordinates", path, e);
            IDENTITY_TRANSFORM
        }
    };
    let projection = dataset.projection();

    let band = dataset.rasterband(1)?;
    let nodata = band.no_data_value();
    let buffer = band.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)?;
    let (_, values) = buffer.into_shape_and_vec();

    debug!(
        "Read {:?}: {} x {} pixels, nodata {:?}",
        path, cols, rows, nodata
    );

    ElevationGrid::new(rows, cols, geo_transform, projection, nodata, values)
}
