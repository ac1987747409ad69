use anyhow::{Context, Result};
use gdal::raster::Buffer;
use gdal::DriverManager;
use std::path::{Path, PathBuf};

use crate::model::ElevationGrid;

#[derive(Default)]
pub struct GeoTiffWriter {}

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self {}
    }

    /// Writes `grid` as a single-band Float32 GeoTIFF with NaN as nodata.
    pub fn write(&self, grid: &ElevationGrid, output_path: &Path) -> Result<()> {
        let (rows, cols) = grid.shape();

        tracing::info!("Writing Float32 GeoTIFF: {} x {} pixels", cols, rows);

        // Get the GTiff driver
        let driver =
            DriverManager::get_driver_by_name("GTiff").context("Failed to get GTiff driver")?;

        // Create a single-band Float32 dataset
        let mut dataset = driver
            .create_with_band_type::<f32, _>(output_path, cols, rows, 1)
            .context("Failed to create dataset")?;

        // Set geotransform and projection
        self.set_geo_metadata(&mut dataset, grid)?;

        // Declare NaN as nodata
        let mut band = dataset.rasterband(1).context("Failed to get raster band")?;
        band.set_no_data_value(Some(f64::NAN))
            .context("Failed to set no data value")?;

        // Convert to f32, nodata becomes NaN
        let values: Vec<f32> = grid
            .values
            .iter()
            .map(|&v| if grid.is_nodata(v) { f32::NAN } else { v as f32 })
            .collect();

        // Write the pixels
        let mut buffer = Buffer::new((cols, rows), values);
        band.write((0, 0), (cols, rows), &mut buffer)
            .context("Failed to write raster data")?;

        Ok(())
    }

    fn set_geo_metadata(&self, dataset: &mut gdal::Dataset, grid: &ElevationGrid) -> Result<()> {
        dataset
            .set_geo_transform(&grid.geo_transform)
            .context("Failed to set geo transform")?;

        if grid.has_crs() {
            dataset
                .set_projection(&grid.projection)
                .context("Failed to set projection")?;
        } else {
            tracing::warn!("Raster has no CRS, writing without projection");
        }

        Ok(())
    }
}

/// `<out_dir>/<input stem>_slope.tif`
pub fn slope_output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dtm");
    out_dir.join(format!("{}_slope.tif", stem))
}
