use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::colormap::{colorize, normalize, Colormap};
use crate::error::Result;
use crate::model::ElevationGrid;
use crate::raster::{read_elevation, NodataRule};
use crate::render::{encode_png, side_by_side};
use crate::slope::sobel_slope;
use crate::zip_handler::has_extension;

const PANEL_GAP: usize = 16;

/// First `.tif` directly in `dir`, by file name.
pub fn find_first_tif(dir: &Path) -> Result<Option<PathBuf>> {
    let mut tifs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, "tif") {
            tifs.push(path);
        }
    }
    tifs.sort();
    Ok(tifs.into_iter().next())
}

/// Masked DEM (terrain colors) and its Sobel slope (inferno) side by side, as PNG.
pub fn render_slope_preview(dem: &ElevationGrid) -> Result<Vec<u8>> {
    let rule = NodataRule::from_nodata(dem.nodata);
    match rule {
        NodataRule::Equal(value) => info!("Using nodata value for masking: {}", value),
        NodataRule::AtOrBelow(value) => {
            info!("No nodata value found, masking {} as NoData.", value)
        }
    }

    let dem_masked: Vec<f64> = dem
        .values
        .iter()
        .map(|&v| if rule.matches(v) { f64::NAN } else { v })
        .collect();
    let slope = sobel_slope(dem, rule)?;

    let left = colorize(&normalize(&dem_masked), Colormap::Terrain);
    let right = colorize(&normalize(&slope.values), Colormap::Inferno);

    let composed = side_by_side(&left, &right, dem.cols, dem.rows, PANEL_GAP);
    encode_png(&composed, 2 * dem.cols + PANEL_GAP, dem.rows)
}

/// Renders the preview of the first DEM in `data_dir` to `output`.
/// Returns the DEM used, or `None` when the directory holds no `.tif`.
pub fn write_slope_preview(data_dir: &Path, output: &Path) -> Result<Option<PathBuf>> {
    let Some(tif_path) = find_first_tif(data_dir)? else {
        info!("No .tif files found in {:?}.", data_dir);
        return Ok(None);
    };

    let dem = read_elevation(&tif_path)?;
    let png = render_slope_preview(&dem)?;
    fs::write(output, png)?;

    info!("Slope preview of {:?} saved: {:?}", tif_path, output);
    Ok(Some(tif_path))
}
