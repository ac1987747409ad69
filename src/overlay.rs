//! DTM to web overlay: reproject to WGS84 lon/lat, colorize, encode PNG.

use gdal::raster::Buffer;
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager};
use std::path::Path;
use tracing::{debug, info};

use crate::colormap::{colorize, normalize, Colormap};
use crate::error::{DtmError, Result};
use crate::model::{Bounds, ElevationGrid};
use crate::raster::read_elevation;
use crate::render::encode_png;

const WGS84_EPSG: u32 = 4326;
const DENSIFY_POINTS: i32 = 21;

/// Output grid of the web overlay, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
        }
    }
}

/// A rendered overlay ready to be served.
#[derive(Debug, Clone)]
pub struct DtmOverlay {
    pub png: Vec<u8>,
    /// Lon/lat extent of the image.
    pub bounds: Bounds,
    /// `(lat, lon)`
    pub center: (f64, f64),
}

pub fn prepare_overlay(path: &Path, config: &OverlayConfig) -> Result<DtmOverlay> {
    info!("Preparing DTM overlay. Looking for DTM at: {:?}", path);
    if !path.exists() {
        return Err(DtmError::NotFound(path.to_path_buf()));
    }

    let grid = read_elevation(path)?;
    let reprojected = reproject_to_wgs84(&grid, config)?;
    let png = render_overlay(&reprojected)?;
    let bounds = reprojected.bounds();

    info!("DTM overlay prepared. bounds: {}", bounds);

    Ok(DtmOverlay {
        png,
        center: bounds.center(),
        bounds,
    })
}

/// Warps `grid` onto a `width x height` lon/lat grid covering its extent.
/// Nodata is masked to NaN before resampling.
pub fn reproject_to_wgs84(grid: &ElevationGrid, config: &OverlayConfig) -> Result<ElevationGrid> {
    if config.width == 0 || config.height == 0 {
        return Err(DtmError::InvalidConfig(format!(
            "overlay size must be positive, got {} x {}",
            config.width, config.height
        )));
    }
    if !grid.has_crs() {
        return Err(DtmError::MissingCrs(
            "cannot reproject a raster without CRS".to_string(),
        ));
    }

    let driver = DriverManager::get_driver_by_name("MEM")?;
    let (rows, cols) = grid.shape();

    let mut src = driver.create_with_band_type::<f64, _>("", cols, rows, 1)?;
    src.set_geo_transform(&grid.geo_transform)?;
    src.set_projection(&grid.projection)?;
    {
        let mut band = src.rasterband(1)?;
        band.set_no_data_value(Some(f64::NAN))?;
        let mut buffer = Buffer::new((cols, rows), grid.masked());
        band.write((0, 0), (cols, rows), &mut buffer)?;
    }

    let wgs84_wkt = SpatialRef::from_epsg(WGS84_EPSG)?.to_wkt()?;
    let (width, height) = (config.width, config.height);
    let mut dst = driver.create_with_band_type::<f64, _>("", width, height, 1)?;
    // datasets keep lon/lat axis order, so use their SRS for the extent too
    dst.set_projection(&wgs84_wkt)?;

    let [west, south, east, north] = lonlat_extent(&src, &dst, &grid.bounds())?;
    debug!(
        "Reprojected extent: west={} south={} east={} north={}",
        west, south, east, north
    );

    let geo_transform = [
        west,
        (east - west) / width as f64,
        0.0,
        north,
        0.0,
        -(north - south) / height as f64,
    ];
    dst.set_geo_transform(&geo_transform)?;
    {
        let mut band = dst.rasterband(1)?;
        band.set_no_data_value(Some(f64::NAN))?;
        band.fill(f64::NAN, None)?;
    }

    gdal::raster::reproject(&src, &dst)?;

    let band = dst.rasterband(1)?;
    let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;
    let (_, values) = buffer.into_shape_and_vec();

    ElevationGrid::new(
        height,
        width,
        geo_transform,
        wgs84_wkt,
        Some(f64::NAN),
        values,
    )
}

fn lonlat_extent(src: &Dataset, dst: &Dataset, bounds: &Bounds) -> Result<[f64; 4]> {
    let src_srs = src.spatial_ref()?;
    let dst_srs = dst.spatial_ref()?;
    let transform = CoordTransform::new(&src_srs, &dst_srs)?;
    let extent = transform.transform_bounds(
        &[bounds.west, bounds.south, bounds.east, bounds.north],
        DENSIFY_POINTS,
    )?;
    Ok(extent)
}

/// Normalized terrain colors, transparent where the grid has no data.
pub fn render_overlay(grid: &ElevationGrid) -> Result<Vec<u8>> {
    let normalized = normalize(&grid.masked());
    let rgba = colorize(&normalized, Colormap::Terrain);
    encode_png(&rgba, grid.cols, grid.rows)
}
