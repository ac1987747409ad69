use gdal::Dataset;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Bounds;
use crate::zip_handler::has_extension;

/// All `.tif` files under `dir`, recursively, sorted by path.
pub fn list_tif_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_tifs(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_tifs(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_tifs(&path, files)?;
        } else if has_extension(&path, "tif") {
            files.push(path);
        }
    }
    Ok(())
}

/// Georeferencing summary of one raster file.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub file_name: String,
    /// `AUTH:CODE` when the CRS is identified, WKT otherwise.
    pub crs: Option<String>,
    pub width: usize,
    pub height: usize,
    pub resolution: (f64, f64),
    pub bounds: Bounds,
}

impl RasterInfo {
    pub fn read(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)?;
        let (width, height) = dataset.raster_size();
        let geo_transform = dataset.geo_transform()?;

        let crs = dataset.spatial_ref().ok().and_then(|srs| {
            match (srs.auth_name(), srs.auth_code()) {
                (Ok(name), Ok(code)) => Some(format!("{}:{}", name, code)),
                _ => srs.to_wkt().ok().filter(|wkt| !wkt.is_empty()),
            }
        });

        let bounds = Bounds::from_transform(&geo_transform, height, width);

        Ok(Self {
            file_name: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            crs,
            width,
            height,
            resolution: (geo_transform[1].abs(), geo_transform[5].abs()),
            bounds,
        })
    }
}

impl fmt::Display for RasterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.file_name)?;
        match &self.crs {
            Some(crs) => writeln!(f, "  CRS: {}", crs)?,
            None => writeln!(f, "  CRS: None")?,
        }
        writeln!(f, "  Shape: {} x {}", self.width, self.height)?;
        writeln!(
            f,
            "  Resolution: ({:?}, {:?})",
            self.resolution.0, self.resolution.1
        )?;
        writeln!(f, "  Bounds: {}", self.bounds)?;
        write!(f, "{}", "-".repeat(40))
    }
}
