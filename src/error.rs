use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DtmError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Raster of {rows} x {cols} pixels is too small for a numerical gradient")]
    TooSmall { rows: usize, cols: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Raster has no coordinate reference system: {0}")]
    MissingCrs(String),

    #[error("DTM not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Archive entry escapes the extraction directory: {0}")]
    UnsafeEntry(String),
}

pub type Result<T> = std::result::Result<T, DtmError>;
