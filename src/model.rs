use std::fmt;

use crate::error::{DtmError, Result};

/// Axis-aligned extent in the raster's CRS units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    /// Extent of a `rows x cols` north-up raster; rotation terms are ignored.
    pub fn from_transform(geo_transform: &[f64; 6], rows: usize, cols: usize) -> Self {
        let gt = geo_transform;
        let x0 = gt[0];
        let x1 = gt[0] + gt[1] * cols as f64;
        let y0 = gt[3];
        let y1 = gt[3] + gt[5] * rows as f64;

        Bounds {
            west: x0.min(x1),
            south: y0.min(y1),
            east: x0.max(x1),
            north: y0.max(y1),
        }
    }

    /// Center as `(lat, lon)`, the order Leaflet expects.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// `[[south, west], [north, east]]`
    pub fn to_leaflet(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox(left={:?}, bottom={:?}, right={:?}, top={:?})",
            self.west, self.south, self.east, self.north
        )
    }
}

/// Single-band elevation (or derived) raster held in memory, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    pub rows: usize,
    pub cols: usize,
    pub geo_transform: [f64; 6],
    /// WKT; empty when the source carries no CRS.
    pub projection: String,
    pub nodata: Option<f64>,
    pub values: Vec<f64>,
}

impl ElevationGrid {
    pub fn new(
        rows: usize,
        cols: usize,
        geo_transform: [f64; 6],
        projection: String,
        nodata: Option<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(DtmError::ShapeMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }

        Ok(Self {
            rows,
            cols,
            geo_transform,
            projection,
            nodata,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Absolute pixel size `(res_x, res_y)`.
    pub fn resolution(&self) -> (f64, f64) {
        (self.geo_transform[1].abs(), self.geo_transform[5].abs())
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_transform(&self.geo_transform, self.rows, self.cols)
    }

    pub fn has_crs(&self) -> bool {
        !self.projection.trim().is_empty()
    }

    pub fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || self.nodata == Some(value)
    }

    /// Values with nodata replaced by NaN.
    pub fn masked(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|&v| if self.is_nodata(v) { f64::NAN } else { v })
            .collect()
    }

    pub fn valid_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for &value in &self.values {
            if self.is_nodata(value) || !value.is_finite() {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
        }

        (min <= max).then_some((min, max))
    }

    /// Same georeferencing, new pixel values.
    pub fn with_values(&self, values: Vec<f64>, nodata: Option<f64>) -> Result<Self> {
        Self::new(
            self.rows,
            self.cols,
            self.geo_transform,
            self.projection.clone(),
            nodata,
            values,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: Vec<f64>, nodata: Option<f64>) -> ElevationGrid {
        ElevationGrid::new(
            2,
            3,
            [-74.2, 0.5, 0.0, 46.1, 0.0, -0.25],
            String::new(),
            nodata,
            values,
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let result = ElevationGrid::new(2, 2, [0.0; 6], String::new(), None, vec![1.0; 3]);
        assert!(matches!(
            result,
            Err(DtmError::ShapeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_bounds_and_center() {
        let g = grid(vec![0.0; 6], None);
        let b = g.bounds();

        assert_eq!(b.west, -74.2);
        assert_eq!(b.north, 46.1);
        assert!((b.east - (-72.7)).abs() < 1e-12);
        assert!((b.south - 45.6).abs() < 1e-12);

        let (lat, lon) = b.center();
        assert!((lat - 45.85).abs() < 1e-12);
        assert!((lon - (-73.45)).abs() < 1e-12);

        assert_eq!(b.to_leaflet(), [[b.south, b.west], [b.north, b.east]]);
        assert_eq!(g.resolution(), (0.5, 0.25));
    }

    #[test]
    fn test_bounds_display_keeps_float_form() {
        let b = Bounds {
            west: 570000.0,
            south: 5097000.0,
            east: 571000.5,
            north: 5098000.0,
        };
        assert_eq!(
            b.to_string(),
            "BoundingBox(left=570000.0, bottom=5097000.0, right=571000.5, top=5098000.0)"
        );
    }

    #[test]
    fn test_masking_and_range() {
        let g = grid(vec![-9999.0, 10.0, 12.0, f64::NAN, 8.0, -9999.0], Some(-9999.0));

        let masked = g.masked();
        assert!(masked[0].is_nan());
        assert!(masked[3].is_nan());
        assert!(masked[5].is_nan());
        assert_eq!(masked[1], 10.0);

        assert_eq!(g.valid_range(), Some((8.0, 12.0)));
    }

    #[test]
    fn test_all_nodata_has_no_range() {
        let g = grid(vec![-9999.0; 6], Some(-9999.0));
        assert_eq!(g.valid_range(), None);
    }
}
