//! Slope (in degrees) from elevation grids.
//!
//! Two estimators are provided:
//!
//! - [`gradient_slope`]: central differences in the interior and one-sided
//!   differences on the borders. Nodata is masked *before* differencing, so
//!   NaN spreads to the immediate neighbours of every void pixel.
//! - [`sobel_slope`]: 3x3 Sobel derivatives with reflected borders, computed on
//!   the raw elevations; the elevation mask is applied to the result afterwards.
//!
//! Both return a grid with the input's georeferencing and NaN as nodata.

use rayon::prelude::*;

use crate::error::{DtmError, Result};
use crate::model::ElevationGrid;
use crate::raster::NodataRule;

/// Slope from the numerical gradient, spacing `res_y` along rows and `res_x`
/// along columns.
pub fn gradient_slope(grid: &ElevationGrid) -> Result<ElevationGrid> {
    let (rows, cols) = grid.shape();
    if rows < 2 || cols < 2 {
        return Err(DtmError::TooSmall { rows, cols });
    }

    let (res_x, res_y) = grid.resolution();
    let z = grid.masked();

    let mut slope = vec![0.0f64; rows * cols];
    slope
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(r, out_row)| {
            for (c, out) in out_row.iter_mut().enumerate() {
                let dz_dx = difference(&z, cols, r, c, Axis::Column, cols, res_x);
                let dz_dy = difference(&z, cols, r, c, Axis::Row, rows, res_y);
                *out = (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan().to_degrees();
            }
        });

    grid.with_values(slope, Some(f64::NAN))
}

/// Slope from Sobel derivatives, scaled by `8 * pixel_size` where the pixel
/// size is the x resolution (square pixels assumed).
pub fn sobel_slope(grid: &ElevationGrid, rule: NodataRule) -> Result<ElevationGrid> {
    let (rows, cols) = grid.shape();
    if rows == 0 || cols == 0 {
        return Err(DtmError::TooSmall { rows, cols });
    }

    let (pixel_size, _) = grid.resolution();
    let scale = 8.0 * pixel_size;
    let z = &grid.values;

    let mut slope = vec![0.0f64; rows * cols];
    slope
        .par_chunks_mut(cols)
        .enumerate()
        .for_each(|(r, out_row)| {
            for (c, out) in out_row.iter_mut().enumerate() {
                let value = z[r * cols + c];
                if rule.matches(value) {
                    *out = f64::NAN;
                    continue;
                }
                let (gx, gy) = sobel_at(z, rows, cols, r, c);
                let dx = gx / scale;
                let dy = gy / scale;
                *out = dx.hypot(dy).atan().to_degrees();
            }
        });

    grid.with_values(slope, Some(f64::NAN))
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Row,
    Column,
}

/// First derivative along one axis; `len` is the extent of that axis.
fn difference(
    z: &[f64],
    cols: usize,
    r: usize,
    c: usize,
    axis: Axis,
    len: usize,
    spacing: f64,
) -> f64 {
    let at = |i: usize| match axis {
        Axis::Row => z[i * cols + c],
        Axis::Column => z[r * cols + i],
    };
    let i = match axis {
        Axis::Row => r,
        Axis::Column => c,
    };

    if i == 0 {
        (at(1) - at(0)) / spacing
    } else if i == len - 1 {
        (at(i) - at(i - 1)) / spacing
    } else {
        (at(i + 1) - at(i - 1)) / (2.0 * spacing)
    }
}

/// Half-sample symmetric reflection: `d c b a | a b c d | d c b a`.
fn reflect(i: isize, len: usize) -> usize {
    let n = len as isize;
    if i < 0 {
        (-i - 1).min(n - 1) as usize
    } else if i >= n {
        (2 * n - i - 1).max(0) as usize
    } else {
        i as usize
    }
}

fn sobel_at(z: &[f64], rows: usize, cols: usize, r: usize, c: usize) -> (f64, f64) {
    const SMOOTH: [f64; 3] = [1.0, 2.0, 1.0];

    let at = |dr: isize, dc: isize| {
        let rr = reflect(r as isize + dr, rows);
        let cc = reflect(c as isize + dc, cols);
        z[rr * cols + cc]
    };

    let mut gx = 0.0;
    let mut gy = 0.0;
    for (k, w) in SMOOTH.iter().enumerate() {
        let d = k as isize - 1;
        gx += w * (at(d, 1) - at(d, -1));
        gy += w * (at(1, d) - at(-1, d));
    }

    (gx, gy)
}
