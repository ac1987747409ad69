//! Continuous colormaps and NaN-aware normalization for raster previews.

/// A color stop: position in [0, 1] mapped to an RGB color with channels in [0, 1].
#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    rgb: [f64; 3],
}

const fn stop(t: f64, r: f64, g: f64, b: f64) -> ColorStop {
    ColorStop { t, rgb: [r, g, b] }
}

/// Blue sea, green lowland, yellow, brown, white peaks.
const TERRAIN_STOPS: &[ColorStop] = &[
    stop(0.00, 0.2, 0.2, 0.6),
    stop(0.15, 0.0, 0.6, 1.0),
    stop(0.25, 0.0, 0.8, 0.4),
    stop(0.50, 1.0, 1.0, 0.6),
    stop(0.75, 0.5, 0.36, 0.33),
    stop(1.00, 1.0, 1.0, 1.0),
];

const INFERNO_STOPS: &[ColorStop] = &[
    stop(0.0, 0.0000, 0.0000, 0.0157),
    stop(0.1, 0.0863, 0.0431, 0.2235),
    stop(0.2, 0.2588, 0.0392, 0.4078),
    stop(0.3, 0.4157, 0.0902, 0.4314),
    stop(0.4, 0.5765, 0.1490, 0.4039),
    stop(0.5, 0.7373, 0.2157, 0.3294),
    stop(0.6, 0.8667, 0.3176, 0.2275),
    stop(0.7, 0.9529, 0.4706, 0.0980),
    stop(0.8, 0.9882, 0.6471, 0.0392),
    stop(0.9, 0.9647, 0.8431, 0.2745),
    stop(1.0, 0.9882, 1.0000, 0.6431),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Elevation
    Terrain,
    /// Slope and other magnitudes
    Inferno,
}

impl Colormap {
    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Colormap::Terrain => TERRAIN_STOPS,
            Colormap::Inferno => INFERNO_STOPS,
        }
    }

    /// Opaque RGBA at `t`, clamped to [0, 1].
    pub fn evaluate(&self, t: f64) -> [u8; 4] {
        let [r, g, b] = interpolate(self.stops(), t);
        [to_channel(r), to_channel(g), to_channel(b), 255]
    }
}

fn interpolate(stops: &[ColorStop], t: f64) -> [f64; 3] {
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if t <= first.t {
        return first.rgb;
    }
    if t >= last.t {
        return last.rgb;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t == hi.t {
            return hi.rgb;
        }
        if t < hi.t {
            let ratio = (t - lo.t) / (hi.t - lo.t);
            return [
                lo.rgb[0] + (hi.rgb[0] - lo.rgb[0]) * ratio,
                lo.rgb[1] + (hi.rgb[1] - lo.rgb[1]) * ratio,
                lo.rgb[2] + (hi.rgb[2] - lo.rgb[2]) * ratio,
            ];
        }
    }
    last.rgb
}

// truncating, like a float-to-uint8 cast of `c * 255`
fn to_channel(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0) as u8
}

/// Rescales to [0, 1] using the NaN-aware min and max. A constant, empty or
/// non-finite range maps every valid value to 0; NaN stays NaN.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (vmin, vmax) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let usable = vmin.is_finite() && vmax.is_finite() && vmax > vmin;

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if usable {
                ((v - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// RGBA pixels for normalized values; NaN becomes fully transparent.
pub fn colorize(normalized: &[f64], colormap: Colormap) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(normalized.len() * 4);
    for &t in normalized {
        if t.is_nan() {
            rgba.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            rgba.extend_from_slice(&colormap.evaluate(t));
        }
    }
    rgba
}
