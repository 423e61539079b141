use palette::{Hsl, IntoColor, Mix, Srgb};

use crate::config::ColorMapName;

/// 8-bit sRGB colour used by every figure primitive.
pub type Rgb = Srgb<u8>;

pub const WHITE: Rgb = Srgb::new(255, 255, 255);
pub const BLACK: Rgb = Srgb::new(0, 0, 0);
pub const GRAY: Rgb = Srgb::new(128, 128, 128);
pub const LIGHT_GRAY: Rgb = Srgb::new(0xcc, 0xcc, 0xcc);
pub const DARK_GRAY: Rgb = Srgb::new(0x40, 0x40, 0x40);

// ---------------------------------------------------------------------------
// Categorical palettes
// ---------------------------------------------------------------------------

/// Crop colours of the polar inhibition chart.
pub const CROP_COLORS: [Rgb; 6] = [
    Srgb::new(0x4c, 0x72, 0xb0),
    Srgb::new(0x55, 0xa8, 0x68),
    Srgb::new(0xc4, 0x4e, 0x52),
    Srgb::new(0x81, 0x72, 0xb3),
    Srgb::new(0xcc, 0xb9, 0x74),
    Srgb::new(0x64, 0xb5, 0xcd),
];

/// Series colours for radar and kinetics charts.
pub const SERIES_COLORS: [Rgb; 6] = [
    Srgb::new(0x1f, 0x77, 0xb4),
    Srgb::new(0xff, 0x7f, 0x0e),
    Srgb::new(0x2c, 0xa0, 0x2c),
    Srgb::new(0xd6, 0x27, 0x28),
    Srgb::new(0x94, 0x67, 0xbd),
    Srgb::new(0x8c, 0x56, 0x4b),
];

/// Reaction-path colours of the energy profile.
pub const PATH_COLORS: [Rgb; 6] = [
    Srgb::new(0xd6, 0x27, 0x28),
    Srgb::new(0x1f, 0x77, 0xb4),
    Srgb::new(0x2c, 0xa0, 0x2c),
    Srgb::new(0xff, 0x7f, 0x0e),
    Srgb::new(0x94, 0x67, 0xbd),
    Srgb::new(0x8c, 0x56, 0x4b),
];

/// Gray mold (blue) and head blight (red) bars.
pub const FUNGICIDE_COLORS: [Rgb; 2] = [Srgb::new(0x4a, 0x90, 0xc0), Srgb::new(0xd9, 0x53, 0x4f)];

/// Colour `i` of a palette, wrapping around.
pub fn cycle(palette: &[Rgb], i: usize) -> Rgb {
    palette[i % palette.len()]
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, lightness: f32) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, lightness);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

/// `#rrggbb` form used in SVG attributes.
pub fn to_hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Continuous colour maps
// ---------------------------------------------------------------------------

/// A piecewise-linear gradient over evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    pub name: ColorMapName,
    stops: Vec<Srgb<f32>>,
}

impl ColorMap {
    pub fn new(name: ColorMapName) -> Self {
        let stops: &[Rgb] = match name {
            ColorMapName::AcademicRed => &[
                Srgb::new(0xff, 0xe5, 0xe5),
                Srgb::new(0xff, 0xcc, 0xcc),
                Srgb::new(0xfc, 0xbb, 0xa1),
                Srgb::new(0xfb, 0x6a, 0x4a),
                Srgb::new(0xde, 0x2d, 0x26),
                Srgb::new(0xa5, 0x0f, 0x15),
            ],
            ColorMapName::Coolwarm => &[
                Srgb::new(0x3b, 0x4c, 0xc0),
                Srgb::new(0x7b, 0x9f, 0xf9),
                Srgb::new(0xc0, 0xd4, 0xf5),
                Srgb::new(0xdd, 0xdc, 0xdc),
                Srgb::new(0xf2, 0xcb, 0xb7),
                Srgb::new(0xee, 0x84, 0x68),
                Srgb::new(0xb4, 0x04, 0x26),
            ],
            ColorMapName::Viridis => &[
                Srgb::new(0x44, 0x01, 0x54),
                Srgb::new(0x48, 0x28, 0x78),
                Srgb::new(0x3e, 0x49, 0x89),
                Srgb::new(0x31, 0x68, 0x8e),
                Srgb::new(0x26, 0x82, 0x8e),
                Srgb::new(0x1f, 0x9e, 0x89),
                Srgb::new(0x35, 0xb7, 0x79),
                Srgb::new(0x6e, 0xce, 0x58),
                Srgb::new(0xb5, 0xde, 0x2b),
                Srgb::new(0xfd, 0xe7, 0x25),
            ],
            ColorMapName::YlOrRd => &[
                Srgb::new(0xff, 0xff, 0xcc),
                Srgb::new(0xff, 0xed, 0xa0),
                Srgb::new(0xfe, 0xd9, 0x76),
                Srgb::new(0xfe, 0xb2, 0x4c),
                Srgb::new(0xfd, 0x8d, 0x3c),
                Srgb::new(0xfc, 0x4e, 0x2a),
                Srgb::new(0xe3, 0x1a, 0x1c),
                Srgb::new(0xbd, 0x00, 0x26),
                Srgb::new(0x80, 0x00, 0x26),
            ],
        };
        ColorMap {
            name,
            stops: stops.iter().map(|c| c.into_format()).collect(),
        }
    }

    /// Colour at position `t` in `[0, 1]`; out-of-range values are clipped.
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let last = self.stops.len() - 1;
        let scaled = t * last as f64;
        let i = (scaled.floor() as usize).min(last.saturating_sub(1));
        let frac = (scaled - i as f64) as f32;
        let a = self.stops[i];
        let b = self.stops[(i + 1).min(last)];
        a.mix(b, frac).into_format()
    }

    /// Colour of `value` on a `[min, max]` scale.
    pub fn scaled(&self, value: f64, min: f64, max: f64) -> Rgb {
        let span = max - min;
        if span.abs() < f64::EPSILON {
            return self.at(0.5);
        }
        self.at((value - min) / span)
    }
}
