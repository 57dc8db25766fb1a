use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy)]
struct ColorStop {
    t: f64,
    color: Rgb,
}

impl ColorStop {
    const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

// Yellow (shallow) through teal to deep blue, as on the published map
const BATHYMETRY_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 0xf7, 0xf7, 0xb3),
    ColorStop::new(0.25, 0xa8, 0xdd, 0xb5),
    ColorStop::new(0.50, 0x43, 0xa2, 0xca),
    ColorStop::new(0.75, 0x08, 0x68, 0xac),
    ColorStop::new(1.00, 0x08, 0x40, 0x81),
];

const VIRIDIS_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 68, 1, 84),
    ColorStop::new(0.25, 59, 82, 139),
    ColorStop::new(0.50, 33, 145, 140),
    ColorStop::new(0.75, 94, 201, 98),
    ColorStop::new(1.00, 253, 231, 37),
];

const BLUES_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 247, 251, 255),
    ColorStop::new(0.25, 198, 219, 239),
    ColorStop::new(0.50, 107, 174, 214),
    ColorStop::new(0.75, 33, 113, 181),
    ColorStop::new(1.00, 8, 48, 107),
];

const YLGNBU_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 255, 255, 217),
    ColorStop::new(0.25, 199, 233, 180),
    ColorStop::new(0.50, 65, 182, 196),
    ColorStop::new(0.75, 34, 94, 168),
    ColorStop::new(1.00, 8, 29, 88),
];

const OCEAN_STOPS: &[ColorStop] = &[
    ColorStop::new(0.000, 0, 128, 0),
    ColorStop::new(0.333, 0, 0, 85),
    ColorStop::new(0.667, 0, 128, 170),
    ColorStop::new(1.000, 255, 255, 255),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Palette {
    Bathymetry,
    Viridis,
    Blues,
    YlGnBu,
    Ocean,
}

impl Palette {
    pub const ALL: [Palette; 5] = [
        Palette::Bathymetry,
        Palette::Viridis,
        Palette::Blues,
        Palette::YlGnBu,
        Palette::Ocean,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Bathymetry => "bathymetry",
            Palette::Viridis => "viridis",
            Palette::Blues => "blues",
            Palette::YlGnBu => "ylgnbu",
            Palette::Ocean => "ocean",
        }
    }

    fn stops(&self) -> &'static [ColorStop] {
        match self {
            Palette::Bathymetry => BATHYMETRY_STOPS,
            Palette::Viridis => VIRIDIS_STOPS,
            Palette::Blues => BLUES_STOPS,
            Palette::YlGnBu => YLGNBU_STOPS,
            Palette::Ocean => OCEAN_STOPS,
        }
    }
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    let (first, last) = (stops[0], stops[stops.len() - 1]);
    if t <= first.t {
        return first.color;
    }
    if t >= last.t {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.t {
            let local = (t - lo.t) / (hi.t - lo.t);
            return Rgb::new(
                lerp(lo.color.r, hi.color.r, local),
                lerp(lo.color.g, hi.color.g, local),
                lerp(lo.color.b, hi.color.b, local),
            );
        }
    }
    last.color
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown colormap '{0}' (expected bathymetry, viridis, blues, ylgnbu or ocean, optionally with _r)")]
pub struct ColormapParseError(pub String);

/// A palette, optionally reversed (`_r` suffix).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct Colormap {
    pub palette: Palette,
    pub reversed: bool,
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            palette: Palette::Bathymetry,
            reversed: false,
        }
    }
}

impl Colormap {
    /// Colour at `t` in [0, 1]; values outside are clamped, NaN maps to 0.
    pub fn evaluate(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let t = if self.reversed { 1.0 - t } else { t };
        multi_stop(self.palette.stops(), t)
    }
}

impl FromStr for Colormap {
    type Err = ColormapParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let (name, reversed) = match lower.strip_suffix("_r") {
            Some(name) => (name, true),
            None => (lower.as_str(), false),
        };

        let palette = Palette::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ColormapParseError(s.to_string()))?;

        Ok(Colormap { palette, reversed })
    }
}

impl TryFrom<String> for Colormap {
    type Error = ColormapParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.palette.name(), if self.reversed { "_r" } else { "" })
    }
}
