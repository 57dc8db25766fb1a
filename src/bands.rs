use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Visible bands used by the log-ratio depth estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    Blue,
    Green,
    Red,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown band name: {0} (expected blue/B02, green/B03 or red/B04)")]
pub struct BandParseError(pub String);

impl Band {
    pub const ALL: [Band; 3] = [Band::Blue, Band::Green, Band::Red];

    /// Sentinel-2 MSI band identifier (10 m L2A product).
    pub fn sentinel2_id(&self) -> &'static str {
        match self {
            Band::Blue => "B02",
            Band::Green => "B03",
            Band::Red => "B04",
        }
    }

    /// Sentinel-2A central wavelength in nm.
    pub fn wavelength(&self) -> u32 {
        match self {
            Band::Blue => 490,
            Band::Green => 560,
            Band::Red => 665,
        }
    }
}

impl FromStr for Band {
    type Err = BandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" | "b02" | "b2" => Ok(Band::Blue),
            "green" | "b03" | "b3" => Ok(Band::Green),
            "red" | "b04" | "b4" => Ok(Band::Red),
            _ => Err(BandParseError(s.to_string())),
        }
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::Blue => write!(f, "blue"),
            Band::Green => write!(f, "green"),
            Band::Red => write!(f, "red"),
        }
    }
}
