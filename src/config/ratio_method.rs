use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bands::Band;

/// Band pair of the log-ratio depth estimate, `ln(numerator) / ln(denominator)`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatioMethod {
    #[default]
    #[serde(rename = "green_red")]
    GreenRed,
    #[serde(rename = "blue_green")]
    BlueGreen,
}

impl RatioMethod {
    /// (numerator, denominator)
    pub fn bands(&self) -> (Band, Band) {
        match self {
            RatioMethod::GreenRed => (Band::Green, Band::Red),
            RatioMethod::BlueGreen => (Band::Blue, Band::Green),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct RatioMethodParseError(String);

impl fmt::Display for RatioMethodParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid ratio method '{}' (expected green_red or blue_green)",
            self.0
        )
    }
}

impl std::error::Error for RatioMethodParseError {}

impl FromStr for RatioMethod {
    type Err = RatioMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "green_red" => Ok(RatioMethod::GreenRed),
            "blue_green" => Ok(RatioMethod::BlueGreen),
            other => Err(RatioMethodParseError(other.to_string())),
        }
    }
}

impl fmt::Display for RatioMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RatioMethod::GreenRed => write!(f, "green_red"),
            RatioMethod::BlueGreen => write!(f, "blue_green"),
        }
    }
}
