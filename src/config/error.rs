use thiserror::Error;

use crate::config::ratio_method::RatioMethodParseError;
use crate::render::colormap::ColormapParseError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    RatioMethod(#[from] RatioMethodParseError),
    #[error("{0}")]
    Colormap(#[from] ColormapParseError),
    #[error("at least one scene must be configured")]
    NoScenes,
    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error(
        "threshold_high ({high}) must be lower than threshold_moderate ({moderate}), both finite"
    )]
    ThresholdOrder { moderate: f64, high: f64 },
    #[error("invalid_color alpha {0} cannot be told apart from valid cells")]
    InvalidColor(u8),
}

impl ConfigError {
    pub(crate) fn out_of_range(name: &'static str, requirement: &'static str, value: f64) -> Self {
        ConfigError::OutOfRange {
            name,
            requirement,
            value,
        }
    }
}
