//! Relative depth derived from band log ratios

pub mod estimator;
pub mod statistics;

pub use estimator::{DepthError, DepthEstimator, log_ratio};
pub use statistics::DepthStatistics;

use crate::raster::Grid;

/// Relative depth of one cell.
///
/// Cells whose inputs could not produce a finite ratio are `Invalid` rather
/// than carrying a magic float.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Depth {
    Valid(f64),
    #[default]
    Invalid,
}

impl Depth {
    /// `Valid` only for finite values.
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() {
            Depth::Valid(value)
        } else {
            Depth::Invalid
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Depth::Valid(v) => Some(*v),
            Depth::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Depth::Valid(_))
    }
}

pub type DepthGrid = Grid<Depth>;
