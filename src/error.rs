use std::fmt::Display;

use thiserror::Error;

use crate::aoi::{ClipError, PolygonError};
use crate::bands::BandParseError;
use crate::config::ConfigError;
use crate::depth::DepthError;
use crate::raster::BandSetError;
use crate::readers::ReadError;
use crate::writers::WriteError;

/// Pipeline step an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    BandLoading,
    AoiLoading,
    DepthEstimation,
    AoiClipping,
    Output,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Configuration => "configuration",
            Stage::BandLoading => "band loading",
            Stage::AoiLoading => "AOI loading",
            Stage::DepthEstimation => "depth estimation",
            Stage::AoiClipping => "AOI clipping",
            Stage::Output => "output",
        };
        write!(f, "{}", name)
    }
}

/// Scene-level failure; per-pixel and per-cell conditions never end up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("band loading: {0}")]
    BandName(#[from] BandParseError),
    #[error("band loading: {0}")]
    Read(#[from] ReadError),
    #[error("band loading: {0}")]
    BandSet(#[from] BandSetError),
    #[error("AOI loading: {0}")]
    AoiSource(ReadError),
    #[error("AOI loading: {0}")]
    Polygon(#[from] PolygonError),
    #[error("depth estimation: {0}")]
    Depth(#[from] DepthError),
    #[error("AOI clipping: {0}")]
    Clip(#[from] ClipError),
    #[error("output: {0}")]
    Write(#[from] WriteError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Config(_) => Stage::Configuration,
            PipelineError::BandName(_) | PipelineError::Read(_) | PipelineError::BandSet(_) => {
                Stage::BandLoading
            }
            PipelineError::AoiSource(_) | PipelineError::Polygon(_) => Stage::AoiLoading,
            PipelineError::Depth(_) => Stage::DepthEstimation,
            PipelineError::Clip(_) => Stage::AoiClipping,
            PipelineError::Write(_) => Stage::Output,
        }
    }
}
