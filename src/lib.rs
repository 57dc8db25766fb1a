//! Relative nearshore bathymetry from Sentinel-2 band ratios, with a
//! gradient-derived flow field and divergence-based rip-current risk zones.

pub mod aoi;
pub mod bands;
pub mod bbox;
pub mod config;
pub mod depth;
pub mod error;
pub mod export;
pub mod flow;
mod maybe_rayon;
pub mod pipeline;
pub mod raster;
pub mod readers;
pub mod render;
pub mod risk;
pub mod utils;
pub mod writers;

pub use config::Config;
pub use error::{PipelineError, Stage};
pub use pipeline::{BatchProcessor, SceneProcessor, run_scene};
