//! GeoTIFF and JSON outputs

pub mod geotiff;
pub mod json;

pub use geotiff::{encode_depth_geotiff, write_depth_geotiff};
pub use json::write_json;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TIFF encoding failed: {0}")]
    Tiff(String),
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
