pub mod clip;
pub mod polygon;

pub use clip::{ClipError, clip_to_aoi};
pub use polygon::{AoiPolygon, BoundaryRule, PolygonError};
