//! Georeferenced grids and the co-registered band set of a scene.

pub mod band_set;
pub mod geotransform;
pub mod grid;

pub use band_set::{BandGrid, BandSet, BandSetError};
pub use geotransform::GeoTransform;
pub use grid::{Grid, GridError};
