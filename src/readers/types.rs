use std::fmt;

use thiserror::Error;

use crate::raster::{BandGrid, GeoTransform, Grid, GridError};

pub trait DataReader {
    fn read_data(&self) -> Result<RasterData, ReadError>;
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("GeoTIFF error in {path}: {message}")]
    GeoTiff { path: String, message: String },
    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
    #[error("unsupported raster file type: {0}")]
    UnknownFileType(String),
    #[error("{0} can only be read with the `gdal` feature enabled")]
    NeedsGdal(String),
    #[error("invalid file pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
    #[error("no file matches {0}")]
    NoMatch(String),
    #[error("{0} carries no georeferencing")]
    MissingGeoTransform(String),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("invalid GeoJSON in {path}: {message}")]
    GeoJson { path: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    GeoTiff,
    Jpeg2000,
}

/// First band of a raster file as read from disk.
#[derive(Debug, Clone)]
pub struct RasterData {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<f64>,
    pub transform: Option<GeoTransform>,
    pub nodata: Option<f64>,
    pub crs: Option<String>,
}

impl RasterData {
    /// Georeferenced grid where nodata and NaN samples become `None`.
    pub fn into_band_grid(self) -> Result<BandGrid, ReadError> {
        let transform = self
            .transform
            .ok_or_else(|| ReadError::MissingGeoTransform(self.path.clone()))?;
        let nodata = self.nodata;

        let samples = self
            .buffer
            .into_iter()
            .map(|v| {
                let is_nodata = nodata.is_some_and(|nd| v == nd || (nd.is_nan() && v.is_nan()));
                (!is_nodata && !v.is_nan()).then_some(v)
            })
            .collect();

        let grid = Grid::from_shape_vec(
            self.height as usize,
            self.width as usize,
            samples,
            transform,
        )?;
        Ok(grid.with_crs(self.crs))
    }
}

impl fmt::Display for RasterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.buffer.iter().filter(|v| {
            !v.is_nan() && self.nodata.is_none_or(|nd| **v != nd)
        });
        let (min, max) = valid.fold((f64::NAN, f64::NAN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        write!(
            f,
            "{}: {}x{}, min {}, max {}, nodata {:?}, crs {}",
            self.path,
            self.width,
            self.height,
            min,
            max,
            self.nodata,
            self.crs.as_deref().unwrap_or("unknown"),
        )
    }
}
