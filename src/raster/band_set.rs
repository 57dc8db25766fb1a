use std::collections::BTreeMap;

use thiserror::Error;

use crate::bands::Band;
use crate::raster::Grid;

/// Reflectance samples of one band; `None` marks nodata.
pub type BandGrid = Grid<Option<f64>>;

#[derive(Debug, Error, PartialEq)]
pub enum BandSetError {
    #[error("band {band} is not co-registered with the scene: {reason}")]
    Misalignment { band: Band, reason: String },
    #[error("band {0} was supplied twice")]
    Duplicate(Band),
}

/// Co-registered bands of a single scene, keyed by band.
///
/// Every inserted grid must match the dimensions, geotransform and CRS of the
/// bands already present.
#[derive(Debug, Clone, Default)]
pub struct BandSet {
    bands: BTreeMap<Band, BandGrid>,
}

impl BandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, band: Band, grid: BandGrid) -> Result<(), BandSetError> {
        if self.bands.contains_key(&band) {
            return Err(BandSetError::Duplicate(band));
        }

        if let Some(reason) = self
            .reference()
            .and_then(|reference| reference.alignment_mismatch(&grid))
        {
            return Err(BandSetError::Misalignment { band, reason });
        }

        self.bands.insert(band, grid);
        Ok(())
    }

    pub fn with_band(mut self, band: Band, grid: BandGrid) -> Result<Self, BandSetError> {
        self.insert(band, grid)?;
        Ok(self)
    }

    pub fn get(&self, band: Band) -> Option<&BandGrid> {
        self.bands.get(&band)
    }

    pub fn contains(&self, band: Band) -> bool {
        self.bands.contains_key(&band)
    }

    /// Any band; all share the same georeferencing.
    pub fn reference(&self) -> Option<&BandGrid> {
        self.bands.values().next()
    }

    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.bands.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
