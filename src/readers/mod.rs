pub mod geojson;
pub mod geotiff;
#[cfg(feature = "gdal")]
pub mod gdal;
pub mod types;
pub mod utils;

pub use geojson::{read_aoi, read_aoi_file};
pub use geotiff::GeoTiffReader;
#[cfg(feature = "gdal")]
pub use gdal::GdalReader;
pub use types::{DataReader, FileType, RasterData, ReadError};
pub use utils::{reader_from_filetype, resolve_path};

use std::path::Path;

use crate::raster::BandGrid;

pub fn create_reader(path: &Path) -> Result<Box<dyn DataReader>, ReadError> {
    let file_name = path.display().to_string();
    match reader_from_filetype(path)? {
        FileType::GeoTiff => Ok(Box::new(GeoTiffReader { file_name })),
        #[cfg(feature = "gdal")]
        FileType::Jpeg2000 => Ok(Box::new(GdalReader { file_name })),
        #[cfg(not(feature = "gdal"))]
        FileType::Jpeg2000 => Err(ReadError::NeedsGdal(file_name)),
    }
}

/// Resolves `pattern`, reads the file and returns its first band.
pub fn read_band(pattern: &str) -> Result<BandGrid, ReadError> {
    let path = resolve_path(pattern)?;
    let data = create_reader(&path)?.read_data()?;
    log::debug!("{}", data);
    data.into_band_grid()
}
