use gdal::Dataset;

use super::{DataReader, RasterData, ReadError};
use crate::raster::GeoTransform;

/// Reads band 1 of any GDAL-supported raster, e.g. Sentinel-2 JPEG2000 tiles.
pub struct GdalReader {
    pub file_name: String,
}

impl DataReader for GdalReader {
    fn read_data(&self) -> Result<RasterData, ReadError> {
        let dataset = Dataset::open(&self.file_name)?;
        let (width, height) = dataset.raster_size();

        let band = dataset.rasterband(1)?;
        let buffer = band.read_as::<f64>((0, 0), (width, height), (width, height), None)?;
        let scale = band.scale().unwrap_or(1.0);
        let offset = band.offset().unwrap_or(0.0);
        let nodata = band.no_data_value();

        let samples = buffer
            .data()
            .iter()
            .map(|&v| {
                if nodata.is_some_and(|nd| v == nd) {
                    v
                } else {
                    v * scale + offset
                }
            })
            .collect();

        let crs = dataset
            .spatial_ref()
            .ok()
            .and_then(|srs| srs.auth_code().ok())
            .map(|code| format!("EPSG:{}", code));

        Ok(RasterData {
            path: self.file_name.clone(),
            width: width as u32,
            height: height as u32,
            buffer: samples,
            transform: dataset.geo_transform().ok().map(GeoTransform::from_gdal),
            nodata,
            crs,
        })
    }
}
