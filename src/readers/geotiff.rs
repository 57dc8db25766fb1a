use std::fs::File;
use std::io::{BufReader, Read, Seek};

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::{DataReader, RasterData, ReadError};
use crate::raster::GeoTransform;

pub(crate) const MODEL_PIXEL_SCALE: u16 = 33550;
pub(crate) const MODEL_TIEPOINT: u16 = 33922;
pub(crate) const GEO_KEY_DIRECTORY: u16 = 34735;
pub(crate) const GDAL_NODATA: u16 = 42113;

const GEOGRAPHIC_TYPE_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_KEY: u32 = 3072;

/// Tag for a GeoTIFF code, named when the `tiff` crate knows it.
pub(crate) fn geo_tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Reads the first sample plane of a (Geo)TIFF with the pure-Rust decoder.
pub struct GeoTiffReader {
    pub file_name: String,
}

impl GeoTiffReader {
    fn error(&self, message: impl std::fmt::Display) -> ReadError {
        ReadError::GeoTiff {
            path: self.file_name.clone(),
            message: message.to_string(),
        }
    }
}

impl DataReader for GeoTiffReader {
    fn read_data(&self) -> Result<RasterData, ReadError> {
        let file = File::open(&self.file_name).map_err(|source| ReadError::Io {
            path: self.file_name.clone(),
            source,
        })?;

        let mut decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| self.error(format!("Failed to decode TIFF: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| self.error(format!("Failed to get dimensions: {}", e)))?;

        let buffer: Vec<f64> = match decoder
            .read_image()
            .map_err(|e| self.error(format!("Failed to read image: {}", e)))?
        {
            DecodingResult::U8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::U32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I8(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I16(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::I32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F32(data) => data.into_iter().map(f64::from).collect(),
            DecodingResult::F64(data) => data,
            _ => return Err(self.error("Unsupported pixel format")),
        };

        // Multi-sample images interleave planes; keep the first one
        let pixels = width as usize * height as usize;
        let buffer = if buffer.len() > pixels && pixels > 0 && buffer.len() % pixels == 0 {
            let samples = buffer.len() / pixels;
            buffer.into_iter().step_by(samples).collect()
        } else {
            buffer
        };

        Ok(RasterData {
            path: self.file_name.clone(),
            width,
            height,
            buffer,
            transform: read_geotransform(&mut decoder),
            nodata: read_nodata(&mut decoder),
            crs: read_crs(&mut decoder),
        })
    }
}

/// ModelPixelScale + ModelTiepoint, north-up only.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(geo_tag(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(geo_tag(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(geo_tag(GDAL_NODATA)).ok()?;
    text.trim_end_matches('\0').trim().parse::<f64>().ok()
}

/// EPSG code from the GeoKeyDirectory, projected CRS first.
fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<String> {
    let keys = decoder.get_tag_u32_vec(geo_tag(GEO_KEY_DIRECTORY)).ok()?;
    epsg_from_geokeys(&keys).map(|code| format!("EPSG:{}", code))
}

pub(crate) fn epsg_from_geokeys(keys: &[u32]) -> Option<u32> {
    // Header: [version, revision, minor, count], then (id, location, count, value)
    let count = *keys.get(3)? as usize;
    let entries: Vec<&[u32]> = keys[4..]
        .chunks_exact(4)
        .take(count)
        .collect();

    let lookup = |key: u32| {
        entries
            .iter()
            .find(|e| e[0] == key && e[1] == 0 && e[3] > 0 && e[3] != 32767)
            .map(|e| e[3])
    };

    lookup(PROJECTED_CS_TYPE_KEY).or_else(|| lookup(GEOGRAPHIC_TYPE_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg_from_geokeys() {
        let projected = [1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 32617];
        assert_eq!(epsg_from_geokeys(&projected), Some(32617));

        let geographic = [1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326];
        assert_eq!(epsg_from_geokeys(&geographic), Some(4326));

        let user_defined = [1, 1, 0, 1, 3072, 0, 1, 32767];
        assert_eq!(epsg_from_geokeys(&user_defined), None);

        assert_eq!(epsg_from_geokeys(&[1, 1]), None);
    }

    #[test]
    fn test_missing_file() {
        let reader = GeoTiffReader {
            file_name: "/nonexistent/B03.tif".into(),
        };
        assert!(matches!(reader.read_data(), Err(ReadError::Io { .. })));
    }
}
