use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::Gray32Float;

use super::WriteError;
use crate::depth::DepthGrid;
use crate::readers::geotiff::{
    GDAL_NODATA, GEO_KEY_DIRECTORY, MODEL_PIXEL_SCALE, MODEL_TIEPOINT, geo_tag,
};

fn tiff_error(e: impl std::fmt::Display) -> WriteError {
    WriteError::Tiff(e.to_string())
}

/// GeoKeyDirectory for an `EPSG:n` CRS, or the model/raster type keys alone.
fn geokeys(crs: Option<&str>) -> Vec<u16> {
    let epsg = crs
        .and_then(|c| c.strip_prefix("EPSG:"))
        .and_then(|code| code.parse::<u16>().ok());

    match epsg {
        // Geographic 2D codes live in 4000..5000
        Some(code) if (4000..5000).contains(&code) => vec![
            1, 1, 0, 3, //
            1024, 0, 1, 2, // GTModelTypeGeoKey = geographic
            1025, 0, 1, 1, // GTRasterTypeGeoKey = PixelIsArea
            2048, 0, 1, code,
        ],
        Some(code) => vec![
            1, 1, 0, 3, //
            1024, 0, 1, 1, // GTModelTypeGeoKey = projected
            1025, 0, 1, 1, //
            3072, 0, 1, code,
        ],
        None => vec![1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1],
    }
}

/// Float32 GeoTIFF of the depth grid; invalid cells are written as NaN and
/// flagged through the GDAL nodata tag.
pub fn encode_depth_geotiff<W: Write + Seek>(grid: &DepthGrid, writer: W) -> Result<(), WriteError> {
    let (rows, cols) = grid.shape();
    let data: Vec<f32> = grid
        .data()
        .iter()
        .map(|d| d.value().map_or(f32::NAN, |v| v as f32))
        .collect();

    let mut encoder = TiffEncoder::new(writer).map_err(tiff_error)?;
    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(tiff_error)?;

    let gt = grid.transform();
    if !gt.is_north_up() {
        log::warn!("Rotated geotransform written as north-up pixel scale and tiepoint");
    }

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    let keys = geokeys(grid.crs());

    let directory = image.encoder();
    directory
        .write_tag(geo_tag(MODEL_PIXEL_SCALE), &scale[..])
        .map_err(tiff_error)?;
    directory
        .write_tag(geo_tag(MODEL_TIEPOINT), &tiepoint[..])
        .map_err(tiff_error)?;
    directory
        .write_tag(geo_tag(GEO_KEY_DIRECTORY), keys.as_slice())
        .map_err(tiff_error)?;
    directory
        .write_tag(geo_tag(GDAL_NODATA), "nan")
        .map_err(tiff_error)?;

    image.write_data(&data).map_err(tiff_error)?;
    Ok(())
}

pub fn write_depth_geotiff<P: AsRef<Path>>(grid: &DepthGrid, path: P) -> Result<(), WriteError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| WriteError::Io {
        path: path.display().to_string(),
        source,
    })?;
    encode_depth_geotiff(grid, BufWriter::new(file))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::Depth;
    use crate::raster::{GeoTransform, Grid};
    use crate::readers::{DataReader, GeoTiffReader};
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    #[test]
    fn test_geokeys() {
        assert_eq!(geokeys(Some("EPSG:4326"))[15], 4326);
        assert_eq!(geokeys(Some("EPSG:32617"))[12], 3072);
        assert_eq!(geokeys(None).len(), 12);
        assert_eq!(geokeys(Some("LOCAL_CS")).len(), 12);
    }

    #[test]
    fn test_write_then_read_back() {
        let transform = GeoTransform::new(-81.23, 42.67, 0.0001, -0.0001);
        let grid = Grid::from_shape_vec(
            2,
            3,
            vec![
                Depth::Valid(0.7),
                Depth::Valid(0.8),
                Depth::Invalid,
                Depth::Valid(0.9),
                Depth::Valid(1.0),
                Depth::Valid(1.1),
            ],
            transform,
        )
        .unwrap()
        .with_crs(Some("EPSG:4326".into()));

        let dir = tempdir().unwrap();
        let path = dir.path().join("depth.tif");
        write_depth_geotiff(&grid, &path).unwrap();

        let data = GeoTiffReader {
            file_name: path.display().to_string(),
        }
        .read_data()
        .unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(data.crs.as_deref(), Some("EPSG:4326"));

        let band = data.into_band_grid().unwrap();
        let gt = band.transform();
        assert_relative_eq!(gt.origin_x, -81.23, epsilon = 1e-12);
        assert_relative_eq!(gt.origin_y, 42.67, epsilon = 1e-12);
        assert_relative_eq!(gt.pixel_height, -0.0001, epsilon = 1e-15);

        assert_eq!(band.get(0, 2), Some(&None));
        assert_relative_eq!(band.get(1, 2).unwrap().unwrap(), 1.1, epsilon = 1e-6);
    }
}
