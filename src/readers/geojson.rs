use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use super::ReadError;
use crate::aoi::AoiPolygon;
use crate::bbox::Bbox;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    FeatureCollection { features: Vec<Feature> },
    Feature(Feature),
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn exterior_ring(self) -> Option<Vec<Vec<f64>>> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.into_iter().next(),
            Geometry::MultiPolygon { coordinates } => {
                coordinates.into_iter().next()?.into_iter().next()
            }
            Geometry::Unsupported => None,
        }
    }
}

impl GeoJson {
    /// Exterior ring of the first polygon in the document.
    fn exterior_ring(self) -> Option<Vec<Vec<f64>>> {
        match self {
            GeoJson::FeatureCollection { features } => features
                .into_iter()
                .find_map(|f| f.geometry.and_then(Geometry::exterior_ring)),
            GeoJson::Feature(feature) => feature.geometry?.exterior_ring(),
            GeoJson::Polygon { coordinates } => Geometry::Polygon { coordinates }.exterior_ring(),
            GeoJson::MultiPolygon { coordinates } => {
                Geometry::MultiPolygon { coordinates }.exterior_ring()
            }
            GeoJson::Unsupported => None,
        }
    }
}

/// AOI polygon from a GeoJSON document in WGS84 longitude/latitude.
///
/// Only the exterior ring of the first polygon is used; holes and further
/// polygons are ignored with a warning.
pub fn read_aoi<R: Read>(reader: R, source: &str) -> Result<AoiPolygon, ReadError> {
    let invalid = |message: String| ReadError::GeoJson {
        path: source.to_string(),
        message,
    };

    let document: GeoJson =
        serde_json::from_reader(reader).map_err(|e| invalid(e.to_string()))?;
    if let GeoJson::FeatureCollection { features } = &document
        && features.len() > 1
    {
        log::warn!("{} has {} features, using the first polygon", source, features.len());
    }

    let ring = document
        .exterior_ring()
        .ok_or_else(|| invalid("no Polygon or MultiPolygon geometry".to_string()))?;

    let vertices = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok((*lon, *lat)),
            _ => Err(invalid(format!("position {:?} has fewer than 2 values", position))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let extent = Bbox::enclosing(&vertices);
    Bbox::geographic(extent.xmin, extent.xmax, extent.ymin, extent.ymax)
        .map_err(|e| invalid(e.to_string()))?;

    AoiPolygon::new(vertices).map_err(|e| invalid(e.to_string()))
}

pub fn read_aoi_file<P: AsRef<Path>>(path: P) -> Result<AoiPolygon, ReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_aoi(BufReader::new(file), &path.display().to_string())
}
