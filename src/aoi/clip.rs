use ndarray::Array2;
use thiserror::Error;

use crate::aoi::{AoiPolygon, BoundaryRule};
use crate::bbox::Bbox;
use crate::depth::{Depth, DepthGrid};

#[derive(Debug, Error, PartialEq)]
pub enum ClipError {
    #[error("AOI {aoi:?} does not intersect the raster extent {raster:?}")]
    OutOfBounds { aoi: Bbox, raster: Bbox },
    #[error("no cell centre of the {rows}x{cols} window falls inside the AOI polygon")]
    NoCellsInside { rows: usize, cols: usize },
    #[error("raster geotransform is degenerate and cannot locate the AOI")]
    DegenerateTransform,
}

const EDGE_TOLERANCE: f64 = 1e-9;

// Pixel coordinates within EDGE_TOLERANCE of a cell edge are put on the edge.
fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() < EDGE_TOLERANCE {
        nearest
    } else {
        value
    }
}

/// Crops `depth` to the AOI bounding box and invalidates cells whose centre
/// lies outside the polygon.
///
/// The crop window is `floor(min)..ceil(max)` of the AOI corners in pixel
/// space, clamped to the raster, so a vertex on a cell edge never pulls in the
/// neighbouring cell. Membership is decided on cell centres with `rule`.
pub fn clip_to_aoi(
    depth: &DepthGrid,
    polygon: &AoiPolygon,
    rule: BoundaryRule,
) -> Result<DepthGrid, ClipError> {
    let raster_bounds = depth.bounds();
    let aoi_bounds = polygon.bbox();

    if depth.is_empty() || !raster_bounds.intersects(&aoi_bounds) {
        return Err(ClipError::OutOfBounds {
            aoi: aoi_bounds,
            raster: raster_bounds,
        });
    }

    let transform = depth.transform();
    let mut cols_f = Vec::with_capacity(4);
    let mut rows_f = Vec::with_capacity(4);
    for (x, y) in [
        (aoi_bounds.xmin, aoi_bounds.ymin),
        (aoi_bounds.xmax, aoi_bounds.ymin),
        (aoi_bounds.xmin, aoi_bounds.ymax),
        (aoi_bounds.xmax, aoi_bounds.ymax),
    ] {
        let (col, row) = transform
            .geo_to_pixel(x, y)
            .ok_or(ClipError::DegenerateTransform)?;
        cols_f.push(col);
        rows_f.push(row);
    }

    let (rows, cols) = depth.shape();
    let span = |values: &[f64], limit: usize| -> (usize, usize) {
        let min = snap(values.iter().copied().fold(f64::INFINITY, f64::min));
        let max = snap(values.iter().copied().fold(f64::NEG_INFINITY, f64::max));
        let start = min.floor().max(0.0).min(limit as f64) as usize;
        let end = max.ceil().max(0.0).min(limit as f64) as usize;
        (start, end)
    };
    let (col_start, col_end) = span(&cols_f, cols);
    let (row_start, row_end) = span(&rows_f, rows);

    if col_start >= col_end || row_start >= row_end {
        return Err(ClipError::OutOfBounds {
            aoi: aoi_bounds,
            raster: raster_bounds,
        });
    }

    let window = transform.offset(col_start, row_start);
    let (out_rows, out_cols) = (row_end - row_start, col_end - col_start);
    let source = depth.data();

    let mut inside_count = 0usize;
    let clipped = Array2::from_shape_fn((out_rows, out_cols), |(r, c)| {
        let (x, y) = window.pixel_to_geo(c, r);
        if polygon.contains(x, y, rule) {
            inside_count += 1;
            source[(row_start + r, col_start + c)]
        } else {
            Depth::Invalid
        }
    });

    if inside_count == 0 {
        return Err(ClipError::NoCellsInside {
            rows: out_rows,
            cols: out_cols,
        });
    }

    log::debug!(
        "Clipped {}x{} raster to {}x{} window at ({}, {}), {} cells inside AOI",
        rows,
        cols,
        out_rows,
        out_cols,
        row_start,
        col_start,
        inside_count
    );

    Ok(DepthGrid::new(clipped, window).with_crs(depth.crs().map(str::to_string)))
}
