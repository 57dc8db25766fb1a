//! Serializable documents for the web map layer

use serde::Serialize;

use crate::bbox::Bounds;
use crate::config::FlowConfig;
use crate::depth::{Depth, DepthGrid};
use crate::flow::{FlowField, flow_vector, gradient_at};
use crate::raster::GeoTransform;
use crate::render::Overlay;
use crate::risk::{DirectionalRisk, RiskClass, RiskZoneGrid};

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowVectorRecord {
    pub lon: f64,
    pub lat: f64,
    pub dx: f64,
    pub dy: f64,
    pub magnitude: f64,
    pub defined: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowMetadata {
    pub block_rows: usize,
    pub block_cols: usize,
    pub lattice_rows: usize,
    pub lattice_cols: usize,
    pub total_vectors: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FlowVectorsDocument {
    pub bounds: Bounds,
    pub flow_vectors: Vec<FlowVectorRecord>,
    pub metadata: FlowMetadata,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RiskRecord {
    pub lon: f64,
    pub lat: f64,
    pub divergence: Option<f64>,
    pub classification: RiskClass,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RiskMetadata {
    pub threshold_moderate: f64,
    pub threshold_high: f64,
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub indeterminate: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RiskZonesDocument {
    pub bounds: Bounds,
    pub cells: Vec<RiskRecord>,
    pub directional: DirectionalRisk,
    pub metadata: RiskMetadata,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DepthPoint {
    pub lon: f64,
    pub lat: f64,
    pub depth: Option<f64>,
    pub flow_x: f64,
    pub flow_y: f64,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct GridSize {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DepthGridDocument {
    pub bounds: Bounds,
    pub grid_size: GridSize,
    pub grid: Vec<Vec<DepthPoint>>,
}

/// Linearly interpolated percentile (0..=100) of `values`.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Flow lattice as records. With `min_magnitude_percentile > 0` only defined
/// vectors at or above that percentile of defined magnitudes are kept.
pub fn flow_vectors_document(field: &FlowField, min_magnitude_percentile: f64) -> FlowVectorsDocument {
    let cutoff = if min_magnitude_percentile > 0.0 {
        let magnitudes: Vec<f64> = field
            .cells()
            .iter()
            .filter_map(|c| c.sample.defined().map(|v| v.magnitude))
            .collect();
        Some(percentile(&magnitudes, min_magnitude_percentile).unwrap_or(f64::INFINITY))
    } else {
        None
    };

    let flow_vectors: Vec<FlowVectorRecord> = field
        .cells()
        .iter()
        .filter(|cell| match cutoff {
            Some(cutoff) => cell.sample.defined().is_some_and(|v| v.magnitude >= cutoff),
            None => true,
        })
        .map(|cell| {
            let v = cell.sample.vector();
            FlowVectorRecord {
                lon: cell.lon,
                lat: cell.lat,
                dx: v.dx,
                dy: v.dy,
                magnitude: v.magnitude,
                defined: cell.sample.is_defined(),
            }
        })
        .collect();

    let lattice = field.lattice();
    FlowVectorsDocument {
        bounds: field.bounds().to_bounds(),
        metadata: FlowMetadata {
            block_rows: lattice.block_rows(),
            block_cols: lattice.block_cols(),
            lattice_rows: lattice.rows(),
            lattice_cols: lattice.cols(),
            total_vectors: flow_vectors.len(),
        },
        flow_vectors,
    }
}

pub fn risk_zones_document(zones: &RiskZoneGrid, directional: DirectionalRisk) -> RiskZonesDocument {
    let (threshold_moderate, threshold_high) = zones.thresholds();
    RiskZonesDocument {
        bounds: zones.bounds().to_bounds(),
        cells: zones
            .cells()
            .iter()
            .map(|cell| RiskRecord {
                lon: cell.lon,
                lat: cell.lat,
                divergence: cell.divergence,
                classification: cell.class,
            })
            .collect(),
        directional,
        metadata: RiskMetadata {
            threshold_moderate,
            threshold_high,
            low: zones.count(RiskClass::Low),
            moderate: zones.count(RiskClass::Moderate),
            high: zones.count(RiskClass::High),
            indeterminate: zones.count(RiskClass::Indeterminate),
        },
    }
}

/// Every `downsample`-th cell of the depth grid with the unit down-gradient
/// direction at that coarser resolution, for client-side particle animation.
pub fn depth_grid_document(depth: &DepthGrid, downsample: usize) -> DepthGridDocument {
    let step = downsample.max(1);
    let (rows, cols) = depth.shape();
    let coarse_rows = rows.div_ceil(step);
    let coarse_cols = cols.div_ceil(step);

    let gt = depth.transform();
    let coarse_transform = GeoTransform {
        pixel_width: gt.pixel_width * step as f64,
        pixel_height: gt.pixel_height * step as f64,
        row_rotation: gt.row_rotation * step as f64,
        col_rotation: gt.col_rotation * step as f64,
        ..*gt
    };
    let coarse = DepthGrid::new(
        ndarray::Array2::from_shape_fn((coarse_rows, coarse_cols), |(r, c)| {
            depth.get(r * step, c * step).copied().unwrap_or(Depth::Invalid)
        }),
        coarse_transform,
    );

    // Only the direction is exported
    let unit = FlowConfig {
        max_magnitude: f64::INFINITY,
        ..FlowConfig::default()
    };

    let grid = (0..coarse_rows)
        .map(|r| {
            (0..coarse_cols)
                .map(|c| {
                    let (lon, lat) = depth.cell_center(r * step, c * step);
                    let direction = gradient_at(&coarse, r, c)
                        .map(|g| flow_vector(g, &unit))
                        .unwrap_or(crate::flow::FlowVector::ZERO);
                    DepthPoint {
                        lon,
                        lat,
                        depth: coarse.get(r, c).and_then(|d| d.value()),
                        flow_x: direction.dx,
                        flow_y: direction.dy,
                    }
                })
                .collect()
        })
        .collect();

    DepthGridDocument {
        bounds: depth.bounds().to_bounds(),
        grid_size: GridSize {
            rows: coarse_rows,
            cols: coarse_cols,
        },
        grid,
    }
}

/// Corner bounds the PNG overlay is stretched over.
pub fn overlay_bounds(overlay: &Overlay) -> Bounds {
    overlay.bounds().to_bounds()
}
