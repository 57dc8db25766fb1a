use serde::Serialize;

use crate::bbox::Bbox;
use crate::config::RiskConfig;
use crate::flow::{FlowField, Lattice};
use crate::maybe_rayon::*;

/// Hazard level of a lattice cell.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskClass {
    Low,
    Moderate,
    High,
    /// Not enough defined neighbours to compute a divergence.
    Indeterminate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskCell {
    pub row: usize,
    pub col: usize,
    pub lon: f64,
    pub lat: f64,
    /// `None` when the cell is indeterminate.
    pub divergence: Option<f64>,
    pub class: RiskClass,
}

/// Risk cells parallel to a [`FlowField`], stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskZoneGrid {
    lattice: Lattice,
    bounds: Bbox,
    threshold_moderate: f64,
    threshold_high: f64,
    cells: Vec<RiskCell>,
}

impl RiskZoneGrid {
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn rows(&self) -> usize {
        self.lattice.rows()
    }

    pub fn cols(&self) -> usize {
        self.lattice.cols()
    }

    pub fn bounds(&self) -> Bbox {
        self.bounds
    }

    /// (moderate, high)
    pub fn thresholds(&self) -> (f64, f64) {
        (self.threshold_moderate, self.threshold_high)
    }

    pub fn cells(&self) -> &[RiskCell] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&RiskCell> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.cells.get(row * self.cols() + col)
    }

    pub fn count(&self, class: RiskClass) -> usize {
        self.cells.iter().filter(|c| c.class == class).count()
    }
}

/// Class of a finite divergence: `Low` at or above `threshold_moderate`,
/// `High` below `threshold_high`, `Moderate` in between.
pub fn classify(divergence: f64, config: &RiskConfig) -> RiskClass {
    if divergence >= config.threshold_moderate {
        RiskClass::Low
    } else if divergence >= config.threshold_high {
        RiskClass::Moderate
    } else {
        RiskClass::High
    }
}

/// Central-difference divergence of the flow velocity at a lattice cell.
///
/// Spacing is the distance in depth-grid pixels between the neighbours'
/// source cells, so the result is in velocity per pixel whatever the CRS
/// units. `None` on the lattice edge, when the cell or any of its four
/// neighbours is undefined, or when neighbouring source cells coincide.
pub fn divergence_at(field: &FlowField, row: usize, col: usize) -> Option<f64> {
    if row == 0 || col == 0 || row + 1 >= field.rows() || col + 1 >= field.cols() {
        return None;
    }

    field.get(row, col)?.sample.defined()?;
    let west = field.get(row, col - 1)?;
    let east = field.get(row, col + 1)?;
    let north = field.get(row - 1, col)?;
    let south = field.get(row + 1, col)?;

    let (vx_west, _) = west.sample.defined()?.velocity();
    let (vx_east, _) = east.sample.defined()?.velocity();
    let (_, vy_north) = north.sample.defined()?.velocity();
    let (_, vy_south) = south.sample.defined()?.velocity();

    let dx = east.source_col as f64 - west.source_col as f64;
    // Rows grow southwards, velocities northwards
    let dy = south.source_row as f64 - north.source_row as f64;
    if dx == 0.0 || dy == 0.0 {
        return None;
    }

    let divergence = (vx_east - vx_west) / dx + (vy_north - vy_south) / dy;
    divergence.is_finite().then_some(divergence)
}

/// Divergence and hazard class for every cell of `field`.
pub fn classify_risk(field: &FlowField, config: &RiskConfig) -> RiskZoneGrid {
    let cells: Vec<RiskCell> = field
        .cells()
        .into_par_iter()
        .map(|cell| {
            let divergence = divergence_at(field, cell.row, cell.col);
            RiskCell {
                row: cell.row,
                col: cell.col,
                lon: cell.lon,
                lat: cell.lat,
                divergence,
                class: divergence.map_or(RiskClass::Indeterminate, |d| classify(d, config)),
            }
        })
        .collect();

    let grid = RiskZoneGrid {
        lattice: *field.lattice(),
        bounds: field.bounds(),
        threshold_moderate: config.threshold_moderate,
        threshold_high: config.threshold_high,
        cells,
    };

    log::debug!(
        "Risk zones: {} low, {} moderate, {} high, {} indeterminate",
        grid.count(RiskClass::Low),
        grid.count(RiskClass::Moderate),
        grid.count(RiskClass::High),
        grid.count(RiskClass::Indeterminate)
    );
    grid
}
