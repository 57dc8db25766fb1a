use crate::bbox::Bbox;
use crate::raster::GridError;

/// Coarse sampling lattice laid over a depth grid, one cell per
/// `block_rows x block_cols` block. The last block of a row or column may be
/// shorter when the grid does not divide evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lattice {
    rows: usize,
    cols: usize,
    block_rows: usize,
    block_cols: usize,
    grid_rows: usize,
    grid_cols: usize,
}

impl Lattice {
    pub fn covering(grid_rows: usize, grid_cols: usize, block_rows: usize, block_cols: usize) -> Self {
        let block_rows = block_rows.max(1);
        let block_cols = block_cols.max(1);
        Self {
            rows: grid_rows.div_ceil(block_rows),
            cols: grid_cols.div_ceil(block_cols),
            block_rows,
            block_cols,
            grid_rows,
            grid_cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    pub fn block_cols(&self) -> usize {
        self.block_cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid rows `[start, end)` covered by lattice row `row`.
    pub fn row_span(&self, row: usize) -> (usize, usize) {
        span(row, self.block_rows, self.grid_rows)
    }

    /// Grid columns `[start, end)` covered by lattice column `col`.
    pub fn col_span(&self, col: usize) -> (usize, usize) {
        span(col, self.block_cols, self.grid_cols)
    }

    /// Row-major (row, col) of flat index `i`.
    pub fn position(&self, i: usize) -> (usize, usize) {
        (i / self.cols, i % self.cols)
    }
}

fn span(index: usize, block: usize, limit: usize) -> (usize, usize) {
    let start = (index * block).min(limit);
    let end = ((index + 1) * block).min(limit);
    (start, end)
}

/// Unit direction `(dx, dy)` with `dy` positive northwards, and a
/// non-negative magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowVector {
    pub dx: f64,
    pub dy: f64,
    pub magnitude: f64,
}

impl FlowVector {
    pub const ZERO: FlowVector = FlowVector {
        dx: 0.0,
        dy: 0.0,
        magnitude: 0.0,
    };

    /// Direction scaled by magnitude, (east, north).
    pub fn velocity(&self) -> (f64, f64) {
        (self.dx * self.magnitude, self.dy * self.magnitude)
    }
}

/// A lattice cell whose gradient could not be sampled is `Undefined`, which
/// reads as the zero vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowSample {
    Defined(FlowVector),
    Undefined,
}

impl FlowSample {
    pub fn vector(&self) -> FlowVector {
        match self {
            FlowSample::Defined(v) => *v,
            FlowSample::Undefined => FlowVector::ZERO,
        }
    }

    pub fn defined(&self) -> Option<&FlowVector> {
        match self {
            FlowSample::Defined(v) => Some(v),
            FlowSample::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, FlowSample::Defined(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowCell {
    pub row: usize,
    pub col: usize,
    pub lon: f64,
    pub lat: f64,
    /// Depth-grid cell the gradient was sampled at.
    pub source_row: usize,
    pub source_col: usize,
    pub sample: FlowSample,
}

/// Flow vectors on a [`Lattice`], stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    lattice: Lattice,
    bounds: Bbox,
    cells: Vec<FlowCell>,
}

impl FlowField {
    pub(crate) fn new(lattice: Lattice, bounds: Bbox, cells: Vec<FlowCell>) -> Self {
        Self {
            lattice,
            bounds,
            cells,
        }
    }

    /// Field from row-major cells, one per lattice cell.
    pub fn from_cells(
        lattice: Lattice,
        bounds: Bbox,
        cells: Vec<FlowCell>,
    ) -> Result<Self, GridError> {
        if cells.len() != lattice.len() {
            return Err(GridError::Shape {
                rows: lattice.rows(),
                cols: lattice.cols(),
                actual: cells.len(),
            });
        }
        Ok(Self::new(lattice, bounds, cells))
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn rows(&self) -> usize {
        self.lattice.rows()
    }

    pub fn cols(&self) -> usize {
        self.lattice.cols()
    }

    /// Extent of the depth grid the field was derived from.
    pub fn bounds(&self) -> Bbox {
        self.bounds
    }

    pub fn cells(&self) -> &[FlowCell] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&FlowCell> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.cells.get(row * self.cols() + col)
    }

    pub fn defined_count(&self) -> usize {
        self.cells.iter().filter(|c| c.sample.is_defined()).count()
    }
}
