use ndarray::Array2;
use thiserror::Error;

use crate::bbox::Bbox;
use crate::raster::GeoTransform;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("buffer of {actual} samples cannot fill a {rows}x{cols} grid")]
    Shape {
        rows: usize,
        cols: usize,
        actual: usize,
    },
}

/// A georeferenced `rows x cols` grid of samples stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<String>,
}

impl<T> Grid<T> {
    pub fn new(data: Array2<T>, transform: GeoTransform) -> Self {
        Self {
            data,
            transform,
            crs: None,
        }
    }

    pub fn from_shape_vec(
        rows: usize,
        cols: usize,
        buffer: Vec<T>,
        transform: GeoTransform,
    ) -> Result<Self, GridError> {
        let actual = buffer.len();
        let data = Array2::from_shape_vec((rows, cols), buffer)
            .map_err(|_| GridError::Shape { rows, cols, actual })?;
        Ok(Self::new(data, transform))
    }

    pub fn with_crs(mut self, crs: Option<String>) -> Self {
        self.crs = crs;
        self
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.data.get((row, col))
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn bounds(&self) -> Bbox {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Geographic coordinate of the centre of cell (row, col).
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Same dimensions, geotransform and (when both are known) CRS.
    pub fn is_aligned_with<U>(&self, other: &Grid<U>) -> bool {
        self.alignment_mismatch(other).is_none()
    }

    /// Human-readable reason why `other` is not co-registered with `self`.
    pub fn alignment_mismatch<U>(&self, other: &Grid<U>) -> Option<String> {
        if self.shape() != other.shape() {
            return Some(format!(
                "dimensions {}x{} differ from {}x{}",
                other.rows(),
                other.cols(),
                self.rows(),
                self.cols()
            ));
        }

        if self.transform != other.transform {
            return Some(format!(
                "geotransform {:?} differs from {:?}",
                other.transform.to_gdal(),
                self.transform.to_gdal()
            ));
        }

        match (self.crs(), other.crs()) {
            (Some(a), Some(b)) if a != b => Some(format!("CRS {} differs from {}", b, a)),
            _ => None,
        }
    }

    /// New grid with the same georeferencing and `f` applied to every cell.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        F: FnMut(&T) -> U,
    {
        Grid {
            data: self.data.map(f),
            transform: self.transform,
            crs: self.crs.clone(),
        }
    }

    /// New grid with the same georeferencing and different cell data.
    pub fn with_data<U>(&self, data: Array2<U>) -> Grid<U> {
        Grid {
            data,
            transform: self.transform,
            crs: self.crs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shape_vec_checks_length() {
        let grid = Grid::from_shape_vec(2, 3, vec![0.0; 6], GeoTransform::default());
        assert!(grid.is_ok());

        let err = Grid::from_shape_vec(2, 3, vec![0.0; 5], GeoTransform::default()).unwrap_err();
        assert_eq!(
            err,
            GridError::Shape {
                rows: 2,
                cols: 3,
                actual: 5
            }
        );
    }

    #[test]
    fn test_alignment() {
        let gt = GeoTransform::new(0.0, 10.0, 1.0, -1.0);
        let a = Grid::from_shape_vec(2, 2, vec![1.0; 4], gt).unwrap();
        let b = Grid::from_shape_vec(2, 2, vec![Some(1.0); 4], gt).unwrap();
        let shifted = Grid::from_shape_vec(2, 2, vec![1.0; 4], gt.offset(1, 0)).unwrap();
        let wider = Grid::from_shape_vec(2, 3, vec![1.0; 6], gt).unwrap();

        assert!(a.is_aligned_with(&b));
        assert!(!a.is_aligned_with(&shifted));
        assert!(a.alignment_mismatch(&wider).unwrap().contains("2x3"));

        let utm = a.clone().with_crs(Some("EPSG:32617".into()));
        let wgs = b.with_crs(Some("EPSG:4326".into()));
        assert!(!utm.is_aligned_with(&wgs));
        assert!(utm.is_aligned_with(&a));
    }

    #[test]
    fn test_map_keeps_georeferencing() {
        let gt = GeoTransform::new(5.0, 5.0, 0.5, -0.5);
        let grid = Grid::from_shape_vec(1, 2, vec![1.0, 2.0], gt)
            .unwrap()
            .with_crs(Some("EPSG:4326".into()));

        let doubled = grid.map(|v| v * 2.0);
        assert_eq!(doubled.get(0, 1), Some(&4.0));
        assert_eq!(doubled.transform(), &gt);
        assert_eq!(doubled.crs(), Some("EPSG:4326"));
        assert_eq!(grid.cell_center(0, 1), (5.75, 4.75));
    }
}
