//! Affine georeferencing for scene rasters

use crate::bbox::Bbox;

/// Affine transformation between pixel space (col, row) and geographic space (x, y):
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// North-up scenes have zero rotation terms and a negative `pixel_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// GDAL ordering: [origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Geographic coordinate of a fractional pixel position (corner convention).
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width + row * self.row_rotation;
        let y = self.origin_y + col * self.col_rotation + row * self.pixel_height;
        (x, y)
    }

    /// Geographic coordinate of the centre of cell (col, row).
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional pixel position of a geographic coordinate, `None` for a
    /// degenerate transform.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;
        if det.abs() < 1e-15 {
            return None;
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        Some((col, row))
    }

    pub fn is_north_up(&self) -> bool {
        self.row_rotation.abs() < 1e-12 && self.col_rotation.abs() < 1e-12 && self.pixel_height < 0.0
    }

    /// Transform of a window whose top-left cell is (col, row) of this one.
    pub fn offset(&self, col: usize, row: usize) -> Self {
        let (origin_x, origin_y) = self.apply(col as f64, row as f64);
        Self {
            origin_x,
            origin_y,
            ..*self
        }
    }

    /// Extent covered by a `cols` x `rows` raster.
    pub fn bounds(&self, cols: usize, rows: usize) -> Bbox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(cols as f64, 0.0),
            self.apply(0.0, rows as f64),
            self.apply(cols as f64, rows as f64),
        ];
        Bbox::enclosing(&corners)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_geo_roundtrip() {
        let gt = GeoTransform::new(-81.2, 42.67, 0.0001, -0.0001);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y).unwrap();

        assert_relative_eq!(col, 5.5, epsilon = 1e-9);
        assert_relative_eq!(row, 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_gdal_ordering() {
        let coeffs = [500000.0, 10.0, 0.0, 4_700_000.0, 0.0, -10.0];
        let gt = GeoTransform::from_gdal(coeffs);
        assert_eq!(gt.origin_y, 4_700_000.0);
        assert_eq!(gt.pixel_height, -10.0);
        assert_eq!(gt.to_gdal(), coeffs);
        assert!(gt.is_north_up());
    }

    #[test]
    fn test_offset_moves_origin() {
        let gt = GeoTransform::new(0.0, 100.0, 2.0, -2.0);
        let window = gt.offset(3, 4);
        assert_relative_eq!(window.origin_x, 6.0);
        assert_relative_eq!(window.origin_y, 92.0);
        assert_eq!(window.pixel_width, gt.pixel_width);
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let bounds = gt.bounds(100, 50);

        assert_relative_eq!(bounds.xmin, 0.0);
        assert_relative_eq!(bounds.xmax, 100.0);
        assert_relative_eq!(bounds.ymin, 50.0);
        assert_relative_eq!(bounds.ymax, 100.0);
    }

    #[test]
    fn test_degenerate_transform() {
        let gt = GeoTransform::new(0.0, 0.0, 0.0, -1.0);
        assert!(gt.geo_to_pixel(1.0, 1.0).is_none());
    }
}
