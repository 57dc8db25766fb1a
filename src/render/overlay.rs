use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::ImageEncoder;
use ndarray::Array2;
use image::codecs::png::PngEncoder;

use crate::bbox::Bbox;
use crate::config::VisualConfig;
use crate::depth::{DepthGrid, DepthStatistics};

/// An RGBA raster of the depth grid, row-major with north at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    bounds: Bbox,
    range: (f64, f64),
}

impl Overlay {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Geographic corners the image must be stretched over.
    pub fn bounds(&self) -> Bbox {
        self.bounds
    }

    /// Depth values mapped to the two ends of the colormap.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = 4 * (y as usize * self.width as usize + x as usize);
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), image::ImageError> {
        let output = BufWriter::new(File::create(path)?);
        let encoder = PngEncoder::new(output);
        encoder.write_image(
            &self.rgba,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(())
    }
}

/// Value range of the valid cells, widened when it is empty or flat.
fn auto_range(depth: &DepthGrid) -> (f64, f64) {
    match DepthStatistics::compute(depth) {
        None => (0.0, 1.0),
        Some(stats) if (stats.max - stats.min).abs() < f64::EPSILON => (stats.min, stats.min + 1.0),
        Some(stats) => (stats.min, stats.max),
    }
}

/// Cells lying on a depth contour.
///
/// Levels are multiples of `range / levels`. A valid cell is on a contour
/// when its east or south valid neighbour falls in a different level band,
/// so invalid cells never carry a line.
pub fn contour_mask(depth: &DepthGrid, levels: usize) -> Array2<bool> {
    let (rows, cols) = depth.shape();
    let mut mask = Array2::from_elem((rows, cols), false);
    if levels == 0 {
        return mask;
    }

    let Some(stats) = DepthStatistics::compute(depth) else {
        return mask;
    };
    let interval = (stats.max - stats.min) / levels as f64;
    if !(interval.is_finite() && interval > 0.0) {
        return mask;
    }
    let base = (stats.min / interval).floor() * interval;

    let bands = depth
        .data()
        .map(|d| d.value().map(|v| ((v - base) / interval).floor() as i64));

    for ((row, col), band) in bands.indexed_iter() {
        let Some(band) = *band else { continue };
        let crosses = |r: usize, c: usize| {
            bands
                .get((r, c))
                .copied()
                .flatten()
                .is_some_and(|other| other != band)
        };
        mask[(row, col)] = crosses(row, col + 1) || crosses(row + 1, col);
    }
    mask
}

fn blend(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}

/// Colours every cell by its depth and paints invalid cells with
/// `visual.invalid_color`, upscaled `visual.scale` times along each axis.
/// Contour cells keep the valid alpha.
pub fn render_overlay(depth: &DepthGrid, visual: &VisualConfig) -> Overlay {
    let (min, max) = auto_range(depth);
    let alpha = visual.valid_alpha();
    let scale = visual.scale.max(1) as usize;
    let (rows, cols) = depth.shape();
    let (width, height) = (cols * scale, rows * scale);
    let contours = contour_mask(depth, visual.contour_levels);
    let [lr, lg, lb] = visual.contour_color;

    let mut rgba = vec![0u8; width * height * 4];
    for ((row, col), cell) in depth.data().indexed_iter() {
        let color = match cell.value() {
            Some(v) => {
                let c = visual.colormap.evaluate((v - min) / (max - min));
                if contours[(row, col)] {
                    [blend(c.r, lr), blend(c.g, lg), blend(c.b, lb), alpha]
                } else {
                    [c.r, c.g, c.b, alpha]
                }
            }
            None => visual.invalid_color,
        };

        for y in row * scale..(row + 1) * scale {
            let line = y * width;
            for x in col * scale..(col + 1) * scale {
                let offset = 4 * (line + x);
                rgba[offset..offset + 4].copy_from_slice(&color);
            }
        }
    }

    Overlay {
        width: width as u32,
        height: height as u32,
        rgba,
        bounds: depth.bounds(),
        range: (min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::Depth;
    use crate::raster::{GeoTransform, Grid};
    use crate::render::Colormap;

    fn depth() -> DepthGrid {
        Grid::from_shape_vec(
            2,
            2,
            vec![
                Depth::Valid(0.5),
                Depth::Valid(1.0),
                Depth::Invalid,
                Depth::Valid(0.75),
            ],
            GeoTransform::new(10.0, 20.0, 0.5, -0.5),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_cells_are_distinguishable() {
        let overlay = render_overlay(&depth(), &VisualConfig::default());

        assert_eq!(overlay.pixel(0, 1), Some([0, 0, 0, 0]));

        let alpha = VisualConfig::default().valid_alpha();
        for (x, y) in [(0, 0), (1, 0), (1, 1)] {
            assert_eq!(overlay.pixel(x, y).unwrap()[3], alpha);
        }
    }

    #[test]
    fn test_range_endpoints_use_colormap_ends() {
        let visual = VisualConfig {
            contour_levels: 0,
            ..VisualConfig::default()
        };
        let overlay = render_overlay(&depth(), &visual);
        assert_eq!(overlay.range(), (0.5, 1.0));

        let shallow = Colormap::default().evaluate(0.0);
        let deep = Colormap::default().evaluate(1.0);
        assert_eq!(&overlay.pixel(0, 0).unwrap()[..3], &[shallow.r, shallow.g, shallow.b]);
        assert_eq!(&overlay.pixel(1, 0).unwrap()[..3], &[deep.r, deep.g, deep.b]);
    }

    #[test]
    fn test_scale_upsamples() {
        let visual = VisualConfig {
            scale: 3,
            ..VisualConfig::default()
        };
        let overlay = render_overlay(&depth(), &visual);

        assert_eq!((overlay.width(), overlay.height()), (6, 6));
        assert_eq!(overlay.pixel(2, 2), overlay.pixel(0, 0));
        assert_eq!(overlay.pixel(0, 5), Some([0, 0, 0, 0]));
        assert_eq!(overlay.pixel(6, 0), None);
    }

    fn ramp_with_hole() -> DepthGrid {
        // 3 rows of 0..16 eastwards, one invalid cell on a level boundary
        let values = (0..3 * 17)
            .map(|i| match (i / 17, i % 17) {
                (1, 3) => Depth::Invalid,
                (_, c) => Depth::Valid(c as f64),
            })
            .collect();
        Grid::from_shape_vec(3, 17, values, GeoTransform::new(0.0, 3.0, 1.0, -1.0)).unwrap()
    }

    #[test]
    fn test_contours_at_level_crossings() {
        let mask = contour_mask(&ramp_with_hole(), 8);

        // Interval 2: bands change between columns 1|2, 3|4, ... 15|16
        let expected: Vec<usize> = (1..16).step_by(2).collect();
        let top: Vec<usize> = (0..17).filter(|&c| mask[(0, c)]).collect();
        assert_eq!(top, expected);

        assert!(!mask[(1, 3)]);
        assert!(mask[(1, 1)]);
        assert!(mask[(1, 5)]);
        assert!(contour_mask(&ramp_with_hole(), 0).iter().all(|on| !on));
    }

    #[test]
    fn test_contour_lines_are_painted() {
        let visual = VisualConfig::default();
        let plain = VisualConfig {
            contour_levels: 0,
            ..VisualConfig::default()
        };
        let with_lines = render_overlay(&ramp_with_hole(), &visual);
        let without = render_overlay(&ramp_with_hole(), &plain);

        assert_ne!(with_lines.pixel(1, 0), without.pixel(1, 0));
        assert_eq!(with_lines.pixel(2, 0), without.pixel(2, 0));
        assert_eq!(with_lines.pixel(1, 0).unwrap()[3], visual.valid_alpha());
        assert_eq!(with_lines.pixel(3, 1), Some(visual.invalid_color));
    }

    #[test]
    fn test_bounds_follow_grid() {
        let overlay = render_overlay(&depth(), &VisualConfig::default());
        assert_eq!(overlay.bounds(), Bbox::new(10.0, 11.0, 19.0, 20.0).unwrap());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        render_overlay(&depth(), &VisualConfig::default())
            .save_png(&path)
            .unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
