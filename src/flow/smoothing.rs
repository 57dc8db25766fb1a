use ndarray::Array2;

use crate::depth::{Depth, DepthGrid};
use crate::maybe_rayon::*;

/// Normalised 1-D Gaussian truncated at `ceil(3 sigma)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let half = (3.0 * sigma).ceil() as usize;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f64> = (0..=2 * half)
        .map(|i| {
            let x = i as f64 - half as f64;
            (-x * x / denom).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// One separable pass; `along_rows` convolves each row left to right.
fn convolve_pass(data: &Array2<Depth>, kernel: &[f64], along_rows: bool) -> Array2<Depth> {
    let (rows, cols) = data.dim();
    let half = (kernel.len() / 2) as isize;

    let out: Vec<Vec<Depth>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| {
                    if !data[(row, col)].is_valid() {
                        return Depth::Invalid;
                    }

                    let mut sum = 0.0;
                    let mut weight = 0.0;
                    for (k, &w) in kernel.iter().enumerate() {
                        let offset = k as isize - half;
                        let (r, c) = if along_rows {
                            (row as isize, col as isize + offset)
                        } else {
                            (row as isize + offset, col as isize)
                        };
                        if r < 0 || c < 0 || r >= rows as isize || c >= cols as isize {
                            continue;
                        }
                        if let Depth::Valid(v) = data[(r as usize, c as usize)] {
                            sum += w * v;
                            weight += w;
                        }
                    }
                    if weight > 0.0 {
                        Depth::from_value(sum / weight)
                    } else {
                        Depth::Invalid
                    }
                })
                .collect()
        })
        .collect();

    Array2::from_shape_fn((rows, cols), |(r, c)| out[r][c])
}

/// Gaussian smoothing of valid cells, `sigma` in cells.
///
/// Invalid cells stay invalid and contribute no weight, so the coastline and
/// the AOI edge are not dragged towards zero. `sigma <= 0` returns a copy.
pub fn gaussian_smooth(depth: &DepthGrid, sigma: f64) -> DepthGrid {
    if sigma.is_nan() || sigma <= 0.0 || depth.is_empty() {
        return depth.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let horizontal = convolve_pass(depth.data(), &kernel, true);
    let smoothed = convolve_pass(&horizontal, &kernel, false);
    depth.with_data(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{GeoTransform, Grid};
    use approx::assert_relative_eq;

    #[test]
    fn test_kernel_is_normalised() {
        let kernel = gaussian_kernel(2.0);
        assert_eq!(kernel.len(), 13);
        assert_relative_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(kernel[0], kernel[12]);
        assert!(kernel[6] > kernel[5]);
    }

    #[test]
    fn test_constant_surface_is_unchanged() {
        let grid =
            Grid::from_shape_vec(6, 6, vec![Depth::Valid(0.8); 36], GeoTransform::default())
                .unwrap();
        let smoothed = gaussian_smooth(&grid, 1.5);

        for d in smoothed.data().iter() {
            assert_relative_eq!(d.value().unwrap(), 0.8, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_cells_are_preserved() {
        let mut values = vec![Depth::Valid(1.0); 25];
        values[12] = Depth::Invalid;
        values[0] = Depth::Valid(2.0);
        let grid = Grid::from_shape_vec(5, 5, values, GeoTransform::default()).unwrap();

        let smoothed = gaussian_smooth(&grid, 1.0);

        assert_eq!(smoothed.get(2, 2), Some(&Depth::Invalid));
        let corner = smoothed.get(0, 0).unwrap().value().unwrap();
        assert!(corner < 2.0 && corner > 1.0);
        assert_eq!(smoothed.data().iter().filter(|d| d.is_valid()).count(), 24);
    }

    #[test]
    fn test_zero_sigma_is_identity() {
        let grid = Grid::from_shape_vec(
            1,
            3,
            vec![Depth::Valid(1.0), Depth::Invalid, Depth::Valid(3.0)],
            GeoTransform::default(),
        )
        .unwrap();
        assert_eq!(gaussian_smooth(&grid, 0.0), grid);
    }
}
