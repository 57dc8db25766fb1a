use crate::config::FlowConfig;
use crate::depth::DepthGrid;
use crate::flow::{FlowCell, FlowField, FlowSample, FlowVector, Lattice, gaussian_smooth};
use crate::maybe_rayon::*;

/// Central-difference depth gradient `(d/dx, d/dy)` at a grid cell in depth
/// units per pixel, `y` positive northwards.
///
/// Spacing is one pixel whatever the CRS units; the transform only sets the
/// axis orientation. `None` at the grid edge or when the cell or any of its
/// four neighbours is invalid.
pub fn gradient_at(depth: &DepthGrid, row: usize, col: usize) -> Option<(f64, f64)> {
    let (rows, cols) = depth.shape();
    if row == 0 || col == 0 || row + 1 >= rows || col + 1 >= cols {
        return None;
    }

    let at = |r: usize, c: usize| depth.get(r, c).and_then(|d| d.value());
    at(row, col)?;
    let west = at(row, col - 1)?;
    let east = at(row, col + 1)?;
    let north = at(row - 1, col)?;
    let south = at(row + 1, col)?;

    let transform = depth.transform();
    let gx = (east - west) / 2.0 * transform.pixel_width.signum();
    // pixel_height is negative on north-up rasters, which flips the row axis
    let gy = (south - north) / 2.0 * transform.pixel_height.signum();

    (gx.is_finite() && gy.is_finite()).then_some((gx, gy))
}

/// Down-gradient vector for a sampled gradient: direction `-grad / |grad|`,
/// magnitude `|grad| * speed_scale` clamped to `max_magnitude`.
pub fn flow_vector(gradient: (f64, f64), config: &FlowConfig) -> FlowVector {
    let (gx, gy) = gradient;
    let slope = gx.hypot(gy);
    if slope == 0.0 {
        return FlowVector::ZERO;
    }

    FlowVector {
        dx: -gx / slope,
        dy: -gy / slope,
        magnitude: (slope * config.speed_scale).min(config.max_magnitude),
    }
}

/// Samples the depth gradient at the centre cell of every lattice block.
///
/// Cells are computed independently of each other, so the result does not
/// depend on evaluation order.
pub fn derive_flow_field(depth: &DepthGrid, config: &FlowConfig) -> FlowField {
    let smoothed;
    let depth = if config.smoothing_sigma > 0.0 {
        smoothed = gaussian_smooth(depth, config.smoothing_sigma);
        &smoothed
    } else {
        depth
    };

    let (rows, cols) = depth.shape();
    let lattice = Lattice::covering(rows, cols, config.block_rows, config.block_cols);
    let transform = depth.transform();

    let cells: Vec<FlowCell> = (0..lattice.len())
        .into_par_iter()
        .map(|i| {
            let (row, col) = lattice.position(i);
            let (row_start, row_end) = lattice.row_span(row);
            let (col_start, col_end) = lattice.col_span(col);

            let (lon, lat) = transform.apply(
                (col_start + col_end) as f64 / 2.0,
                (row_start + row_end) as f64 / 2.0,
            );
            let source_row = (row_start + row_end) / 2;
            let source_col = (col_start + col_end) / 2;

            let sample = match gradient_at(depth, source_row, source_col) {
                Some(gradient) => FlowSample::Defined(flow_vector(gradient, config)),
                None => FlowSample::Undefined,
            };

            FlowCell {
                row,
                col,
                lon,
                lat,
                source_row,
                source_col,
                sample,
            }
        })
        .collect();

    let field = FlowField::new(lattice, depth.bounds(), cells);
    log::debug!(
        "Flow lattice {}x{}: {} of {} vectors defined",
        field.rows(),
        field.cols(),
        field.defined_count(),
        lattice.len()
    );
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::Depth;
    use crate::raster::{GeoTransform, Grid};
    use approx::assert_relative_eq;

    fn grid_from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> Depth) -> DepthGrid {
        let values = (0..rows * cols).map(|i| f(i / cols, i % cols)).collect();
        Grid::from_shape_vec(rows, cols, values, GeoTransform::new(0.0, rows as f64, 1.0, -1.0))
            .unwrap()
    }

    fn config(block: usize) -> FlowConfig {
        FlowConfig {
            block_rows: block,
            block_cols: block,
            ..FlowConfig::default()
        }
    }

    #[test]
    fn test_constant_depth_has_zero_magnitude() {
        let depth = grid_from_fn(10, 10, |_, _| Depth::Valid(0.9));
        let field = derive_flow_field(&depth, &config(2));

        assert!(field.defined_count() > 0);
        for cell in field.cells() {
            assert_eq!(cell.sample.vector().magnitude, 0.0);
        }
    }

    #[test]
    fn test_eastward_ramp_flows_west() {
        let depth = grid_from_fn(10, 10, |_, c| Depth::Valid(0.1 * c as f64));
        let cfg = FlowConfig {
            speed_scale: 2.0,
            ..config(3)
        };
        let field = derive_flow_field(&depth, &cfg);

        for cell in field.cells() {
            if let Some(v) = cell.sample.defined() {
                assert_relative_eq!(v.dx, -1.0, epsilon = 1e-12);
                assert_relative_eq!(v.dy, 0.0, epsilon = 1e-12);
                assert_relative_eq!(v.magnitude, 0.2, epsilon = 1e-12);
            }
        }
        assert_eq!(field.defined_count(), 9);
    }

    #[test]
    fn test_magnitude_is_proportional_to_slope() {
        let gentle = grid_from_fn(9, 9, |_, c| Depth::Valid(0.05 * c as f64));
        let steep = grid_from_fn(9, 9, |_, c| Depth::Valid(0.15 * c as f64));

        let a = derive_flow_field(&gentle, &config(3));
        let b = derive_flow_field(&steep, &config(3));

        let ma = a.get(1, 1).unwrap().sample.vector().magnitude;
        let mb = b.get(1, 1).unwrap().sample.vector().magnitude;
        assert_relative_eq!(mb / ma, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degree_raster_magnitude_tracks_slope() {
        // ~10 m pixels in decimal degrees
        let ramp = |step: f64| {
            let values = (0..45 * 45).map(|i| Depth::Valid(step * (i % 45) as f64)).collect();
            Grid::from_shape_vec(45, 45, values, GeoTransform::new(-81.25, 42.68, 0.00009, -0.00009))
                .unwrap()
        };

        let gentle = derive_flow_field(&ramp(0.002), &FlowConfig::default());
        let steep = derive_flow_field(&ramp(0.006), &FlowConfig::default());

        let ma = gentle.get(1, 1).unwrap().sample.vector().magnitude;
        let mb = steep.get(1, 1).unwrap().sample.vector().magnitude;
        assert_relative_eq!(ma, 0.002, epsilon = 1e-12);
        assert_relative_eq!(mb / ma, 3.0, epsilon = 1e-9);
        assert!(mb < FlowConfig::default().max_magnitude);
        assert_relative_eq!(steep.get(1, 1).unwrap().sample.vector().dx, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_southward_deepening_flows_north() {
        // Row index grows southwards on a north-up raster
        let depth = grid_from_fn(9, 9, |r, _| Depth::Valid(0.1 * r as f64));
        let field = derive_flow_field(&depth, &config(3));

        let v = field.get(1, 1).unwrap().sample.vector();
        assert_relative_eq!(v.dx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.dy, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_magnitude_is_clamped() {
        let depth = grid_from_fn(9, 9, |_, c| Depth::Valid(1000.0 * c as f64));
        let field = derive_flow_field(&depth, &config(3));
        assert_eq!(
            field.get(1, 1).unwrap().sample.vector().magnitude,
            FlowConfig::default().max_magnitude
        );
    }

    #[test]
    fn test_edges_and_invalid_neighbours_are_undefined() {
        let depth = grid_from_fn(6, 6, |r, c| {
            if (r, c) == (2, 3) {
                Depth::Invalid
            } else {
                Depth::Valid(0.5)
            }
        });

        assert!(gradient_at(&depth, 0, 3).is_none());
        assert!(gradient_at(&depth, 3, 5).is_none());
        assert!(gradient_at(&depth, 2, 2).is_none());
        assert!(gradient_at(&depth, 3, 3).is_none());
        assert_eq!(gradient_at(&depth, 4, 1), Some((0.0, 0.0)));

        let field = derive_flow_field(&depth, &config(1));
        assert_eq!(field.get(0, 0).unwrap().sample, FlowSample::Undefined);
        assert_eq!(field.get(2, 2).unwrap().sample, FlowSample::Undefined);
        assert!(field.get(4, 1).unwrap().sample.is_defined());
    }

    #[test]
    fn test_lattice_geometry() {
        let depth = grid_from_fn(10, 10, |_, _| Depth::Valid(1.0));
        let field = derive_flow_field(&depth, &config(3));

        assert_eq!((field.rows(), field.cols()), (4, 4));
        let first = field.get(0, 0).unwrap();
        assert_eq!((first.source_row, first.source_col), (1, 1));
        assert_relative_eq!(first.lon, 1.5);
        assert_relative_eq!(first.lat, 10.0 - 1.5);

        let last = field.get(3, 3).unwrap();
        assert_eq!((last.source_row, last.source_col), (9, 9));
        assert_eq!(last.sample, FlowSample::Undefined);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let depth = grid_from_fn(30, 25, |r, c| {
            Depth::Valid(((r * 7 + c * 3) % 11) as f64 * 0.01 + 0.5)
        });
        let cfg = FlowConfig {
            smoothing_sigma: 1.0,
            ..config(4)
        };

        assert_eq!(derive_flow_field(&depth, &cfg), derive_flow_field(&depth, &cfg));
    }
}
