use std::fmt::Display;

use crate::depth::DepthGrid;

/// Summary of the valid cells of a depth grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub valid: usize,
    pub total: usize,
}

impl DepthStatistics {
    /// `None` when the grid has no valid cell.
    pub fn compute(grid: &DepthGrid) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut valid = 0usize;

        for value in grid.data().iter().filter_map(|d| d.value()) {
            min = min.min(value);
            max = max.max(value);
            sum += value;
            valid += 1;
        }

        if valid == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: sum / valid as f64,
            valid,
            total: grid.len(),
        })
    }

    pub fn valid_fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f64 / self.total as f64
        }
    }
}

impl Display for DepthStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "min {:.4}, max {:.4}, mean {:.4}, valid {} / {} ({:.1}%)",
            self.min,
            self.max,
            self.mean,
            self.valid,
            self.total,
            100.0 * self.valid_fraction()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depth::Depth;
    use crate::raster::{GeoTransform, Grid};
    use approx::assert_relative_eq;

    #[test]
    fn test_statistics_skip_invalid() {
        let grid = Grid::from_shape_vec(
            2,
            2,
            vec![
                Depth::Valid(1.0),
                Depth::Invalid,
                Depth::Valid(3.0),
                Depth::Valid(2.0),
            ],
            GeoTransform::default(),
        )
        .unwrap();

        let stats = DepthStatistics::compute(&grid).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert_relative_eq!(stats.mean, 2.0);
        assert_relative_eq!(stats.valid_fraction(), 0.75);
        assert!(stats.to_string().contains("3 / 4"));
    }

    #[test]
    fn test_all_invalid() {
        let grid = Grid::from_shape_vec(1, 2, vec![Depth::Invalid; 2], GeoTransform::default())
            .unwrap();
        assert!(DepthStatistics::compute(&grid).is_none());
    }
}
