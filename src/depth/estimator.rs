use ndarray::Zip;
use thiserror::Error;

use crate::bands::Band;
use crate::config::{Config, RatioMethod};
use crate::depth::{Depth, DepthGrid};
use crate::raster::BandSet;

#[derive(Debug, Error, PartialEq)]
pub enum DepthError {
    #[error("band {band} is required by the {method} ratio but missing from the scene")]
    MissingBand { band: Band, method: RatioMethod },
}

/// `ln(numerator) / ln(denominator)`.
///
/// Both inputs must be positive and finite. A denominator of exactly 1 has
/// `ln = 0` and is rejected. Rejected inputs give `Depth::Invalid`.
pub fn log_ratio(numerator: f64, denominator: f64) -> Depth {
    if !(numerator.is_finite() && denominator.is_finite()) {
        return Depth::Invalid;
    }
    if numerator <= 0.0 || denominator <= 0.0 {
        return Depth::Invalid;
    }

    let ln_denominator = denominator.ln();
    if ln_denominator == 0.0 {
        return Depth::Invalid;
    }

    Depth::from_value(numerator.ln() / ln_denominator)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DepthEstimator {
    method: RatioMethod,
    nodata: Option<f64>,
    saturation: Option<f64>,
}

impl DepthEstimator {
    pub fn new(method: RatioMethod) -> Self {
        Self {
            method,
            nodata: None,
            saturation: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.ratio_method())
            .with_nodata(config.nodata())
            .with_saturation(config.saturation())
    }

    /// Sample value treated as nodata in addition to what the rasters declare.
    pub fn with_nodata(mut self, nodata: Option<f64>) -> Self {
        self.nodata = nodata;
        self
    }

    /// Reflectance at or above this value is saturated and invalid.
    pub fn with_saturation(mut self, saturation: Option<f64>) -> Self {
        self.saturation = saturation;
        self
    }

    pub fn method(&self) -> RatioMethod {
        self.method
    }

    fn reflectance(&self, sample: Option<f64>) -> Option<f64> {
        let value = sample?;
        if self.nodata.is_some_and(|nodata| value == nodata) {
            return None;
        }
        if self.saturation.is_some_and(|saturation| value >= saturation) {
            return None;
        }
        Some(value)
    }

    pub fn estimate(&self, bands: &BandSet) -> Result<DepthGrid, DepthError> {
        let (numerator_band, denominator_band) = self.method.bands();
        let missing = |band| DepthError::MissingBand {
            band,
            method: self.method,
        };

        let numerator = bands
            .get(numerator_band)
            .ok_or_else(|| missing(numerator_band))?;
        let denominator = bands
            .get(denominator_band)
            .ok_or_else(|| missing(denominator_band))?;

        let depth = Zip::from(numerator.data())
            .and(denominator.data())
            .map_collect(|&n, &d| match (self.reflectance(n), self.reflectance(d)) {
                (Some(n), Some(d)) => log_ratio(n, d),
                _ => Depth::Invalid,
            });

        let invalid = depth.iter().filter(|d| !d.is_valid()).count();
        log::debug!(
            "{} ratio: {} of {} pixels invalid",
            self.method,
            invalid,
            depth.len()
        );

        Ok(numerator.with_data(depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BandGrid, GeoTransform, Grid};
    use approx::assert_relative_eq;

    fn band(values: Vec<Option<f64>>) -> BandGrid {
        let cols = values.len();
        Grid::from_shape_vec(1, cols, values, GeoTransform::new(0.0, 1.0, 1.0, -1.0)).unwrap()
    }

    fn green_red(green: Vec<Option<f64>>, red: Vec<Option<f64>>) -> BandSet {
        BandSet::new()
            .with_band(Band::Green, band(green))
            .unwrap()
            .with_band(Band::Red, band(red))
            .unwrap()
    }

    #[test]
    fn test_log_ratio_valid_range() {
        let depth = log_ratio(0.04, 0.01).value().unwrap();
        assert_relative_eq!(depth, 0.04_f64.ln() / 0.01_f64.ln());
        assert_relative_eq!(depth, 0.69897, epsilon = 1e-5);
    }

    #[test]
    fn test_log_ratio_guards() {
        assert_eq!(log_ratio(0.04, 1.0), Depth::Invalid);
        assert_eq!(log_ratio(0.04, 0.0), Depth::Invalid);
        assert_eq!(log_ratio(0.04, -0.2), Depth::Invalid);
        assert_eq!(log_ratio(0.0, 0.5), Depth::Invalid);
        assert_eq!(log_ratio(f64::NAN, 0.5), Depth::Invalid);
        assert_eq!(log_ratio(0.5, f64::INFINITY), Depth::Invalid);
    }

    #[test]
    fn test_invalid_pixels_are_marked() {
        let bands = green_red(
            vec![Some(0.04), Some(0.04), Some(0.04), None, Some(0.04)],
            vec![Some(0.02), Some(1.0), Some(-0.1), Some(0.02), Some(0.0)],
        );

        let depth = DepthEstimator::default().estimate(&bands).unwrap();

        assert!(depth.get(0, 0).unwrap().is_valid());
        for col in 1..5 {
            assert_eq!(depth.get(0, col), Some(&Depth::Invalid), "col {col}");
        }
    }

    #[test]
    fn test_nodata_and_saturation() {
        let bands = green_red(
            vec![Some(0.04), Some(0.04), Some(0.04)],
            vec![Some(0.02), Some(-9999.0), Some(0.9)],
        );

        let depth = DepthEstimator::new(RatioMethod::GreenRed)
            .with_nodata(Some(-9999.0))
            .with_saturation(Some(0.8))
            .estimate(&bands)
            .unwrap();

        assert!(depth.get(0, 0).unwrap().is_valid());
        assert_eq!(depth.get(0, 1), Some(&Depth::Invalid));
        assert_eq!(depth.get(0, 2), Some(&Depth::Invalid));
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let green: Vec<_> = (1..=20).map(|i| Some(0.01 * i as f64)).collect();
        let red: Vec<_> = (1..=20).map(|i| Some(0.045 - 0.002 * i as f64)).collect();
        let bands = green_red(green, red);

        let estimator = DepthEstimator::default();
        let a = estimator.estimate(&bands).unwrap();
        let b = estimator.estimate(&bands).unwrap();

        for (x, y) in a.data().iter().zip(b.data().iter()) {
            match (x, y) {
                (Depth::Valid(x), Depth::Valid(y)) => assert_eq!(x.to_bits(), y.to_bits()),
                (x, y) => assert_eq!(x, y),
            }
        }
    }

    #[test]
    fn test_blue_green_variant() {
        let bands = BandSet::new()
            .with_band(Band::Blue, band(vec![Some(0.05)]))
            .unwrap()
            .with_band(Band::Green, band(vec![Some(0.03)]))
            .unwrap();

        let depth = DepthEstimator::new(RatioMethod::BlueGreen)
            .estimate(&bands)
            .unwrap();
        assert_relative_eq!(
            depth.get(0, 0).unwrap().value().unwrap(),
            0.05_f64.ln() / 0.03_f64.ln()
        );
    }

    #[test]
    fn test_missing_band() {
        let bands = BandSet::new()
            .with_band(Band::Green, band(vec![Some(0.05)]))
            .unwrap();

        assert_eq!(
            DepthEstimator::default().estimate(&bands),
            Err(DepthError::MissingBand {
                band: Band::Red,
                method: RatioMethod::GreenRed
            })
        );
        assert_eq!(
            DepthEstimator::new(RatioMethod::BlueGreen).estimate(&bands),
            Err(DepthError::MissingBand {
                band: Band::Blue,
                method: RatioMethod::BlueGreen
            })
        );
    }
}
