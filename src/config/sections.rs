use serde::Deserialize;

use crate::config::ConfigError;
use crate::render::Colormap;

/// A named input raster, e.g. `{"name": "green", "path": "scene/*B03_10m.tif"}`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RasterFile {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SceneConfig {
    /// Prefix of every output file; a timestamped name is generated when absent.
    pub name: Option<String>,
    pub bands: Vec<RasterFile>,
}

/// Where the AOI polygon comes from: a GeoJSON file or inline `[lon, lat]` vertices.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum AoiSource {
    GeoJson { path: String },
    Vertices { vertices: Vec<[f64; 2]> },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FlowConfig {
    /// Depth-grid rows per flow lattice cell.
    pub block_rows: usize,
    /// Depth-grid columns per flow lattice cell.
    pub block_cols: usize,
    /// Magnitude per unit of depth change per pixel.
    pub speed_scale: f64,
    /// Upper bound on vector magnitude.
    pub max_magnitude: f64,
    /// Gaussian pre-smoothing of the depth grid in cells, 0 disables it.
    pub smoothing_sigma: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            block_rows: 15,
            block_cols: 15,
            speed_scale: 1.0,
            max_magnitude: 10.0,
            smoothing_sigma: 0.0,
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_rows == 0 {
            return Err(ConfigError::out_of_range("flow.block_rows", ">= 1", 0.0));
        }
        if self.block_cols == 0 {
            return Err(ConfigError::out_of_range("flow.block_cols", ">= 1", 0.0));
        }
        if !(self.speed_scale.is_finite() && self.speed_scale > 0.0) {
            return Err(ConfigError::out_of_range(
                "flow.speed_scale",
                "finite and > 0",
                self.speed_scale,
            ));
        }
        if !(self.max_magnitude.is_finite() && self.max_magnitude > 0.0) {
            return Err(ConfigError::out_of_range(
                "flow.max_magnitude",
                "finite and > 0",
                self.max_magnitude,
            ));
        }
        if !(self.smoothing_sigma.is_finite() && self.smoothing_sigma >= 0.0) {
            return Err(ConfigError::out_of_range(
                "flow.smoothing_sigma",
                "finite and >= 0",
                self.smoothing_sigma,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Divergence below this is at least moderate risk. Divergence is in flow
    /// velocity per depth-grid pixel.
    pub threshold_moderate: f64,
    /// Divergence below this is high risk.
    pub threshold_high: f64,
    /// Direction pointing away from the shore, `[east, north]`.
    pub offshore_direction: [f64; 2],
    /// Multiplier applied to directional scores before clamping to 1.
    pub gain: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            threshold_moderate: -0.05,
            threshold_high: -0.25,
            offshore_direction: [0.0, -1.0],
            gain: 100.0,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.threshold_moderate.is_finite()
            && self.threshold_high.is_finite()
            && self.threshold_high < self.threshold_moderate;
        if !ordered {
            return Err(ConfigError::ThresholdOrder {
                moderate: self.threshold_moderate,
                high: self.threshold_high,
            });
        }

        let [east, north] = self.offshore_direction;
        let norm = east.hypot(north);
        if !(norm.is_finite() && norm > 0.0) {
            return Err(ConfigError::out_of_range(
                "risk.offshore_direction",
                "a finite non-zero vector",
                norm,
            ));
        }

        if !(self.gain.is_finite() && self.gain > 0.0) {
            return Err(ConfigError::out_of_range("risk.gain", "finite and > 0", self.gain));
        }
        Ok(())
    }

    /// Unit offshore vector.
    pub fn offshore_unit(&self) -> (f64, f64) {
        let [east, north] = self.offshore_direction;
        let norm = east.hypot(north);
        (east / norm, north / norm)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct VisualConfig {
    pub colormap: Colormap,
    /// Output pixels per depth cell along each axis.
    pub scale: u32,
    /// Alpha of valid cells in (0, 1].
    pub opacity: f64,
    /// RGBA of invalid cells.
    pub invalid_color: [u8; 4],
    /// Number of depth contour intervals drawn over valid cells, 0 disables
    /// contours.
    pub contour_levels: usize,
    /// RGB of contour lines, blended half and half with the depth colour.
    pub contour_color: [u8; 3],
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            scale: 1,
            opacity: 0.9,
            invalid_color: [0, 0, 0, 0],
            contour_levels: 8,
            contour_color: [128, 0, 128],
        }
    }
}

impl VisualConfig {
    pub fn valid_alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale == 0 {
            return Err(ConfigError::out_of_range("visual.scale", ">= 1", 0.0));
        }
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(ConfigError::out_of_range(
                "visual.opacity",
                "in (0, 1]",
                self.opacity,
            ));
        }
        if self.invalid_color[3] == self.valid_alpha() {
            return Err(ConfigError::InvalidColor(self.invalid_color[3]));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Flow vectors weaker than this percentile of defined magnitudes are left
    /// out of the JSON export; 0 keeps every lattice cell.
    pub min_magnitude_percentile: f64,
    /// Depth-grid cells per exported browser grid cell.
    pub depth_grid_downsample: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            min_magnitude_percentile: 0.0,
            depth_grid_downsample: 10,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.min_magnitude_percentile) {
            return Err(ConfigError::out_of_range(
                "export.min_magnitude_percentile",
                "in [0, 100]",
                self.min_magnitude_percentile,
            ));
        }
        if self.depth_grid_downsample == 0 {
            return Err(ConfigError::out_of_range(
                "export.depth_grid_downsample",
                ">= 1",
                0.0,
            ));
        }
        Ok(())
    }
}
