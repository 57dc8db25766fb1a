use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::aoi::BoundaryRule;

pub mod error;
pub use error::ConfigError;

pub mod ratio_method;
pub use ratio_method::RatioMethod;

pub mod sections;
pub use sections::{
    AoiSource, ExportConfig, FlowConfig, RasterFile, RiskConfig, SceneConfig, VisualConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    scenes: Vec<SceneConfig>,
    aoi: AoiSource,
    output_directory: PathBuf,
    ratio_method: RatioMethod,
    nodata: Option<f64>,
    saturation: Option<f64>,
    boundary_rule: BoundaryRule,
    flow: FlowConfig,
    risk: RiskConfig,
    visual: VisualConfig,
    export: ExportConfig,
}

// Deserializes through a helper so that enumerated strings are parsed with
// their own error types and every section is validated before a Config exists.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            scenes: Vec<SceneConfig>,
            aoi: AoiSource,
            #[serde(default = "default_output_directory")]
            output_directory: PathBuf,
            #[serde(default)]
            ratio_method: Option<String>,
            #[serde(default)]
            nodata: Option<f64>,
            #[serde(default)]
            saturation: Option<f64>,
            #[serde(default)]
            boundary_rule: BoundaryRule,
            #[serde(default)]
            flow: FlowConfig,
            #[serde(default)]
            risk: RiskConfig,
            #[serde(default)]
            visual: VisualConfig,
            #[serde(default)]
            export: ExportConfig,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;

        if helper.scenes.is_empty() {
            return Err(D::Error::custom(ConfigError::NoScenes));
        }

        let ratio_method = match helper.ratio_method {
            Some(name) => name
                .parse::<RatioMethod>()
                .map_err(|e| D::Error::custom(ConfigError::from(e)))?,
            None => RatioMethod::default(),
        };

        if let Some(saturation) = helper.saturation
            && !(saturation.is_finite() && saturation > 0.0)
        {
            return Err(D::Error::custom(ConfigError::out_of_range(
                "saturation",
                "finite and > 0",
                saturation,
            )));
        }

        helper.flow.validate().map_err(D::Error::custom)?;
        helper.risk.validate().map_err(D::Error::custom)?;
        helper.visual.validate().map_err(D::Error::custom)?;
        helper.export.validate().map_err(D::Error::custom)?;

        Ok(Config {
            scenes: helper.scenes,
            aoi: helper.aoi,
            output_directory: helper.output_directory,
            ratio_method,
            nodata: helper.nodata,
            saturation: helper.saturation,
            boundary_rule: helper.boundary_rule,
            flow: helper.flow,
            risk: helper.risk,
            visual: helper.visual,
            export: helper.export,
        })
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

impl Config {
    pub fn new(scenes: Vec<SceneConfig>, aoi: AoiSource) -> Self {
        Self {
            scenes,
            aoi,
            output_directory: default_output_directory(),
            ratio_method: RatioMethod::default(),
            nodata: None,
            saturation: None,
            boundary_rule: BoundaryRule::default(),
            flow: FlowConfig::default(),
            risk: RiskConfig::default(),
            visual: VisualConfig::default(),
            export: ExportConfig::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn with_output_directory<P: Into<PathBuf>>(mut self, output_directory: P) -> Self {
        self.output_directory = output_directory.into();
        self
    }

    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    pub fn with_risk(mut self, risk: RiskConfig) -> Self {
        self.risk = risk;
        self
    }

    pub fn scenes(&self) -> &[SceneConfig] {
        &self.scenes
    }

    pub fn aoi(&self) -> &AoiSource {
        &self.aoi
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn ratio_method(&self) -> RatioMethod {
        self.ratio_method
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn saturation(&self) -> Option<f64> {
        self.saturation
    }

    pub fn boundary_rule(&self) -> BoundaryRule {
        self.boundary_rule
    }

    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }

    pub fn risk(&self) -> &RiskConfig {
        &self.risk
    }

    pub fn visual(&self) -> &VisualConfig {
        &self.visual
    }

    pub fn export(&self) -> &ExportConfig {
        &self.export
    }
}
