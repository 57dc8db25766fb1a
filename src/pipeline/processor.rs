use std::path::PathBuf;

use crate::aoi::{AoiPolygon, clip_to_aoi};
use crate::bands::Band;
use crate::bbox::Bounds;
use crate::config::{AoiSource, Config, SceneConfig};
use crate::depth::{DepthEstimator, DepthGrid, DepthStatistics};
use crate::error::PipelineError;
use crate::export::{depth_grid_document, flow_vectors_document, overlay_bounds, risk_zones_document};
use crate::flow::{FlowField, derive_flow_field};
use crate::raster::BandSet;
use crate::readers::{read_aoi_file, read_band};
use crate::render::{Overlay, render_overlay};
use crate::risk::{DirectionalRisk, RiskClass, RiskZoneGrid, classify_risk, directional_risk};
use crate::utils::log_depth_statistics;
use crate::writers::{WriteError, write_depth_geotiff, write_json};

/// In-memory products of one scene.
#[derive(Debug, Clone)]
pub struct SceneProducts {
    /// Depth over the full band extent.
    pub depth: DepthGrid,
    pub clipped: DepthGrid,
    pub overlay: Overlay,
    pub flow: FlowField,
    pub risk: RiskZoneGrid,
    pub directional: DirectionalRisk,
}

/// Files written for one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneOutputs {
    pub name: String,
    pub depth_tif: PathBuf,
    pub overlay_png: PathBuf,
    pub overlay_bounds: PathBuf,
    pub flow_vectors: PathBuf,
    pub risk_zones: PathBuf,
    pub depth_grid: PathBuf,
    pub statistics: Option<DepthStatistics>,
}

/// Parses the configured AOI, either a GeoJSON file or inline vertices.
pub fn load_aoi(source: &AoiSource) -> Result<AoiPolygon, PipelineError> {
    match source {
        AoiSource::GeoJson { path } => read_aoi_file(path).map_err(PipelineError::AoiSource),
        AoiSource::Vertices { vertices } => {
            let vertices = vertices.iter().map(|[lon, lat]| (*lon, *lat)).collect();
            Ok(AoiPolygon::new(vertices)?)
        }
    }
}

/// Depth estimate, clip, overlay, flow and risk for an already loaded band set.
///
/// The overlay and the flow branch both read the clipped grid; nothing here
/// touches the filesystem.
pub fn run_scene(
    bands: &BandSet,
    polygon: &AoiPolygon,
    config: &Config,
) -> Result<SceneProducts, PipelineError> {
    let depth = DepthEstimator::from_config(config).estimate(bands)?;
    log_depth_statistics("scene", &depth);

    let clipped = clip_to_aoi(&depth, polygon, config.boundary_rule())?;
    log::info!("AOI window is {}x{} cells", clipped.rows(), clipped.cols());

    let overlay = render_overlay(&clipped, config.visual());
    let flow = derive_flow_field(&clipped, config.flow());
    let risk = classify_risk(&flow, config.risk());
    let directional = directional_risk(&flow, &risk, config.risk());

    log::info!(
        "Flow lattice {}x{} ({} defined), risk: {} high, {} moderate, {} low, {} indeterminate",
        flow.rows(),
        flow.cols(),
        flow.defined_count(),
        risk.count(RiskClass::High),
        risk.count(RiskClass::Moderate),
        risk.count(RiskClass::Low),
        risk.count(RiskClass::Indeterminate),
    );

    Ok(SceneProducts {
        depth,
        clipped,
        overlay,
        flow,
        risk,
        directional,
    })
}

pub struct SceneProcessor<'a> {
    config: &'a Config,
    aoi: AoiPolygon,
}

impl<'a> SceneProcessor<'a> {
    pub fn new(config: &'a Config) -> Result<Self, PipelineError> {
        let aoi = load_aoi(config.aoi())?;
        Ok(Self::with_aoi(config, aoi))
    }

    pub fn with_aoi(config: &'a Config, aoi: AoiPolygon) -> Self {
        SceneProcessor { config, aoi }
    }

    pub fn aoi(&self) -> &AoiPolygon {
        &self.aoi
    }

    /// Reads every configured band into a co-registered set.
    pub fn load_bands(&self, scene: &SceneConfig) -> Result<BandSet, PipelineError> {
        let mut bands = BandSet::new();
        for raster in &scene.bands {
            let band: Band = raster.name.parse()?;
            let grid = read_band(&raster.path)?;
            log::info!(
                "Loaded {} ({}) from {}: {}x{}",
                band,
                band.sentinel2_id(),
                raster.path,
                grid.rows(),
                grid.cols()
            );
            bands.insert(band, grid)?;
        }
        Ok(bands)
    }

    /// Loads, processes and writes one scene under `name`.
    pub fn process(&self, scene: &SceneConfig, name: &str) -> Result<SceneOutputs, PipelineError> {
        log::info!("Processing scene {}", name);
        let bands = self.load_bands(scene)?;
        let products = run_scene(&bands, &self.aoi, self.config)?;
        self.write_outputs(name, &products)
    }

    pub fn write_outputs(
        &self,
        name: &str,
        products: &SceneProducts,
    ) -> Result<SceneOutputs, PipelineError> {
        let dir = self.config.output_directory();
        std::fs::create_dir_all(dir).map_err(|source| WriteError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let file = |suffix: &str| -> PathBuf { dir.join(format!("{}_{}", name, suffix)) };
        let outputs = SceneOutputs {
            name: name.to_string(),
            depth_tif: file("depth.tif"),
            overlay_png: file("overlay.png"),
            overlay_bounds: file("overlay.json"),
            flow_vectors: file("flow_vectors.json"),
            risk_zones: file("rip_risk_zones.json"),
            depth_grid: file("depth_grid.json"),
            statistics: DepthStatistics::compute(&products.clipped),
        };

        write_depth_geotiff(&products.clipped, &outputs.depth_tif)?;
        products
            .overlay
            .save_png(&outputs.overlay_png)
            .map_err(WriteError::from)?;

        let bounds: Bounds = overlay_bounds(&products.overlay);
        write_json(&bounds, &outputs.overlay_bounds)?;

        let export = self.config.export();
        write_json(
            &flow_vectors_document(&products.flow, export.min_magnitude_percentile),
            &outputs.flow_vectors,
        )?;
        write_json(
            &risk_zones_document(&products.risk, products.directional.clone()),
            &outputs.risk_zones,
        )?;
        write_json(
            &depth_grid_document(&products.clipped, export.depth_grid_downsample),
            &outputs.depth_grid,
        )?;

        log::info!("Wrote {} outputs to {}", name, dir.display());
        Ok(outputs)
    }
}
