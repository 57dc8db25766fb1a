use chrono::Local;

use crate::config::{Config, SceneConfig};
use crate::error::PipelineError;
use crate::pipeline::{SceneOutputs, SceneProcessor};

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<SceneOutputs>,
    pub failed: Vec<(String, PipelineError)>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs every configured scene; a failing scene is logged and skipped.
#[derive(Debug)]
pub struct BatchProcessor {
    config: Config,
}

impl BatchProcessor {
    pub fn new(config: Config) -> Self {
        BatchProcessor { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output prefix for each scene. Unnamed scenes share one timestamp and
    /// get an index suffix when the batch has more than one scene.
    pub fn scene_names(&self) -> Vec<String> {
        let stamp = Local::now().format("bathymetry_%Y%m%d_%H%M%S").to_string();
        let scenes = self.config.scenes();
        scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| scene_name(scene, &stamp, i, scenes.len()))
            .collect()
    }

    /// Fails only when the AOI cannot be loaded, since every scene needs it.
    pub fn process(&self) -> Result<BatchSummary, PipelineError> {
        let processor = SceneProcessor::new(&self.config)?;
        let mut summary = BatchSummary::default();

        for (scene, name) in self.config.scenes().iter().zip(self.scene_names()) {
            match processor.process(scene, &name) {
                Ok(outputs) => summary.succeeded.push(outputs),
                Err(e) => {
                    log::warn!("Scene {} failed during {}: {}", name, e.stage(), e);
                    summary.failed.push((name, e));
                }
            }
        }

        log::info!(
            "Processed {} scene(s): {} succeeded, {} failed",
            self.config.scenes().len(),
            summary.succeeded.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}

fn scene_name(scene: &SceneConfig, stamp: &str, index: usize, total: usize) -> String {
    match &scene.name {
        Some(name) => name.clone(),
        None if total > 1 => format!("{}_{}", stamp, index + 1),
        None => stamp.to_string(),
    }
}
