use nearshore::{BatchProcessor, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./config.json".to_string());
    log::info!("Starting nearshore bathymetry processing with {}", config_path);

    let config = Config::from_file(&config_path)?;
    let summary = BatchProcessor::new(config).process()?;

    for outputs in &summary.succeeded {
        match &outputs.statistics {
            Some(stats) => log::info!("{}: {}", outputs.name, stats),
            None => log::info!("{}: no valid depth inside the AOI", outputs.name),
        }
    }

    if !summary.is_success() {
        return Err(format!("{} scene(s) failed", summary.failed.len()).into());
    }
    Ok(())
}
